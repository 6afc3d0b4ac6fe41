//! Search wildcards as `glob` patterns.
//!
//! The repository's `$match` knows two metacharacters: `*` for any run of characters and
//! `?` for exactly one. Everything else, brackets included, is literal, so literal runs
//! are escaped before `glob` sees them and runs of `*` collapse to one.

use glob::{Pattern, PatternError};

pub(crate) fn compile(raw: &str) -> Result<Pattern, PatternError> { Pattern::new(&translate(raw)) }

fn translate(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut literal = String::new();

    for c in raw.chars() {
        if c != '*' && c != '?' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            out.push_str(&Pattern::escape(&literal));
            literal.clear();
        } else if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out.push_str(&Pattern::escape(&literal));
    out
}
