//! Search expression construction.
//!
//! Every user-supplied value enters the expression as a JSON string literal produced by
//! `serde_json`, so quotes and backslashes in masks or paths stay inside their clause.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::filter::CandidateFilter;

/// Fields requested for every matching item.
pub const INCLUDED_FIELDS: [&str; 5] = ["name", "repo", "path", "created", "sha256"];

/// Timestamp layout understood by the search endpoint.
pub const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Build the criteria object:
///
/// ```text
/// $and: [ repo == R, path ~ P*, created > T, $and[path !~ X...], $or[name ~ M...] ]
/// ```
///
/// The exclude block is the negated disjunction NOT(X1 or X2 ...) written as a
/// conjunction of `$nmatch` clauses; it is omitted when there are no excludes.
pub fn criteria(filter: &CandidateFilter, threshold: DateTime<Utc>) -> Value {
    let mut clauses = vec![
        json!({ "repo": filter.repo() }),
        json!({ "path": { "$match": filter.prefix_glob() } }),
        json!({ "created": { "$gt": threshold.format(CREATED_FORMAT).to_string() } }),
    ];

    let excludes: Vec<Value> = filter
        .exclude_patterns()
        .map(|pattern| json!({ "path": { "$nmatch": pattern } }))
        .collect();
    if !excludes.is_empty() {
        clauses.push(json!({ "$and": excludes }));
    }

    let masks: Vec<Value> = filter
        .name_masks()
        .map(|mask| json!({ "name": { "$match": mask } }))
        .collect();
    clauses.push(json!({ "$or": masks }));

    json!({ "$and": clauses })
}

/// Render the complete `items.find(...).include(...)` expression.
pub fn build(filter: &CandidateFilter, threshold: DateTime<Utc>) -> String {
    let include = INCLUDED_FIELDS
        .iter()
        .map(|field| Value::from(*field).to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("items.find({}).include({include})", criteria(filter, threshold))
}
