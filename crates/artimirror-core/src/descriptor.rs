use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use url::Url;

/// One remote artifact selected for synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub repo:         String,
    /// Slash-separated directory inside the repository, empty at the repository root.
    pub path:         String,
    pub name:         String,
    pub created_at:   DateTime<Utc>,
    /// Lower-case hex SHA-256 as reported by the server.
    pub checksum:     Option<String>,
    pub download_url: String,
}

impl ArtifactDescriptor {
    /// `repo/path/name` as it appears on the server, for log events.
    pub fn remote_path(&self) -> String {
        [self.repo.as_str(), self.path.as_str(), self.name.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Local directory mirroring `{repo}/{path}` below `root`.
    pub fn local_dir(&self, root: &Path) -> PathBuf {
        let mut dir = root.join(&self.repo);
        dir.extend(segments(&self.path));
        dir
    }

    /// Final local location `{root}/{repo}/{path}/{name}`.
    pub fn target_path(&self, root: &Path) -> PathBuf { self.local_dir(root).join(&self.name) }
}

/// Canonical form of a server path: no surrounding slashes, `.` for the repository root
/// becomes empty.
pub fn normalize_path(raw: &str) -> String {
    segments(raw).collect::<Vec<_>>().join("/")
}

/// `{base}/artifactory/{repo}/{path}/{name}` with every segment percent-encoded.
pub fn download_url(base: &Url, repo: &str, path: &str, name: &str) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push("artifactory")
        .push(repo)
        .extend(segments(path))
        .push(name);
    Some(url)
}

/// True when a name or path segment cannot escape or alias its parent directory.
pub(crate) fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}
