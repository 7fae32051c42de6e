//! Lexical path handling, no filesystem access.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components. A `..` at the top of the path is dropped.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True when `candidate` lies under (or equals) `root` once both are normalized.
pub fn is_under(candidate: &Path, root: &Path) -> bool {
    lexical_normalize(candidate).starts_with(lexical_normalize(root))
}
