//! Path policy for caller-supplied paths

use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use arbor_core::ArborError;

/// Accept an absolute path or one starting with `~/`, expand the home
/// directory and normalise `.` and `..` lexically.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!(ArborError::InvalidPath(
            "path cannot be empty, provide an absolute path".to_string()
        ));
    }

    let expanded = if raw == "~" || raw.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            ArborError::InvalidPath("cannot resolve the home directory".to_string())
        })?;
        match raw.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => home,
        }
    } else {
        PathBuf::from(raw)
    };

    if !expanded.is_absolute() {
        bail!(ArborError::InvalidPath(format!(
            "'{raw}' must be absolute or start with '~/'"
        )));
    }

    Ok(normalize(&expanded))
}

fn normalize(path: &Path) -> PathBuf {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_and_empty() {
        assert!(expand_path("").is_err());
        assert!(expand_path("src/module").is_err());
        assert!(expand_path("./module").is_err());
    }

    #[test]
    fn normalises_absolute_paths() {
        let path = expand_path("/srv/project/./a/../b/").unwrap();
        assert_eq!(path, PathBuf::from("/srv/project/b"));
    }

    #[test]
    fn expands_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/code").unwrap(), home.join("code"));
            assert_eq!(expand_path("~").unwrap(), home);
        }
    }
}
