//! File utility functions

use std::path::PathBuf;

/// Expand a path string to an absolute path.
///
/// Handles tilde expansion (`~`, `~/path`), relative paths (`.`, `..`,
/// `./path`), bare names, and passes absolute paths through unchanged.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    if path == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("."));
    }

    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
        return PathBuf::from(rest);
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return p;
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let joined = cwd.join(&p);
    joined.canonicalize().unwrap_or(joined)
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_unchanged() {
        assert_eq!(expand_path("/etc/config"), PathBuf::from("/etc/config"));
    }

    #[test]
    fn test_empty_resolves_to_cwd() {
        let p = expand_path("");
        assert!(p.is_absolute());
    }

    #[test]
    fn test_tilde_expansion() {
        let p = expand_path("~/data");
        assert!(!p.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_relative_becomes_absolute() {
        let p = expand_path("some-dir");
        assert!(p.is_absolute());
        assert!(p.ends_with("some-dir"));
    }
}
