//! Path canonicalization for directive paths.

/// Canonicalize a path taken from a directive attribute.
///
/// Backslashes become `/`, `.` segments and repeated separators are dropped,
/// and a trailing separator is removed. A leading `/` is kept so that the
/// working tree can reject absolute paths; `..` segments are kept for the
/// same reason.
///
/// # Examples
///
/// ```
/// use orbix_directives::canonicalize_path;
///
/// assert_eq!(canonicalize_path(r"src\components\Button.tsx"), "src/components/Button.tsx");
/// assert_eq!(canonicalize_path("./src//lib/"), "src/lib");
/// assert_eq!(canonicalize_path("/etc/passwd"), "/etc/passwd");
/// ```
#[must_use]
pub fn canonicalize_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let absolute = unified.starts_with('/');

    let segments: Vec<&str> = unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_unchanged() {
        assert_eq!(canonicalize_path("src/App.tsx"), "src/App.tsx");
    }

    #[test]
    fn test_windows_separators() {
        assert_eq!(canonicalize_path(r"src\pages\Index.tsx"), "src/pages/Index.tsx");
    }

    #[test]
    fn test_leading_dot_segment() {
        assert_eq!(canonicalize_path("./src/App.tsx"), "src/App.tsx");
        assert_eq!(canonicalize_path(r".\.\src\App.tsx"), "src/App.tsx");
    }

    #[test]
    fn test_repeated_and_trailing_separators() {
        assert_eq!(canonicalize_path("src//utils///x.ts"), "src/utils/x.ts");
        assert_eq!(canonicalize_path("src/utils/"), "src/utils");
    }

    #[test]
    fn test_parent_segments_are_kept() {
        assert_eq!(canonicalize_path("../outside.txt"), "../outside.txt");
    }

    #[test]
    fn test_absolute_path_keeps_root() {
        assert_eq!(canonicalize_path("//tmp/x"), "/tmp/x");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(canonicalize_path(""), "");
        assert_eq!(canonicalize_path("./"), "");
    }
}
