//! Path utilities for splitting and joining segments
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

/// Splits a path into its non-empty segments
///
/// **Pure function**: borrows from `path`, no allocation per segment.
///
/// Leading, trailing and repeated separators are ignored, so `/a//b/` and
/// `a/b` produce the same segments.
///
/// # Examples
///
/// ```
/// use switchyard_router::path::split_segments;
///
/// assert_eq!(split_segments("/admin/product/7"), vec!["admin", "product", "7"]);
/// assert_eq!(split_segments("//admin//"), vec!["admin"]);
/// assert!(split_segments("/").is_empty());
/// ```
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Joins segments left over after a match
///
/// **Pure function**: empty input yields `""`, otherwise a `/`-prefixed path.
///
/// # Examples
///
/// ```
/// use switchyard_router::path::remaining_path;
///
/// assert_eq!(remaining_path(&[]), "");
/// assert_eq!(remaining_path(&["a", "b"]), "/a/b");
/// ```
pub fn remaining_path(segments: &[&str]) -> String {
    segments.iter().fold(String::new(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(segment);
        acc
    })
}

/// Renders generated segments as an absolute path
///
/// **Pure function**: empty input renders as the root `/`.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }

    segments.iter().fold(String::new(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(segment.as_ref());
        acc
    })
}
