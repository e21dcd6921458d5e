use std::path::Path;

/// Characters removed from link names.
const STRIPPED: [char; 2] = ['\'', '"'];

/// Derive the link name for a content directory: its final path segment with
/// quote characters removed.
///
/// Returns `None` when no usable name remains (no final segment, not valid
/// UTF-8, or nothing left after stripping).
///
/// ```
/// use emberly_library::reconcile::link_name;
/// use std::path::Path;
///
/// assert_eq!(link_name(Path::new("/media/movies/O'Brien's Movie")).as_deref(), Some("OBriens Movie"));
/// assert_eq!(link_name(Path::new("/")), None);
/// ```
pub fn link_name(content: &Path) -> Option<String> {
    let segment = content.file_name()?.to_str()?;
    let name: String = segment.chars().filter(|c| !STRIPPED.contains(c)).collect();
    match emberly_storage::validate_name(&name) {
        Ok(_) => Some(name),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/media/movies/O'Brien's Movie", Some("OBriens Movie"))]
    #[case("/media/movies/The \"Best\" Film", Some("The Best Film"))]
    #[case("/media/movies/The Matrix", Some("The Matrix"))]
    #[case("/media/movies/The Matrix/", Some("The Matrix"))]
    #[case("/media/series/Breaking Bad (2008)", Some("Breaking Bad (2008)"))]
    #[case("/media/movies/''", None)]
    #[case("/media/movies/..", None)]
    #[case("/", None)]
    fn test_link_name(#[case] content: &str, #[case] expected: Option<&str>) {
        assert_eq!(link_name(Path::new(content)).as_deref(), expected);
    }
}
