// Utility functions for uploaded file names

/// Extension of an uploaded file name, dot included, taken from the last `.`.
/// Returns an empty string when there is none or when it is not a plain
/// name fragment (separators, NUL).
pub fn file_extension(original_name: &str) -> &str {
    original_name
        .rfind('.')
        .map(|idx| &original_name[idx..])
        .filter(|ext| !ext.contains(['/', '\\', '\0']))
        .unwrap_or("")
}

/// Accepts plain file names only: no separators, no parent references.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_keeps_dot_and_case() {
        assert_eq!(file_extension("car.JPG"), ".JPG");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("noext"), "");
        assert_eq!(file_extension("trailing."), ".");
    }

    #[test]
    fn extension_with_separator_is_dropped() {
        assert_eq!(file_extension("x.a/b"), "");
        assert_eq!(file_extension("dir.v2\\photo"), "");
        assert_eq!(file_extension("photos/front.png"), ".png");
    }

    #[test]
    fn unsafe_names_are_rejected() {
        assert!(is_safe_filename("3f2c9a.jpg"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../secret"));
        assert!(!is_safe_filename("a/b.jpg"));
        assert!(!is_safe_filename("a\\b.jpg"));
        assert!(!is_safe_filename(".."));
    }
}
