use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Marker that turns the folder specifier into a suffix of the parent directory
pub const SUFFIX_MARKER: char = '-';

/// Where the reduced copy of `source` is written.
///
/// `folder` is either a sub-folder name (`reduced` ->
/// `<parent>/reduced/<file>`) or, when it starts with `-`, a suffix for the
/// parent directory itself (`-small` -> `<parent>-small/<file>`). The file
/// name is kept. Returns `None` for paths without a file name.
pub fn output_path(source: &Path, folder: &str) -> Option<PathBuf> {
    let file_name = source.file_name()?;
    let parent = source.parent().unwrap_or_else(|| Path::new(""));

    let directory = if folder.starts_with(SUFFIX_MARKER) {
        let mut name = OsString::from(parent.as_os_str());
        name.push(folder);
        PathBuf::from(name)
    } else {
        parent.join(folder)
    };

    Some(directory.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subfolder() {
        assert_eq!(
            output_path(Path::new("/photos/trip/IMG_001.jpg"), "reduced"),
            Some(PathBuf::from("/photos/trip/reduced/IMG_001.jpg"))
        );
    }

    #[test]
    fn test_suffix() {
        assert_eq!(
            output_path(Path::new("/photos/trip/IMG_001.jpg"), "-small"),
            Some(PathBuf::from("/photos/trip-small/IMG_001.jpg"))
        );
    }

    #[test]
    fn test_nested_subfolder() {
        assert_eq!(
            output_path(Path::new("/photos/a.jpeg"), "web/1080"),
            Some(PathBuf::from("/photos/web/1080/a.jpeg"))
        );
    }

    #[test]
    fn test_relative_file_without_parent() {
        assert_eq!(
            output_path(Path::new("a.jpg"), "reduced"),
            Some(PathBuf::from("reduced/a.jpg"))
        );
        assert_eq!(
            output_path(Path::new("a.jpg"), "-small"),
            Some(PathBuf::from("-small/a.jpg"))
        );
    }

    #[test]
    fn test_no_file_name() {
        assert_eq!(output_path(Path::new("/photos/.."), "reduced"), None);
    }
}
