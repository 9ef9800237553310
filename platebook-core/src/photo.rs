//! Upload rules for dish photos.
//!
//! These checks look only at what the client declared (size, content type,
//! filename). The bytes are never sniffed here; thumbnails are decoded later
//! by the server, on demand.

use thiserror::Error;

/// Maximum photo size (5MB).
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Declared content types accepted for dish photos.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Filename extensions accepted for dish photos (compared lowercase).
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Longest filename that fits the `photos.filename` column.
pub const MAX_FILENAME_LEN: usize = 255;

/// What the client told us about an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMeta {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    #[error("File too large ({size} bytes). Maximum size is 5MB.")]
    TooLarge { size: usize },

    #[error("Unsupported image format: {0}. Allowed: JPEG, PNG, GIF, WebP")]
    UnsupportedContentType(String),

    #[error("Filename too long ({0} characters). Ensure it has at most 255 characters.")]
    FilenameTooLong(usize),

    #[error("Unsupported file extension: {0:?}. Allowed: .jpg, .jpeg, .png, .gif, .webp")]
    UnsupportedExtension(String),
}

/// Check size, declared content type, filename length and extension, in that
/// order.
pub fn validate_photo(meta: &PhotoMeta) -> Result<(), PhotoError> {
    if meta.size > MAX_PHOTO_SIZE {
        return Err(PhotoError::TooLarge { size: meta.size });
    }

    let content_type = normalize_content_type(&meta.content_type);
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(PhotoError::UnsupportedContentType(content_type));
    }

    let filename_len = meta.filename.chars().count();
    if filename_len > MAX_FILENAME_LEN {
        return Err(PhotoError::FilenameTooLong(filename_len));
    }

    let ext = extension(&meta.filename);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(PhotoError::UnsupportedExtension(ext));
    }

    Ok(())
}

/// Lowercased media type without parameters (`image/PNG; q=1` -> `image/png`).
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Lowercased extension including the dot, or an empty string.
///
/// Leading dots of the basename are not extension separators, so `.jpg`
/// alone has no extension.
fn extension(filename: &str) -> String {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem_start = basename.len() - basename.trim_start_matches('.').len();
    match basename[stem_start..].rfind('.') {
        Some(pos) => basename[stem_start + pos..].to_ascii_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(filename: &str, content_type: &str, size: usize) -> PhotoMeta {
        PhotoMeta {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size,
        }
    }

    #[test]
    fn test_accepts_each_allowed_pair() {
        for (name, ct) in [
            ("a.jpg", "image/jpeg"),
            ("a.JPEG", "image/jpg"),
            ("a.png", "image/png"),
            ("a.gif", "image/gif"),
            ("a.webp", "image/webp"),
        ] {
            assert_eq!(validate_photo(&meta(name, ct, 10)), Ok(()), "{name}");
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate_photo(&meta("a.png", "image/png", MAX_PHOTO_SIZE)).is_ok());
        assert_eq!(
            validate_photo(&meta("a.png", "image/png", MAX_PHOTO_SIZE + 1)),
            Err(PhotoError::TooLarge {
                size: MAX_PHOTO_SIZE + 1
            })
        );
    }

    #[test]
    fn test_rejects_bad_content_type() {
        assert_eq!(
            validate_photo(&meta("a.png", "image/bmp", 10)),
            Err(PhotoError::UnsupportedContentType("image/bmp".to_string()))
        );
    }

    #[test]
    fn test_content_type_parameters_are_ignored() {
        assert!(validate_photo(&meta("a.png", "Image/PNG; charset=binary", 10)).is_ok());
    }

    #[test]
    fn test_rejects_bad_extension_even_with_good_type() {
        assert_eq!(
            validate_photo(&meta("photo.bmp", "image/png", 10)),
            Err(PhotoError::UnsupportedExtension(".bmp".to_string()))
        );
        assert_eq!(
            validate_photo(&meta("noext", "image/png", 10)),
            Err(PhotoError::UnsupportedExtension(String::new()))
        );
    }

    #[test]
    fn test_filename_length_limit() {
        let at_limit = format!("{}.png", "a".repeat(MAX_FILENAME_LEN - 4));
        assert!(validate_photo(&meta(&at_limit, "image/png", 10)).is_ok());

        let long = format!("{}.png", "a".repeat(300));
        assert_eq!(
            validate_photo(&meta(&long, "image/png", 10)),
            Err(PhotoError::FilenameTooLong(304))
        );
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(extension("dir.png/file"), "");
        assert_eq!(extension("C:\\pics\\Dish.WebP"), ".webp");
        assert_eq!(extension(".jpg"), "");
        assert_eq!(extension("archive.tar.gif"), ".gif");
    }
}
