//! Content classification constants.

/// Extensions whose content is read as UTF-8 text rather than raw bytes.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "md", "mdx", "txt", "json", "yaml", "yml", "css", "js", "ts", "html", "xml", "csv", "tsv",
];

/// How a file's content is obtained before fingerprinting and upload.
///
/// The classification never changes the digest: text content is hashed
/// over its UTF-8 bytes, which are the same bytes a raw read would return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Binary,
}

impl ContentKind {
    /// Classify a file by its extension (case-insensitive, without the dot).
    pub fn for_extension(extension: &str) -> Self {
        if is_text_extension(extension) {
            Self::Text
        } else {
            Self::Binary
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Check whether an extension is classified as plain text.
pub fn is_text_extension(extension: &str) -> bool {
    let ext = extension.trim_start_matches('.');
    TEXT_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}
