use std::path::Path;

/// Image extensions handled by the repair pipeline
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic"];

/// Video extensions handled by the repair pipeline
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Media kind detected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

/// Classify a file extension (without the leading dot, any case).
pub fn classify(extension: &str) -> MediaKind {
    let ext = extension.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Video
    } else {
        MediaKind::Unsupported
    }
}

/// Classify a path by its extension. Files without one are Unsupported.
pub fn classify_path(path: &Path) -> MediaKind {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(MediaKind::Unsupported, classify)
}
