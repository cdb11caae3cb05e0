use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::classify::{self, MediaKind};

/// A media file discovered in an extracted archive tree.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Absolute path inside the extraction tree
    pub path: PathBuf,
    /// Kind detected from the extension
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: PathBuf, kind: MediaKind) -> Self {
        Self { path, kind }
    }
}

/// Collect all supported media files under `root`.
pub fn discover_media(root: &Path) -> Vec<MediaFile> {
    let mut media = Vec::new();

    for entry_result in WalkDir::new(root) {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                if let Some(path) = err.path() {
                    eprintln!("Warning: failed to access {}: {}", path.display(), err);
                } else {
                    eprintln!("Warning: walk error: {}", err);
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let kind = classify::classify_path(entry.path());
        if kind == MediaKind::Unsupported {
            continue;
        }

        media.push(MediaFile::new(entry.path().to_path_buf(), kind));
    }

    media
}
