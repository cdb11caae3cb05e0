use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use filetime::FileTime;

use crate::exiftool;
use crate::media::MediaFile;
use crate::sidecar;

/// Result of processing one media file.
#[derive(Debug)]
pub enum RepairOutcome {
    /// Metadata rewritten, file copied to the final set
    Repaired,
    /// No usable timestamp, file copied unmodified
    CopiedOnly,
    /// Processing failed; the caller quarantines the original
    Failed(anyhow::Error),
}

/// Run the repair pipeline for one file and tag the outcome.
///
/// `root` is the extraction root the relative output path is derived from.
/// Quarantining on `Failed` is the caller's job.
pub fn process(
    media: &MediaFile,
    root: &Path,
    final_dir: &Path,
    strict_tool: bool,
) -> RepairOutcome {
    match try_process(media, root, final_dir, strict_tool) {
        Ok(outcome) => outcome,
        Err(e) => RepairOutcome::Failed(e),
    }
}

fn try_process(
    media: &MediaFile,
    root: &Path,
    final_dir: &Path,
    strict_tool: bool,
) -> Result<RepairOutcome> {
    let repaired = match sidecar::read(&media.path)? {
        None => {
            eprintln!("No sidecar for: {}", file_name(&media.path));
            false
        }
        Some(record) => match record.taken_at {
            None => {
                eprintln!("No timestamp in sidecar for: {}", file_name(&media.path));
                false
            }
            Some(taken_at) => {
                let args = exiftool::build_args(media.kind, taken_at, record.geo, &media.path)?;
                exiftool::run(&args, strict_tool)?;
                true
            }
        },
    };

    // Copy after the in-place rewrite so the final file carries the new metadata
    copy_to(&media.path, root, final_dir)?;

    Ok(if repaired {
        RepairOutcome::Repaired
    } else {
        RepairOutcome::CopiedOnly
    })
}

/// Move the original into the quarantine set, preserving its path
/// relative to `root`.
pub fn quarantine(media: &MediaFile, root: &Path, failed_dir: &Path) -> Result<()> {
    let dest = dest_for(&media.path, root, failed_dir)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    // Scratch and quarantine may sit on different filesystems
    if fs::rename(&media.path, &dest).is_err() {
        fs::copy(&media.path, &dest)
            .with_context(|| format!("Failed to copy to {}", dest.display()))?;
        fs::remove_file(&media.path)
            .with_context(|| format!("Failed to remove {}", media.path.display()))?;
    }

    eprintln!(
        "Moved to failed set: {}",
        media.path.strip_prefix(root).unwrap_or(&media.path).display()
    );
    Ok(())
}

/// Copy `src` under `dest_root` at its path relative to `root`, keeping
/// the source modification time on the copy.
fn copy_to(src: &Path, root: &Path, dest_root: &Path) -> Result<()> {
    let dest = dest_for(src, root, dest_root)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::copy(src, &dest).with_context(|| format!("Failed to copy to {}", dest.display()))?;

    if let Ok(meta) = fs::metadata(src) {
        let mtime = FileTime::from_last_modification_time(&meta);
        filetime::set_file_mtime(&dest, mtime).ok();
    }

    Ok(())
}

fn dest_for(src: &Path, root: &Path, dest_root: &Path) -> Result<PathBuf> {
    let rel = src
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", src.display(), root.display()))?;
    Ok(dest_root.join(rel))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
