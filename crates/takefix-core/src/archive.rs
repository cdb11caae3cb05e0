use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::SHIFT_JIS;
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;

use crate::media;
use crate::repair::{self, RepairOutcome};

/// Per-archive outcome tallies.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveStats {
    pub files: u64,
    pub repaired: u64,
    pub copied_only: u64,
    pub failed: u64,
}

/// Decode a zip entry name, trying UTF-8 first, then Shift_JIS
fn decode_entry_name(raw: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_string();
    }

    let (decoded, _, had_errors) = SHIFT_JIS.decode(raw);
    if !had_errors {
        return decoded.into_owned();
    }

    String::from_utf8_lossy(raw).into_owned()
}

/// Turn a decoded entry name into a relative path under the extraction
/// root, or None when the entry would escape it.
fn safe_entry_path(name: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn archive_name(zip_path: &Path) -> String {
    zip_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("archive")
        .to_string()
}

/// Extract the whole archive into `dest`. Returns the number of file
/// entries written.
pub fn extract_archive(zip_path: &Path, dest: &Path) -> Result<u64> {
    let file =
        File::open(zip_path).with_context(|| format!("Failed to open {}", zip_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read {}", zip_path.display()))?;

    let pb = ProgressBar::new(archive.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} extracting {msg}")
            .unwrap(),
    );
    pb.set_message(archive_name(zip_path));

    let mut written = 0u64;
    for i in 0..archive.len() {
        pb.inc(1);
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let entry_name = decode_entry_name(entry.name_raw());
        let Some(rel) = safe_entry_path(&entry_name) else {
            eprintln!(
                "Warning: skipping unsafe entry {:?} in {}",
                entry_name,
                zip_path.display()
            );
            continue;
        };

        let out_path = dest.join(rel);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut out = io::BufWriter::new(
            File::create(&out_path)
                .with_context(|| format!("Failed to create {}", out_path.display()))?,
        );
        io::copy(&mut entry, &mut out)?;
        written += 1;
    }
    pb.finish_and_clear();

    Ok(written)
}

/// Extract one archive to a scratch directory and repair every supported
/// media file in it. The scratch directory is discarded unconditionally,
/// however many files failed.
pub fn run_archive(
    zip_path: &Path,
    final_dir: &Path,
    failed_dir: &Path,
    strict_tool: bool,
) -> Result<ArchiveStats> {
    let scratch = TempDir::new().context("Failed to create scratch directory")?;
    let root = scratch.path();

    extract_archive(zip_path, root)?;

    let files = media::discover_media(root);
    let mut stats = ArchiveStats {
        files: files.len() as u64,
        ..Default::default()
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} repairing {msg}")
            .unwrap(),
    );
    pb.set_message(archive_name(zip_path));

    for media_file in &files {
        pb.inc(1);
        match repair::process(media_file, root, final_dir, strict_tool) {
            RepairOutcome::Repaired => stats.repaired += 1,
            RepairOutcome::CopiedOnly => stats.copied_only += 1,
            RepairOutcome::Failed(cause) => {
                stats.failed += 1;
                eprintln!(
                    "Error processing {}: {:#}",
                    media_file.path.display(),
                    cause
                );
                if let Err(e) = repair::quarantine(media_file, root, failed_dir) {
                    eprintln!(
                        "Failed to quarantine {}: {:#}",
                        media_file.path.display(),
                        e
                    );
                }
            }
        }
    }
    pb.finish_and_clear();

    Ok(stats)
}
