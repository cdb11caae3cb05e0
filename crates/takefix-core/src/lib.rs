pub mod archive;
pub mod classify;
pub mod exiftool;
pub mod media;
pub mod repair;
pub mod sidecar;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

pub use archive::ArchiveStats;
pub use classify::MediaKind;
pub use media::MediaFile;
pub use repair::RepairOutcome;
pub use sidecar::{GeoPoint, Sidecar};

/// Where archives are read from and where the two output sets go.
/// All paths are explicit configuration, injected at startup.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Directory holding the exported zip archives, scanned non-recursively
    pub input_dir: PathBuf,
    /// Destination for repaired and copied-as-is files
    pub final_dir: PathBuf,
    /// Quarantine destination, mirroring relative paths
    pub failed_dir: PathBuf,
    /// Treat a non-zero exiftool exit status as a per-file failure
    pub strict_tool_status: bool,
}

/// Aggregate tallies across all archives of one run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RepairSummary {
    pub archives: u64,
    pub files: u64,
    pub repaired: u64,
    pub copied_only: u64,
    pub failed: u64,
}

impl RepairSummary {
    fn add(&mut self, stats: &ArchiveStats) {
        self.archives += 1;
        self.files += stats.files;
        self.repaired += stats.repaired;
        self.copied_only += stats.copied_only;
        self.failed += stats.failed;
    }
}

/// Process every archive in the input directory, sequentially.
///
/// A missing input directory and an input directory without archives both
/// end the run gracefully with an empty summary. A per-archive failure
/// (e.g. an unreadable zip) is reported and skipped.
pub fn run(options: &RepairOptions) -> anyhow::Result<RepairSummary> {
    fs::create_dir_all(&options.final_dir)
        .with_context(|| format!("Failed to create {}", options.final_dir.display()))?;
    fs::create_dir_all(&options.failed_dir)
        .with_context(|| format!("Failed to create {}", options.failed_dir.display()))?;

    let mut summary = RepairSummary::default();

    if !options.input_dir.exists() {
        eprintln!(
            "Input directory does not exist: {}",
            options.input_dir.display()
        );
        return Ok(summary);
    }

    let archives = find_archives(&options.input_dir)?;
    if archives.is_empty() {
        eprintln!("No zip archives found in {}", options.input_dir.display());
        return Ok(summary);
    }

    for zip_path in &archives {
        eprintln!("Processing archive: {}", zip_path.display());
        match archive::run_archive(
            zip_path,
            &options.final_dir,
            &options.failed_dir,
            options.strict_tool_status,
        ) {
            Ok(stats) => summary.add(&stats),
            Err(e) => eprintln!("Error processing archive {}: {:#}", zip_path.display(), e),
        }
    }

    Ok(summary)
}

/// Zip files directly inside `input_dir`, in directory-listing order.
fn find_archives(input_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read {}", input_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("zip"));
        if is_zip {
            archives.push(path);
        }
    }
    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn options(base: &Path) -> RepairOptions {
        RepairOptions {
            input_dir: base.join("input"),
            final_dir: base.join("final"),
            failed_dir: base.join("failed"),
            strict_tool_status: false,
        }
    }

    #[test]
    fn test_missing_input_dir_is_graceful() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path());

        let summary = run(&opts).unwrap();
        assert_eq!(summary.archives, 0);
        assert_eq!(summary.files, 0);
        // Output directories are still bootstrapped
        assert!(opts.final_dir.is_dir());
        assert!(opts.failed_dir.is_dir());
    }

    #[test]
    fn test_input_dir_without_archives_is_graceful() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path());
        fs::create_dir_all(&opts.input_dir).unwrap();
        fs::write(opts.input_dir.join("not-an-archive.txt"), b"x").unwrap();

        let summary = run(&opts).unwrap();
        assert_eq!(summary.archives, 0);
    }

    #[test]
    fn test_find_archives_case_insensitive_non_recursive() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input");
        fs::create_dir_all(input.join("nested")).unwrap();
        fs::write(input.join("a.zip"), b"x").unwrap();
        fs::write(input.join("b.ZIP"), b"x").unwrap();
        fs::write(input.join("c.txt"), b"x").unwrap();
        fs::write(input.join("nested/d.zip"), b"x").unwrap();

        let mut found = find_archives(&input).unwrap();
        found.sort();
        assert_eq!(found, vec![input.join("a.zip"), input.join("b.ZIP")]);
    }

    #[test]
    fn test_run_processes_archive_end_to_end() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path());
        fs::create_dir_all(&opts.input_dir).unwrap();

        let mut zw =
            zip::ZipWriter::new(fs::File::create(opts.input_dir.join("takeout.zip")).unwrap());
        zw.start_file("Photos/clip1.mp4", SimpleFileOptions::default())
            .unwrap();
        zw.write_all(b"video bytes").unwrap();
        zw.finish().unwrap();

        let summary = run(&opts).unwrap();
        assert_eq!(summary.archives, 1);
        assert_eq!(summary.files, 1);
        assert_eq!(summary.copied_only, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            fs::read(opts.final_dir.join("Photos/clip1.mp4")).unwrap(),
            b"video bytes"
        );
    }
}
