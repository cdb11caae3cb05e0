use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "takefix",
    version,
    about = "Repair Takeout media timestamps and GPS from sidecar JSON files"
)]
struct Cli {
    /// Directory containing the exported zip archives
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// Destination for repaired files
    #[arg(long = "final", value_name = "DIR")]
    final_dir: PathBuf,

    /// Quarantine destination for files that failed processing
    #[arg(long = "failed", value_name = "DIR")]
    failed_dir: PathBuf,

    /// Treat a non-zero exiftool exit status as a per-file failure
    #[arg(long)]
    strict_tool_status: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let t_total = std::time::Instant::now();

    let options = takefix_core::RepairOptions {
        input_dir: cli.input,
        final_dir: cli.final_dir,
        failed_dir: cli.failed_dir,
        strict_tool_status: cli.strict_tool_status,
    };

    let summary = takefix_core::run(&options)?;

    eprintln!(
        "Done! {} archives, {} media files: {} repaired, {} copied without metadata, {} failed ({:.2}s)",
        summary.archives,
        summary.files,
        summary.repaired,
        summary.copied_only,
        summary.failed,
        t_total.elapsed().as_secs_f64()
    );
    eprintln!("Final files in: {}", options.final_dir.display());
    eprintln!("Failed files in: {}", options.failed_dir.display());

    Ok(())
}
