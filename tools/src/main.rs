use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use apitrace_tools::{
    dump_trace, format_dump_pretty, inspect_trace, replay_headless, InspectReport, ReplaySummary,
};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "apitrace-tools",
    version,
    about = "apitrace inspection, dump and replay tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize trace structure and sizes.
    Inspect {
        /// Trace file, or a directory of traces.
        trace_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected traces.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected traces (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Number of opcodes listed per trace.
        #[arg(long, default_value_t = 8)]
        top: usize,
    },
    /// Decode events frame by frame.
    Dump {
        trace_file: PathBuf,
        /// Stop after this many frames.
        #[arg(long)]
        frames: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DumpFormat::Pretty)]
        format: DumpFormat,
    },
    /// Replay a trace on the headless backend.
    Replay {
        trace_file: PathBuf,
        /// Stop after this many presented frames.
        #[arg(long)]
        frames: Option<u64>,
        /// Back buffers of the replay swapchain.
        #[arg(long, default_value_t = 2)]
        back_buffers: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DumpFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let limits = wire::Limits::default();
    match cli.command {
        Command::Inspect {
            trace_path,
            glob,
            sort,
            limit,
            top,
        } => {
            if trace_path.is_dir() {
                let entries = collect_trace_entries(&trace_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = read_trace(&entry.path)?;
                    let report = inspect_trace(&bytes, &limits)
                        .with_context(|| format!("inspect {}", entry.path.display()))?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_inspect_report(&report, top);
                }
            } else {
                let bytes = read_trace(&trace_path)?;
                let report = inspect_trace(&bytes, &limits)?;
                print_inspect_report(&report, top);
            }
        }
        Command::Dump {
            trace_file,
            frames,
            format,
        } => {
            let bytes = read_trace(&trace_file)?;
            let output = dump_trace(&bytes, &limits, frames)?;
            match format {
                DumpFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DumpFormat::Pretty => {
                    print!("{}", format_dump_pretty(&output));
                }
            }
        }
        Command::Replay {
            trace_file,
            frames,
            back_buffers,
        } => {
            let bytes = read_trace(&trace_file)?;
            let summary = replay_headless(&bytes, &limits, frames, back_buffers)?;
            print_replay_summary(&summary);
        }
    }
    Ok(())
}

fn read_trace(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read trace {}", path.display()))
}

struct TraceEntry {
    path: PathBuf,
    size: u64,
}

fn collect_trace_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<TraceEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(TraceEntry { path, size });
    }
    Ok(entries)
}

fn maybe_sort_entries(mut entries: Vec<TraceEntry>, sort: Option<InspectSort>) -> Vec<TraceEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}

fn print_inspect_report(report: &InspectReport, top: usize) {
    println!(
        "api: {} ({:#x}) size: {} bytes blake3: {}",
        report.header.api.name(),
        report.header.api.raw(),
        report.total_bytes,
        report.digest
    );
    println!(
        "events: {} frames: {} presented: {}",
        report.events,
        report.frames.len(),
        report.presented_frames()
    );
    println!("frames:");
    for frame in &report.frames {
        let marker = if frame.presented { "" } else { " (no present)" };
        println!(
            "  #{}: {} events ({} bytes){marker}",
            frame.index, frame.events, frame.bytes
        );
    }
    if !report.opcodes.is_empty() {
        println!("top opcodes by size:");
        for entry in report.opcodes.iter().take(top) {
            println!(
                "  {:<32} {:>8} x {:>10} bytes",
                entry.opcode.name(),
                entry.count,
                entry.bytes
            );
        }
    }
    if let Some(stop) = &report.stop {
        println!("decoding stopped at byte {}: {}", stop.offset, stop.reason);
    }
}

fn print_replay_summary(summary: &ReplaySummary) {
    let stats = &summary.stats;
    let counters = &summary.counters;
    println!("frames presented: {}", summary.frames);
    println!(
        "events: {} created: {} destroyed: {} live at end: {}",
        stats.events, stats.created, stats.destroyed, summary.live_objects
    );
    println!(
        "unresolved handles: {} skipped uploads: {} no-ops: {}",
        stats.unresolved, stats.skipped_uploads, stats.no_ops
    );
    println!(
        "draws: {} dispatches: {} indirect: {} clears: {} copies: {} barriers: {}",
        counters.draws,
        counters.dispatches,
        counters.indirect,
        counters.clears,
        counters.copies,
        counters.barriers
    );
}
