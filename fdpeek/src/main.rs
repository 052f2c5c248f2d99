mod config;
mod data;
mod error;
mod report;

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use fdpeek_common::ProcessHandle;

use crate::config::Config;
use crate::data::inspector::{inspect, StalePolicy};
use crate::data::procfs::ProcFs;

#[derive(Parser)]
#[command(
    name = "fdpeek",
    version,
    about = "List the open file descriptors of a running process"
)]
struct Cli {
    /// Process ID to inspect
    #[arg(value_name = "PID", allow_negative_numbers = true)]
    pid: ProcessHandle,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors; hides per-descriptor warnings
    #[arg(short, long)]
    quiet: bool,

    /// Leave out descriptors whose target can no longer be stat-ed
    #[arg(long)]
    skip_stale: bool,

    /// Where procfs is mounted
    #[arg(long, value_name = "DIR")]
    proc_root: Option<PathBuf>,
}

fn main() -> ExitCode {
    // clap exits with 2 on usage errors; this tool reports them as 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fdpeek: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("{e:#}; using default settings");
        Config::default()
    });

    // CLI overrides
    if cli.skip_stale {
        config.general.stale_targets = StalePolicy::Skip;
    }
    if let Some(root) = cli.proc_root {
        config.general.proc_root = root;
    }

    let source = ProcFs::new(&config.general.proc_root);
    let records = match inspect(&source, cli.pid, config.inspect_options()) {
        Ok(records) => records,
        Err(e) => {
            // A vanished or foreign process is an ordinary outcome, not a
            // failed run.
            eprintln!("fdpeek: {e}");
            return Ok(());
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match report::render(&mut out, cli.pid, records) {
        Ok(rows) => {
            log::info!("listed {rows} descriptors of process {}", cli.pid);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e).context("writing report"),
    }
}
