//! PaneStack CLI
//!
//! Command-line interface for driving a PaneStack host.
//!
//! Protocol commands are printed as JSON lines, ready to be piped into the
//! `panestack` host's stdin. `allocate` runs the allocator offline.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use panestack_core_layout::{allocate, AllocatorInput, DEFAULT_PANE_WIDTH, DEFAULT_TAB_WIDTH};
use panestack_ipc::{encode_line, IpcCommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "panestack-cli")]
#[command(author, version, about = "Drive a PaneStack host")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a pane, or promote an open one to the end
    Open {
        /// Pane id
        id: String,
        /// Tab title (defaults to the id)
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Close a pane
    Close {
        /// Pane id
        id: String,
    },
    /// Report new viewport metrics
    Resize {
        /// Viewport width in pixels
        width: f64,
        /// Viewport height in pixels
        #[arg(default_value = "0")]
        height: f64,
    },
    /// Send one drag sample
    Drag {
        /// Cumulative offset since the gesture started
        #[arg(allow_negative_numbers = true)]
        offset: f64,
        /// Sign of the current movement (-1, 0 or 1)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        direction: i8,
        /// Mark this as the final sample of the gesture
        #[arg(short, long)]
        release: bool,
    },
    /// Scroll with the wheel (positive = toward the end of the list)
    Wheel {
        /// Delta in pixels
        #[arg(allow_negative_numbers = true)]
        delta: f64,
    },
    /// Abort the current gesture
    Cancel,
    /// Query host state
    Query {
        #[command(subcommand)]
        what: QueryType,
    },
    /// Reload host configuration
    Reload,
    /// Stop the host
    Stop,
    /// Run the allocator offline and print the result
    Allocate {
        /// Number of panes
        #[arg(short = 'n', long)]
        panes: usize,
        /// Viewport width in pixels
        #[arg(short, long)]
        viewport: f64,
        /// Full pane width in pixels
        #[arg(short = 'w', long, default_value_t = DEFAULT_PANE_WIDTH)]
        pane_width: f64,
        /// Tab width in pixels
        #[arg(short, long, default_value_t = DEFAULT_TAB_WIDTH)]
        tab_width: f64,
        /// Collapsed panes pushed to the right edge
        #[arg(short = 'o', long, default_value_t = 0)]
        tab_offset: i32,
    },
}

#[derive(Subcommand)]
enum QueryType {
    /// Current partition, offsets and placements
    Layout,
    /// Open panes in display order
    Panes,
}

/// Offline allocation result.
#[derive(Debug, PartialEq, Serialize)]
struct AllocationReport {
    left_tabs: usize,
    pinned_index: Option<usize>,
    track_panes: usize,
    right_tabs: usize,
    pane_width: f64,
    track_offset: f64,
    resting_shift: f64,
}

/// Map a protocol subcommand to its command; `None` for offline commands.
fn to_command(command: Commands) -> Result<Option<IpcCommand>> {
    let cmd = match command {
        Commands::Open { id, title } => {
            if id.trim().is_empty() {
                bail!("Pane id must not be empty");
            }
            let title = title.unwrap_or_else(|| id.clone());
            IpcCommand::OpenPane { id, title }
        }
        Commands::Close { id } => IpcCommand::ClosePane { id },
        Commands::Resize { width, height } => IpcCommand::Resize { width, height },
        Commands::Drag {
            offset,
            direction,
            release,
        } => IpcCommand::Drag {
            offset,
            direction: if release { 0 } else { direction.signum() },
            active: !release,
        },
        Commands::Wheel { delta } => IpcCommand::Wheel { delta },
        Commands::Cancel => IpcCommand::CancelGesture,
        Commands::Query { what } => match what {
            QueryType::Layout => IpcCommand::QueryLayout,
            QueryType::Panes => IpcCommand::QueryPanes,
        },
        Commands::Reload => IpcCommand::Reload,
        Commands::Stop => IpcCommand::Stop,
        Commands::Allocate { .. } => return Ok(None),
    };
    Ok(Some(cmd))
}

fn run_allocate(
    panes: usize,
    viewport: f64,
    pane_width: f64,
    tab_width: f64,
    tab_offset: i32,
) -> AllocationReport {
    let input = AllocatorInput::new(panes, pane_width, viewport, tab_width);
    let alloc = allocate(&input, tab_offset);
    AllocationReport {
        left_tabs: alloc.left_tabs,
        pinned_index: alloc.pinned_index(),
        track_panes: alloc.track_panes,
        right_tabs: alloc.right_tabs,
        pane_width: alloc.pane_width,
        track_offset: alloc.track_offset,
        resting_shift: alloc.resting_shift(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Allocate {
        panes,
        viewport,
        pane_width,
        tab_width,
        tab_offset,
    } = cli.command
    {
        let report = run_allocate(panes, viewport, pane_width, tab_width, tab_offset);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(cmd) = to_command(cli.command)? {
        print!("{}", encode_line(&cmd)?);
    }

    Ok(())
}
