//! Threadline CLI — render conversation fixtures as threaded text.
//!
//! Usage:
//!   threadline render <fixture.json> [--sort newest] [--hide-quiet] [--focus <hash>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use threadline::{
    CastHash, ConversationView, FilterMode, JsonFileSource, SortMode, ThreadRow, ViewOptions,
    ViewSnapshot,
};

#[derive(Parser)]
#[command(name = "threadline", version, about = "Conversation thread engine")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a conversation fixture as a threaded view
    Render {
        /// Path to a conversation fixture (JSON)
        file: PathBuf,
        /// Sort mode: newest, engagement, or quality
        #[arg(long, default_value = "newest")]
        sort: String,
        /// Hide replies with no engagement anywhere in their subtree
        #[arg(long)]
        hide_quiet: bool,
        /// Scroll to and highlight this reply hash
        #[arg(long)]
        focus: Option<String>,
    },
}

async fn cmd_render(
    file: &PathBuf,
    sort: SortMode,
    hide_quiet: bool,
    focus: Option<String>,
) -> i32 {
    let source = match JsonFileSource::open(file) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            eprintln!("Error: cannot load '{}': {}", file.display(), e);
            return 1;
        }
    };

    let mut options = ViewOptions::new(source.root_hash().clone())
        .with_sort(sort)
        .with_filter(if hide_quiet {
            FilterMode::HideNoEngagement
        } else {
            FilterMode::KeepAll
        });
    if let Some(target) = focus {
        options = options.with_focus_target(CastHash::new(target));
    }

    let view = ConversationView::new(source, options);
    view.load().await;

    // Let spawned parent fetches land before taking the snapshot.
    tokio::time::sleep(Duration::from_millis(50)).await;

    match view.snapshot() {
        ViewSnapshot::Loading => {
            eprintln!("Error: view still loading");
            1
        }
        ViewSnapshot::Failed { message } => {
            eprintln!("Error: {}", message);
            1
        }
        ViewSnapshot::Ready {
            rows,
            hidden_count,
            highlighted,
            ..
        } => {
            for row in &rows {
                print_row(row, highlighted.as_ref());
            }
            if hidden_count > 0 {
                println!("({} low-engagement replies hidden)", hidden_count);
            }
            0
        }
    }
}

fn print_row(row: &ThreadRow, highlighted: Option<&CastHash>) {
    let indent = "  ".repeat(row.depth);
    let line = if row.connector_below { "│" } else { " " };
    let marker = if highlighted == Some(&row.node.hash) {
        "▶ "
    } else {
        ""
    };

    let mut header = format!("{}{}", marker, row.node.author.handle());
    if let Some(parent) = &row.reply_parent {
        header.push_str(&format!(" ↩ replying to {}", parent.author.handle()));
    }
    for hash in row.node.quoted_hashes() {
        header.push_str(&format!(" ❝ quoting {}", hash));
    }

    println!("{}{}", indent, header);
    println!("{}{} {}", indent, line, row.node.text);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            file,
            sort,
            hide_quiet,
            focus,
        } => {
            let sort = match sort.parse::<SortMode>() {
                Ok(sort) => sort,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(2);
                }
            };
            let code = cmd_render(&file, sort, hide_quiet, focus).await;
            std::process::exit(code);
        }
    }
}
