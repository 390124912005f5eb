//! httpdeck - tabbed HTTP request workbench
//!
//! Architecture:
//! - Command loop (stdin) - line-oriented front end
//! - Workspace layer - central state machine processing one event at a time
//! - Storage layer - JSON slot store shared with the capture process
//! - Network layer (Tokio) - async HTTP dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use httpdeck::messages::workspace::BulkCloseAction;
use httpdeck::util::{format_bytes, format_time, params_to_query_string};
use httpdeck::{
    default_store_path, generate_curl, DispatchActor, StorageActor, WorkspaceActor,
    WorkspaceCommand, WorkspaceSnapshot,
};

#[derive(Parser, Debug)]
#[command(name = "httpdeck", version, about = "A tabbed HTTP request workbench")]
struct Args {
    /// Open the captured log entry with this id on startup
    #[arg(long)]
    log_id: Option<String>,

    /// Path of the slot store (defaults to ~/.httpdeck/store.json)
    #[arg(long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", "httpdeck.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let store_path = args.store.unwrap_or_else(default_store_path);

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (storage_tx, storage_rx) = mpsc::unbounded_channel();
    let (storage_ev_tx, storage_ev_rx) = mpsc::unbounded_channel();
    let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
    let (dispatch_ev_tx, dispatch_ev_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();

    tokio::spawn(StorageActor::new(store_path, storage_ev_tx).run(storage_rx));
    tokio::spawn(DispatchActor::new(dispatch_ev_tx).run(dispatch_rx));

    let mut workspace = WorkspaceActor::new(storage_tx, dispatch_tx, snapshot_tx);
    workspace.init(args.log_id).await?;
    tokio::spawn(workspace.run(cmd_rx, dispatch_ev_rx, storage_ev_rx));

    run_command_loop(cmd_tx, snapshot_rx).await
}

/// What a parsed input line asks for.
enum LineAction {
    Command(WorkspaceCommand),
    Print(String),
    Quit,
    Unknown,
}

async fn run_command_loop(
    cmd_tx: mpsc::UnboundedSender<WorkspaceCommand>,
    mut snapshot_rx: mpsc::UnboundedReceiver<WorkspaceSnapshot>,
) -> Result<()> {
    let mut current = WorkspaceSnapshot::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(snapshot) = snapshot_rx.recv() => {
                current = snapshot;
                print_snapshot(&current);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_line(line, &current) {
                    LineAction::Command(cmd) => {
                        let _ = cmd_tx.send(cmd);
                    }
                    LineAction::Print(text) => println!("{}", text),
                    LineAction::Quit => {
                        let _ = cmd_tx.send(WorkspaceCommand::Shutdown);
                        break;
                    }
                    LineAction::Unknown => println!(
                        "commands: tabs, open N, new, close [N], send, rename NAME, \
                         close-others N, close-right N, close-left N, close-all, \
                         collections, new-collection, logs, refresh, import N, \
                         export N, delete-log N, clear-logs, record, \
                         curl <command>, quit"
                    ),
                }
            }
        }
    }
    Ok(())
}

fn parse_line(line: &str, snapshot: &WorkspaceSnapshot) -> LineAction {
    let mut parts = line.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    let tab_id_at = |index: &str| -> Option<String> {
        index
            .parse::<usize>()
            .ok()
            .and_then(|i| snapshot.tabs.get(i))
            .map(|t| t.id.clone())
    };
    let log_at = |index: &str| {
        index
            .parse::<usize>()
            .ok()
            .and_then(|i| snapshot.logs.get(i))
    };

    match verb {
        "quit" | "q" | "exit" => LineAction::Quit,
        "tabs" => LineAction::Print(render_tabs(snapshot)),
        "new" => LineAction::Command(WorkspaceCommand::NewRequest),
        "send" => LineAction::Command(WorkspaceCommand::SendActive),
        "open" => match tab_id_at(rest) {
            Some(id) => LineAction::Command(WorkspaceCommand::ActivateTab(id)),
            None => LineAction::Unknown,
        },
        "close" => {
            if rest.is_empty() {
                LineAction::Command(WorkspaceCommand::CloseTab(snapshot.active_tab_id.clone()))
            } else {
                match tab_id_at(rest) {
                    Some(id) => LineAction::Command(WorkspaceCommand::CloseTab(id)),
                    None => LineAction::Unknown,
                }
            }
        }
        "rename" if !rest.is_empty() => LineAction::Command(WorkspaceCommand::RenameTab {
            id: snapshot.active_tab_id.clone(),
            name: rest.to_string(),
        }),
        "close-others" => match tab_id_at(rest) {
            Some(id) => LineAction::Command(WorkspaceCommand::BulkClose {
                action: BulkCloseAction::Others,
                target_id: id,
            }),
            None => LineAction::Unknown,
        },
        "close-right" => match tab_id_at(rest) {
            Some(id) => LineAction::Command(WorkspaceCommand::BulkClose {
                action: BulkCloseAction::ToTheRight,
                target_id: id,
            }),
            None => LineAction::Unknown,
        },
        "close-left" => match tab_id_at(rest) {
            Some(id) => LineAction::Command(WorkspaceCommand::BulkClose {
                action: BulkCloseAction::ToTheLeft,
                target_id: id,
            }),
            None => LineAction::Unknown,
        },
        "close-all" => LineAction::Command(WorkspaceCommand::BulkClose {
            action: BulkCloseAction::All,
            target_id: snapshot.active_tab_id.clone(),
        }),
        "collections" => LineAction::Print(render_collections(snapshot)),
        "new-collection" => LineAction::Command(WorkspaceCommand::CreateCollection),
        "logs" => LineAction::Print(render_logs(snapshot)),
        // pull in capture-process writes made since the last refresh
        "refresh" => LineAction::Command(WorkspaceCommand::Refresh),
        "import" => match log_at(rest) {
            Some(log) => LineAction::Command(WorkspaceCommand::ImportLog(log.id.clone())),
            None => LineAction::Unknown,
        },
        "export" => match log_at(rest) {
            Some(log) => LineAction::Print(generate_curl(log)),
            None => LineAction::Unknown,
        },
        "delete-log" => match log_at(rest) {
            Some(log) => LineAction::Command(WorkspaceCommand::DeleteLog(log.id.clone())),
            None => LineAction::Unknown,
        },
        "clear-logs" => LineAction::Command(WorkspaceCommand::ClearLogs),
        "record" => LineAction::Command(WorkspaceCommand::ToggleRecording),
        "curl" => LineAction::Command(WorkspaceCommand::ImportCurl(line.to_string())),
        _ => LineAction::Unknown,
    }
}

fn render_tabs(snapshot: &WorkspaceSnapshot) -> String {
    snapshot
        .tabs
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if t.is_active { "*" } else { " " };
            let method = t
                .method
                .map(|m| format!("{} ", m))
                .unwrap_or_default();
            let spinner = if t.is_loading { " ..." } else { "" };
            format!("{}{} {}{}{}", i, marker, method, t.title, spinner)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_collections(snapshot: &WorkspaceSnapshot) -> String {
    if snapshot.collections.is_empty() {
        return String::from("no collections");
    }
    snapshot
        .collections
        .iter()
        .map(|c| {
            let requests = c
                .requests
                .iter()
                .map(|r| format!("  {} {}", r.method, r.name))
                .collect::<Vec<_>>()
                .join("\n");
            if requests.is_empty() {
                c.name.clone()
            } else {
                format!("{}\n{}", c.name, requests)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_logs(snapshot: &WorkspaceSnapshot) -> String {
    let header = if snapshot.is_recording {
        "recording on"
    } else {
        "recording off"
    };
    if snapshot.logs.is_empty() {
        return format!("{}\nno captured entries", header);
    }
    let entries = snapshot
        .logs
        .iter()
        .enumerate()
        .map(|(i, l)| {
            format!(
                "{} {} {} {} {}",
                i,
                format_time(l.timestamp),
                l.method,
                l.status,
                l.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}", header, entries)
}

fn print_snapshot(snapshot: &WorkspaceSnapshot) {
    if let Some(notice) = &snapshot.notice {
        println!("! {}", notice);
    }
    let strip = snapshot
        .tabs
        .iter()
        .map(|t| {
            let marker = if t.is_active { "*" } else { "" };
            format!("[{}{}]", t.title, marker)
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", strip);

    let Some(tab) = &snapshot.active else { return };
    if let Some(request) = &tab.data {
        let query = params_to_query_string(&request.params);
        if query.is_empty() {
            println!("  {} {}", request.method, request.url);
        } else {
            println!("  {} {} ({})", request.method, request.url, query);
        }
    }
    if tab.is_loading {
        println!("  sending...");
    }
    if let Some(error) = &tab.error {
        println!("  error: {}", error);
    }
    if let Some(response) = &tab.response {
        println!(
            "  {} {} | {} ms | {}",
            response.status,
            response.status_text,
            response.time_ms,
            format_bytes(response.size)
        );
    }
}
