use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client::location::MemoryLocation;
use client::service::HttpGenerationService;
use client::tabs::PaneKind;
use client::widget::{BufferEditor, Editor, TextErrorPane};
use client::{PlaygroundConfig, Session, SessionEvent, Widgets, logging};
use common::{Bootstrap, Document};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Configuration used when a new page has no config document yet.
const DEFAULT_CONFIG: &str = r#"{
  "version": "1",
  "packages": [
    {
      "path": "db",
      "engine": "postgresql",
      "schema": "query.sql",
      "queries": "query.sql"
    }
  ]
}"#;

#[derive(Parser, Debug)]
#[command(name = "playground", about = "Terminal front end for the generation playground")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the generation service.
    #[arg(long)]
    endpoint: Option<String>,

    /// Quiet period after the last edit, in milliseconds.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Only send requests once the config document is loaded.
    #[arg(long)]
    require_config: bool,

    /// JSON payload with the initial input documents.
    #[arg(long)]
    bootstrap_input: Option<PathBuf>,

    /// JSON payload with the initial generation output.
    #[arg(long)]
    bootstrap_output: Option<PathBuf>,
}

enum Input {
    Line(Option<String>),
    Event(Option<SessionEvent>),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    logging::init_logging(&config.log_level);

    let bootstrap = load_bootstrap(&args, &config)?;
    let service = HttpGenerationService::new(config.endpoint.clone())
        .context("Failed to build HTTP client")?;

    let mut input = BufferEditor::new();
    let output = BufferEditor::new();
    let errors = TextErrorPane::new();
    let location = MemoryLocation::default();
    let mut session = Session::new(
        &config,
        Widgets {
            input: Box::new(input.clone()),
            output: Box::new(output.clone()),
            errors: Box::new(errors.clone()),
            location: Box::new(location),
        },
        Arc::new(service),
    );
    session.bootstrap(bootstrap);
    info!(session = %session.id(), endpoint = %config.endpoint, "Playground ready");

    print_help();
    print_panes(&session, &input, &output, &errors);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let next = tokio::select! {
            line = lines.next_line() => Input::Line(line.context("Failed to read stdin")?),
            event = session.next_event() => Input::Event(event),
        };

        match next {
            Input::Line(None) => break,
            Input::Line(Some(line)) => {
                if !run_command(&mut session, &mut input, line.trim()) {
                    break;
                }
                if line.trim() == "show" {
                    print_panes(&session, &input, &output, &errors);
                }
            }
            Input::Event(None) => break,
            Input::Event(Some(event)) => {
                let before = session.output().renders();
                if !session.dispatch(event) {
                    break;
                }
                if session.output().renders() != before {
                    print_panes(&session, &input, &output, &errors);
                }
            }
        }
    }

    session.dispatch(SessionEvent::Shutdown);
    Ok(())
}

fn load_config(args: &Args) -> Result<PlaygroundConfig> {
    let mut config = match &args.config {
        Some(path) => PlaygroundConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PlaygroundConfig::default(),
    };
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(debounce_ms) = args.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
    if args.require_config {
        config.require_config = true;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_bootstrap(args: &Args, config: &PlaygroundConfig) -> Result<Bootstrap> {
    let read = |path: &Option<PathBuf>| -> Result<Option<String>> {
        path.as_ref()
            .map(|p| {
                std::fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))
            })
            .transpose()
    };
    let input = read(&args.bootstrap_input)?;
    let output = read(&args.bootstrap_output)?;

    let mut bootstrap = Bootstrap::from_payloads(input.as_deref(), output.as_deref())
        .context("Malformed bootstrap payload")?;
    if bootstrap.input.is_none() {
        bootstrap.input = Bootstrap::with_input([
            Document::for_file(config.query_document.clone(), ""),
            Document::for_file(config.config_document.clone(), DEFAULT_CONFIG),
        ])
        .input;
    }
    Ok(bootstrap)
}

/// Applies one stdin command. Returns `false` on quit.
fn run_command(session: &mut Session, input: &mut BufferEditor, command: &str) -> bool {
    let (verb, rest) = command.split_once(' ').unwrap_or((command, ""));
    match verb {
        "" | "show" => {}
        "quit" => {
            println!("Closing session and exiting.");
            return false;
        }
        "edit" => {
            input.set_value(rest);
            session.dispatch(SessionEvent::EditOccurred);
        }
        "append" => {
            let mut text = input.value();
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(rest);
            input.set_value(&text);
            session.dispatch(SessionEvent::EditOccurred);
        }
        "tab" => match rest.split_once(' ') {
            Some((pane, name)) => match pane.parse::<PaneKind>() {
                Ok(pane) => {
                    session.dispatch(SessionEvent::TabSelected {
                        pane,
                        name: name.trim().to_string(),
                    });
                }
                Err(e) => println!("{}", e),
            },
            None => println!("Usage: tab input|output <name>"),
        },
        _ => {
            println!("Unknown command: {}", verb);
            print_help();
        }
    }
    true
}

fn print_help() {
    println!("Commands: edit <text>, append <text>, tab input|output <name>, show, quit");
}

fn print_panes(
    session: &Session,
    input: &BufferEditor,
    output: &BufferEditor,
    errors: &TextErrorPane,
) {
    let input_tabs: Vec<_> = session
        .input_tabs()
        .tabs()
        .iter()
        .map(|tab| if tab.selected { format!("[{}]", tab.label) } else { tab.label.clone() })
        .collect();
    println!("\n== input: {}", input_tabs.join(" "));
    println!("{}", input.text());

    if errors.is_visible() {
        println!("== error");
        println!("{}", errors.text());
    } else if output.is_visible() {
        let tabs = session.output().tabs();
        let labels: Vec<_> = tabs
            .tabs()
            .iter()
            .map(|tab| if tab.selected { format!("[{}]", tab.label) } else { tab.label.clone() })
            .collect();
        println!("== {}: {}", tabs.header().unwrap_or("output"), labels.join(" "));
        println!("{}", output.text());
    }
    println!("== location: {}", session.location());
}
