use std::path::PathBuf;

use clap::{Parser, Subcommand};
use netkit::config::{load_config, NetkitConfig, SocketConfig};
use netkit::http::{Body, Http, RequestOptions};
use netkit::observability::logging;
use netkit::socket::{CloseInfo, Lifecycle, Socket};
use netkit::uri::Uri;
use serde_json::Value;
use tokio::sync::oneshot;

#[derive(Parser)]
#[command(name = "netkit-cli")]
#[command(about = "Inspect URIs, call HTTP APIs and listen on WebSocket events", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `http.base_uri` from the config file
    #[arg(short, long)]
    base_uri: Option<String>,

    /// Extra request header, as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded parts of a URI
    Uri { uri: String },
    /// Send a GET request
    Get { path: String },
    /// Send a DELETE request
    Delete { path: String },
    /// Send a POST request with a JSON body
    Post { path: String, body: Option<String> },
    /// Send a PUT request with a JSON body
    Put { path: String, body: Option<String> },
    /// Send a PATCH request with a JSON body
    Patch { path: String, body: Option<String> },
    /// Connect to a WebSocket and print events
    Listen {
        /// Overrides `socket.source` from the config file
        #[arg(short, long)]
        source: Option<String>,
        /// Event types to print; every message when empty
        events: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => NetkitConfig::default(),
    };
    if let Some(base_uri) = cli.base_uri {
        config.http.base_uri = base_uri;
    }

    logging::init(&config.logging)?;

    let options = parse_headers(&cli.headers)?;

    match cli.command {
        Commands::Uri { uri } => {
            let uri = Uri::new(uri);
            let output = serde_json::json!({
                "route": uri.route(),
                "structure": uri.structure(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Get { path } => {
            let http = Http::new(config.http);
            print_response(http.get(&path, options).await)?;
        }
        Commands::Delete { path } => {
            let http = Http::new(config.http);
            print_response(http.delete(&path, options).await)?;
        }
        Commands::Post { path, body } => {
            let http = Http::new(config.http);
            print_response(http.post(&path, parse_body(body)?, options).await)?;
        }
        Commands::Put { path, body } => {
            let http = Http::new(config.http);
            print_response(http.put(&path, parse_body(body)?, options).await)?;
        }
        Commands::Patch { path, body } => {
            let http = Http::new(config.http);
            print_response(http.patch(&path, parse_body(body)?, options).await)?;
        }
        Commands::Listen { source, events } => {
            let mut socket_config = config.socket;
            if let Some(source) = source {
                socket_config = SocketConfig::new(source);
            }
            listen(socket_config, events).await?;
        }
    }

    Ok(())
}

fn parse_headers(raw: &[String]) -> Result<RequestOptions, Box<dyn std::error::Error>> {
    let mut options = RequestOptions::new();
    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header '{header}' must look like 'Name: value'"))?;
        options = options.header(name.trim(), value.trim());
    }
    Ok(options)
}

fn parse_body(raw: Option<String>) -> Result<Body, serde_json::Error> {
    match raw {
        Some(raw) => Ok(Body::Json(serde_json::from_str(&raw)?)),
        None => Ok(Body::Empty),
    }
}

fn print_response(
    result: netkit::http::HttpResult<Value>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(body) = e.body() {
                eprintln!("Response: {body}");
            }
        }
    }
    Ok(())
}

async fn listen(
    config: SocketConfig,
    events: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (closed_tx, closed_rx) = oneshot::channel::<CloseInfo>();
    let closed_tx = std::sync::Mutex::new(Some(closed_tx));

    let mut lifecycle = Lifecycle::new()
        .on_error(|e| eprintln!("Error: {e}"))
        .on_close(move |info| {
            if let Ok(mut slot) = closed_tx.lock() {
                if let Some(tx) = slot.take() {
                    let _ = tx.send(info.clone());
                }
            }
        });
    if events.is_empty() {
        lifecycle = lifecycle.on_message(|payload| println!("{payload}"));
    }

    let mut socket = Socket::new(config, lifecycle);
    for event in &events {
        socket.on(event, |payload| println!("{payload}"), false);
    }

    socket.connect().await?;

    tokio::select! {
        info = closed_rx => {
            if let Ok(info) = info {
                eprintln!("Closed: {} {}", info.code, info.reason);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            socket.close(None, "bye")?;
        }
    }

    Ok(())
}
