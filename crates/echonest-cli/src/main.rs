// SPDX-License-Identifier: GPL-3.0-or-later
mod acrostic;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use echonest_client::{generic_unmarshal, Args, EchoNestClient, UploadFile};
use echonest_config::load as load_config;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "echonest", version, about = "Echo Nest API command line client")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Wait for exhausted rate-limit windows to reset
    #[arg(long, global = true)]
    throttle: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Issue a GET call, e.g. `get artist/profile name=Radiohead bucket=hotttnesss`
    Get {
        call: String,
        /// Arguments as key=value; keys may repeat
        params: Vec<String>,
    },
    /// Issue a multipart POST call
    Post {
        call: String,
        params: Vec<String>,
        /// File part as field=path
        #[arg(long = "file")]
        files: Vec<String>,
    },
    /// Spell a message with song titles from a genre radio
    Acrostic { genre: String, message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.telemetry.log_level);

    let mut builder = config.client.builder();
    if cli.throttle {
        builder = builder.throttle(true);
    }
    let client = builder.build()?;
    info!(target: "cli", base_url = %client.base_url(), throttle = client.throttle(), "client ready");

    match cli.command {
        Command::Get { call, params } => {
            let args = parse_args(&params)?;
            let response = client.get_call(&call, &args).await?;
            print_json(generic_unmarshal(response).await?)?;
        }
        Command::Post {
            call,
            params,
            files,
        } => {
            let args = parse_args(&params)?;
            let mut uploads = Vec::with_capacity(files.len());
            for raw in &files {
                let (field, path) = parse_pair(raw)?;
                let file = UploadFile::from_path(&path)
                    .await
                    .with_context(|| format!("reading {}", path))?;
                uploads.push((field, file));
            }
            let response = client.post_call(&call, &args, uploads).await?;
            print_json(generic_unmarshal(response).await?)?;
        }
        Command::Acrostic { genre, message } => {
            for line in run_acrostic(&client, genre, &message).await? {
                println!("{}", line);
            }
        }
    }

    log_rate_limits(&client).await;
    Ok(())
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn run_acrostic(client: &EchoNestClient, genre: String, message: &str) -> Result<Vec<String>> {
    let (tx, mut rx) = mpsc::channel(message.len().max(1));
    let producer = tokio::spawn(acrostic::produce_songs(client.clone(), genre, tx));

    let result = acrostic::build_acrostic(message, &mut rx, acrostic::MAX_TRIES).await;
    drop(rx);

    match result {
        Ok(lines) => {
            producer.abort();
            Ok(lines)
        }
        Err(err) => match producer.await {
            Ok(Err(source)) => Err(source.context("fetching songs")),
            _ => Err(err),
        },
    }
}

async fn log_rate_limits(client: &EchoNestClient) {
    for (bucket, info) in client.rate_limits().await {
        debug!(
            target: "cli",
            bucket = %bucket,
            limit = info.limit,
            used = info.used,
            remaining = info.remaining,
            last_call = %info.last_call,
            drift_ms = info.drift.num_milliseconds(),
            "rate limit"
        );
    }
}

fn print_json(value: serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got {:?}", raw))?;
    if key.is_empty() {
        return Err(anyhow!("empty key in {:?}", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_args(params: &[String]) -> Result<Args> {
    params.iter().map(|raw| parse_pair(raw)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("name=Sigur Rós").unwrap(),
            ("name".to_string(), "Sigur Rós".to_string())
        );
        assert_eq!(
            parse_pair("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_pair("empty=").unwrap().1, "");
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn test_parse_args_keeps_repeated_keys() {
        let params = vec![
            "name=Radiohead".to_string(),
            "bucket=terms".to_string(),
            "bucket=news".to_string(),
        ];
        let args = parse_args(&params).unwrap();
        assert_eq!(args.get("name"), Some("Radiohead"));
        assert_eq!(args.get_all("bucket").collect::<Vec<_>>(), ["terms", "news"]);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "echonest",
            "--throttle",
            "post",
            "track/upload",
            "filetype=mp3",
            "--file",
            "track=song.mp3",
        ])
        .unwrap();
        assert!(cli.throttle);
        match cli.command {
            Command::Post { call, params, files } => {
                assert_eq!(call, "track/upload");
                assert_eq!(params, ["filetype=mp3"]);
                assert_eq!(files, ["track=song.mp3"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["echonest", "acrostic", "Jazz", "hello world"]).unwrap();
        assert!(matches!(cli.command, Command::Acrostic { .. }));
    }
}
