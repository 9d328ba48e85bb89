//! seminary-data command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command
//!       │
//!       ▼
//!   ┌──────────────┐    ┌──────────────────┐    ┌───────────────┐
//!   │ BackendClient│───▶│ RetryingTransport│───▶│ HttpTransport │────▶ hosted backend
//!   │ query/auth/  │    │ timeout + retry  │    │   (reqwest)   │
//!   │ storage      │◀───│                  │◀───│               │◀────
//!   └──────┬───────┘    └──────────────────┘    └───────────────┘
//!          │ on error
//!          ▼
//!   classify → user-facing message (stderr), exit code 1
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use seminary_data::backend::records::{Banner, Statistic};
use seminary_data::backend::{load_or_default, object_path, user_message, Direction, OrderBy, Query, UploadEvent};
use seminary_data::config::load_config;
use seminary_data::observability::logging::init_logging;
use seminary_data::BackendClient;

#[derive(Parser)]
#[command(name = "seminary-data")]
#[command(about = "Query and manage the seminary website's hosted backend", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment overrides apply on top.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List rows of any table as JSON
    Select {
        table: String,
        /// Equality filter, `column=value` (repeatable)
        #[arg(long = "eq")]
        filters: Vec<String>,
        /// Sort term, `column` or `column.desc`
        #[arg(long)]
        order: Option<OrderBy>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Active home page banners, with the default banner as fallback
    Banners,
    /// About page statistics, with default figures as fallback
    Statistics,
    /// Upload a file and print its public URL
    Upload {
        bucket: String,
        /// Folder inside the bucket
        prefix: String,
        file: PathBuf,
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },
    /// Sign in with email and password and print the session user
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.is_empty() => Ok((column.to_string(), value.to_string())),
        _ => Err(format!("invalid filter '{}', expected column=value", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config.observability);
    tracing::debug!(url = %config.backend.url, "Configuration loaded");

    let client = BackendClient::from_config(&config)?;

    match cli.command {
        Commands::Select {
            table,
            filters,
            order,
            limit,
        } => {
            let mut query = Query::new();
            for raw in &filters {
                let (column, value) = parse_filter(raw)?;
                query = query.eq(&column, value);
            }
            if let Some(order) = order {
                query = query.order_by(order);
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }

            match client.select_json(&table, &query).await {
                Ok(rows) => print_json(&rows)?,
                Err(e) => {
                    eprintln!("Error: {}", user_message(&e));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Banners => {
            let query = Query::new().eq("active", true).order("order_index", Direction::Asc);
            let loaded = load_or_default::<Banner, _>(&client, &query).await;
            if let Some(notice) = &loaded.notice {
                eprintln!("Warning: {}", notice);
            }
            print_json(&loaded.records)?;
        }
        Commands::Statistics => {
            let query = Query::new().order("created_at", Direction::Asc);
            let loaded = load_or_default::<Statistic, _>(&client, &query).await;
            if let Some(notice) = &loaded.notice {
                eprintln!("Warning: {}", notice);
            }
            print_json(&loaded.records)?;
        }
        Commands::Upload {
            bucket,
            prefix,
            file,
            content_type,
        } => {
            let data = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let path = object_path(&prefix, &file_name);

            let mut upload = match client.upload(&bucket, &path, data, &content_type).await {
                Ok(handle) => handle,
                Err(e) => {
                    eprintln!("Error: {}", user_message(&e));
                    return Ok(ExitCode::FAILURE);
                }
            };

            while let Some(event) = upload.next_event().await {
                match event {
                    UploadEvent::Progress(pct) => eprintln!("{:>3}%", pct),
                    UploadEvent::Completed { public_url, .. } => {
                        println!("{}", public_url);
                        return Ok(ExitCode::SUCCESS);
                    }
                    UploadEvent::Failed { message } => {
                        eprintln!("Error: {}", message);
                        return Ok(ExitCode::FAILURE);
                    }
                    UploadEvent::Cancelled => {
                        eprintln!("Upload cancelled");
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
        }
        Commands::SignIn { email, password } => match client.sign_in_with_password(&email, &password).await {
            Ok(session) => {
                print_json(&session.user)?;
                if let Err(e) = client.sign_out().await {
                    tracing::warn!(error = %e, "Sign out failed");
                }
            }
            Err(e) => {
                eprintln!("Error: {}", user_message(&e));
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
