use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use heron::services::remote_store::HttpRemoteStore;
use heron::services::tree_service;
use heron::services::upload_service::{SelectedFile, UploadEvent, UploadSession, UploadStatus};
use heron::settings::{Language, Settings};
use heron::AppContext;

#[derive(Parser)]
#[command(name = "heron", version, about = "Manage a remote image storage service")]
struct Cli {
    /// Base URL of the storage service
    #[arg(long, env = "HERON_BASE_URL", default_value = "http://localhost:5000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List one folder
    Ls {
        #[arg(default_value = "")]
        path: String,
    },
    /// Print the whole folder tree
    Tree,
    /// Upload files into a folder
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Destination folder; empty means the storage root
        #[arg(long, default_value = "")]
        folder: String,
    },
    /// Create a folder
    Mkdir { path: String },
    /// Delete a folder
    Rmdir { path: String },
    /// Rename a folder
    MvDir { old_path: String, new_path: String },
    /// Rename a file
    Mv { path: String, new_name: String },
    /// Delete a file
    Rm { path: String },
    /// Show or change persisted settings
    Config {
        /// Interface language: de or en
        #[arg(long)]
        language: Option<String>,
        /// Base URL used in shareable links
        #[arg(long)]
        public_base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let settings = Settings::load().unwrap_or_default();
    let store = HttpRemoteStore::new(&cli.base_url);
    let mut app = AppContext::new(store, settings);

    match cli.command {
        Command::Ls { path } => {
            let view = app
                .controller
                .navigate(&path)
                .await?
                .context("navigation was superseded")?;
            for dir in &view.directories {
                println!("{}/", dir.name);
            }
            for file in &view.files {
                let size = file.size.unwrap_or(0);
                match app.settings.share_url(&cli.base_url, file) {
                    Some(url) => println!("{}\t{}\t{}", file.name, size, url),
                    None => println!("{}\t{}", file.name, size),
                }
            }
        }
        Command::Tree => {
            let root = app.controller.reload_tree().await?;
            for option in tree_service::flatten_for_selector(&root, None) {
                println!("{}", option.label);
            }
        }
        Command::Upload { files, folder } => {
            let mut selected = Vec::new();
            for path in &files {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .with_context(|| format!("invalid file name: {}", path.display()))?;
                let media_type = mime_guess::from_path(path)
                    .first_or_octet_stream()
                    .to_string();
                selected.push(SelectedFile {
                    name,
                    media_type,
                    bytes,
                });
            }
            app.select_files(selected);
            for upload in app.uploads.pending() {
                if let Some(dims) = upload.dimensions {
                    println!("{}: {}x{}px", upload.file.name, dims.width, dims.height);
                }
            }

            let destination = UploadSession::resolve_destination(&folder, None);
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            let report = app.upload_to(&destination, Some(&tx)).await?;
            drop(tx);

            let language = app.settings.language;
            while let Some(event) = rx.recv().await {
                if let UploadEvent::FileFinished { index, succeeded, percent } = event {
                    let status = if succeeded {
                        UploadStatus::Uploaded
                    } else {
                        UploadStatus::Failed(String::new())
                    };
                    let label = language.upload_status_label(&status);
                    println!("[{:>3.0}%] file {}: {label}", percent, index + 1);
                }
            }
            println!("Completed {} of {} files", report.completed, report.total);
        }
        Command::Mkdir { path } => {
            app.controller.create_folder(&path).await?;
            println!("created {path}");
        }
        Command::Rmdir { path } => {
            app.controller.delete_folder(&path).await?;
            println!("deleted {path}");
        }
        Command::MvDir { old_path, new_path } => {
            app.controller.rename_folder(&old_path, &new_path).await?;
            println!("renamed {old_path} -> {new_path}");
        }
        Command::Mv { path, new_name } => {
            app.controller.rename_file(&path, &new_name).await?;
            println!("renamed {path} -> {new_name}");
        }
        Command::Rm { path } => {
            app.controller.delete_file(&path).await?;
            println!("deleted {path}");
        }
        Command::Config {
            language,
            public_base_url,
        } => {
            let mut settings = app.settings.clone();
            if let Some(language) = language {
                settings.language = match language.as_str() {
                    "de" => Language::De,
                    "en" => Language::En,
                    other => anyhow::bail!("unknown language: {other}"),
                };
            }
            if let Some(url) = public_base_url {
                settings.public_base_url = if url.is_empty() { None } else { Some(url) };
            }
            if settings != app.settings {
                settings.save()?;
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
