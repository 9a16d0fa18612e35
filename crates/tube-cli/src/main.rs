//! tube-tools: manage a PeerTube channel and the S3 bucket holding its originals.
//!
//! Configuration comes from the environment (and `.env`): PEERTUBE_URL,
//! PEERTUBE_USERNAME, PEERTUBE_PASSWORD, PEERTUBE_CHANNEL_ID, S3_ENDPOINT,
//! S3_ACCESS_KEY, S3_SECRET_KEY, S3_BUCKET, plus optional S3_REGION,
//! DATA_DIR and FFPROBE_PATH.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tube_api_client::ApiClient;
use tube_cli::{
    format_directory_report, format_missing_backups, init_tracing, parse_published_at,
};
use tube_core::config::DEFAULT_FFPROBE_PATH;
use tube_core::constants::{DEFAULT_BACKUP_PAGE_SIZE, DEFAULT_VIDEO_PAGE_SIZE};
use tube_core::{Config, VideoPrivacy};
use tube_storage::{create_backup_store, LocalState};
use tube_sync::{
    compute_missing_backups, fingerprint, render_channel_readme, upload_backup,
    ChannelVideoSource, ListingOptions, ReconcileOptions, UploadOptions, Uploader, VideoProbe,
};

#[derive(Parser)]
#[command(name = "tube-tools", about = "Command-line tools to manage a PeerTube channel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the fingerprint (SHA-256 of the first MiB) of a file
    Hash {
        /// Path to the file
        path: PathBuf,
    },
    /// Print the embedded metadata of a video file as JSON
    Metadata {
        /// Path to the file
        path: PathBuf,
    },
    /// Upload a video to PeerTube and back up the original
    Upload {
        /// Path to the file
        path: PathBuf,
        /// Name of the video (defaults to embedded title, then file name)
        #[arg(long)]
        name: Option<String>,
        /// Description of the video
        #[arg(long)]
        description: Option<String>,
        /// Original publication date, RFC 3339 or YYYY-MM-DD
        #[arg(long, value_parser = parse_published_at)]
        published_at: Option<DateTime<Utc>>,
        /// public, unlisted, private, internal, or the numeric id
        #[arg(long, default_value = "public")]
        privacy: VideoPrivacy,
        /// Do not read embedded metadata
        #[arg(long)]
        no_metadata: bool,
        /// Do not copy the original to the backup bucket
        #[arg(long)]
        no_backup: bool,
    },
    /// Upload every video in a directory, skipping ones already uploaded
    UploadDir {
        /// Path to the directory
        dir: PathBuf,
        /// Privacy of every uploaded video
        #[arg(long, default_value = "public")]
        privacy: VideoPrivacy,
        /// Do not read embedded metadata
        #[arg(long)]
        no_metadata: bool,
        /// Do not copy originals to the backup bucket
        #[arg(long)]
        no_backup: bool,
    },
    /// Copy a file to the backup bucket as the original of a PeerTube video
    Backup {
        /// Path to the file
        path: PathBuf,
        /// UUID of the PeerTube video
        uuid: String,
    },
    /// List channel videos that have no original in the backup bucket
    MissingBackups {
        /// Videos requested per PeerTube page
        #[arg(long, default_value_t = DEFAULT_VIDEO_PAGE_SIZE)]
        page_size: usize,
        /// Keys requested per bucket listing page
        #[arg(long, default_value_t = DEFAULT_BACKUP_PAGE_SIZE)]
        backup_page_size: i32,
    },
    /// Print a Markdown README listing the channel's videos
    ChannelReadme {
        /// Description requests in flight at once
        #[arg(long, default_value_t = 10)]
        concurrency: usize,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    Config::from_env().context("Invalid configuration. Check the environment or .env file")
}

async fn login(config: &Config) -> anyhow::Result<ApiClient> {
    ApiClient::login(
        config.peertube_url(),
        &config.peertube.username,
        &config.peertube.password,
    )
    .await
    .with_context(|| format!("Failed to log in to {}", config.peertube_url()))
}

async fn uploader(config: &Config, use_metadata: bool) -> anyhow::Result<Uploader> {
    let client = login(config).await?;
    let channel = client
        .get_channel(&config.peertube.channel)
        .await
        .with_context(|| format!("Failed to look up channel {}", config.peertube.channel))?;

    let backups = create_backup_store(config).context("Failed to configure backup store")?;
    let state = LocalState::new(&config.data_dir)
        .await
        .with_context(|| format!("Failed to open data dir {}", config.data_dir.display()))?;

    let uploader = Uploader::new(Arc::new(client), backups, state, channel.id);
    if use_metadata {
        Ok(uploader.with_probe(VideoProbe::new(config.ffprobe_path.clone())?))
    } else {
        Ok(uploader)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hash { path } => {
            let fp = fingerprint(&path)
                .await
                .with_context(|| format!("Failed to hash {}", path.display()))?;
            println!("{}", fp);
        }
        Commands::Metadata { path } => {
            let ffprobe = std::env::var("FFPROBE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FFPROBE_PATH.to_string());
            let metadata = VideoProbe::new(ffprobe)?
                .probe(&path)
                .await
                .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
            print_json(&metadata.raw)?;
        }
        Commands::Upload {
            path,
            name,
            description,
            published_at,
            privacy,
            no_metadata,
            no_backup,
        } => {
            let config = load_config()?;
            let uploader = uploader(&config, !no_metadata).await?;
            let options = UploadOptions {
                name,
                description,
                published_at,
                privacy,
                use_metadata: !no_metadata,
                backup: !no_backup,
            };
            let outcome = uploader
                .upload_video(&path, &options)
                .await
                .with_context(|| format!("Failed to upload {}", path.display()))?;
            println!("{}", outcome.uuid);
        }
        Commands::UploadDir {
            dir,
            privacy,
            no_metadata,
            no_backup,
        } => {
            let config = load_config()?;
            let uploader = uploader(&config, !no_metadata).await?;
            let options = UploadOptions {
                privacy,
                use_metadata: !no_metadata,
                backup: !no_backup,
                ..UploadOptions::default()
            };
            let report = uploader
                .upload_dir(&dir, &options)
                .await
                .with_context(|| format!("Failed to upload directory {}", dir.display()))?;
            print!("{}", format_directory_report(&report));
        }
        Commands::Backup { path, uuid } => {
            let config = load_config()?;
            let backups =
                create_backup_store(&config).context("Failed to configure backup store")?;
            let key = upload_backup(backups.as_ref(), &path, &uuid)
                .await
                .with_context(|| format!("Failed to back up {}", path.display()))?;
            println!("{}", key);
        }
        Commands::MissingBackups {
            page_size,
            backup_page_size,
        } => {
            let config = load_config()?;
            let client = login(&config).await?;
            let videos = ChannelVideoSource::new(client, config.peertube.channel.clone());
            let backups =
                create_backup_store(&config).context("Failed to configure backup store")?;
            let options = ReconcileOptions {
                video_page_size: page_size,
                backup_page_size,
                ..ReconcileOptions::default()
            };

            let missing = compute_missing_backups(&videos, backups.as_ref(), &options)
                .await
                .context("Reconciliation failed")?;
            print!("{}", format_missing_backups(backups.bucket(), &missing));
        }
        Commands::ChannelReadme { concurrency } => {
            let config = load_config()?;
            let client = login(&config).await?;
            let channel = client
                .get_channel(&config.peertube.channel)
                .await
                .with_context(|| {
                    format!("Failed to look up channel {}", config.peertube.channel)
                })?;
            let videos = ChannelVideoSource::new(client.clone(), config.peertube.channel.clone());
            let options = ListingOptions {
                server_url: config.peertube_url().to_string(),
                page_size: DEFAULT_VIDEO_PAGE_SIZE,
                concurrency,
            };

            let readme = render_channel_readme(&channel, &videos, &client, &options)
                .await
                .context("Failed to render channel listing")?;
            print!("{}", readme);
        }
    }

    Ok(())
}
