use anyhow::{Context, Result};
use camroll_core::batch;
use camroll_core::collection::CollectionStore;
use camroll_core::config::{self, AppConfig};
use camroll_core::models::{resolve_storage_url, PhotoStatus};
use camroll_core::poller::PollPolicy;
use camroll_core::reconcile::{self, CleanupOutcome, Reconciler, UntaggedList};
use clap::{Parser, Subcommand};
use providers::device::{FsDeviceConfig, FsDeviceLibrary};
use providers::http::{HttpConfig, HttpRemoteLibrary};
use providers::{Access, AssetUpload, DeviceLibrary, RemoteLibrary};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Upload { files, json } => run_upload(cfg, files, json).await,
        Commands::Status { photo_id } => run_status(cfg, photo_id).await,
        Commands::Photos {
            page,
            per_page,
            json,
        } => run_photos(cfg, page, per_page, json).await,
        Commands::Cleanup { delete, json } => run_cleanup(cfg, delete, json).await,
    }
}

#[derive(Parser)]
#[command(name = "camroll")]
#[command(about = "Photo upload, tagging status, and cleanup client", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload photos and track their processing status
    Upload {
        /// Image files to submit
        files: Vec<String>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Query processing status for one photo
    Status {
        photo_id: String,
    },
    /// List device photos, newest first
    Photos {
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// Page size; defaults to device.page_size from config
        #[arg(long)]
        per_page: Option<usize>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch untagged photos and optionally delete them from the device
    Cleanup {
        /// Actually delete device assets (default: list candidates only)
        #[arg(long, default_value_t = false)]
        delete: bool,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn build_remote(cfg: &AppConfig) -> Arc<dyn RemoteLibrary> {
    Arc::new(HttpRemoteLibrary::new(HttpConfig {
        base_url: cfg.api.base_url.clone(),
    }))
}

fn build_device(cfg: &AppConfig) -> Result<Arc<dyn DeviceLibrary>> {
    let root = cfg
        .device
        .root
        .clone()
        .context("device.root is not configured")?;
    Ok(Arc::new(FsDeviceLibrary::new(FsDeviceConfig {
        root: root.into(),
        allow_delete: cfg.device.allow_delete,
    })))
}

async fn run_upload(cfg: AppConfig, files: Vec<String>, json: bool) -> Result<()> {
    anyhow::ensure!(!files.is_empty(), "no files given");

    // Mirror the library-permission gate when a device root is configured.
    if cfg.device.root.is_some() {
        let device = build_device(&cfg)?;
        if !device.request_permission(Access::Read).await? {
            anyhow::bail!("photo library access denied; allow photo access to upload");
        }
    }

    let remote = build_remote(&cfg);
    let store = CollectionStore::new();
    let assets: Vec<AssetUpload> = files.iter().map(AssetUpload::from_path).collect();
    let policy = PollPolicy::from(&cfg.polling);

    let outcome = batch::upload_batch(remote, &store, &cfg.api.user_id, &assets, policy).await;
    for failure in &outcome.failures {
        eprintln!("upload failed: {}: {}", failure.file_name, failure.error);
    }

    // All submissions have been attempted; let the detached pollers settle
    // before the process exits.
    for handle in outcome.pollers {
        let _ = handle.await;
    }

    let photos = store.snapshot();
    if json {
        let summary = serde_json::json!({
            "photos": photos,
            "failures": outcome.failures,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for photo in &photos {
            println!(
                "{}  {}  {}",
                photo.photo_id,
                photo.status.as_str(),
                resolve_storage_url(&cfg.api.base_url, &photo.storage_url)
            );
        }
        println!(
            "uploaded {} of {} ({} failed)",
            photos.len(),
            files.len(),
            outcome.failures.len()
        );
    }
    Ok(())
}

async fn run_status(cfg: AppConfig, photo_id: String) -> Result<()> {
    let remote = build_remote(&cfg);
    let report = remote.photo_status(&photo_id).await?;
    println!("{}", PhotoStatus::parse(report.status.as_deref()).as_str());
    Ok(())
}

async fn run_photos(cfg: AppConfig, page: usize, per_page: Option<usize>, json: bool) -> Result<()> {
    let device = build_device(&cfg)?;
    if !device.request_permission(Access::Read).await? {
        anyhow::bail!("photo library access denied");
    }
    let per_page = per_page.unwrap_or(cfg.device.page_size);
    let photos = device.list_photos(page, per_page).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&photos)?);
    } else {
        for photo in &photos {
            let created = chrono::DateTime::from_timestamp(photo.created, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            println!("{}  {}", created, photo.asset_id);
        }
        println!("{} photos on page {}", photos.len(), page);
    }
    Ok(())
}

async fn run_cleanup(cfg: AppConfig, delete: bool, json: bool) -> Result<()> {
    let remote = build_remote(&cfg);
    let candidates = reconcile::fetch_untagged(remote.as_ref(), &cfg.api.user_id).await?;

    if !delete {
        if json {
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        } else {
            for photo in &candidates {
                println!(
                    "{}  {}",
                    photo.id,
                    resolve_storage_url(&cfg.api.base_url, &photo.storage_url)
                );
            }
            println!(
                "{} untagged photos; rerun with --delete to remove them",
                candidates.len()
            );
        }
        return Ok(());
    }

    let device = build_device(&cfg)?;
    let reconciler = Reconciler::new(device, cfg.device.uri_prefixes.clone());
    let list = UntaggedList::new();
    list.replace(candidates.clone());

    let mut deleted = 0usize;
    let mut warnings = 0usize;
    for photo in &candidates {
        match reconciler.delete_photo(&list, photo).await {
            CleanupOutcome::Deleted => deleted += 1,
            CleanupOutcome::DeleteFailed(msg) => {
                warnings += 1;
                eprintln!("could not delete {}: {}", photo.id, msg);
            }
            CleanupOutcome::SkippedNoPermission => {
                eprintln!("deletion permission denied; {} left on device", photo.id);
            }
            CleanupOutcome::SkippedNoAsset | CleanupOutcome::AlreadyInFlight => {}
        }
    }

    if json {
        let summary = serde_json::json!({
            "candidates": candidates.len(),
            "deleted": deleted,
            "warnings": warnings,
            "remaining": list.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "cleanup: {} candidates, {} deleted, {} warnings, {} remaining",
            candidates.len(),
            deleted,
            warnings,
            list.len()
        );
    }
    Ok(())
}
