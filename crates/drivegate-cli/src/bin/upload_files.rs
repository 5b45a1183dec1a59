use anyhow::{Context, Result};
use clap::Parser;
use drivegate_cli::{format_bytes, guess_content_type};
use drivegate_client::{
    ApiClient, BatchCoordinator, BatchDestination, BatchStatus, TaskState, TransferEngine,
    UploadTask,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "upload_files")]
#[command(about = "Upload files directly to the provider via brokered sessions")]
struct Args {
    /// Files to upload, in order
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Existing destination folder id (ignored when --new-folder is given)
    #[arg(long, value_name = "ID")]
    folder_id: Option<String>,

    /// Create this folder under the configured root and upload into it
    #[arg(long, value_name = "NAME")]
    new_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let client = ApiClient::from_env()?;

    let destination = BatchDestination {
        folder_id: args.folder_id,
        new_folder_name: args.new_folder,
    };

    let coordinator = BatchCoordinator::new(
        Arc::new(client),
        Arc::new(TransferEngine::new()),
        destination,
    );

    let mut total_bytes = 0u64;
    for path in &args.files {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Cannot read file: {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("Not a regular file: {}", path.display());
        }

        let size = metadata.len();
        total_bytes += size;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");
        let content_type = guess_content_type(file_name).to_string();

        coordinator.add_task(UploadTask::new(path.clone(), size, content_type));
    }

    println!(
        "Uploading {} file(s), {} total",
        args.files.len(),
        format_bytes(total_bytes)
    );

    let status = coordinator.run().await;

    for task in coordinator.tasks() {
        match task.state {
            TaskState::Success => {
                println!("  ok    {} ({})", task.file_name, format_bytes(task.size));
            }
            TaskState::Error => {
                println!(
                    "  FAIL  {} - {}",
                    task.file_name,
                    task.error.as_deref().unwrap_or("unknown error")
                );
            }
            _ => {
                println!("  skip  {}", task.file_name);
            }
        }
    }

    match status {
        BatchStatus::Success => {
            println!("All uploads completed.");
            Ok(())
        }
        BatchStatus::Error => {
            anyhow::bail!("One or more uploads failed")
        }
        other => {
            anyhow::bail!("Batch finished in unexpected state: {:?}", other)
        }
    }
}
