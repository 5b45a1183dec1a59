use anyhow::Result;
use clap::Parser;
use drivegate_client::ApiClient;

#[derive(Parser, Debug)]
#[command(name = "list_folders")]
#[command(about = "List destination folders available for uploads")]
struct Args {
    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,
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

    let response = client.list_folders().await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&response)?),
        _ => {
            if response.folders.is_empty() {
                println!("No folders found under the configured root.");
                return Ok(());
            }
            println!("{:<44} NAME", "ID");
            for folder in &response.folders {
                println!("{:<44} {}", folder.id, folder.name);
            }
        }
    }

    Ok(())
}
