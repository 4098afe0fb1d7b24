use clap::{Parser, Subcommand};
use qlogo_fetch::avatar::DEFAULT_SIZE;
use qlogo_fetch::utils::files::read_identifier_list;
use qlogo_fetch::{logging, preset_urls, AvatarClient, ClientConfig, Identifier, Quality};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Build, check and download avatars from the qlogo.cn service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Timeout in seconds for downloads
    #[arg(long, global = true, default_value_t = 10)]
    fetch_timeout: u64,

    /// Timeout in seconds for existence checks
    #[arg(long, global = true, default_value_t = 5)]
    probe_timeout: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the avatar URL for an identifier
    Url {
        identifier: String,
        #[arg(short, long, value_enum, default_value_t = Quality::HighDefinition)]
        quality: Quality,
        /// Avatar size in pixels (clamped to 640 for hd, 140 for standard)
        #[arg(short, long, default_value_t = DEFAULT_SIZE)]
        size: u32,
    },
    /// Check whether an avatar exists
    Check {
        identifier: String,
        #[arg(short, long, value_enum, default_value_t = Quality::HighDefinition)]
        quality: Quality,
    },
    /// Download a single avatar
    Fetch {
        identifier: String,
        #[arg(short, long, value_enum, default_value_t = Quality::HighDefinition)]
        quality: Quality,
        /// Avatar size in pixels (clamped to 640 for hd, 140 for standard)
        #[arg(short, long, default_value_t = DEFAULT_SIZE)]
        size: u32,
        /// Where to save the image (defaults to avatar_<id><suffix>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download avatars for many identifiers, one after another
    Batch {
        /// Identifiers to download
        identifiers: Vec<String>,
        /// File with more identifiers (JSON array or one per line)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Directory to save the images into
        #[arg(short, long, default_value = "avatars")]
        output_dir: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Quality::HighDefinition)]
        quality: Quality,
        /// Avatar size in pixels (clamped to 640 for hd, 140 for standard)
        #[arg(short, long, default_value_t = DEFAULT_SIZE)]
        size: u32,
        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show URLs for the common avatar sizes
    Sizes { identifier: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> qlogo_fetch::Result<ExitCode> {
    let config = ClientConfig {
        fetch_timeout: Duration::from_secs(args.fetch_timeout),
        probe_timeout: Duration::from_secs(args.probe_timeout),
        ..ClientConfig::default()
    };
    let client = AvatarClient::with_config(config)?;

    match args.command {
        Commands::Url {
            identifier,
            quality,
            size,
        } => {
            let url = client.build_url(&Identifier::from(identifier), quality, size)?;
            println!("{}", url);
        }
        Commands::Check {
            identifier,
            quality,
        } => {
            let identifier = Identifier::from(identifier);
            if client.check_exists(&identifier, quality).await {
                println!("✓ Avatar exists: {}", identifier);
            } else {
                println!("✗ Avatar missing or unreachable: {}", identifier);
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Fetch {
            identifier,
            quality,
            size,
            output,
        } => {
            let identifier = Identifier::from(identifier);
            let written = client
                .fetch(&identifier, quality, size, output.as_deref())
                .await?;
            println!("✓ Saved avatar for {} ({} bytes)", identifier, written);
        }
        Commands::Batch {
            identifiers,
            file,
            output_dir,
            quality,
            size,
            json,
        } => {
            let mut ids: Vec<Identifier> =
                identifiers.into_iter().map(Identifier::from).collect();
            if let Some(file) = file {
                ids.extend(read_identifier_list(&file)?);
            }

            if ids.is_empty() {
                eprintln!("No identifiers given; pass them as arguments or with --file");
                return Ok(ExitCode::FAILURE);
            }

            let summary = client.batch_fetch(&ids, &output_dir, quality, size).await?;

            if json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("Failed to serialize summary: {}", e),
                }
            } else {
                println!(
                    "Download complete! Succeeded: {}/{}",
                    summary.succeeded, summary.total
                );
            }

            if summary.failed() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Sizes { identifier } => {
            let identifier = Identifier::from(identifier);
            for (preset, url) in preset_urls(&client.config().endpoints, &identifier) {
                let label = format!("{}({}x{})", preset.name(), preset.size(), preset.size());
                match url {
                    Ok(url) => println!("{:<16} {}", label, url),
                    Err(e) => println!("{:<16} {}", label, e),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
