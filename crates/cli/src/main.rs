//! Menucochon CLI - migrations and one-off maintenance scripts.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! mc-cli migrate
//!
//! # Create a back-office account (password from MC_ADMIN_PASSWORD)
//! mc-cli admin create -e marie@menucochon.com -n "Marie"
//!
//! # Import content
//! mc-cli import posts content/blog
//! mc-cli import lexicon content/lexique.yaml
//!
//! # Fill in English titles and descriptions
//! mc-cli translate recipes --limit 20 --dry-run
//!
//! # Rewrite French descriptions with the local model
//! mc-cli rewrite descriptions --limit 10
//!
//! # Recipe images
//! mc-cli images map --dry-run
//! mc-cli images resize photos/ out/ --width 1200 --upload
//! mc-cli images generate --limit 5
//! ```
//!
//! Scripts handle one item at a time and pause `--delay-ms` between calls
//! to external services.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;
mod config;
mod matching;

#[derive(Parser)]
#[command(name = "mc-cli")]
#[command(author, version, about = "Menucochon maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage back-office accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Import content files into the database
    Import {
        #[command(subcommand)]
        target: ImportTarget,
    },
    /// Translate French content into English
    Translate {
        #[command(subcommand)]
        target: TranslateTarget,
    },
    /// Rewrite French content with the local model
    Rewrite {
        #[command(subcommand)]
        target: RewriteTarget,
    },
    /// Recipe image maintenance
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password (defaults to the `MC_ADMIN_PASSWORD` environment variable)
        #[arg(long, env = "MC_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum ImportTarget {
    /// Markdown posts with YAML frontmatter (`<name>.en.md` holds the English version)
    Posts {
        /// Directory containing the post files
        dir: PathBuf,
        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// YAML list of lexicon terms
    Lexicon {
        /// YAML file
        file: PathBuf,
        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Options shared by scripts that call external services.
#[derive(Args, Clone, Copy, Debug)]
pub struct BatchOptions {
    /// Maximum number of items to process
    #[arg(long, default_value_t = 50)]
    pub limit: i64,
    /// Pause between external calls, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,
    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
enum TranslateTarget {
    /// Recipes missing an English title or description
    Recipes(BatchOptions),
}

#[derive(Subcommand)]
enum RewriteTarget {
    /// French recipe descriptions
    Descriptions(BatchOptions),
}

#[derive(Subcommand)]
enum ImagesAction {
    /// Point recipe image URLs at matching files in the storage bucket
    Map {
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Only consider files under this bucket prefix
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Resize JPEG/PNG/WebP images into WebP
    Resize {
        /// Source file or directory
        src: PathBuf,
        /// Output directory
        out: PathBuf,
        /// Maximum width in pixels
        #[arg(long, default_value_t = 1200)]
        width: u32,
        /// Upload each resized file to the storage bucket
        #[arg(long)]
        upload: bool,
    },
    /// Generate a photo for recipes without an image
    Generate(BatchOptions),
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
        Commands::Import { target } => match target {
            ImportTarget::Posts { dir, dry_run } => {
                commands::import::posts(&dir, dry_run).await?;
            }
            ImportTarget::Lexicon { file, dry_run } => {
                commands::import::lexicon(&file, dry_run).await?;
            }
        },
        Commands::Translate { target } => match target {
            TranslateTarget::Recipes(options) => commands::translate::recipes(options).await?,
        },
        Commands::Rewrite { target } => match target {
            RewriteTarget::Descriptions(options) => {
                commands::rewrite::descriptions(options).await?;
            }
        },
        Commands::Images { action } => match action {
            ImagesAction::Map { dry_run, prefix } => {
                commands::images::map(&prefix, dry_run).await?;
            }
            ImagesAction::Resize {
                src,
                out,
                width,
                upload,
            } => commands::images::resize(&src, &out, width, upload).await?,
            ImagesAction::Generate(options) => commands::images::generate(options).await?,
        },
    }
    Ok(())
}
