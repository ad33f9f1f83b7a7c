//! LockSmith command-line interface: UID discovery, dump, clone, and
//! dump-file inspection for Mifare Classic tags.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use locksmith_core::{
    hexdump, logging, provider::NfcProvider, LockSmith, LocksmithConfig,
};
use locksmith_nfc::SystemNfcProvider;
use log::warn;
use schemars::schema_for;
use serde_json::to_string_pretty;
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level command-line options shared by every subcommand.
#[derive(Parser, Debug)]
#[command(
    name = "locksmith",
    version,
    about = "Automation layer around nfc-list, mfoc, and nfc-mfclassic for Mifare Classic tags."
)]
struct Cli {
    /// Path to a LockSmith configuration file (TOML or YAML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory dump and key files are resolved against.
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Explicit candidate key (8 hex characters); repeatable.
    #[arg(short, long = "key")]
    keys: Vec<String>,

    /// Name of the default key file inside the workspace.
    #[arg(long)]
    keys_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover a tag and print its UID.
    Uid,

    /// Authenticate to a tag and write a binary dump into the workspace.
    Dump {
        /// Destination filename, relative to the workspace.
        filename: String,

        /// Extra options passed through to the dump tool untouched.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },

    /// Write one dump's contents onto a connected tag.
    Clone {
        /// Source dump filename, relative to the workspace.
        source: String,

        /// Target dump filename, relative to the workspace.
        target: String,

        /// Leave sector zero untouched (for tags whose sector zero is
        /// not rewritable).
        #[arg(long)]
        locked: bool,
    },

    /// Render a dump file as a hexadecimal grid.
    Show {
        /// Path to the dump file (absolute, or relative to the cwd).
        path: PathBuf,

        /// Read and chunk the file without printing the grid.
        #[arg(long)]
        quiet: bool,
    },

    /// Validate a configuration file or emit the config schema.
    Validate {
        /// Path to the configuration file to validate.
        #[arg(short = 'f', long, default_value = "locksmith.toml")]
        file: PathBuf,

        /// Output the JSON schema instead of validating a file.
        #[arg(long)]
        schema: bool,
    },
}

/// Entry point: parse arguments and surface errors with an exit code.
#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Dispatch to the requested subcommand.
async fn run() -> Result<()> {
    logging::init("info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file, schema } => {
            if schema {
                let schema = schema_for!(LocksmithConfig);
                println!("{}", to_string_pretty(&schema)?);
                return Ok(());
            }

            let cfg = LocksmithConfig::load(&file)
                .with_context(|| format!("failed to load configuration from {}", file.display()))?;

            let issues = cfg.validate();
            if issues.is_empty() {
                println!("Configuration valid ({} explicit keys).", cfg.keys.len());
            } else {
                eprintln!("Configuration validation failed:");
                for issue in issues {
                    eprintln!("  - {issue}");
                }
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Show { path, quiet } => {
            let table = hexdump::read_hex_file(&path, !quiet)
                .await
                .with_context(|| format!("failed to read dump file {}", path.display()))?;
            let bytes: usize = table.iter().map(|row| row.len()).sum();
            println!("{} rows ({} bytes)", table.len(), bytes);
            Ok(())
        }
        Commands::Uid => {
            let config = load_config(&cli)?;
            let provider = SystemNfcProvider::from_config(&config)?;
            let uid = provider.read_uid().await?;
            println!("{uid}");
            Ok(())
        }
        Commands::Dump { ref filename, ref options } => {
            let config = load_config(&cli)?;
            let provider = SystemNfcProvider::from_config(&config)?;
            let smith = LockSmith::new(config.clone(), provider)?;

            let params = smith.dump(&filename, &options).await?;
            println!("Dump written with parameters: {}", params.join(" "));

            let dump_path = config.resolve(&filename);
            hexdump::read_hex_file(&dump_path, true)
                .await
                .with_context(|| format!("dump tool reported success but {} is unreadable", dump_path.display()))?;
            Ok(())
        }
        Commands::Clone { ref source, ref target, locked } => {
            let config = load_config(&cli)?;
            let provider = SystemNfcProvider::from_config(&config)?;
            let smith = LockSmith::new(config, provider)?;
            if locked {
                warn!("sector zero will not be written (locked mode)");
            }
            smith.clone_tag(&source, &target, !locked).await?;
            println!("Cloned {source} onto {target}.");
            Ok(())
        }
    }
}

/// Load the configuration file when one was given, then fold the
/// command-line overrides on top.
fn load_config(cli: &Cli) -> Result<Arc<LocksmithConfig>> {
    let mut config = match &cli.config {
        Some(path) => LocksmithConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => LocksmithConfig::default(),
    };

    if let Some(workspace) = &cli.workspace {
        config.workspace = workspace.clone();
    }
    if !cli.keys.is_empty() {
        config.keys.extend(cli.keys.iter().cloned());
    }
    if let Some(keys_file) = &cli.keys_file {
        config.default_keys_file = keys_file.clone();
    }

    Ok(Arc::new(config))
}
