mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pressroom-admin")]
#[command(about = "Operator tools for Pressroom settings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh encryption key as hex
    Keygen,
    /// Encrypt a value into a settings token
    Encrypt {
        /// Read from stdin when omitted
        plaintext: Option<String>,
        #[arg(long, env = "PRESSROOM_ENCRYPTION__KEY", hide_env_values = true)]
        key: String,
    },
    /// Decrypt a settings token
    Decrypt {
        token: String,
        #[arg(long, env = "PRESSROOM_ENCRYPTION__KEY", hide_env_values = true)]
        key: String,
    },
    /// Check a JSON file against a category schema
    Validate {
        category: String,
        file: PathBuf,
    },
    /// List categories with their storage kind and sensitive fields
    Categories,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => commands::keygen(),
        Commands::Encrypt { plaintext, key } => commands::encrypt(&key, plaintext),
        Commands::Decrypt { token, key } => commands::decrypt(&key, &token),
        Commands::Validate { category, file } => commands::validate(&category, &file),
        Commands::Categories => commands::categories(),
    }
}
