use clap::{Parser, Subcommand};

use jdx_cli::commands::{config_ops, dict_ops};
use jdx_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "jdxtool", about = "EUC-JP dictionary index and search tool")]
struct Cli {
    /// Custom settings TOML (see `settings-export`)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the index for a dictionary (skipped if the cached index is valid)
    Build {
        /// Dictionary file (EUC-JP)
        dict_file: String,
        /// Directory for the cached index (default: next to the dictionary)
        #[arg(long)]
        cache_dir: Option<String>,
        /// Rebuild even if the cached index is valid
        #[arg(long)]
        force: bool,
    },
    /// Print every line with a token starting with the query
    Search {
        /// Dictionary file (EUC-JP)
        dict_file: String,
        /// Query text (kana, kanji or ASCII)
        query: String,
        /// Directory for the cached index (default: next to the dictionary)
        #[arg(long)]
        cache_dir: Option<String>,
    },
    /// Show dictionary and index information
    Info {
        /// Dictionary file (EUC-JP)
        dict_file: String,
        /// Directory for the cached index (default: next to the dictionary)
        #[arg(long)]
        cache_dir: Option<String>,
    },
    /// Check that the index is sorted
    Verify {
        /// Dictionary file (EUC-JP)
        dict_file: String,
        /// Directory for the cached index (default: next to the dictionary)
        #[arg(long)]
        cache_dir: Option<String>,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Some(file) = &cli.settings {
        config_ops::load_settings(file);
    }

    match cli.command {
        Command::Build {
            dict_file,
            cache_dir,
            force,
        } => dict_ops::build(&dict_file, cache_dir.as_deref(), force),
        Command::Search {
            dict_file,
            query,
            cache_dir,
        } => dict_ops::search(&dict_file, &query, cache_dir.as_deref()),
        Command::Info {
            dict_file,
            cache_dir,
        } => dict_ops::info(&dict_file, cache_dir.as_deref()),
        Command::Verify {
            dict_file,
            cache_dir,
        } => dict_ops::verify(&dict_file, cache_dir.as_deref()),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
