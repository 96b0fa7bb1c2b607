use std::io;
use std::path::PathBuf;

use certshelf_utils::asn1::{Decoder, DecoderConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_LEN};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod add;
mod asn1parse;
mod delete;
mod input;
mod inspect;
mod list;
mod show;

/// Keep a shelf of X.509 certificates decoded from DER files.
#[derive(Parser)]
#[command(name = "certshelf")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Certificate store file.
    #[arg(
        long,
        global = true,
        env = "CERTSHELF_STORE",
        default_value = "certificates.json"
    )]
    store: PathBuf,
    /// Maximum ASN.1 nesting depth.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Maximum certificate file size in bytes.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_INPUT_LEN)]
    max_size: usize,
    /// Log decoding and store activity to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a DER certificate and add it to the store.
    Add {
        /// DER certificate file.
        file: PathBuf,
    },
    /// List stored certificates.
    List,
    /// Show details of a stored certificate.
    Show {
        /// Position in the list.
        index: usize,
    },
    /// Remove a stored certificate.
    Delete {
        /// Position in the list.
        index: usize,
    },
    /// Decode a DER certificate without storing it.
    Inspect {
        /// DER certificate file.
        file: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the ASN.1 element tree of a DER file.
    Asn1parse {
        /// DER input file.
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let decoder = Decoder::new(
        DecoderConfig::builder()
            .max_depth(cli.max_depth)
            .max_input_len(cli.max_size)
            .build(),
    );
    debug!(
        store = %cli.store.display(),
        max_depth = cli.max_depth,
        max_size = cli.max_size,
        "starting"
    );
    let mut out = io::stdout().lock();

    let result = match &cli.command {
        Commands::Add { file } => add::run(&cli.store, &decoder, file, &mut out),
        Commands::List => list::run(&cli.store, &mut out),
        Commands::Show { index } => show::run(&cli.store, *index, &mut out),
        Commands::Delete { index } => delete::run(&cli.store, *index, &mut out),
        Commands::Inspect { file, json } => inspect::run(&decoder, file, *json, &mut out),
        Commands::Asn1parse { file } => asn1parse::run(&decoder, file, &mut out),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "certshelf",
            "list",
            "--store",
            "/tmp/shelf.json",
            "--max-depth",
            "16",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.store, PathBuf::from("/tmp/shelf.json"));
        assert_eq!(cli.max_depth, 16);
        assert_eq!(cli.max_size, DEFAULT_MAX_INPUT_LEN);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_parse_inspect_json() {
        let cli = Cli::try_parse_from(["certshelf", "inspect", "--json", "cert.der"]).unwrap();
        match cli.command {
            Commands::Inspect { file, json } => {
                assert_eq!(file, PathBuf::from("cert.der"));
                assert!(json);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_index() {
        assert!(Cli::try_parse_from(["certshelf", "delete", "minus-one"]).is_err());
    }
}
