// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line front-end for editing a PostgreSQL service file.
//!
//! ```bash
//! pg-service list
//! pg-service show prod
//! pg-service create dev -p host=localhost -p port=5432 -p dbname=app -p user=app
//! pg-service update dev -p host=127.0.0.1 -p port=5432 -p dbname=app -p user=app
//! pg-service delete dev
//! ```

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use pgservice::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::Level;

/// List, show, create, update and delete services in pg_service.conf
#[derive(Parser, Debug)]
#[command(name = "pg-service", version, about, long_about = None)]
struct Cli {
    /// Service file to edit (default: $PGSERVICEFILE, then the platform location)
    #[arg(short, long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Do not copy the file to <file>.bak before changing it
    #[arg(long, global = true)]
    no_backup: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved service file path
    Path,
    /// List service names in file order
    List,
    /// Show the parameters of one service
    Show {
        /// Service name
        name: String,
        /// Print the password instead of *****
        #[arg(long)]
        reveal: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Create a new service
    Create(WriteArgs),
    /// Replace the parameters of an existing service
    Update(WriteArgs),
    /// Create the service, or replace its parameters if it exists
    Upsert(WriteArgs),
    /// Delete a service
    Delete {
        /// Service name
        name: String,
    },
}

#[derive(Args, Debug)]
struct WriteArgs {
    /// Service name
    name: String,

    /// Parameter as KEY=VALUE; repeat for each parameter
    #[arg(
        short = 'p',
        long = "param",
        value_name = "KEY=VALUE",
        value_parser = parse_param,
        required = true
    )]
    params: Vec<(String, String)>,

    /// Fail unless host, port, dbname and user are all given
    #[arg(long)]
    require_connection: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Yaml,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[cfg(feature = "yaml")]
    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[cfg(not(feature = "yaml"))]
    #[error("{0}")]
    Unsupported(String),
}

fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_store(
    path: &Path,
    backup: bool,
    require_connection: bool,
) -> Result<ServiceConfigStore> {
    let mut builder = ServiceConfigStore::builder()
        .with_path(path)
        .backup(backup);
    if require_connection {
        builder = builder.require_connection_params();
    }
    builder.build()
}

fn print_entry(entry: &ServiceEntry, format: Format) -> std::result::Result<(), CliError> {
    match format {
        Format::Text => {
            println!("{}", entry.name.header());
            for (key, value) in entry.params.iter() {
                println!("{}={}", key, value);
            }
            Ok(())
        }
        #[cfg(feature = "yaml")]
        Format::Yaml => {
            print!("{}", serde_yaml::to_string(entry)?);
            Ok(())
        }
        #[cfg(not(feature = "yaml"))]
        Format::Yaml => Err(CliError::Unsupported(
            "pg-service was built without YAML support".to_string(),
        )),
    }
}

fn run(cli: Cli) -> std::result::Result<(), CliError> {
    let path = match cli.file {
        Some(path) => path,
        None => ServiceFileLocator::new().locate()?,
    };
    let backup = !cli.no_backup;

    match cli.command {
        Command::Path => {
            println!("{}", path.display());
        }
        Command::List => {
            let store = open_store(&path, backup, false)?;
            for name in store.list() {
                println!("{}", name);
            }
        }
        Command::Show {
            name,
            reveal,
            format,
        } => {
            let store = open_store(&path, backup, false)?;
            let params = store.load(&name)?;
            if let Err(e) = params.port(&name) {
                tracing::warn!("{}", e);
            }
            let entry = ServiceEntry::new(ServiceName::new(&name)?, params);
            let entry = if reveal { entry } else { entry.redacted() };
            print_entry(&entry, format)?;
        }
        Command::Create(args) => {
            let mut store = open_store(&path, backup, args.require_connection)?;
            let params: ServiceParams = args.params.into_iter().collect();
            store.create(&args.name, &params)?;
            println!("Created service '{}'", args.name.trim());
        }
        Command::Update(args) => {
            let mut store = open_store(&path, backup, args.require_connection)?;
            let params: ServiceParams = args.params.into_iter().collect();
            store.update(&args.name, &params)?;
            println!("Updated service '{}'", args.name.trim());
        }
        Command::Upsert(args) => {
            let mut store = open_store(&path, backup, args.require_connection)?;
            let params: ServiceParams = args.params.into_iter().collect();
            let verb = match store.upsert(&args.name, &params)? {
                Upsert::Created => "Created",
                Upsert::Updated => "Updated",
            };
            println!("{} service '{}'", verb, args.name.trim());
        }
        Command::Delete { name } => {
            let mut store = open_store(&path, backup, false)?;
            store.delete(&name)?;
            println!("Deleted service '{}'", name.trim());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
