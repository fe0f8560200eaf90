//! wsbridge CLI
//!
//! Renders the WSDL document of a configured web service and inspects its
//! resolved types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codegen::DumpOptions;
use config::Config;
use wsbridge_cli::{load_services, render_wsdl, resolved_types};

/// Command-line interface configuration for wsbridge.
#[derive(Parser, Debug)]
#[command(name = "wsbridge", about = "Expose service definitions as SOAP web services", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
    /// Log level used when RUST_LOG is not set; overrides the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Available wsbridge commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print (or write) the WSDL document of a service
    Wsdl {
        /// Configuration file
        #[arg(long)]
        config: PathBuf,
        /// Service name
        #[arg(long)]
        service: String,
        /// Endpoint declared by the service port
        #[arg(long)]
        endpoint: Option<String>,
        /// Stylesheet referenced by an xml-stylesheet instruction
        #[arg(long)]
        stylesheet: Option<String>,
        /// Write the document here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the resolved type map of a service
    Types {
        /// Configuration file
        #[arg(long)]
        config: PathBuf,
        /// Service name
        #[arg(long)]
        service: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(settings: &Config, level: Option<&str>) -> std::io::Result<()> {
    let mut logging = settings.logging.clone();
    if let Some(level) = level {
        logging.level = level.to_string();
    }
    logging::init(&logging)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.cmd {
        Commands::Wsdl { config, service, endpoint, stylesheet, output } => {
            let (settings, services) = load_services(&config)?;
            init_logging(&settings, cli.log_level.as_deref())?;

            let document = render_wsdl(&services, &service, &DumpOptions { endpoint, stylesheet })?;
            match output {
                Some(path) => {
                    std::fs::write(&path, document)?;
                    logging::trace("CLI", &format!("wrote {}", path.display()));
                }
                None => print!("{}", document),
            }
        }
        Commands::Types { config, service } => {
            let (settings, services) = load_services(&config)?;
            init_logging(&settings, cli.log_level.as_deref())?;

            for (native, wire) in resolved_types(&services, &service)? {
                println!("{} => {}", native, wire);
            }
        }
    }
    Ok(())
}
