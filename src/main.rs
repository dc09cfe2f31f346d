mod commands;
mod logging;

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::Source;

#[derive(Parser)]
#[command(name = "zjuical")]
#[command(about = "Turn scraped ZJU timetable and exam records into an iCalendar file")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the calendar to a file
    Generate {
        #[command(flatten)]
        source: Source,

        /// Output file
        #[arg(short, long, default_value = "zjuical.ics")]
        output: PathBuf,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },
    /// Serve the calendar over HTTP, regenerating it periodically
    Serve {
        #[command(flatten)]
        source: Source,

        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(short, long, default_value_t = commands::serve::DEFAULT_PORT)]
        port: u16,

        /// Seconds between regenerations
        #[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Generate {
            source,
            output,
            force,
        } => commands::generate::run(&source, &output, force),
        Commands::Serve {
            source,
            host,
            port,
            interval,
        } => commands::serve::run(source, host, port, interval).await,
    }
}
