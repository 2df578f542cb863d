use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{listen::ListenArgs, optimize::OptimizeArgs};

mod listen;
mod optimize;
mod parsers;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign unassigned orders to vehicles
    #[command(visible_alias = "o")]
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
    /// Connect to the realtime channel and keep a fleet in sync
    Listen {
        #[command(flatten)]
        args: ListenArgs,
    },
    /// Print the JSON schema of the fleet input file
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Optimize { args }) => optimize::run(args)?,
        Some(Commands::Listen { args }) => listen::run(args).await?,
        Some(Commands::Schema) => {
            println!("{}", courier_optimizer::json::schema::generate_json_schema()?)
        }
        None => {}
    }

    Ok(())
}
