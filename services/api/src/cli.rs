use crate::admin::{run_sellers, SellerArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sea_merkado::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "e-Sea-Merkado",
    about = "Run the seller store API and review seller onboarding from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Review and decide seller registrations against a running seller store
    Sellers(SellerArgs),
    /// Run an in-process demo of the seller approval workflow
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Sellers(args) => run_sellers(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
