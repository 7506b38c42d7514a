use crate::render::{run_analyze, run_catalog, AnalyzeArgs, CatalogArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fintech_readiness::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "FinTech Readiness Assistant",
    about = "Score startup documents against QCB compliance topics and match support programs",
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
    /// Analyze a document and print the readiness report
    Analyze(AnalyzeArgs),
    /// Print the loaded rule table and reference catalog
    Catalog(CatalogArgs),
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
        Command::Analyze(args) => run_analyze(args),
        Command::Catalog(args) => run_catalog(args),
    }
}
