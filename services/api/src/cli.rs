use crate::report::{run_summary, run_sweep, SummaryArgs, SweepArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use intern_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Intern Desk",
    about = "Serve and inspect the intern absence and hours desk",
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
    /// Print the hours balance, absences and recent activity of one intern
    Summary(SummaryArgs),
    /// Purge trash items past their retention window
    Sweep(SweepArgs),
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
        Command::Summary(args) => run_summary(args),
        Command::Sweep(args) => run_sweep(args),
    }
}
