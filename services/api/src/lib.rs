mod cli;
mod infra;
mod report;
mod routes;
mod server;

use intern_desk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
