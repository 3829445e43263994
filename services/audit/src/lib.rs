mod cli;
mod commands;
mod render;

use genius_control::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
