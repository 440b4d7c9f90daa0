mod artifacts;
mod command_line;
mod config;
mod deploy;
#[cfg(test)]
mod test_server;
mod utils;
mod verify;

use std::process::ExitCode;

use clap::Parser;
use command_line::CommandLine;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();

    let cmd = CommandLine::parse();
    exit_code(cmd.execute().await)
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("Error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}
