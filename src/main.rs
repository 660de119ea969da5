use std::env;
use std::process::ExitCode;

use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vending_machine::VendingMachine;
use vending_machine::catalog::Catalog;
use vending_machine::csv::{read_catalog, read_commands, write_transcript};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        error!("usage: vending-machine <commands.csv> [catalog.csv]");
        return ExitCode::from(2);
    };

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let catalog = match args.next() {
        Some(catalog_path) => match read_catalog(&catalog_path) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(path = %catalog_path, "{e}");
                return ExitCode::from(2);
            }
        },
        None => Catalog::default(),
    };
    info!(products = catalog.len(), "available products:\n{catalog}");

    let commands = match read_commands(path) {
        Ok(commands) => commands,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    let mut machine = VendingMachine::with_catalog(catalog);
    let (command_sender, command_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if command_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let transcript = machine.run(ReceiverStream::new(command_receiver)).await;

    if let Err(e) = write_transcript(std::io::stdout().lock(), &transcript) {
        error!("failed to write transcript: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
