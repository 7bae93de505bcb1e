// src/main.rs

use when_changed::config::Settings;
use when_changed::errors::WhenChangedError;
use when_changed::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        match err {
            WhenChangedError::ArgumentError(msg) => {
                eprintln!("when-changed: {msg}");
                eprintln!("{}", cli::usage());
            }
            err => eprintln!("when-changed: {err}"),
        }
        std::process::exit(1);
    }
}

async fn run_main() -> Result<(), WhenChangedError> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let settings = Settings::try_from(args)?;
    run(settings).await
}
