//! GridRPG - Entry Point
//!
//! Sets up logging, loads the configuration and runs one console session.

use std::fs::OpenOptions;
use std::io;

use anyhow::Result;

use gridrpg::data::GameConfig;
use gridrpg::game::SessionEnd;
use gridrpg::ui::ConsoleApp;

fn main() -> Result<()> {
    // Log to a file so it does not interleave with the game text
    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    );
    match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("gridrpg.log")
    {
        Ok(log_file) => {
            logger.target(env_logger::Target::Pipe(Box::new(log_file)));
        }
        Err(e) => eprintln!("Warning: could not open gridrpg.log: {}", e),
    }
    logger.init();

    log::info!("Starting GridRPG v{}", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::load();
    let stdin = io::stdin();
    let mut app = ConsoleApp::new(stdin.lock(), io::stdout(), config);

    let result = app.run();
    match &result {
        Ok(SessionEnd::Victory { total_kills }) => log::info!("Session won with {} kills", total_kills),
        Ok(SessionEnd::Defeat { cause }) => log::info!("Session lost: {}", cause),
        Ok(SessionEnd::Quit) => log::info!("Session quit"),
        Err(e) => {
            log::error!("Game exited with error: {}", e);
            eprintln!("Error: {}", e);
        }
    }

    log::info!("GridRPG shut down cleanly");
    result.map(|_| ())
}
