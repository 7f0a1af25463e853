use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use minicade::app::App;
use minicade::clock::FrameClock;
use minicade::config::GameCli;
use minicade::event::TerminalInput;
use minicade::logging;
use minicade::runner::{self, TerminalScreen};

fn main() -> Result<()> {
    let cli = GameCli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init_file(&log_path)?;

    let config = cli.loop_config();
    info!(game = cli.game.key(), ?config, "starting");

    let mut app = App::new(cli.game.session());
    let mut clock = FrameClock::new(&config);
    let mut input = TerminalInput::new();

    // Setup terminal
    let mut screen = TerminalScreen::enter()?;
    let result = runner::run(&mut app, &mut clock, &mut input, &mut screen);
    if let Err(e) = &result {
        error!(error = %e, "main loop failed");
    }

    // Restore terminal even when the loop failed
    let restored = screen.restore();
    runner::finish(result, restored)?;
    Ok(())
}
