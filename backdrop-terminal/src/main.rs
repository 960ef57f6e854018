/// Backdrop Terminal Demo - Particle field and floating wireframes
///
/// Renders the animated page backdrop as colored ASCII and plays the hero
/// reveal once the first frame is up.
/// Options:
///   --seed <u64>     Random seed for the scene layout
///   --title <text>   Hero title, one reveal step per word
///   --fps <n>        Target frame rate (default 30)
/// Controls:
///   - Mouse: lean the particle field; the cursor ring widens over the call to action
///   - Q/ESC: Quit

use std::io;
use backdrop_terminal::logging::{init_logging, LoggingConfig};
use backdrop_terminal::{AppConfig, Args, TerminalApp};
use clap::Parser;

fn main() -> io::Result<()> {
    init_logging(LoggingConfig::default());

    let config = AppConfig::from(Args::parse());

    let mut app = TerminalApp::new(config)?;
    app.run()?;

    Ok(())
}
