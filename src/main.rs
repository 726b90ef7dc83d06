//! Cannon Range entry point
//!
//! Headless demo: spawns a handful of drifting targets, lets the demo pilot
//! shoot at them on a recording surface and prints the final score.
//!
//! Usage: `cannon-range [settings.json]`

use anyhow::Result;

use cannon_range::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use cannon_range::{DemoPilot, RecordingSurface, Session, Settings};

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Cannon Range starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path),
        None => Settings::setup("Test", FIELD_WIDTH, FIELD_HEIGHT),
    };

    let mut pilot = DemoPilot::from_settings(&settings);
    let target_count = settings.target_count;
    let mut session = Session::init(settings, RecordingSurface::new());
    session.spawn_random_targets(target_count);

    let score = session.run(&mut pilot);
    log::info!("{} repaints", session.surface().repaints());

    println!("Your score is {}.", score);
    Ok(())
}
