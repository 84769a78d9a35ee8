//! Walks the selected display through every rotation and back, using an
//! in-memory store so the real config file is left alone.

use screen_rotator::backends::displayplacer::{Displayplacer, DEFAULT_TIMEOUT};
use screen_rotator::engine::Rotator;
use screen_rotator::error::Result;
use screen_rotator::inventory;
use screen_rotator::orientation::Rotation;
use screen_rotator::store::LayoutStore;

use std::thread::sleep;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let mut tool = Displayplacer::locate(DEFAULT_TIMEOUT)?;
    println!("using {}", tool.path().display());
    let displays = inventory::list_displays(&mut tool);
    for display in &displays {
        println!("found {:?}", display);
    }

    let mut rotator = Rotator::new(tool, LayoutStore::default(), None);
    let target = match rotator.auto_select_target(&displays) {
        Some(target) => target.to_owned(),
        None => {
            println!("no displays, nothing to rotate");
            return Ok(());
        }
    };

    for rotation in [
        Rotation::Clockwise90,
        Rotation::Clockwise180,
        Rotation::Clockwise270,
        Rotation::None,
    ]
    .iter()
    {
        println!("rotating {} to {}: {}", target, rotation, rotator.rotate(*rotation));
        sleep(Duration::from_secs(2));
    }

    for (mode, command) in [
        ("landscape", &rotator.store().layouts.landscape),
        ("portrait", &rotator.store().layouts.portrait),
    ]
    .iter()
    {
        println!("{} layout: {}", mode, command.as_deref().unwrap_or("none"));
    }
    Ok(())
}
