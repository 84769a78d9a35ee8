use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Arg, ArgMatches, Command};

use screen_rotator::backends::displayplacer::{Displayplacer, DEFAULT_TIMEOUT};
use screen_rotator::engine::{RotationOutcome, Rotator};
use screen_rotator::error::{Error, Result};
use screen_rotator::orientation::Rotation;
use screen_rotator::paths;
use screen_rotator::service::RotationService;
use screen_rotator::shortcuts::{KeyCombination, ShortcutAction};
use screen_rotator::store::LayoutStore;

const ACTIONS: [&str; 4] = ["toggle", "rotate_90", "rotate_0", "rotate_270"];

fn cli() -> Command<'static> {
    Command::new("screen-rotator")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .takes_value(true)
                .help("Config file, defaults to $SCREEN_ROTATOR_CONFIG or ~/.screen_rotator_config.json"),
        )
        .arg(
            Arg::new("tool")
                .long("tool")
                .value_name("PATH")
                .takes_value(true)
                .help("displayplacer binary, searched on $PATH and in Homebrew otherwise"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .takes_value(true)
                .default_value("10")
                .validator(parse_timeout)
                .help("Seconds to wait for displayplacer before giving up"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output"),
        )
        .subcommand(Command::new("list").about("List attached displays"))
        .subcommand(
            Command::new("rotate")
                .about("Rotate the target display")
                .arg(
                    Arg::new("degree")
                        .required(true)
                        .possible_values(["0", "90", "180", "270"]),
                ),
        )
        .subcommand(Command::new("toggle").about("Toggle the target display between 0 and 90"))
        .subcommand(
            Command::new("select")
                .about("Choose the display to rotate")
                .arg(Arg::new("id").required(true).help("Persistent screen id")),
        )
        .subcommand(Command::new("target").about("Show the selected display"))
        .subcommand(Command::new("shortcuts").about("Show shortcut bindings"))
        .subcommand(
            Command::new("bind")
                .about("Bind a key combination to an action")
                .arg(Arg::new("action").required(true).possible_values(ACTIONS))
                .arg(
                    Arg::new("keys")
                        .required(true)
                        .help("Keys joined by '+', e.g. ctrl+shift+r"),
                ),
        )
        .subcommand(Command::new("unbind-all").about("Clear all shortcut bindings"))
        .subcommand(
            Command::new("trigger")
                .about("Run the action a shortcut is bound to")
                .arg(Arg::new("action").required(true).possible_values(ACTIONS)),
        )
}

fn parse_timeout(secs: &str) -> std::result::Result<Duration, String> {
    match secs.parse::<u64>() {
        Ok(0) => Err("must be at least 1 second".to_owned()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(e.to_string()),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.is_present("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config_path = matches
        .value_of("config")
        .map(PathBuf::from)
        .unwrap_or_else(paths::default_config_path);

    // Commands that only read or edit the config never need displayplacer.
    match matches.subcommand() {
        Some(("target", _)) => {
            match LayoutStore::load(&config_path).target_display_id {
                Some(id) => println!("{}", id),
                None => println!("{}", Error::NoTarget),
            }
            Ok(())
        }
        Some(("shortcuts", _)) => {
            let bindings = LayoutStore::load(&config_path).shortcuts;
            for action in ShortcutAction::ALL.iter() {
                println!("{:<10}  {}", action, bindings.display(*action));
            }
            Ok(())
        }
        Some(("bind", sub)) => {
            let action: ShortcutAction = sub.value_of("action").unwrap_or_default().parse()?;
            let combo: KeyCombination = sub.value_of("keys").unwrap_or_default().parse()?;
            println!("{}: {}", action, combo.display);
            edit_config(&config_path, |store| store.shortcuts.set(action, Some(combo)))
        }
        Some(("unbind-all", _)) => {
            edit_config(&config_path, |store| store.shortcuts.clear())?;
            println!("All shortcuts have been cleared");
            Ok(())
        }
        Some((name, sub)) => run_with_tool(matches, config_path, name, sub),
        None => Ok(()),
    }
}

fn edit_config(path: &Path, edit: impl FnOnce(&mut LayoutStore)) -> Result<()> {
    let mut store = LayoutStore::load(path);
    edit(&mut store);
    store.try_save(path)
}

fn run_with_tool(
    matches: &ArgMatches,
    config_path: PathBuf,
    name: &str,
    sub: &ArgMatches,
) -> Result<()> {
    let timeout = matches
        .value_of("timeout")
        .and_then(|secs| parse_timeout(secs).ok())
        .unwrap_or(DEFAULT_TIMEOUT);
    let tool = match matches.value_of("tool") {
        Some(path) => Displayplacer::new(PathBuf::from(path), timeout),
        None => Displayplacer::locate(timeout)?,
    };
    let service = RotationService::new(Rotator::open(tool, config_path));

    match name {
        "list" => {
            let target = service.current_target();
            let displays = service.list_displays();
            if displays.is_empty() {
                println!("No displays found");
            }
            for display in displays {
                let marker = if target.as_deref() == Some(display.persistent_id.as_str()) {
                    "*"
                } else {
                    " "
                };
                let kind = if display.is_built_in {
                    "built-in"
                } else if display.is_external {
                    "external"
                } else {
                    "unknown"
                };
                println!(
                    "{} {}  {} ({})",
                    marker, display.persistent_id, display.name, kind
                );
            }
            Ok(())
        }
        "rotate" => {
            let degrees = sub
                .value_of("degree")
                .and_then(|degree| degree.parse::<isize>().ok())
                .unwrap_or_default();
            report(service.rotate(Rotation::from_degrees(degrees)?))
        }
        "toggle" => report(service.toggle()),
        "select" => {
            let id = sub.value_of("id").unwrap_or_default();
            service.select_target(id);
            println!("Target display set to {}", id);
            Ok(())
        }
        "trigger" => {
            let action: ShortcutAction = sub.value_of("action").unwrap_or_default().parse()?;
            report(service.trigger(action))
        }
        _ => Ok(()),
    }
}

fn report(outcome: RotationOutcome) -> Result<()> {
    match outcome {
        RotationOutcome::Failed(e) => Err(e),
        RotationOutcome::NoTarget => Err(Error::NoTarget),
        done => {
            println!("{}", done);
            Ok(())
        }
    }
}
