//! Where the config file lives.
//!
//! Priority:
//! 1) `--config` on the command line
//! 2) `$SCREEN_ROTATOR_CONFIG` (if set and non-empty)
//! 3) `~/.screen_rotator_config.json`

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "SCREEN_ROTATOR_CONFIG";

const CONFIG_FILE: &str = ".screen_rotator_config.json";

pub fn default_config_path() -> PathBuf {
    resolve_config_path(env::var_os(CONFIG_ENV), dirs::home_dir())
}

fn resolve_config_path(from_env: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    if let Some(path) = from_env.map(PathBuf::from) {
        if !path.as_os_str().is_empty() {
            return path;
        }
    }
    home.unwrap_or_else(|| PathBuf::from(".")).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_home() {
        assert_eq!(
            resolve_config_path(
                Some(OsString::from("/tmp/rot.json")),
                Some(PathBuf::from("/Users/me"))
            ),
            PathBuf::from("/tmp/rot.json")
        );
    }

    #[test]
    fn empty_env_falls_back_to_home() {
        assert_eq!(
            resolve_config_path(Some(OsString::new()), Some(PathBuf::from("/Users/me"))),
            PathBuf::from("/Users/me/.screen_rotator_config.json")
        );
        assert_eq!(
            resolve_config_path(None, None),
            PathBuf::from("./.screen_rotator_config.json")
        );
    }
}
