// Noise Control config path for Linux
// Config: ~/.config/noise-control

use std::env;
use std::path::PathBuf;

/// Uses `$XDG_CONFIG_HOME/noise-control` if set, otherwise `~/.config/noise-control`.
pub fn get_config_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("noise-control")
    } else {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home).join(".config").join("noise-control")
    }
}
