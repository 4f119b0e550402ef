use colored::Colorize;
use mise::{MiseApp, MiseConfig};

/// Print every known setting. Values are never shown, only whether one is set.
pub fn show(config: &MiseConfig) {
    println!("profile {}", config.profile().bold());
    for prop in MiseApp::settings() {
        let state = if config.contains_key(prop.key) {
            "set".green()
        } else {
            "default".dimmed()
        };
        println!(
            "{:<26} {:<24} {:<7} {:<8} {}",
            prop.key,
            prop.env_var().cyan(),
            prop.type_name,
            state,
            prop.description.dimmed()
        );
    }
}
