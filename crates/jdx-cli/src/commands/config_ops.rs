use std::fs;

use super::die;

pub fn settings_export() {
    print!("{}", jdx_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        jdx_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: index.capacity_divisor={}, index.index_extension={}, query.max_results={}",
        s.index.capacity_divisor, s.index.index_extension, s.query.max_results
    );
}

/// Load a custom settings file before any dictionary is opened.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(
        jdx_core::settings::init_custom(content),
        "Error loading settings: {}"
    );
}
