//! TOML keymap files.
//!
//! ```toml
//! [settings]
//! min_threshold = 127
//! max_threshold = 153
//! layer_count = 3
//!
//! [[position]]
//! row = 2
//! col = 0
//! key = 0
//!
//! [[binding]]
//! key = 0
//! layer = 0
//! route = "momentary"
//! payload = "A"       # or a number such as 0x04
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use strobe_core::{keycode, Binding, Keymap, KeymapError, Route, Setting, MAX_LAYERS, NUM_KEYS};
use thiserror::Error;

/// Keymap sized for the full matrix.
pub type FullKeymap = Keymap<NUM_KEYS, MAX_LAYERS>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown setting \"{0}\"")]
    UnknownSetting(String),

    #[error("unknown route \"{0}\"")]
    UnknownRoute(String),

    #[error("unknown payload \"{0}\"")]
    UnknownPayload(String),

    #[error(transparent)]
    Keymap(#[from] KeymapError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeymapFile {
    #[serde(default)]
    settings: BTreeMap<String, u8>,
    #[serde(default, rename = "position")]
    positions: Vec<PositionEntry>,
    #[serde(default, rename = "binding")]
    bindings: Vec<BindingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PositionEntry {
    row: usize,
    col: usize,
    key: u8,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BindingEntry {
    key: usize,
    layer: usize,
    route: String,
    payload: PayloadRepr,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PayloadRepr {
    Code(u8),
    Name(String),
}

impl PayloadRepr {
    fn resolve(&self) -> Result<u8, ConfigError> {
        match self {
            PayloadRepr::Code(code) => Ok(*code),
            PayloadRepr::Name(name) => {
                keycode::parse(name).ok_or_else(|| ConfigError::UnknownPayload(name.clone()))
            }
        }
    }
}

/// Build a keymap from TOML text. Settings left out keep their factory
/// values.
pub fn parse_keymap(text: &str) -> Result<FullKeymap, ConfigError> {
    let file: KeymapFile = toml::from_str(text)?;
    let mut keymap = FullKeymap::new();

    for (name, value) in &file.settings {
        let setting =
            Setting::from_name(name).ok_or_else(|| ConfigError::UnknownSetting(name.clone()))?;
        keymap.set_setting(setting, *value);
    }

    for p in &file.positions {
        keymap.map_position(p.row, p.col, p.key)?;
    }

    for b in &file.bindings {
        let route =
            Route::from_name(&b.route).ok_or_else(|| ConfigError::UnknownRoute(b.route.clone()))?;
        let payload = b.payload.resolve()?;
        keymap.set_binding(b.key, b.layer, Binding::new(route, payload))?;
    }

    Ok(keymap)
}

/// Load a keymap file, or the factory keymap when no path is given.
pub fn load_keymap(path: Option<&Path>) -> Result<FullKeymap> {
    let Some(path) = path else {
        return FullKeymap::demo().context("building factory keymap");
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_keymap(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use strobe_core::ConfigStore;

    const SAMPLE: &str = r#"
[settings]
min_threshold = 100
layer_count = 2

[[position]]
row = 3
col = 7
key = 5

[[binding]]
key = 5
layer = 0
route = "momentary"
payload = "LShift"

[[binding]]
key = 5
layer = 1
route = "analog"
payload = 0x21
"#;

    #[test]
    fn test_parse_sample() {
        let km = parse_keymap(SAMPLE).unwrap();
        assert_eq!(km.setting(Setting::MinThreshold), 100);
        assert_eq!(km.setting(Setting::MaxThreshold), 153);
        assert_eq!(km.setting(Setting::LayerCount), 2);
        assert!(km.is_position_active(3, 7));
        assert_eq!(km.user_id(3, 7), 5);
        assert_eq!(km.binding(5, 0), Binding::new(Route::Momentary, 0xE1));
        assert_eq!(km.binding(5, 1), Binding::new(Route::Analog, 0x21));
    }

    #[test]
    fn test_unknown_names() {
        let err = parse_keymap("[settings]\nspeed = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSetting(ref s) if s == "speed"));

        let err = parse_keymap(
            "[[binding]]\nkey = 0\nlayer = 0\nroute = \"hold\"\npayload = 4\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRoute(_)));

        let err = parse_keymap(
            "[[binding]]\nkey = 0\nlayer = 0\nroute = \"toggle\"\npayload = \"Hyper\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPayload(_)));
    }

    #[test]
    fn test_out_of_range_binding() {
        let err = parse_keymap(
            "[[binding]]\nkey = 0\nlayer = 16\nroute = \"toggle\"\npayload = 4\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Keymap(KeymapError::LayerOutOfRange(16))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let km = load_keymap(Some(file.path())).unwrap();
        assert_eq!(km.user_id(3, 7), 5);
    }

    #[test]
    fn test_load_default_is_factory() {
        let km = load_keymap(None).unwrap();
        assert_eq!(km, FullKeymap::demo().unwrap());
    }

    #[test]
    fn test_missing_file() {
        let err = load_keymap(Some(Path::new("/nonexistent/keymap.toml"))).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
