use std::path::{Path, PathBuf};

use config::{Config, ConfigError};
use serde::Deserialize;

use crate::parser::hours::DEFAULT_OFFSET_HOURS;

pub const CONFIG_FILE: &str = "findhelp.toml";
const ENV_PREFIX: &str = "FINDHELP";

/// Run-wide settings. Defaults, then the optional config file, then
/// `FINDHELP_*` environment variables; CLI flags are applied on top in `main`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_offset_hours: i64,
    pub service_type: String,
    pub base_url: String,
    pub zipcodes_path: Option<PathBuf>,
    pub zipcode_column: String,
    pub db_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_offset_hours: DEFAULT_OFFSET_HOURS,
            service_type: "Shelter".into(),
            base_url: "https://www.auntbertha.com/".into(),
            zipcodes_path: None,
            zipcode_column: "LA County".into(),
            db_path: PathBuf::from("data/graph.sqlite"),
        }
    }
}

impl Settings {
    pub fn load(file: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::from(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(s.source_offset_hours, 3);
        assert_eq!(s.service_type, "Shelter");
        assert_eq!(s.zipcode_column, "LA County");
        assert!(s.zipcodes_path.is_none());
    }

    #[test]
    fn file_overrides_some_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("findhelp.toml");
        std::fs::write(
            &path,
            "service_type = \"Food Pantry\"\nsource_offset_hours = 0\nzipcodes_path = \"data/places.csv\"\n",
        )
        .unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.service_type, "Food Pantry");
        assert_eq!(s.source_offset_hours, 0);
        assert_eq!(s.zipcodes_path, Some(PathBuf::from("data/places.csv")));
        assert_eq!(s.base_url, "https://www.auntbertha.com/");
    }
}
