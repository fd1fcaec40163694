use crate::TowersError;
use serde::Deserialize;
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

/// Settings read from a JSON file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Location of the tower data store.
    pub dbfile: Option<PathBuf>,
}

impl Config {
    pub const TOWERS_DIR: &'static str = "talltowers";
    pub const TOWERS_DB: &'static str = "towers.db";

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path).map_err(|err| {
            TowersError::Config(format!("unable to read {}: {}", path.display(), err))
        })?;

        let config = Self::from_json(&text)
            .map_err(|err| TowersError::Config(format!("{}: {}", path.display(), err)))?;

        tracing::debug!("loaded settings from {}", path.display());

        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Default store location under the home directory.
    pub fn default_db_path() -> Option<PathBuf> {
        dirs::home_dir().map(|hd| hd.join(Self::TOWERS_DIR).join(Self::TOWERS_DB))
    }

    /// An explicit path wins, then the settings file, then the default location.
    pub fn db_path(&self, explicit: Option<&Path>) -> Result<PathBuf, TowersError> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.dbfile.clone())
            .or_else(Self::default_db_path)
            .ok_or_else(|| TowersError::Config("no database file configured".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let config = Config::from_json(r#"{"dbfile": "/data/towers.db", "plotsdir": "/tmp"}"#)
            .unwrap();
        assert_eq!(config.dbfile, Some(PathBuf::from("/data/towers.db")));

        let empty = Config::from_json("{}").unwrap();
        assert_eq!(empty.dbfile, None);

        assert!(Config::from_json("{\"dbfile\": 3}").is_err());
    }

    #[test]
    fn test_db_path_precedence() {
        let config = Config {
            dbfile: Some(PathBuf::from("/from/settings.db")),
        };

        assert_eq!(
            config.db_path(Some(Path::new("/from/flag.db"))).unwrap(),
            PathBuf::from("/from/flag.db")
        );
        assert_eq!(
            config.db_path(None).unwrap(),
            PathBuf::from("/from/settings.db")
        );
    }

    #[test]
    fn test_missing_settings_file() {
        let err = Config::load(Path::new("/no/such/settings.json")).unwrap_err();
        assert!(err.to_string().contains("settings.json"));
    }
}
