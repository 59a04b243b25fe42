use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dialtidy_core::validate_raw_number;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "dialtidy";
const CONFIG_FILENAME: &str = "config.toml";

/// The sample values seeded when the config does not override them. Same
/// varied human-entered formats the tool exists to clean up.
pub const DEFAULT_SEED_VALUES: &[&str] = &[
    "1234567890",
    "123 456 7891",
    "(123) 456 7892",
    "(123) 456-7893",
    "123-456-7894",
    "123-456-7890",
    "1234567892",
    "(123)456-7892",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub seed_values: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            seed_values: DEFAULT_SEED_VALUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid seed value {value:?}: {reason}")]
    InvalidSeedValue { value: String, reason: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    db_path: Option<PathBuf>,
    seed: Option<SeedFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    values: Option<Vec<String>>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(db_path) = parsed.db_path {
        if db_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(db_path));
        }
        config.db_path = Some(db_path);
    }

    if let Some(seed) = parsed.seed {
        if let Some(values) = seed.values {
            for value in &values {
                validate_raw_number(value).map_err(|err| ConfigError::InvalidSeedValue {
                    value: value.clone(),
                    reason: err.to_string(),
                })?;
            }
            config.seed_values = values;
        }
    }

    Ok(config)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_at_path, merge_config, ConfigFile, SeedFile, DEFAULT_SEED_VALUES};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            db_path: Some(PathBuf::from("/tmp/numbers.sqlite3")),
            seed: Some(SeedFile {
                values: Some(vec!["555-0100".to_string(), "(555) 0101".to_string()]),
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.db_path, Some(PathBuf::from("/tmp/numbers.sqlite3")));
        assert_eq!(merged.seed_values, vec!["555-0100", "(555) 0101"]);
    }

    #[test]
    fn merge_config_defaults_seed_values() {
        let parsed = ConfigFile {
            db_path: None,
            seed: None,
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.seed_values.len(), DEFAULT_SEED_VALUES.len());
    }

    #[test]
    fn merge_config_rejects_digitless_seed_value() {
        let parsed = ConfigFile {
            db_path: None,
            seed: Some(SeedFile {
                values: Some(vec!["call me".to_string()]),
            }),
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(err.to_string().contains("invalid seed value"));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "db_path = \"numbers.sqlite3\"\n[seed]\nvalues = [\"555-0100\"]\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.db_path, Some(PathBuf::from("numbers.sqlite3")));
        assert_eq!(config.seed_values, vec!["555-0100"]);
    }
}
