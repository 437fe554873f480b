//! Settings loader
//!
//! Variables are collected from env files and the process environment into a
//! single map, then bound onto [`Settings`] through the `config` crate. Keys
//! are case-insensitive and groups are nested with `__`, so `DB__POOL_SIZE`
//! binds to `settings.db.pool_size`.

use std::path::{Path, PathBuf};

use validator::Validate;

use super::Settings;
use crate::errors::SettingsError;

/// Delimiter joining a group name and a field name in variable keys
pub const ENV_NESTED_DELIMITER: &str = "__";

/// Env file holding checked-in defaults
pub const TEMPLATE_ENV_FILE: &str = ".env.template";

/// Env file holding local overrides
pub const OVERRIDE_ENV_FILE: &str = ".env";

/// Top-level groups of [`Settings`]; variables outside them are ignored
const GROUPS: [&str; 4] = ["run", "api", "db", "log"];

/// Builder that assembles the variable sources and produces [`Settings`]
///
/// Precedence, lowest to highest: env files in the order added, the process
/// environment, explicit variables set with [`SettingsLoader::var`].
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    env_files: Vec<PathBuf>,
    overrides: Vec<(String, String)>,
    process_env: bool,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Create a loader that reads the process environment only
    pub fn new() -> Self {
        Self {
            env_files: Vec::new(),
            overrides: Vec::new(),
            process_env: true,
        }
    }

    /// Add `.env.template` and `.env` from `base_dir`, in that order
    pub fn with_default_env_files(self, base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        self.env_file(base_dir.join(TEMPLATE_ENV_FILE))
            .env_file(base_dir.join(OVERRIDE_ENV_FILE))
    }

    /// Layer an env file; later files win. Missing files are skipped.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_files.push(path.into());
        self
    }

    /// Set one variable with the highest precedence
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Set several variables with the highest precedence
    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Do not read the process environment
    pub fn without_process_env(mut self) -> Self {
        self.process_env = false;
        self
    }

    /// Collect every source, bind it onto [`Settings`] and validate the result
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let vars = self.collect_vars()?;
        tracing::debug!("Binding {} configuration variables", vars.len());

        let settings: Settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator(ENV_NESTED_DELIMITER)
                    .source(Some(vars)),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn collect_vars(&self) -> Result<config::Map<String, String>, SettingsError> {
        let mut vars = config::Map::new();

        for path in &self.env_files {
            if !path.is_file() {
                tracing::debug!("Env file {} not found, skipping", path.display());
                continue;
            }

            let entries = dotenvy::from_path_iter(path).map_err(|source| {
                SettingsError::EnvFile {
                    path: path.clone(),
                    source,
                }
            })?;

            for entry in entries {
                let (key, value) = entry.map_err(|source| SettingsError::EnvFile {
                    path: path.clone(),
                    source,
                })?;
                insert_var(&mut vars, &key, value);
            }
        }

        if self.process_env {
            for (key, value) in std::env::vars() {
                insert_var(&mut vars, &key, value);
            }
        }

        for (key, value) in &self.overrides {
            insert_var(&mut vars, key, value.clone());
        }

        Ok(vars)
    }
}

/// Insert a variable under its lower-cased key if it belongs to a known group
fn insert_var(vars: &mut config::Map<String, String>, key: &str, value: String) {
    let key = key.to_lowercase();
    let in_group = key
        .split_once(ENV_NESTED_DELIMITER)
        .is_some_and(|(group, field)| GROUPS.contains(&group) && !field.is_empty());

    if in_group {
        vars.insert(key, value);
    }
}
