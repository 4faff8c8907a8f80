//! Configuration file support.
//!
//! ```toml
//! dialect = "postgresql"
//! membership = "native_array"
//! database_url = "postgres://localhost/app"
//! schema_file = "entities.toml"
//!
//! [[entities]]
//! name = "SomeEntity"
//! table = "some_entity"
//! members = [{ name = "aBool", column = "a_bool", converter = "bool_as_string" }]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::convert::ConverterRegistry;
use crate::error::{PredError, PredResult};
use crate::schema::{EntityDef, Schema, SchemaFile};
use crate::transpiler::{Dialect, MembershipStrategy};

/// File looked up in the working directory.
pub const LOCAL_CONFIG: &str = "predsql.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dialect: Dialect,
    pub membership: MembershipStrategy,
    pub database_url: Option<String>,
    /// External schema file; relative paths resolve against the config file.
    pub schema_file: Option<PathBuf>,
    pub entities: Vec<EntityDef>,
}

impl Config {
    pub fn from_toml(content: &str) -> PredResult<Self> {
        toml::from_str(content).map_err(|e| PredError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> PredResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PredError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml(&content)?;
        if let Some(schema_file) = &config.schema_file
            && schema_file.is_relative()
            && let Some(dir) = path.parent()
        {
            config.schema_file = Some(dir.join(schema_file));
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `explicit` if given, else the first of [`Config::default_locations`]
    /// that exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> PredResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// `./predsql.toml`, then `<config dir>/predsql/config.toml`.
    pub fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("predsql").join("config.toml"));
        }
        paths
    }

    /// Inline entities plus those of the schema file.
    pub fn schema(&self, converters: &ConverterRegistry) -> PredResult<Schema> {
        let mut defs = self.entities.clone();
        if let Some(path) = &self.schema_file {
            defs.extend(SchemaFile::load(path)?.entities);
        }
        Schema::build(defs, converters)
    }
}
