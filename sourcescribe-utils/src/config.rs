use sourcescribe_types::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// A loaded configuration file's contents, normalized to JSON regardless of
/// the file's on-disk format.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    values: HashMap<String, serde_json::Value>,
}

impl ConfigSource {
    /// Load a single config file, auto-detecting format from its extension
    /// (`.toml`, `.json`, `.yml`/`.yaml`). The file's top-level table is
    /// flattened one level into `key -> value` with everything below that
    /// kept as nested JSON.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ManifestUnreadable {
            family: path.display().to_string(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let json: serde_json::Value = match ext.as_str() {
            "toml" => {
                let value: toml::Value = toml::from_str(&raw).map_err(|e| ConfigError::ManifestMalformed {
                    family: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                serde_json::to_value(value).map_err(|e| ConfigError::ManifestMalformed {
                    family: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
            "yml" | "yaml" => serde_yaml::from_str(&raw).map_err(|e| ConfigError::ManifestMalformed {
                family: path.display().to_string(),
                reason: e.to_string(),
            })?,
            _ => serde_json::from_str(&raw).map_err(|e| ConfigError::ManifestMalformed {
                family: path.display().to_string(),
                reason: e.to_string(),
            })?,
        };

        let values = match json {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            other => HashMap::from([("root".to_string(), other)]),
        };

        Ok(Self { values })
    }

    /// Dot-notation nested lookup, e.g. `get("providers.ollama.base_url")`.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.values.get(first)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)?.as_str().map(str::to_string)
    }
}

/// Reads recognized configuration variables from the process environment,
/// falling back to an optional on-disk `ConfigSource`. Missing required
/// variables are collected and reported together rather than one at a time,
/// so a user fixes every problem in a single pass.
pub struct EnvConfigLoader {
    file: Option<ConfigSource>,
}

impl EnvConfigLoader {
    pub fn new(file: Option<ConfigSource>) -> Self {
        Self { file }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().or_else(|| self.file.as_ref()?.get_string(key))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
            None => default,
        }
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key)?.parse().ok()
    }

    /// Validate that every name in `required` is present. Reports all
    /// missing names at once.
    pub fn require_all(&self, required: &[&str]) -> Result<(), ConfigError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| self.get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingVariables(missing))
        }
    }
}
