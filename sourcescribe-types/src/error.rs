/// Fatal-at-startup configuration problems: missing or invalid environment
/// variables, an unreadable manifest, a provider family with no matching
/// credentials.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration variable(s): {0:?}")]
    MissingVariables(Vec<String>),

    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("manifest for provider family '{family}' could not be loaded: {source}")]
    ManifestUnreadable {
        family: String,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest for provider family '{family}' is malformed: {reason}")]
    ManifestMalformed { family: String, reason: String },
}
