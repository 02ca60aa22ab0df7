//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

use crate::access::AccessMode;
use crate::repo::SourceField;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Deserialization(#[from] serde_yaml::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialization(#[source] serde_yaml::Error),

    #[error("repo '{repo}' specifies both {first} and {second} parameters, please use only one of them")]
    ConflictingRepoSource {
        repo: String,
        first: SourceField,
        second: SourceField,
    },

    #[error("please specify url(s) or mirrorlist for repo '{repo}'")]
    MissingRepoSource { repo: String },

    #[error(
        "mirrorlist file {} for repo '{repo}' does not exist or isn't readable for user {user}",
        .path.display()
    )]
    UnreadableMirrorlist {
        repo: String,
        path: PathBuf,
        user: String,
    },

    #[error("{} does not exist or isn't {mode} for user {user}", .path.display())]
    PathNotAccessible {
        path: PathBuf,
        mode: AccessMode,
        user: String,
    },

    #[error("Failed to resolve current user: {0}")]
    IdentityLookup(String),

    #[error("'purge_files_after' period is too low ({0}) please specify at least 10 minutes")]
    PurgeIntervalTooShort(i64),

    #[error("'{field}' value is too low ({value}), please set it to a value greater than 0")]
    InvalidTtl { field: &'static str, value: i64 },

    #[error("Invalid cron string '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    #[error("Invalid socket activation value: {0}")]
    InvalidEnumValue(String),
}
