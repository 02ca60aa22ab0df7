//! Pacoloco Configuration Core
//!
//! This crate turns the pacoloco YAML configuration into a validated,
//! defaulted [`Config`], covering repository sources, cache directory
//! permissions, the prefetch schedule and socket activation.

pub mod access;
pub mod activation;
pub mod config;
pub mod error;
pub mod prefetch;
pub mod repo;

pub use access::{AccessMode, check_access, current_user};
pub use activation::SocketActivation;
pub use config::{Config, DEFAULT_CACHE_DIR, DEFAULT_DB_NAME, DEFAULT_PORT};
pub use error::ConfigError;
pub use prefetch::{DEFAULT_TTL_UNACCESSED_DAYS, DEFAULT_TTL_UNUPDATED_DAYS, RefreshPeriod};
pub use repo::{Repo, RepoSource, SourceField};
