//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (dotenvy) + config file (TOML)
//!     → loader.rs (parse, env overrides, ${VAR} expansion)
//!     → validation.rs (semantic checks)
//!     → SweeperConfig (validated, immutable)
//!     → NetworkProfile table shared read-only by every sweep
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Without `[[networks]]` the built-in testnet table applies

pub mod loader;
pub mod networks;
pub mod schema;
pub mod validation;

pub use loader::{load_config, prepare_config, read_config, ConfigError};
pub use schema::{
    BatchConfig, LogFormat, NetworkProfile, ObservabilityConfig, RpcConfig, SweepConfig,
    SweeperConfig, WalletsConfig,
};
