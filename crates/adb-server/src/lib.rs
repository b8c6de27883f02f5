//! HTTP server for ADB.
//!
//! Serves one shared [`Db`](adb_sdk::Db) over HTTP:
//!
//! - `GET /v1/health`
//! - `GET /v1/info` -- version, record counts and loaded contracts
//! - `POST /v1/query` -- `{query, variables}` in, `{data, errors}` out
//!
//! Configuration is read from `adb.toml` (see [`AdbConfig`]).

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{AdbConfig, LogConfig, NetworkConfig, ServerConfig, CONFIG_FILE_NAME};
pub use error::{ServerError, ServerResult};
pub use server::AdbServer;
