//! Configuration module
//!
//! Handles CLI configuration. Pipeline settings for in-process runs come
//! from the environment, the same way the server reads them.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Launchpad server
    pub server_url: String,
}
