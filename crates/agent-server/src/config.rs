//! Server configuration

use agent_utils::env_string;
use std::path::PathBuf;

/// Settings of the HTTP front end
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:5000`
    pub listen_addr: String,
    /// Directory holding charts and reports, served under `/files`
    pub output_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::DEFAULT_LISTEN_ADDR.to_string(),
            output_dir: PathBuf::from(Self::DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ServerConfig {
    const DEFAULT_LISTEN_ADDR: &'static str = "127.0.0.1:5000";
    const DEFAULT_OUTPUT_DIR: &'static str = "./output";

    /// Read `SERVER_LISTEN_ADDR` and `OUTPUT_DIR`, keeping defaults for unset ones
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: env_string("SERVER_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            output_dir: env_string("OUTPUT_DIR").map_or(defaults.output_dir, PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:5000");
        assert_eq!(config.output_dir, PathBuf::from("./output"));
    }
}
