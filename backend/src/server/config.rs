//! Server configuration surface.
//!
//! Thin by design: flags with environment fallbacks, nothing dynamic.

use std::net::SocketAddr;

use clap::Parser;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Storefront REST API server")]
pub struct AppConfig {
    /// Socket address to bind.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Expose construction-site debug blocks on error envelopes.
    #[arg(long, env = "APP_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::parse_from(["backend"])
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces_without_debug() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.debug);
    }

    #[test]
    fn flags_override_defaults() {
        let config = AppConfig::parse_from(["backend", "--bind-addr", "127.0.0.1:9000", "--debug"]);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert!(config.debug);
    }
}
