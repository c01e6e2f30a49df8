//! Command-line configuration for the binaries
//!
//! Flag-style parsing: `-csp <port>` for the server; `-ccp <port>`,
//! `-cca <host>`, and `-bot` for the client. Flags are case-insensitive.
//! Malformed or missing values fall back to the defaults rather than
//! aborting startup.

use tracing::warn;

/// Port the server binds and the client connects to by default.
pub const DEFAULT_PORT: u16 = 14001;

/// Host the client connects to by default.
pub const DEFAULT_HOST: &str = "localhost";

/// Server binary configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to bind the listening endpoint on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    /// Parse server flags from program arguments (without the binary name).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut config = Self::default();
        let args: Vec<String> = args.into_iter().collect();
        for (i, arg) in args.iter().enumerate() {
            if arg.eq_ignore_ascii_case("-csp") {
                match args.get(i + 1).map(|v| v.parse()) {
                    Some(Ok(port)) => config.port = port,
                    _ => warn!("invalid -csp argument, using default port {}", DEFAULT_PORT),
                }
            }
        }
        config
    }
}

/// Client binary configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host to connect to.
    pub host: String,
    /// Port to connect to.
    pub port: u16,
    /// Run as the automated bot instead of an interactive client.
    pub bot: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bot: false,
        }
    }
}

impl ClientConfig {
    /// Parse client flags from program arguments (without the binary name).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut config = Self::default();
        let args: Vec<String> = args.into_iter().collect();
        for (i, arg) in args.iter().enumerate() {
            if arg.eq_ignore_ascii_case("-ccp") {
                match args.get(i + 1).map(|v| v.parse()) {
                    Some(Ok(port)) => config.port = port,
                    _ => warn!("invalid -ccp argument, using default port {}", DEFAULT_PORT),
                }
            } else if arg.eq_ignore_ascii_case("-cca") {
                match args.get(i + 1) {
                    Some(host) => config.host = host.clone(),
                    None => warn!("missing -cca argument, using default host {}", DEFAULT_HOST),
                }
            } else if arg.eq_ignore_ascii_case("-bot") || arg.eq_ignore_ascii_case("--bot") {
                config.bot = true;
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_server_defaults() {
        assert_eq!(ServerConfig::from_args(args(&[])).port, DEFAULT_PORT);
    }

    #[test]
    fn test_server_port_flag() {
        let config = ServerConfig::from_args(args(&["-csp", "9000"]));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_server_flag_is_case_insensitive() {
        let config = ServerConfig::from_args(args(&["-CSP", "9001"]));
        assert_eq!(config.port, 9001);
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = ServerConfig::from_args(args(&["-csp", "harbor"]));
        assert_eq!(config.port, DEFAULT_PORT);
        let config = ServerConfig::from_args(args(&["-csp"]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_client_flags() {
        let config = ClientConfig::from_args(args(&["-cca", "example.net", "-ccp", "4040", "-bot"]));
        assert_eq!(config.host, "example.net");
        assert_eq!(config.port, 4040);
        assert!(config.bot);
    }

    #[test]
    fn test_client_defaults() {
        let config = ClientConfig::from_args(args(&[]));
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.bot);
    }
}
