use clap::{Parser, builder::BoolishValueParser};
use imob_core::backend::BackendConfig;
use imob_mcp::runtime::RuntimeConfig;
use imob_mcp::server::McpHttpServerConfig;
use std::error::Error;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

#[derive(Parser, Debug)]
#[command(name = "imob-mcpd", version, about = "Imob MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "MCP_HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(long, env = "BACKEND_API_URL")]
    backend_api_url: Option<String>,

    #[arg(long, env = "BACKEND_INTERNAL_KEY", hide_env_values = true)]
    backend_internal_key: Option<String>,

    #[arg(
        long,
        env = "BACKEND_TIMEOUT_SECS",
        default_value_t = DEFAULT_BACKEND_TIMEOUT_SECS
    )]
    backend_timeout_secs: u64,

    #[arg(
        long,
        env = "MCP_STATEFUL",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    stateful: bool,

    #[arg(
        long,
        env = "MCP_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    sse_keep_alive_secs: u64,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct ImobConfig {
    pub addr: SocketAddr,
    pub backend: BackendConfig,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ImobConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    pub fn server_config(&self) -> McpHttpServerConfig {
        let runtime = RuntimeConfig::new(self.backend.clone())
            .with_stateful_mode(self.stateful_mode)
            .with_sse_keep_alive(self.sse_keep_alive);
        McpHttpServerConfig::new(self.addr, runtime)
    }
}

impl TryFrom<CliArgs> for ImobConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let host: IpAddr = args
            .host
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidSetting {
                name: "MCP_HOST",
                value: args.host.clone(),
            })?;

        if args.backend_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "BACKEND_TIMEOUT_SECS",
                value: args.backend_timeout_secs.to_string(),
            });
        }

        let backend = BackendConfig::new(args.backend_api_url, args.backend_internal_key)
            .with_timeout(Duration::from_secs(args.backend_timeout_secs));

        let sse_keep_alive = if args.sse_keep_alive_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(args.sse_keep_alive_secs))
        };

        Ok(Self {
            addr: SocketAddr::new(host, args.port),
            backend,
            stateful_mode: args.stateful,
            sse_keep_alive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend_api_url: None,
            backend_internal_key: None,
            backend_timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
            stateful: false,
            sse_keep_alive_secs: DEFAULT_SSE_KEEP_ALIVE_SECS,
        }
    }

    #[test]
    fn defaults_listen_on_all_interfaces_port_8000() {
        let config = ImobConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.addr, "0.0.0.0:8000".parse().expect("valid addr"));
        assert!(!config.backend.is_configured());
        assert_eq!(config.backend.timeout, Duration::from_secs(15));
        assert!(!config.stateful_mode);
    }

    #[test]
    fn backend_url_is_normalized() {
        let mut args = base_args();
        args.backend_api_url = Some(" http://backend:3000/ ".to_string());
        args.backend_internal_key = Some("key".to_string());

        let config = ImobConfig::try_from(args).expect("config should parse");

        assert_eq!(config.backend.base_url.as_deref(), Some("http://backend:3000"));
        assert!(config.backend.is_configured());
    }

    #[test]
    fn blank_key_selects_degraded_mode() {
        let mut args = base_args();
        args.backend_api_url = Some("http://backend:3000".to_string());
        args.backend_internal_key = Some("   ".to_string());

        let config = ImobConfig::try_from(args).expect("config should parse");

        assert!(!config.backend.is_configured());
    }

    #[test]
    fn rejects_invalid_host_and_zero_timeout() {
        let mut args = base_args();
        args.host = "not-an-ip".to_string();
        assert!(ImobConfig::try_from(args).is_err());

        let mut args = base_args();
        args.backend_timeout_secs = 0;
        assert!(ImobConfig::try_from(args).is_err());
    }

    #[test]
    fn zero_keep_alive_disables_it() {
        let mut args = base_args();
        args.sse_keep_alive_secs = 0;

        let config = ImobConfig::try_from(args).expect("config should parse");

        assert!(config.sse_keep_alive.is_none());
        assert!(config.server_config().runtime.sse_keep_alive.is_none());
    }
}
