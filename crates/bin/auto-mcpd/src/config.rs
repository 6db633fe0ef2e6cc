use clap::Parser;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

const DEFAULT_TRANSPORT: &str = "stdio";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "auto-mcpd", version, about = "Admin Auto MCP daemon.")]
struct CliArgs {
    /// Base URL of the Admin Auto instance, e.g. `https://auto.example.org`.
    #[arg(long, env = "AUTO_URL")]
    url: Option<String>,

    /// HTTP Basic Auth username.
    #[arg(long, env = "AUTO_USERNAME")]
    username: Option<String>,

    /// HTTP Basic Auth password.
    #[arg(long, env = "AUTO_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// `stdio` or `http`.
    #[arg(long, env = "TRANSPORT", default_value = DEFAULT_TRANSPORT)]
    transport: String,

    #[arg(long, env = "AUTO_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    http_addr: SocketAddr,

    /// Overrides the port of `--http-addr`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    #[arg(
        long,
        env = "AUTO_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    /// tracing filter directive, e.g. `info,auto_core=debug`.
    #[arg(long, env = "AUTO_LOG", default_value = DEFAULT_LOG_FILTER)]
    log: String,
}

/// MCP transport the daemon serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(ConfigError::InvalidSetting {
                name: "TRANSPORT",
                value: value.to_string(),
            }),
        }
    }
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct AutoConfig {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub transport: Transport,
    pub http_addr: SocketAddr,
    pub request_timeout: Duration,
    pub log_filter: String,
}

impl fmt::Debug for AutoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("transport", &self.transport)
            .field("http_addr", &self.http_addr)
            .field("request_timeout", &self.request_timeout)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl AutoConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Instance URL without a trailing slash, as the REST client expects it.
    pub fn instance_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingSetting(name))
}

fn parse_instance_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidSetting {
        name: "AUTO_URL",
        value: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

impl TryFrom<CliArgs> for AutoConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let url = parse_instance_url(&required(args.url, "AUTO_URL")?)?;
        let username = required(args.username, "AUTO_USERNAME")?;
        let password = required(args.password, "AUTO_PASSWORD")?;
        let transport = args.transport.parse()?;

        if args.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "AUTO_REQUEST_TIMEOUT_SECS",
                value: args.request_timeout_secs.to_string(),
            });
        }

        let mut http_addr = args.http_addr;
        if let Some(port) = args.port {
            http_addr.set_port(port);
        }

        let log_filter = if args.log.trim().is_empty() {
            DEFAULT_LOG_FILTER.to_string()
        } else {
            args.log
        };

        Ok(Self {
            url,
            username,
            password,
            transport,
            http_addr,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            url: Some("https://auto.example.org/".to_string()),
            username: Some("admin".to_string()),
            password: Some("secret".to_string()),
            transport: DEFAULT_TRANSPORT.to_string(),
            http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            port: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    #[test]
    fn defaults_to_stdio_with_thirty_second_timeout() {
        let config = AutoConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.instance_url(), "https://auto.example.org");
        assert_eq!(config.http_addr.to_string(), DEFAULT_MCP_HTTP_ADDR);
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let mut args = base_args();
        args.password = Some("   ".to_string());
        assert!(matches!(
            AutoConfig::try_from(args),
            Err(ConfigError::MissingSetting("AUTO_PASSWORD"))
        ));

        let mut args = base_args();
        args.url = None;
        assert!(matches!(
            AutoConfig::try_from(args),
            Err(ConfigError::MissingSetting("AUTO_URL"))
        ));
    }

    #[test]
    fn rejects_non_http_urls_and_unknown_transports() {
        let mut args = base_args();
        args.url = Some("ftp://auto.example.org".to_string());
        assert!(matches!(
            AutoConfig::try_from(args),
            Err(ConfigError::InvalidSetting { name: "AUTO_URL", .. })
        ));

        let mut args = base_args();
        args.transport = "sse".to_string();
        assert!(matches!(
            AutoConfig::try_from(args),
            Err(ConfigError::InvalidSetting { name: "TRANSPORT", .. })
        ));
    }

    #[test]
    fn port_overrides_http_addr() {
        let mut args = base_args();
        args.transport = "HTTP".to_string();
        args.port = Some(8080);
        let config = AutoConfig::try_from(args).expect("config should parse");

        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut args = base_args();
        args.request_timeout_secs = 0;
        assert!(AutoConfig::try_from(args).is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let config = AutoConfig::try_from(base_args()).expect("config should parse");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
    }
}
