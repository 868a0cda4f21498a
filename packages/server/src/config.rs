//! Command line and environment configuration.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use huddle_shared::logger::LogFormat;

/// Broadcast channel implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrokerKind {
    /// In-process channel; single gateway process only
    Memory,
    /// Redis PUBLISH / PSUBSCRIBE; any number of gateway processes
    Redis,
}

/// Huddle project messaging gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "huddle-server", version, about = "Huddle project messaging gateway")]
pub struct Config {
    /// Bind address
    #[arg(long, env = "HUDDLE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "HUDDLE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Shared HS256 secret used to verify access tokens
    #[arg(
        long,
        env = "HUDDLE_JWT_SECRET",
        hide_env_values = true,
        value_parser = parse_secret
    )]
    pub jwt_secret: String,

    /// Broadcast channel implementation
    #[arg(long, env = "HUDDLE_BROKER", value_enum, default_value_t = BrokerKind::Memory)]
    pub broker: BrokerKind,

    /// Redis URL, used with `--broker redis`
    #[arg(long, env = "HUDDLE_REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Namespace prefixed to every project topic
    #[arg(long, env = "HUDDLE_CHANNEL_NAMESPACE", default_value = "project-chat")]
    pub channel_namespace: String,

    /// Seconds between liveness pings
    #[arg(
        long,
        env = "HUDDLE_HEARTBEAT_INTERVAL_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub heartbeat_interval_secs: u64,

    /// JSON file with the staff and client users allowed to connect
    #[arg(long, env = "HUDDLE_DIRECTORY_FILE")]
    pub directory_file: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "HUDDLE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable structured JSON logging
    #[arg(long, env = "HUDDLE_JSON_LOGS")]
    pub json_logs: bool,
}

fn parse_secret(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("secret must not be empty".to_string());
    }
    Ok(value.to_string())
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn log_format(&self) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // テスト項目: 秘密鍵以外はデフォルト値で起動できる
        // when (操作):
        let config = Config::try_parse_from(["huddle-server", "--jwt-secret", "s3cret"]).unwrap();

        // then (期待する結果):
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.broker, BrokerKind::Memory);
        assert_eq!(config.channel_namespace, "project-chat");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(30));
        assert_eq!(config.log_format(), LogFormat::Pretty);
        assert!(config.directory_file.is_none());
    }

    #[test]
    fn test_redis_broker_and_json_logs() {
        // テスト項目: Redis ブローカーと JSON ログを指定できる
        // when (操作):
        let config = Config::try_parse_from([
            "huddle-server",
            "--jwt-secret",
            "s3cret",
            "--broker",
            "redis",
            "--redis-url",
            "redis://cache:6379",
            "--json-logs",
        ])
        .unwrap();

        // then (期待する結果):
        assert_eq!(config.broker, BrokerKind::Redis);
        assert_eq!(config.redis_url, "redis://cache:6379");
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        // テスト項目: 空の秘密鍵は拒否される
        // when (操作):
        let result = Config::try_parse_from(["huddle-server", "--jwt-secret", ""]);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_heartbeat_is_rejected() {
        // テスト項目: 0秒の生存確認間隔は拒否される
        // when (操作):
        let result = Config::try_parse_from([
            "huddle-server",
            "--jwt-secret",
            "s3cret",
            "--heartbeat-interval-secs",
            "0",
        ]);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
