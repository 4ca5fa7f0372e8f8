use burrow_core::KeyPolicy;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "BURROW_GATEWAY_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "BURROW_GATEWAY_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "BURROW_GATEWAY_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "BURROW_GATEWAY_MYSQL_DSN";
pub const KEY_POLICY_ENV: &str = "BURROW_GATEWAY_KEY_POLICY";
pub const CREATE_SCHEMA_ENV: &str = "BURROW_GATEWAY_CREATE_SCHEMA";
pub const CONNECT_ATTEMPTS_ENV: &str = "BURROW_GATEWAY_CONNECT_ATTEMPTS";
pub const QUERY_TIMEOUT_MS_ENV: &str = "BURROW_GATEWAY_QUERY_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "BURROW_GATEWAY_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 6;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyPolicyArg {
    #[value(name = "identifier")]
    Identifier,
    #[value(name = "short-code")]
    ShortCode,
}

impl From<KeyPolicyArg> for KeyPolicy {
    fn from(value: KeyPolicyArg) -> Self {
        match value {
            KeyPolicyArg::Identifier => KeyPolicy::Identifier,
            KeyPolicyArg::ShortCode => KeyPolicy::ShortCode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "burrow-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix for returned short URLs; the bare code is returned when unset.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = KEY_POLICY_ENV,
        value_enum,
        default_value_t = KeyPolicyArg::Identifier
    )]
    pub key_policy: KeyPolicyArg,

    /// Create the `urls` table on start-up if it is missing.
    #[arg(long, env = CREATE_SCHEMA_ENV)]
    pub create_schema: bool,

    #[arg(long, env = CONNECT_ATTEMPTS_ENV, default_value_t = DEFAULT_CONNECT_ATTEMPTS)]
    pub connect_attempts: u32,

    /// Deadline for each storage query, in milliseconds.
    #[arg(long, env = QUERY_TIMEOUT_MS_ENV, default_value_t = DEFAULT_QUERY_TIMEOUT_MS)]
    pub query_timeout_ms: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}
