//! Environment override keys and parsing

use std::str::FromStr;

pub const TIMEOUT_MS: &str = "CONNECTOR_HEALTH_TIMEOUT_MS";

pub const MAX_CONCURRENCY: &str = "CONNECTOR_HEALTH_MAX_CONCURRENCY";

pub const BIND_ADDR: &str = "CONNECTOR_HEALTH_BIND_ADDR";

pub const API_TOKEN: &str = "CONNECTOR_HEALTH_API_TOKEN";

pub fn parse_override<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
