// src/external.rs
use std::net::IpAddr;

use reqwest::StatusCode;

use crate::config::ExternalConfig;
use crate::error::LookupError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Asks the echo service which address our requests come from.
pub async fn external_ip(config: &ExternalConfig) -> Result<IpAddr, LookupError> {
    let mut builder = reqwest::Client::builder().timeout(config.timeout()).user_agent(USER_AGENT);
    if config.no_proxy {
        builder = builder.no_proxy();
    }
    let client = builder.build().map_err(LookupError::Request)?;

    tracing::debug!(url = %config.url, timeout_ms = config.timeout_ms, "querying echo service");

    let response = client.get(&config.url).send().await.map_err(LookupError::Request)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(LookupError::UnexpectedStatus(status.as_u16()));
    }

    let body = response.text().await.map_err(LookupError::ReadBody)?;
    parse_echo_body(&body)
}

pub fn parse_echo_body(body: &str) -> Result<IpAddr, LookupError> {
    let trimmed = body.trim();
    trimmed
        .parse::<IpAddr>()
        .map_err(|_| LookupError::InvalidResponse(trimmed.to_string()))
}
