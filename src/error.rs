// src/error.rs
use thiserror::Error;

/// Failure of a single lookup. Scoped to its own section; never aborts the run.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("listing interfaces: {0}")]
    Interfaces(#[source] std::io::Error),
    #[error("reading routing table {path}: {source}")]
    RouteTable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing routing table: {0}")]
    RouteDecode(String),
    #[error("{program} not found on PATH")]
    MissingCommand { program: String },
    #[error("running {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailure {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("no default gateway found")]
    NoDefaultGateway,
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),
    #[error("reading response: {0}")]
    ReadBody(#[source] reqwest::Error),
    #[error("invalid IP returned: {0:?}")]
    InvalidResponse(String),
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}
