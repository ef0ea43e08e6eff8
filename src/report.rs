// src/report.rs

use serde::Serialize;

use crate::cli::Plan;
use crate::config::AppConfig;
use crate::error::LookupError;
use crate::external;
use crate::gateway;
use crate::interfaces::{self, InterfaceFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressEntry {
    pub addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl AddressEntry {
    pub fn bare(addr: impl ToString) -> Self {
        AddressEntry { addr: addr.to_string(), interface: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Local,
    Gateway,
    External,
}

impl SectionKind {
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Local => "Local IPs",
            SectionKind::Gateway => "Gateway IP",
            SectionKind::External => "External IP",
        }
    }
}

#[derive(Debug)]
pub struct Section {
    pub kind: SectionKind,
    pub outcome: Result<Vec<AddressEntry>, LookupError>,
}

impl Section {
    fn single<T: ToString>(kind: SectionKind, result: Result<T, LookupError>) -> Self {
        Section { kind, outcome: result.map(|addr| vec![AddressEntry::bare(addr)]) }
    }
}

/// Flattened view of the sections, one optional field per value or error.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct JsonOutput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub local: Vec<AddressEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_error: Option<String>,
}

impl JsonOutput {
    pub fn from_sections(sections: &[Section]) -> Self {
        let mut out = JsonOutput::default();
        for section in sections {
            let first = |entries: &[AddressEntry]| entries.first().map(|e| e.addr.clone());
            match (section.kind, &section.outcome) {
                (SectionKind::Local, Ok(entries)) => out.local = entries.clone(),
                (SectionKind::Local, Err(e)) => out.local_error = Some(e.to_string()),
                (SectionKind::Gateway, Ok(entries)) => out.gateway = first(entries),
                (SectionKind::Gateway, Err(e)) => out.gateway_error = Some(e.to_string()),
                (SectionKind::External, Ok(entries)) => out.external = first(entries),
                (SectionKind::External, Err(e)) => out.external_error = Some(e.to_string()),
            }
        }
        out
    }
}

/// Runs the selected lookups one after another, in display order.
pub async fn collect(plan: &Plan, config: &AppConfig) -> Vec<Section> {
    let mut sections = Vec::new();

    if plan.local {
        let filter = InterfaceFilter {
            include_bridge: plan.include_bridge,
            bridge_prefix: &config.local.bridge_prefix,
        };
        let outcome = interfaces::local_addresses(&filter);
        log_outcome(SectionKind::Local, &outcome);
        sections.push(Section { kind: SectionKind::Local, outcome });
    }

    if plan.gateway {
        let section = Section::single(SectionKind::Gateway, gateway::resolve_gateway(&config.gateway).await);
        log_outcome(section.kind, &section.outcome);
        sections.push(section);
    }

    if plan.external {
        let section = Section::single(SectionKind::External, external::external_ip(&config.external).await);
        log_outcome(section.kind, &section.outcome);
        sections.push(section);
    }

    sections
}

fn log_outcome(kind: SectionKind, outcome: &Result<Vec<AddressEntry>, LookupError>) {
    match outcome {
        Ok(entries) => tracing::debug!(section = kind.label(), count = entries.len(), "lookup finished"),
        Err(error) => tracing::debug!(section = kind.label(), %error, "lookup failed"),
    }
}
