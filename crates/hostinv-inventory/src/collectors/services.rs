//! Running systemd services

use hostinv_exec::Probe;
use tracing::{debug, instrument};

use crate::types::Service;

const LIST_RUNNING: &str =
    "systemctl list-units --type=service --state=running --no-pager --no-legend";

/// Collect running services; empty when systemd is absent
#[instrument(skip(probe))]
pub async fn collect_services(probe: &Probe) -> Vec<Service> {
    debug!("collecting running services");

    probe
        .stdout(LIST_RUNNING)
        .await
        .map(|output| parse_units(&output))
        .unwrap_or_default()
}

/// Parse `systemctl list-units --no-legend` output
pub fn parse_units(output: &str) -> Vec<Service> {
    output
        .lines()
        .filter_map(|line| {
            // Failed units are prefixed with a status marker
            let mut columns = line
                .split_whitespace()
                .skip_while(|token| *token == "●" || *token == "*");
            let unit = columns.next()?;
            // UNIT LOAD ACTIVE SUB DESCRIPTION
            let sub = columns.nth(2).unwrap_or("running");
            Some(Service {
                name: unit.trim_end_matches(".service").to_string(),
                status: sub.to_string(),
            })
        })
        .collect()
}
