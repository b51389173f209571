//! Human-readable run summary and failure diagnostics

use std::path::Path;

use hostinv_client::DeliveryError;
use hostinv_core::{AgentConfig, RunReport};

/// Final summary of a successful run
pub fn render_summary(report: &RunReport) -> String {
    let packages = report
        .package_counts
        .iter()
        .map(|(manager, count)| format!("{manager} {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    let packages = if packages.is_empty() {
        "0".to_string()
    } else {
        format!("{} ({packages})", report.total_packages())
    };

    let services = report
        .service_count
        .map_or_else(|| "not collected".to_string(), |count| count.to_string());

    let artifact = match &report.artifact {
        Some(artifact) => format!(
            "{} ({:.1} KB)",
            artifact.path.display(),
            artifact.bytes as f64 / 1024.0
        ),
        None => "unchanged".to_string(),
    };

    let delivery = match &report.delivery {
        Some(outcome) => outcome.to_string(),
        None => "skipped, inventory unchanged".to_string(),
    };

    let lines = [
        "Inventory summary".to_string(),
        format!("  Host:              {}", report.hostname),
        format!("  OS:                {}", report.os),
        format!("  Packages:          {packages}"),
        format!("  Services:          {services}"),
        format!(
            "  Critical software: {} detected, {} with parsed version",
            report.software_detected, report.software_parsed
        ),
        format!("  Change detection:  {}", report.decision),
        format!("  Fingerprint:       {}", report.fingerprint.short()),
        format!("  Artifact:          {artifact}"),
        format!("  Delivery:          {delivery}"),
        format!("  Duration:          {:.1}s", report.elapsed.as_secs_f64()),
    ];
    lines.join("\n")
}

/// What to check after a failed delivery
pub fn render_delivery_failure(config: &AgentConfig, artifact: &Path, error: &DeliveryError) -> String {
    let delivery = &config.delivery;

    let lines = [
        format!("Inventory delivery failed: {error}"),
        format!(
            "The inventory was saved to {} and will be sent again on the next run.",
            artifact.display()
        ),
        "Verify:".to_string(),
        format!("  - the endpoint {} is reachable from this host", delivery.endpoint),
        format!(
            "  - the access token {} is valid",
            mask_token(&delivery.token)
        ),
        format!("  - server id {:?} is registered at the endpoint", delivery.server_id),
        "  - outbound HTTP(S) is allowed by the local firewall or proxy".to_string(),
    ];
    lines.join("\n")
}

/// Token reduced to its first and last four characters
///
/// Tokens too short to keep eight characters hidden are masked entirely.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.trim().chars().collect();
    if chars.len() < 16 {
        return "*".repeat(chars.len().max(4));
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use hostinv_client::DeliveryOutcome;
    use hostinv_core::{ArtifactInfo, ChangeDecision, Fingerprint};
    use hostinv_inventory::PackageManagerType;

    use super::*;

    fn report() -> RunReport {
        RunReport {
            hostname: "web01".to_string(),
            os: "Ubuntu 20.04.6 LTS".to_string(),
            package_counts: BTreeMap::from([
                (PackageManagerType::Dpkg, 1200),
                (PackageManagerType::Pip, 30),
            ]),
            service_count: None,
            software_detected: 5,
            software_parsed: 4,
            decision: ChangeDecision::SendFirstRun,
            fingerprint: Fingerprint::parse(&"ab".repeat(32)).unwrap(),
            artifact: Some(ArtifactInfo {
                path: PathBuf::from("/var/lib/rs-agent/inventory.json"),
                bytes: 2048,
            }),
            delivery: Some(DeliveryOutcome::Sent {
                status: 200,
                payload_bytes: 1900,
            }),
            elapsed: Duration::from_millis(3200),
        }
    }

    #[test]
    fn test_summary() {
        let summary = render_summary(&report());

        assert!(summary.contains("Host:              web01"));
        assert!(summary.contains("1230 (dpkg 1200, pip 30)"));
        assert!(summary.contains("Services:          not collected"));
        assert!(summary.contains("5 detected, 4 with parsed version"));
        assert!(summary.contains("inventory.json (2.0 KB)"));
        assert!(summary.contains("sent 1900 bytes (HTTP 200)"));
        assert!(summary.contains("Fingerprint:       abababababab"));
    }

    #[test]
    fn test_summary_when_skipped() {
        let mut report = report();
        report.decision = ChangeDecision::SkipUnchanged;
        report.artifact = None;
        report.delivery = None;

        let summary = render_summary(&report);

        assert!(summary.contains("Change detection:  unchanged"));
        assert!(summary.contains("Artifact:          unchanged"));
        assert!(summary.contains("skipped, inventory unchanged"));
    }

    #[test]
    fn test_failure_names_what_to_verify() {
        let mut config = AgentConfig::default();
        config.delivery.endpoint = "https://inventory.example.com/api".to_string();
        config.delivery.token = "429bd269e5c88dc73c14c69bf0e87717".to_string();
        config.delivery.server_id = "srv-42".to_string();
        config.validate().unwrap();
        let error = DeliveryError::Transport("connection refused".to_string());

        let text = render_delivery_failure(&config, Path::new("/tmp/inventory.json"), &error);

        assert!(text.contains("connection refused"));
        assert!(text.contains("https://inventory.example.com/api"));
        assert!(text.contains("access token 429b…7717 is valid"));
        assert!(!text.contains("429bd269e5c88dc73c14c69bf0e87717"));
        assert!(text.contains("\"srv-42\""));
        assert!(text.contains("/tmp/inventory.json"));
    }

    #[test]
    fn test_short_tokens_are_fully_masked() {
        assert_eq!(mask_token("abc"), "****");
        assert_eq!(mask_token("0123456789"), "**********");
        assert_eq!(mask_token(" 0123456789abcdef "), "0123…cdef");
    }
}
