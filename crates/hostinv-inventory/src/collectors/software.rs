//! Critical software version detection
//!
//! A fixed checklist of commonly exploited tools. Each entry pairs a version
//! command with a pattern whose first capture group is the version. Tools that
//! are not installed are silently left out.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use hostinv_exec::Probe;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::types::{CriticalSoftware, SchemaVersion, SoftwareVersion, UNKNOWN_VERSION};

/// One checklist entry
#[derive(Debug, Clone, Copy)]
pub struct SoftwareCheck {
    /// Identifier recorded in the document
    pub name: &'static str,
    /// Command printing the version banner
    pub command: &'static str,
    /// Pattern with the version in capture group 1
    pub pattern: &'static str,
}

const fn check(name: &'static str, command: &'static str, pattern: &'static str) -> SoftwareCheck {
    SoftwareCheck {
        name,
        command,
        pattern,
    }
}

/// Tools tracked on every host, probed in this order
pub static CHECKLIST: [SoftwareCheck; 15] = [
    // web servers
    check("apache2", "apache2 -v", r"Apache/(\d+\.\d+\.\d+)"),
    check("httpd", "httpd -v", r"Apache/(\d+\.\d+\.\d+)"),
    check("nginx", "nginx -v", r"nginx/(\d+\.\d+\.\d+)"),
    // databases
    check("mysql", "mysql --version", r"Ver (\d+\.\d+\.\d+)"),
    check("mysqld", "mysqld --version", r"Ver (\d+\.\d+\.\d+)"),
    check("postgresql", "psql --version", r"PostgreSQL[)\s]+(\d+\.\d+(?:\.\d+)?)"),
    check("postgres", "postgres --version", r"PostgreSQL[)\s]+(\d+\.\d+(?:\.\d+)?)"),
    // runtimes
    check("docker", "docker --version", r"Docker version (\d+\.\d+\.\d+)"),
    check("php", "php --version", r"PHP (\d+\.\d+\.\d+)"),
    check("node", "node --version", r"v(\d+\.\d+\.\d+)"),
    check("java", "java -version", r#"version "(\d+\.\d+\.\d+)"#),
    check("python3", "python3 --version", r"Python (\d+\.\d+\.\d+)"),
    // core tools
    check("openssh", "ssh -V", r"OpenSSH_(\d+\.\d+p?\d*)"),
    check("openssl", "openssl version", r"OpenSSL (\d+\.\d+\.\d+[a-z]?)"),
    check("git", "git --version", r"git version (\d+\.\d+\.\d+)"),
];

/// Checklist patterns, compiled on first use
static COMPILED: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    CHECKLIST
        .iter()
        .filter_map(|entry| match Regex::new(entry.pattern) {
            Ok(regex) => Some((entry.pattern, regex)),
            Err(e) => {
                warn!(tool = entry.name, error = %e, "invalid version pattern");
                None
            }
        })
        .collect()
});

impl SoftwareCheck {
    /// Compiled version pattern, shared by every run in the process
    pub fn regex(&self) -> Option<&'static Regex> {
        COMPILED.get(self.pattern)
    }
}

/// Run the checklist and shape the result for `schema`
#[instrument(skip(probe))]
pub async fn collect_critical_software(probe: &Probe, schema: SchemaVersion) -> CriticalSoftware {
    let mut banners = Vec::new();

    for entry in &CHECKLIST {
        match probe.banner(entry.command).await {
            Some(banner) => {
                let first_line = first_line(&banner).to_string();
                debug!(tool = entry.name, banner = %first_line, "detected");
                banners.push((entry, first_line));
            }
            None => debug!(tool = entry.name, "not installed"),
        }
    }

    match schema {
        SchemaVersion::V1 => CriticalSoftware::V1(
            banners
                .into_iter()
                .map(|(entry, line)| (entry.name.to_string(), line))
                .collect::<BTreeMap<_, _>>(),
        ),
        SchemaVersion::V2 => CriticalSoftware::V2(
            banners
                .into_iter()
                .map(|(entry, line)| version_record(entry, line))
                .collect(),
        ),
    }
}

/// Build a version record from a banner line
pub fn version_record(entry: &SoftwareCheck, raw_output: String) -> SoftwareVersion {
    let version = entry
        .regex()
        .and_then(|regex| extract_version(regex, &raw_output))
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

    SoftwareVersion {
        name: entry.name.to_string(),
        version,
        raw_output,
    }
}

/// First capture group of `regex` in `text`
pub fn extract_version(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}
