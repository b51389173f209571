//! CPU, memory, disks, and network addresses

use hostinv_exec::Probe;
use tracing::{debug, instrument};

use crate::types::{Disk, HardwareInfo, NetworkInterface};

/// Collect hardware facts
///
/// Each field comes from its own command; a missing tool only empties that
/// field.
#[instrument(skip(probe))]
pub async fn collect_hardware(probe: &Probe) -> HardwareInfo {
    debug!("collecting hardware info");

    let mut hardware = HardwareInfo::default();

    if let Some(output) = probe.stdout("lscpu").await {
        let (model, cores) = parse_lscpu(&output);
        hardware.cpu_model = model;
        hardware.cpu_cores = cores;
    }

    if let Some(output) = probe.stdout("free -m").await {
        hardware.ram_mb = parse_free(&output);
    }

    if let Some(output) = probe.stdout("lsblk -b -d -o NAME,SIZE,TYPE,MODEL -n").await {
        hardware.disks = parse_lsblk(&output);
    }

    if let Some(output) = probe.stdout("ip -o addr show").await {
        hardware.network_interfaces = parse_ip_addr(&output);
    }

    hardware
}

/// Extract CPU model and logical CPU count from `lscpu`
pub fn parse_lscpu(output: &str) -> (Option<String>, Option<u32>) {
    let mut model = None;
    let mut cores = None;

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "Model name" if model.is_none() && !value.is_empty() => {
                model = Some(value.to_string());
            }
            "CPU(s)" if cores.is_none() => cores = value.parse().ok(),
            _ => {}
        }
    }

    (model, cores)
}

/// Extract total memory in MB from `free -m`
pub fn parse_free(output: &str) -> Option<u64> {
    output
        .lines()
        .find(|line| line.starts_with("Mem:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|total| total.parse().ok())
}

/// Extract whole disks from `lsblk -b -d -o NAME,SIZE,TYPE,MODEL -n`
pub fn parse_lsblk(output: &str) -> Vec<Disk> {
    let mut disks = Vec::new();

    for line in output.lines() {
        // Example: sda 512110190592 disk Samsung SSD 860
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 || parts[2] != "disk" {
            continue;
        }

        let Ok(size_bytes) = parts[1].parse() else {
            continue;
        };

        let model = if parts.len() > 3 {
            parts[3..].join(" ")
        } else {
            "Unknown".to_string()
        };

        disks.push(Disk {
            device: format!("/dev/{}", parts[0]),
            size_bytes,
            model,
        });
    }

    disks
}

/// Extract interface addresses from `ip -o addr show`, skipping loopback
pub fn parse_ip_addr(output: &str) -> Vec<NetworkInterface> {
    let mut interfaces = Vec::new();

    for line in output.lines() {
        // Example: 2: eth0    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let name = parts[1];
        if name == "lo" {
            continue;
        }

        let ip = parts[3].split('/').next().unwrap_or(parts[3]);
        interfaces.push(NetworkInterface {
            name: name.to_string(),
            ip: ip.to_string(),
        });
    }

    interfaces
}
