//! Human-readable output

use anyhow::Result;

use edge_shared_types::{Interface, NetworkSettings};

use crate::commands::OutputFormat;

pub fn render_settings(settings: &NetworkSettings, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(settings)?),
        OutputFormat::Text => Ok(settings
            .interfaces
            .iter()
            .map(interface_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub fn render_interface(interface: &Interface, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(interface)?),
        OutputFormat::Text => Ok(interface_text(interface)),
    }
}

/// One header line followed by indented detail lines.
pub fn interface_text(interface: &Interface) -> String {
    let mut header = format!("{} ({})", interface.interface_name, interface.mac_address);
    if !interface.label.is_empty() {
        header.push_str(&format!(" label {}", interface.label));
    }
    if interface.gateway_interface {
        header.push_str(" [gateway]");
    }

    let mut lines = vec![header, format!("  dhcp: {}", interface.dhcp)];
    if let Some(conf) = &interface.static_conf {
        let mut line = format!("  ipv4: {}/{}", conf.ipv4, conf.netmask);
        if !conf.gateway.is_empty() {
            line.push_str(&format!(" via {}", conf.gateway));
        }
        lines.push(line);
    }
    if let Some(dns) = &interface.dns {
        let servers: Vec<&str> = [dns.primary.as_str(), dns.secondary.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if !servers.is_empty() {
            lines.push(format!("  dns: {}", servers.join(", ")));
        }
    }
    if let Some(l2) = interface.l2.as_ref().filter(|l2| !l2.is_empty()) {
        lines.push(format!(
            "  macvlan: {} mask {} range {} gateway {}",
            l2.starting_address, l2.netmask, l2.range, l2.gateway
        ));
    }
    lines.join("\n")
}
