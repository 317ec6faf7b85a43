//! CLI command tests

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;

    use edge_network_api::context::AppContext;
    use edge_network_api::NetworkService;
    use edge_network_apply::to_profile;
    use edge_network_config::ServiceConfig;
    use edge_network_test::{FakeNetworkManager, MemoryLabelStore, StaticL2};
    use edge_shared_types::{DhcpMode, DnsConf, Interface, L2Conf, StaticConf};

    use crate::commands::{
        read_settings, ApplyCommand, LabelsCommand, ListCommand, OutputFormat, ValidateCommand,
    };
    use crate::render::interface_text;

    const MAC0: &str = "AA:BB:CC:DD:EE:FF";

    const STATIC_SETTINGS: &str = r#"{
        "Interfaces": [{
            "GatewayInterface": true,
            "MacAddress": "AA:BB:CC:DD:EE:FF",
            "DHCP": "disabled",
            "Static": {"IPv4": "192.168.1.50", "NetMask": "255.255.255.0", "Gateway": "192.168.1.1"},
            "DNSConfig": {"PrimaryDNS": "8.8.8.8"}
        }]
    }"#;

    fn setup() -> (Arc<AppContext>, FakeNetworkManager) {
        let nm = FakeNetworkManager::new();
        nm.add_device("eth0", MAC0);
        let dhcp = Interface {
            mac_address: MAC0.to_string(),
            dhcp: DhcpMode::Enabled,
            ..Default::default()
        };
        let id = nm.insert_connection(to_profile(&dhcp, "eth0"));
        nm.activate_stored(id, "eth0");

        let service = NetworkService::new(
            Arc::new(nm.clone()),
            Arc::new(MemoryLabelStore::with_labels(&[("WAN", "eth0")])),
            Arc::new(StaticL2::new()),
            Duration::ZERO,
        );
        (AppContext::new(ServiceConfig::default(), Arc::new(service)), nm)
    }

    /// Writes `content` into a fresh temp directory.
    fn write_file(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, content).expect("Failed to write test file");
        (temp_dir, path)
    }

    #[tokio::test]
    async fn test_apply_command_success() {
        let (context, nm) = setup();
        let (_dir, path) = write_file(STATIC_SETTINGS);

        let output = ApplyCommand::new(context.clone())
            .execute(&path, false)
            .await
            .unwrap();
        assert!(output.contains("1 interface(s) applied"));

        let profile = nm.active_profile("eth0").unwrap();
        assert_eq!(profile.id(), Some("AA:BB:CC:DD:EE:FF_static"));
    }

    #[tokio::test]
    async fn test_apply_dry_run_leaves_devices_alone() {
        let (context, nm) = setup();
        let (_dir, path) = write_file(STATIC_SETTINGS);

        let output = ApplyCommand::new(context).execute(&path, true).await.unwrap();
        assert!(output.contains("Dry-run completed"));
        assert!(nm.calls().is_empty());
        assert_eq!(
            nm.active_profile("eth0").unwrap().id(),
            Some("AA:BB:CC:DD:EE:FF_dhcp")
        );
    }

    #[tokio::test]
    async fn test_validate_command_reports_bad_address() {
        let (context, _) = setup();
        let (_dir, path) = write_file(&STATIC_SETTINGS.replace("192.168.1.50", "192.168.1.500"));

        let err = ValidateCommand::new(context).execute(&path).await.unwrap_err();
        assert!(err.to_string().contains("wrong ip address 192.168.1.500"));
    }

    #[tokio::test]
    async fn test_validate_command_missing_file() {
        let (context, _) = setup();
        let err = ValidateCommand::new(context)
            .execute(&PathBuf::from("/nonexistent/settings.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }

    #[test]
    fn test_read_settings_rejects_malformed_json() {
        let (_dir, path) = write_file("{\"Interfaces\": 3}");
        let err = read_settings(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let (context, _) = setup();
        let cmd = ListCommand::new(context);

        let text = cmd.execute(OutputFormat::Text).await.unwrap();
        assert!(text.starts_with("eth0 (AA:BB:CC:DD:EE:FF) label WAN"));
        assert!(text.contains("dhcp: enabled"));

        let json = cmd.get_by_label("wan", OutputFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["MacAddress"], MAC0);

        let err = cmd
            .get_by_mac("00:00:00:00:00:01", OutputFormat::Text)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Interface does not exist on this device!");
    }

    #[tokio::test]
    async fn test_labels_set_and_show() {
        let (context, _) = setup();
        let (_dir, path) = write_file(r#"{"lan1": "eth1", "wan": "eth0"}"#);
        let cmd = LabelsCommand::new(context);

        assert_eq!(cmd.set(&path).await.unwrap(), "✓ 2 label(s) stored");
        let shown = cmd.show(OutputFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(value, serde_json::json!({"LAN1": "eth1", "WAN": "eth0"}));
    }

    #[test]
    fn test_interface_text() {
        let interface = Interface {
            gateway_interface: true,
            mac_address: MAC0.to_string(),
            dhcp: DhcpMode::Disabled,
            static_conf: Some(StaticConf::new("192.168.1.50", "255.255.255.0", "")),
            dns: Some(DnsConf::new("8.8.8.8", "4.4.4.4")),
            l2: Some(L2Conf::default()),
            interface_name: "eth0".into(),
            label: String::new(),
        };

        assert_eq!(
            interface_text(&interface),
            "eth0 (AA:BB:CC:DD:EE:FF) [gateway]\n  dhcp: disabled\n  ipv4: 192.168.1.50/255.255.255.0\n  dns: 8.8.8.8, 4.4.4.4"
        );
    }
}
