//! Tests for the label store and service configuration

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use crate::{FileLabelStore, LabelStore, ListenAddress, ServiceConfig};

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn set_all_writes_uppercase_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("network.label");
        let store = FileLabelStore::new(&path);

        store
            .set_all(&labels(&[("key1", "value1"), ("Key2", "Value2")]))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, r#"{"KEY1":"VALUE1","KEY2":"VALUE2"}"#);
    }

    #[tokio::test]
    async fn set_all_replaces_previous_map() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLabelStore::new(temp_dir.path().join("network.label"));

        store.set_all(&labels(&[("lan1", "eth0")])).await.unwrap();
        store.set_all(&labels(&[("lan2", "eth1")])).await.unwrap();

        assert_eq!(store.resolve("lan1").await, None);
        assert_eq!(store.resolve("lan2").await.as_deref(), Some("ETH1"));
        assert_eq!(store.get_all().await.unwrap(), labels(&[("LAN2", "ETH1")]));
    }

    #[tokio::test]
    async fn lookups_in_both_directions() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLabelStore::new(temp_dir.path().join("network.label"));
        store
            .set_all(&labels(&[("lan1", "eth0"), ("wan", "enp3s0")]))
            .await
            .unwrap();

        assert_eq!(store.resolve("LAN1").await.as_deref(), Some("ETH0"));
        assert_eq!(store.resolve("lan1").await.as_deref(), Some("ETH0"));
        assert_eq!(store.reverse_resolve("enp3s0").await.as_deref(), Some("WAN"));
        assert_eq!(store.reverse_resolve("eth9").await, None);
    }

    #[tokio::test]
    async fn external_edits_are_visible() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("network.label");
        let store = FileLabelStore::new(&path);
        store.set_all(&labels(&[("lan1", "eth0")])).await.unwrap();

        std::fs::write(&path, r#"{"LAN1":"ETH5"}"#).unwrap();

        assert_eq!(store.resolve("lan1").await.as_deref(), Some("ETH5"));
    }

    #[tokio::test]
    async fn missing_or_corrupt_file_resolves_to_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("network.label");
        let store = FileLabelStore::new(&path);

        assert_eq!(store.resolve("lan1").await, None);
        assert!(store.get_all().await.is_err());

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(store.resolve("lan1").await, None);
        assert_eq!(store.reverse_resolve("eth0").await, None);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLabelStore::new(temp_dir.path().join("missing").join("network.label"));

        let result = store.set_all(&labels(&[("lan1", "eth0")])).await;
        assert!(result.is_err());
    }

    #[test]
    fn listen_address_parsing() {
        assert_eq!(
            "unix:///run/edge.sock".parse::<ListenAddress>().unwrap(),
            ListenAddress::Unix(PathBuf::from("/run/edge.sock"))
        );
        assert_eq!(
            "tcp://127.0.0.1:9000".parse::<ListenAddress>().unwrap(),
            ListenAddress::Tcp("127.0.0.1:9000".to_string())
        );
        assert!("unix://".parse::<ListenAddress>().is_err());
        assert!("http://localhost".parse::<ListenAddress>().is_err());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("service.toml");
        std::fs::write(
            &path,
            "listen = \"tcp://0.0.0.0:8080\"\nsettle_delay_secs = 0\nsocket_group = 999\n",
        )
        .unwrap();

        let config = ServiceConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config.listen_address().unwrap(),
            ListenAddress::Tcp("0.0.0.0:8080".to_string())
        );
        assert_eq!(config.settle_delay_secs, 0);
        assert_eq!(config.socket_group, Some(999));
        assert_eq!(config.label_file, PathBuf::from("/var/network.label"));
        assert_eq!(config.docker_binary, "docker");
    }

    #[test]
    fn invalid_listen_address_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("service.toml");
        std::fs::write(&path, "listen = \"ftp://nowhere\"\n").unwrap();

        assert!(ServiceConfig::load(Some(&path)).is_err());
    }
}
