//! Unit tests for the network API

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use edge_network_apply::to_profile;
    use edge_network_config::ServiceConfig;
    use edge_network_test::{FakeNetworkManager, MemoryLabelStore, Op, StaticL2};
    use edge_shared_types::{DhcpMode, Interface};

    use crate::context::AppContext;
    use crate::error::INTERFACE_NOT_FOUND;
    use crate::{NetworkAPI, NetworkService};

    const MAC0: &str = "AA:BB:CC:DD:EE:FF";
    const MAC1: &str = "11:22:33:44:55:66";

    fn setup_with_labels(labels: MemoryLabelStore) -> (Router, FakeNetworkManager) {
        let nm = FakeNetworkManager::new();
        for (interface, mac) in [("eth0", MAC0), ("eth1", MAC1)] {
            nm.add_device(interface, mac);
            let dhcp = Interface {
                mac_address: mac.to_string(),
                dhcp: DhcpMode::Enabled,
                ..Default::default()
            };
            let id = nm.insert_connection(to_profile(&dhcp, interface));
            nm.activate_stored(id, interface);
        }

        let service = NetworkService::new(
            Arc::new(nm.clone()),
            Arc::new(labels),
            Arc::new(StaticL2::new()),
            Duration::ZERO,
        );
        let config = ServiceConfig {
            settle_delay_secs: 0,
            ..Default::default()
        };
        let context = AppContext::new(config, Arc::new(service));
        (NetworkAPI::router().with_state(context), nm)
    }

    fn setup() -> (Router, FakeNetworkManager) {
        setup_with_labels(MemoryLabelStore::with_labels(&[("LAN1", "eth1")]))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn static_settings(mac: &str, ip: &str) -> Value {
        json!({
            "Interfaces": [{
                "GatewayInterface": true,
                "MacAddress": mac,
                "DHCP": "disabled",
                "Static": {"IPv4": ip, "NetMask": "255.255.255.0", "Gateway": "192.168.1.1"},
                "DNSConfig": {"PrimaryDNS": "8.8.8.8", "SecondaryDNS": "4.4.4.4"}
            }]
        })
    }

    #[tokio::test]
    async fn test_get_all_interfaces() {
        let (app, _) = setup();
        let (status, body) = call(&app, Method::GET, "/interfaces", None).await;

        assert_eq!(status, StatusCode::OK);
        let interfaces = body["Interfaces"].as_array().unwrap();
        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces[0]["MacAddress"], MAC0);
        assert_eq!(interfaces[0]["InterfaceName"], "eth0");
        assert_eq!(interfaces[0]["DHCP"], "enabled");
        assert_eq!(interfaces[1]["Label"], "LAN1");
    }

    #[tokio::test]
    async fn test_get_interface_with_mac() {
        let (app, _) = setup();
        let (status, body) = call(&app, Method::GET, "/interfaces/mac/aa:bb:cc:dd:ee:ff", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["MacAddress"], MAC0);

        let (status, body) = call(&app, Method::GET, "/interfaces/mac/00:00:00:00:00:01", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"code": "NotFound", "message": INTERFACE_NOT_FOUND}));
    }

    #[tokio::test]
    async fn test_get_interface_with_label() {
        let (app, _) = setup();
        let (status, body) = call(&app, Method::GET, "/interfaces/label/lan1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["MacAddress"], MAC1);

        let (status, _) = call(&app, Method::GET, "/interfaces/label/WAN", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_apply_settings_reads_back() {
        let (app, _) = setup();
        let (status, body) = call(
            &app,
            Method::POST,
            "/interfaces",
            Some(static_settings(MAC0, "192.168.1.50")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (_, iface) = call(&app, Method::GET, "/interfaces/mac/AA:BB:CC:DD:EE:FF", None).await;
        assert_eq!(iface["DHCP"], "disabled");
        assert_eq!(
            iface["Static"],
            json!({"IPv4": "192.168.1.50", "NetMask": "255.255.255.0", "Gateway": "192.168.1.1"})
        );
        assert_eq!(
            iface["DNSConfig"],
            json!({"PrimaryDNS": "8.8.8.8", "SecondaryDNS": "4.4.4.4"})
        );
        assert_eq!(iface["GatewayInterface"], true);
    }

    #[tokio::test]
    async fn test_apply_settings_precondition_failure() {
        let (app, nm) = setup();
        let (status, body) = call(
            &app,
            Method::POST,
            "/interfaces",
            Some(static_settings(MAC0, "192.168.1.500")),
        )
        .await;

        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["code"], "FailedPrecondition");
        assert_eq!(
            body["message"],
            "Wrong input for this method, wrong ip address 192.168.1.500"
        );
        assert!(nm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_apply_settings_unknown_device() {
        let (app, _) = setup();
        let (status, body) = call(
            &app,
            Method::POST,
            "/interfaces",
            Some(static_settings("00:00:00:00:00:01", "192.168.1.50")),
        )
        .await;

        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(
            body["message"],
            "Wrong input for this method, device does not exist: mac address 00:00:00:00:00:01"
        );
    }

    #[tokio::test]
    async fn test_apply_settings_internal_failure_restores() {
        let (app, nm) = setup();
        nm.fail(Op::AddConnection, Some("AA:BB:CC:DD:EE:FF_static"));

        let (status, body) = call(
            &app,
            Method::POST,
            "/interfaces",
            Some(static_settings(MAC0, "192.168.1.50")),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "Internal");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Errors occured while applying new settings, "));
        assert_eq!(
            nm.active_profile("eth0").and_then(|p| p.id().map(str::to_string)),
            Some("AA:BB:CC:DD:EE:FF_dhcp".to_string())
        );
    }

    #[tokio::test]
    async fn test_apply_settings_malformed_body() {
        let (app, nm) = setup();
        let (status, body) = call(
            &app,
            Method::POST,
            "/interfaces",
            Some(json!({"Interfaces": "eth0"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidArgument");
        assert!(nm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_labels_roundtrip() {
        let (app, _) = setup_with_labels(MemoryLabelStore::new());
        let (status, _) = call(
            &app,
            Method::PUT,
            "/labels",
            Some(json!({"wan": "eth0", "lan1": "eth1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, Method::GET, "/labels", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"LAN1": "eth1", "WAN": "eth0"}));

        let (_, iface) = call(&app, Method::GET, "/interfaces/label/Wan", None).await;
        assert_eq!(iface["InterfaceName"], "eth0");
    }

    #[tokio::test]
    async fn test_label_write_failure() {
        let (app, _) = setup_with_labels(MemoryLabelStore::read_only());
        let (status, body) = call(&app, Method::PUT, "/labels", Some(json!({"wan": "eth0"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "Internal");
    }

    #[tokio::test]
    async fn test_adapter_failure_on_read() {
        let (app, nm) = setup();
        nm.fail(Op::Devices, None);
        let (status, body) = call(&app, Method::GET, "/interfaces", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "Internal");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = setup();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
