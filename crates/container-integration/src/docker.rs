//! Docker macvlan reservations
//!
//! Lists the macvlan networks known to docker, inspects each one and reports
//! the address pool of the network whose `parent` option names the
//! requested interface.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ipnet::Ipv4Net;
use log::{debug, warn};
use serde::Deserialize;

use edge_network_core::addr::{parse_netmask, prefix_range};
use edge_network_core::L2Inspector;
use edge_shared_types::L2Conf;

use crate::command::CommandRunner;
use crate::error::{ContainerError, Result};

/// One entry of `docker network inspect` output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DockerNetwork {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub driver: String,
    #[serde(rename = "IPAM", default)]
    pub ipam: Ipam,
    #[serde(default)]
    pub options: Option<BTreeMap<String, String>>,
}

impl DockerNetwork {
    pub fn parent(&self) -> Option<&str> {
        self.options
            .as_ref()
            .and_then(|options| options.get("parent"))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ipam {
    #[serde(default)]
    pub config: Option<Vec<IpamConfig>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpamConfig {
    #[serde(default)]
    pub subnet: String,
    #[serde(rename = "IPRange", default)]
    pub ip_range: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub auxiliary_addresses: Option<BTreeMap<String, String>>,
}

/// L2 inspector that queries the docker CLI.
pub struct DockerL2Inspector {
    runner: Arc<dyn CommandRunner>,
    docker_binary: String,
}

impl DockerL2Inspector {
    pub fn new(runner: Arc<dyn CommandRunner>, docker_binary: impl Into<String>) -> Self {
        Self {
            runner,
            docker_binary: docker_binary.into(),
        }
    }

    async fn docker(&self, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let command = format!("{} {}", self.docker_binary, args.join(" "));
        self.runner
            .run(&self.docker_binary, args)
            .await?
            .into_stdout(&command)
    }

    /// Names of all networks using the macvlan driver.
    pub async fn macvlan_networks(&self) -> Result<Vec<String>> {
        let output = self
            .docker(&[
                "network",
                "ls",
                "--format",
                "{{.Name}}",
                "--filter",
                "driver=macvlan",
            ])
            .await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn inspect_network(&self, name: &str) -> Result<Vec<DockerNetwork>> {
        let output = self.docker(&["network", "inspect", name]).await?;
        Ok(serde_json::from_str(&output)?)
    }

    /// Reservation of the macvlan network attached to `interface_name`, or
    /// an empty one when no such network exists.
    pub async fn l2_conf_for(&self, interface_name: &str) -> Result<L2Conf> {
        for name in self.macvlan_networks().await? {
            for network in self.inspect_network(&name).await? {
                if network.parent() == Some(interface_name) {
                    debug!("Macvlan network {} is attached to {}", network.name, interface_name);
                    return l2_conf(&network);
                }
            }
        }
        debug!("No macvlan network attached to {}", interface_name);
        Ok(L2Conf::default())
    }
}

#[async_trait]
impl L2Inspector for DockerL2Inspector {
    async fn inspect(&self, interface_name: &str) -> L2Conf {
        match self.l2_conf_for(interface_name).await {
            Ok(conf) => conf,
            Err(e) => {
                warn!("Macvlan lookup for {} failed: {}", interface_name, e);
                L2Conf::default()
            }
        }
    }
}

fn invalid(network: &DockerNetwork, reason: impl Into<String>) -> ContainerError {
    ContainerError::InvalidNetwork {
        network: network.name.clone(),
        reason: reason.into(),
    }
}

/// Netmask from the subnet, start address and pool size from the IP range.
pub fn l2_conf(network: &DockerNetwork) -> Result<L2Conf> {
    let config = network
        .ipam
        .config
        .as_ref()
        .and_then(|configs| configs.first())
        .ok_or_else(|| invalid(network, "no IPAM config"))?;

    let subnet: Ipv4Net = config
        .subnet
        .parse()
        .map_err(|_| invalid(network, format!("bad subnet '{}'", config.subnet)))?;
    let ip_range: Ipv4Net = config
        .ip_range
        .parse()
        .map_err(|_| invalid(network, format!("bad ip range '{}'", config.ip_range)))?;
    let range = prefix_range(u32::from(ip_range.prefix_len()))
        .ok_or_else(|| invalid(network, "ip range prefix out of bounds"))?;

    Ok(L2Conf {
        starting_address: ip_range.addr().to_string(),
        netmask: parse_netmask(u32::from(subnet.prefix_len())),
        range: range.to_string(),
        gateway: config.gateway.clone(),
        auxiliary_addresses: config.auxiliary_addresses.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, MockCommandRunner};

    const INSPECT_LAN: &str = r#"[
        {
            "Name": "lan-macvlan",
            "Driver": "macvlan",
            "IPAM": {
                "Driver": "default",
                "Options": {},
                "Config": [
                    {
                        "Subnet": "192.168.1.0/24",
                        "IPRange": "192.168.1.64/28",
                        "Gateway": "192.168.1.1",
                        "AuxiliaryAddresses": {"router": "192.168.1.2"}
                    }
                ]
            },
            "Containers": {},
            "Options": {"parent": "eth1"},
            "Labels": {}
        }
    ]"#;

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            success: true,
            exit_code: Some(0),
            stdout: stdout.to_string(),
            ..Default::default()
        }
    }

    fn mock_docker(ls: &'static str, inspect: &'static str) -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args| {
                program.to_string() == "docker" && args.get(1).map(String::as_str) == Some("ls")
            })
            .returning(move |_, _| Ok(ok(ls)));
        runner
            .expect_run()
            .withf(|_, args| args.get(1).map(String::as_str) == Some("inspect"))
            .returning(move |_, _| Ok(ok(inspect)));
        runner
    }

    fn docker_inspector(runner: MockCommandRunner) -> DockerL2Inspector {
        DockerL2Inspector::new(Arc::new(runner), "docker")
    }

    #[tokio::test]
    async fn reports_pool_of_matching_parent() {
        let inspector = docker_inspector(mock_docker("lan-macvlan\n", INSPECT_LAN));

        let conf = inspector.inspect("eth1").await;
        assert_eq!(conf.starting_address, "192.168.1.64");
        assert_eq!(conf.netmask, "255.255.255.0");
        assert_eq!(conf.range, "16");
        assert_eq!(conf.gateway, "192.168.1.1");
        assert_eq!(
            conf.auxiliary_addresses.get("router").map(String::as_str),
            Some("192.168.1.2")
        );
    }

    #[tokio::test]
    async fn other_parent_yields_empty_conf() {
        let inspector = docker_inspector(mock_docker("lan-macvlan\n", INSPECT_LAN));
        assert!(inspector.inspect("eth0").await.is_empty());
    }

    #[tokio::test]
    async fn no_macvlan_networks_skips_inspect() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args| {
                program.to_string() == "docker"
                    && args.as_slice()
                        == ["network", "ls", "--format", "{{.Name}}", "--filter", "driver=macvlan"]
            })
            .times(1)
            .returning(|_, _| Ok(ok("")));

        let inspector = docker_inspector(runner);
        assert!(inspector.inspect("eth1").await.is_empty());
    }

    #[tokio::test]
    async fn command_failure_yields_empty_conf() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| {
            Ok(CommandOutput {
                success: false,
                exit_code: Some(1),
                stderr: "Cannot connect to the Docker daemon".into(),
                ..Default::default()
            })
        });

        let inspector = docker_inspector(runner);
        assert!(inspector.inspect("eth1").await.is_empty());
        assert!(inspector.macvlan_networks().await.is_err());
    }

    #[tokio::test]
    async fn malformed_inspect_output_yields_empty_conf() {
        let inspector = docker_inspector(mock_docker("lan-macvlan\n", "not json"));
        assert!(inspector.inspect("eth1").await.is_empty());
        assert!(matches!(
            inspector.l2_conf_for("eth1").await,
            Err(ContainerError::Serialization { .. })
        ));
    }

    #[test]
    fn missing_ip_range_is_invalid() {
        let network = DockerNetwork {
            name: "lan".into(),
            ipam: Ipam {
                config: Some(vec![IpamConfig {
                    subnet: "192.168.1.0/24".into(),
                    ..Default::default()
                }]),
            },
            ..Default::default()
        };
        assert!(matches!(
            l2_conf(&network),
            Err(ContainerError::InvalidNetwork { .. })
        ));
    }
}
