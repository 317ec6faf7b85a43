//! List and get commands

use std::sync::Arc;

use anyhow::Result;

use edge_network_api::context::AppContext;

use super::OutputFormat;
use crate::render::{render_interface, render_settings};

pub struct ListCommand {
    context: Arc<AppContext>,
}

impl ListCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Renders every ethernet interface.
    pub async fn execute(&self, format: OutputFormat) -> Result<String> {
        let settings = self.context.service.get_all_interfaces().await?;
        render_settings(&settings, format)
    }

    pub async fn get_by_mac(&self, mac: &str, format: OutputFormat) -> Result<String> {
        let interface = self.context.service.get_interface_with_mac(mac).await?;
        render_interface(&interface, format)
    }

    pub async fn get_by_label(&self, label: &str, format: OutputFormat) -> Result<String> {
        let interface = self.context.service.get_interface_with_label(label).await?;
        render_interface(&interface, format)
    }
}
