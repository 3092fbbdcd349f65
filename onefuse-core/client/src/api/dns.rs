//! DNS 记录 API

use serde_json::Value;
use tracing::info;

use super::{collection_path, hostname, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::Result;
use crate::job::RequestMethod;
use crate::models::{ManagedObject, Properties, ResourceKind};

/// DNS API
pub struct DnsApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> DnsApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 创建 DNS 记录
    ///
    /// 每个区域名都会单独渲染。
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        ip_address: &str,
        zones: &[String],
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        let hostname = hostname(properties)?;
        info!("创建 DNS 记录: {} -> {}, 策略: {}", hostname, ip_address, policy_name);

        let mut template =
            policy_template(self.client, ResourceKind::Dns, policy_name, properties).await?;

        let mut rendered_zones = Vec::with_capacity(zones.len());
        for zone in zones {
            rendered_zones.push(Value::String(self.client.render(zone, properties).await?));
        }

        template.insert("name".to_string(), Value::String(hostname));
        template.insert("value".to_string(), Value::String(ip_address.to_string()));
        template.insert("zones".to_string(), Value::Array(rendered_zones));

        self.client
            .request(
                &collection_path(ResourceKind::Dns)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
            )
            .await
    }

    /// 删除 DNS 记录
    pub async fn deprovision(&self, dns_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::Dns, dns_id)?;
        self.client.deprovision(&path).await?;
        Ok(path)
    }
}
