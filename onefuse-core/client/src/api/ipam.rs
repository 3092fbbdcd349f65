//! IP 地址管理 API

use serde_json::Value;
use tracing::info;

use super::{collection_path, hostname, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::Result;
use crate::job::RequestMethod;
use crate::models::{ManagedObject, Properties, ResourceKind};

/// IPAM API
pub struct IpamApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> IpamApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 为属性栈中的 `hostname` 预留 IP 地址
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        let hostname = hostname(properties)?;
        info!("申请 IP 地址: {}, 策略: {}", hostname, policy_name);

        let mut template =
            policy_template(self.client, ResourceKind::Ipam, policy_name, properties).await?;
        template.insert("hostname".to_string(), Value::String(hostname));

        self.client
            .request(
                &collection_path(ResourceKind::Ipam)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
            )
            .await
    }

    /// 释放 IP 地址预留
    pub async fn deprovision(&self, ipam_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::Ipam, ipam_id)?;
        self.client.deprovision(&path).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::error::OneFuseError;
    use crate::models::Properties;
    use crate::testing::ScriptedTransport;
    use crate::transport::ApiResponse;
    use crate::OneFuseClient;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_provision_ipam_sends_hostname() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_policy("ipamPolicies", 3, "atl-prod");
        transport.respond(
            "POST",
            "/ipamReservations/",
            ApiResponse::new(201, json!({ "id": 8, "ipAddress": "10.0.0.15" })),
        );
        let client = OneFuseClient::with_transport(transport.clone(), ClientConfig::default());

        let mut properties = Properties::new();
        properties.insert("hostname".to_string(), json!("atl-web01"));
        let mo = client.ipam().provision("atl-prod", &properties, Some("t-1")).await.unwrap();

        assert_eq!(mo.get_str("ipAddress"), Some("10.0.0.15"));
        let request = transport.last_request("POST").unwrap();
        assert_eq!(request.body.unwrap()["hostname"], "atl-web01");
        assert_eq!(request.tracking_id.as_deref(), Some("t-1"));
    }

    #[tokio::test]
    async fn test_provision_ipam_requires_hostname() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = OneFuseClient::with_transport(transport.clone(), ClientConfig::default());

        let err = client.ipam().provision("atl-prod", &Properties::new(), None).await.unwrap_err();
        assert!(matches!(err, OneFuseError::MissingField(field) if field == "hostname"));
        assert!(transport.requests().is_empty());
    }
}
