//! 脚本部署 API

use serde_json::Value;
use tracing::info;

use super::{collection_path, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::Result;
use crate::job::RequestMethod;
use crate::models::{ManagedObject, Properties, ResourceKind};

/// 脚本 API
pub struct ScriptingApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> ScriptingApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 执行脚本部署
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        info!("执行脚本部署, 策略: {}", policy_name);
        let template =
            policy_template(self.client, ResourceKind::Scripting, policy_name, properties).await?;
        self.client
            .request(
                &collection_path(ResourceKind::Scripting)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
            )
            .await
    }

    /// 执行脚本的反向部署并删除对象
    pub async fn deprovision(&self, script_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::Scripting, script_id)?;
        self.client.deprovision(&path).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::models::Properties;
    use crate::testing::ScriptedTransport;
    use crate::transport::ApiResponse;
    use crate::OneFuseClient;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_provision_scripting_forwards_tracking_id() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_policy("scriptingPolicies", 3, "linux_hardening");
        transport.respond(
            "POST",
            "/scriptingDeployments/",
            ApiResponse::new(201, json!({ "id": 7, "hostname": "web01" })).with_tracking_id("t-9"),
        );
        let client = OneFuseClient::with_transport(transport.clone(), ClientConfig::default());

        let mo = client
            .scripting()
            .provision("linux_hardening", &Properties::new(), Some("t-9"))
            .await
            .unwrap();

        assert_eq!(mo.id(), Some(7));
        assert_eq!(mo.tracking_id(), Some("t-9"));
        let request = transport.last_request("POST").unwrap();
        assert_eq!(request.tracking_id.as_deref(), Some("t-9"));
        assert_eq!(request.body.unwrap()["policy"], "/api/v3/onefuse/scriptingPolicies/3/");
    }
}
