//! vRealize Automation 部署 API

use serde_json::Value;
use tracing::info;

use super::{collection_path, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::Result;
use crate::job::RequestMethod;
use crate::models::{ManagedObject, Properties, ResourceKind};

/// vRA API
pub struct VraApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> VraApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 创建 vRA 部署，使用较长的轮询间隔
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        deployment_name: &str,
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        let rendered_deployment_name = self.client.render(deployment_name, properties).await?;
        info!("创建 vRA 部署: {}, 策略: {}", rendered_deployment_name, policy_name);

        let mut template =
            policy_template(self.client, ResourceKind::Vra, policy_name, properties).await?;
        template.insert(
            "deploymentName".to_string(),
            Value::String(rendered_deployment_name),
        );

        self.client
            .request_with_interval(
                &collection_path(ResourceKind::Vra)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
                self.client.config().vra_poll_interval(),
            )
            .await
    }

    /// 删除 vRA 部署
    pub async fn deprovision(&self, vra_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::Vra, vra_id)?;
        self.client.deprovision(&path).await?;
        Ok(path)
    }
}
