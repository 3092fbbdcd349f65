//! 命名 API

use serde_json::Value;
use tracing::info;

use super::{collection_path, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::Result;
use crate::job::RequestMethod;
use crate::models::{ManagedObject, Properties, ResourceKind};

/// 命名 API
pub struct NamingApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> NamingApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 按命名策略生成主机名
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        info!("申请主机名, 策略: {}", policy_name);
        let template =
            policy_template(self.client, ResourceKind::Naming, policy_name, properties).await?;
        self.client
            .request(
                &collection_path(ResourceKind::Naming)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
            )
            .await
    }

    /// 删除主机名，返回被删除对象的路径
    pub async fn deprovision(&self, name_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::Naming, name_id)?;
        self.client.deprovision(&path).await?;
        Ok(path)
    }
}
