//! Microsoft AD 计算机账户 API

use serde_json::{json, Value};
use tracing::info;

use super::{collection_path, hostname, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::{OneFuseError, Result};
use crate::job::RequestMethod;
use crate::models::{link_href, ManagedObject, Properties, ResourceKind};

/// Microsoft AD API
pub struct AdApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> AdApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 在构建 OU 中创建计算机账户，账户名取自 `hostname`
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        let name = hostname(properties)?;
        info!("创建 AD 计算机账户: {}, 策略: {}", name, policy_name);

        let mut template =
            policy_template(self.client, ResourceKind::Ad, policy_name, properties).await?;
        template.insert("name".to_string(), Value::String(name));

        self.client
            .request(
                &collection_path(ResourceKind::Ad)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
            )
            .await
    }

    /// 将计算机账户移动到最终 OU
    pub async fn move_ou(&self, ad_id: i64) -> Result<ManagedObject> {
        let path = item_path(ResourceKind::Ad, ad_id)?;
        let current = self.client.get_json(&path).await?;

        let name = current.get("name").and_then(Value::as_str).unwrap_or_default();
        let final_ou = current.get("finalOu").and_then(Value::as_str).unwrap_or_default();
        let workspace = link_href(&current, "workspace")
            .ok_or_else(|| OneFuseError::MissingField("_links.workspace.href".to_string()))?;

        let tracking_id = self.client.tracking_id_from_mo(&path).await;
        let template = json!({
            "workspace": workspace,
            "state": "final",
        });

        info!("移动 AD 对象: {} 到最终 OU: {}", name, final_ou);
        let mo = self
            .client
            .request(&path, &template, Some(&tracking_id), RequestMethod::Put)
            .await?;
        info!("AD 对象已移动到最终 OU. AD: {}, OU: {}", name, final_ou);
        Ok(mo)
    }

    /// 删除计算机账户
    pub async fn deprovision(&self, ad_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::Ad, ad_id)?;
        self.client.deprovision(&path).await?;
        Ok(path)
    }
}
