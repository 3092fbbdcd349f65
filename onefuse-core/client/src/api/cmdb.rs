//! ServiceNow CMDB API

use serde_json::{json, Value};
use tracing::info;

use super::{collection_path, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::{OneFuseError, Result};
use crate::job::RequestMethod;
use crate::models::{link_href, ManagedObject, Properties, ResourceKind};

/// ServiceNow CMDB API
pub struct CmdbApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> CmdbApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 创建 CMDB 记录
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        info!("创建 CMDB 记录, 策略: {}", policy_name);
        let template =
            policy_template(self.client, ResourceKind::Cmdb, policy_name, properties).await?;
        self.client
            .request(
                &collection_path(ResourceKind::Cmdb)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
            )
            .await
    }

    /// 使用新的属性栈更新已有 CMDB 记录，沿用原策略与工作区
    pub async fn update(&self, properties: &Properties, cmdb_id: i64) -> Result<ManagedObject> {
        let path = item_path(ResourceKind::Cmdb, cmdb_id)?;
        let current = self.client.get_json(&path).await?;
        let tracking_id = self.client.tracking_id_from_mo(&path).await;

        let href = |rel: &str| {
            link_href(&current, rel)
                .map(str::to_string)
                .ok_or_else(|| OneFuseError::MissingField(format!("_links.{}.href", rel)))
        };
        let template = json!({
            "policy": href("policy")?,
            "templateProperties": properties,
            "workspace": href("workspace")?,
        });

        info!("更新 CMDB 记录: {}", path);
        self.client
            .request(&path, &template, Some(&tracking_id), RequestMethod::Put)
            .await
    }

    /// 删除 CMDB 记录
    pub async fn deprovision(&self, cmdb_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::Cmdb, cmdb_id)?;
        self.client.deprovision(&path).await?;
        Ok(path)
    }
}
