//! Ansible Tower 部署 API

use serde_json::Value;
use tracing::info;

use super::{collection_path, item_path, policy_template};
use crate::client::OneFuseClient;
use crate::error::Result;
use crate::job::RequestMethod;
use crate::models::{ManagedObject, Properties, ResourceKind};

/// Ansible Tower API
pub struct AnsibleTowerApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> AnsibleTowerApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 执行 Ansible Tower 部署
    ///
    /// `hosts` 渲染后按逗号拆分；`limit` 为空时发送空字符串。
    pub async fn provision(
        &self,
        policy_name: &str,
        properties: &Properties,
        hosts: &str,
        limit: &str,
        tracking_id: Option<&str>,
    ) -> Result<ManagedObject> {
        info!("执行 Ansible Tower 部署, 策略: {}", policy_name);
        let mut template =
            policy_template(self.client, ResourceKind::AnsibleTower, policy_name, properties)
                .await?;

        let mut rendered_hosts = Vec::new();
        if !hosts.is_empty() {
            let rendered = self.client.render(hosts, properties).await?;
            rendered_hosts = rendered
                .split(',')
                .map(|host| Value::String(host.trim().to_string()))
                .collect();
        }

        let rendered_limit = if limit.is_empty() {
            String::new()
        } else {
            self.client.render(limit, properties).await?
        };

        template.insert("hosts".to_string(), Value::Array(rendered_hosts));
        template.insert("limit".to_string(), Value::String(rendered_limit));

        self.client
            .request(
                &collection_path(ResourceKind::AnsibleTower)?,
                &Value::Object(template),
                tracking_id,
                RequestMethod::Post,
            )
            .await
    }

    /// 删除 Ansible Tower 部署
    pub async fn deprovision(&self, deployment_id: i64) -> Result<String> {
        let path = item_path(ResourceKind::AnsibleTower, deployment_id)?;
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
    async fn test_hosts_split_and_trimmed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_policy("ansibleTowerPolicies", 2, "apache");
        transport.respond(
            "POST",
            "/ansibleTowerDeployments/",
            ApiResponse::new(201, json!({ "id": 5 })),
        );
        let client = OneFuseClient::with_transport(transport.clone(), ClientConfig::default());

        client
            .ansible_tower()
            .provision("apache", &Properties::new(), "web01, web02 ,web03", "", None)
            .await
            .unwrap();

        let body = transport.last_request("POST").unwrap().body.unwrap();
        assert_eq!(body["hosts"], json!(["web01", "web02", "web03"]));
        assert_eq!(body["limit"], "");
    }

    #[tokio::test]
    async fn test_empty_hosts_sends_empty_list() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_policy("ansibleTowerPolicies", 2, "apache");
        transport.respond(
            "POST",
            "/ansibleTowerDeployments/",
            ApiResponse::new(201, json!({ "id": 5 })),
        );
        let client = OneFuseClient::with_transport(transport.clone(), ClientConfig::default());

        client
            .ansible_tower()
            .provision("apache", &Properties::new(), "", "web01", None)
            .await
            .unwrap();

        let body = transport.last_request("POST").unwrap().body.unwrap();
        assert_eq!(body["hosts"], json!([]));
        assert_eq!(body["limit"], "web01");
    }
}
