//! OneFuse 客户端核心实现

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::api::{
    AdApi, AnsibleTowerApi, CmdbApi, DnsApi, IpamApi, NamingApi, PropertySetApi, ScriptingApi,
    VraApi,
};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::transport::{ApiResponse, HttpTransport, Transport};

/// OneFuse 客户端
///
/// 持有传输层与配置，负责认证、请求头与 URL 拼接，
/// 调用方只需要关心相对路径与 JSON 内容。
#[derive(Clone)]
pub struct OneFuseClient {
    /// 传输层
    transport: Arc<dyn Transport>,

    /// 配置
    config: ClientConfig,
}

impl OneFuseClient {
    /// 创建新的 OneFuse 客户端
    pub fn new(host: &str, username: &str, password: &str, config: ClientConfig) -> Result<Self> {
        info!("创建 OneFuse 客户端: {} (source: {})", host, config.source);
        let transport = HttpTransport::new(host, username, password, &config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// 使用自定义传输层创建客户端
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// 获取配置
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    // ============================================
    // 原始 REST 调用
    // ============================================

    /// GET 请求，返回原始响应
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.transport.get(path).await
    }

    /// POST 请求，返回原始响应
    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.transport.post(path, body, None).await
    }

    /// PUT 请求，返回原始响应
    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.transport.put(path, body, None).await
    }

    /// DELETE 请求，返回原始响应
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.transport.delete(path, None).await
    }

    /// GET 请求并要求 2xx，返回响应体
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.transport.get(path).await?;
        Ok(response.error_for_status("GET", path)?.body)
    }

    // ============================================
    // 模块 API
    // ============================================

    /// 获取命名模块 API
    pub fn naming(&self) -> NamingApi<'_> {
        NamingApi::new(self)
    }

    /// 获取 IPAM 模块 API
    pub fn ipam(&self) -> IpamApi<'_> {
        IpamApi::new(self)
    }

    /// 获取 DNS 模块 API
    pub fn dns(&self) -> DnsApi<'_> {
        DnsApi::new(self)
    }

    /// 获取 Microsoft AD 模块 API
    pub fn ad(&self) -> AdApi<'_> {
        AdApi::new(self)
    }

    /// 获取 Ansible Tower 模块 API
    pub fn ansible_tower(&self) -> AnsibleTowerApi<'_> {
        AnsibleTowerApi::new(self)
    }

    /// 获取脚本模块 API
    pub fn scripting(&self) -> ScriptingApi<'_> {
        ScriptingApi::new(self)
    }

    /// 获取 ServiceNow CMDB 模块 API
    pub fn cmdb(&self) -> CmdbApi<'_> {
        CmdbApi::new(self)
    }

    /// 获取 vRealize Automation 模块 API
    pub fn vra(&self) -> VraApi<'_> {
        VraApi::new(self)
    }

    /// 获取静态属性集 API
    pub fn property_sets(&self) -> PropertySetApi<'_> {
        PropertySetApi::new(self)
    }
}

impl std::fmt::Debug for OneFuseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneFuseClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    #[test]
    fn test_onefuse_client_creation() {
        let client =
            OneFuseClient::new("onefuse.example.com", "admin", "admin", ClientConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_get_json_rejects_error_status() {
        let transport = ScriptedTransport::new();
        transport.respond(
            "GET",
            "/namingPolicies/",
            ApiResponse::new(403, json!({ "detail": "denied" })),
        );
        let client = OneFuseClient::with_transport(Arc::new(transport), ClientConfig::default());

        let err = client.get_json("/namingPolicies/").await.unwrap_err();
        assert!(err.to_string().contains("denied"));
    }
}
