//! OneFuse REST API 客户端
//!
//! 封装 OneFuse 平台的资源申请流程：渲染策略名、按名称解析策略、
//! 提交申请并轮询异步任务直到完成。
//!
//! # 功能
//!
//! - **传输层** (`Transport` / `HttpTransport`): 基本认证、固定请求头、跟踪 ID
//! - **模板渲染** (`OneFuseClient::render`): 调用 `/templateTester/`
//! - **策略解析** (`OneFuseClient::resolve_policy`): 唯一匹配，零条或多条报错
//! - **任务编排** (`OneFuseClient::request` / `deprovision`): 202 异步任务轮询与超时
//! - **模块 API**: 命名、IPAM、DNS、AD、Ansible Tower、脚本、CMDB、vRA、静态属性集
//!
//! # 示例
//!
//! ```ignore
//! use onefuse_client::{ClientConfig, OneFuseClient, Properties};
//!
//! let config = ClientConfig::default();
//! let client = OneFuseClient::new("onefuse.example.com", "admin", "secret", config)?;
//!
//! let mut properties = Properties::new();
//! properties.insert("env".into(), "prod".into());
//!
//! // 申请主机名
//! let name = client.naming().provision("machine", &properties, None).await?;
//! properties.insert("hostname".into(), name.name().unwrap_or_default().into());
//!
//! // 预留 IP
//! let ip = client.ipam().provision("atl-prod", &properties, name.tracking_id()).await?;
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod job;
pub mod models;
pub mod policy;
pub mod template;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use api::property_set::get_create_properties;
pub use client::OneFuseClient;
pub use config::{AsyncTimeouts, ClientConfig, PropertyToolkitConfig};
pub use error::{OneFuseError, Result};
pub use job::{PollSettings, RequestMethod};
pub use models::{
    collection_of, link_href, strip_api_prefix, JobMetadata, JobState, ManagedObject, PolicyLinks,
    Properties, ResourceKind, API_PREFIX,
};
pub use policy::{embedded_items, Filter};
pub use template::needs_render;
pub use transport::{ApiResponse, HttpTransport, Transport, TRACKING_ID_HEADER};
