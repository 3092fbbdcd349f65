//! OneFuse 模块 API
//!
//! 每个模块封装一类托管对象的申请与删除：
//! - 命名 (NamingApi)
//! - IP 地址管理 (IpamApi)
//! - DNS 记录 (DnsApi)
//! - Microsoft AD 计算机账户 (AdApi)
//! - Ansible Tower 部署 (AnsibleTowerApi)
//! - 脚本部署 (ScriptingApi)
//! - ServiceNow CMDB (CmdbApi)
//! - vRealize Automation 部署 (VraApi)
//! - 静态属性集 (PropertySetApi)

pub mod ad;
pub mod ansible_tower;
pub mod cmdb;
pub mod dns;
pub mod ipam;
pub mod naming;
pub mod property_set;
pub mod scripting;
pub mod vra;

pub use ad::AdApi;
pub use ansible_tower::AnsibleTowerApi;
pub use cmdb::CmdbApi;
pub use dns::DnsApi;
pub use ipam::IpamApi;
pub use naming::NamingApi;
pub use property_set::PropertySetApi;
pub use scripting::ScriptingApi;
pub use vra::VraApi;

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::OneFuseClient;
use crate::error::{OneFuseError, Result};
use crate::models::{Properties, ResourceKind};

/// 渲染策略名并解析策略，返回 `{policy, workspace, templateProperties}`
pub(crate) async fn policy_template(
    client: &OneFuseClient,
    kind: ResourceKind,
    policy_name: &str,
    properties: &Properties,
) -> Result<Map<String, Value>> {
    let collection = policy_collection(kind)?;
    let rendered_name = client.render(policy_name, properties).await?;
    debug!("解析策略: {} / {}", collection, rendered_name);

    let links = client.resolve_policy_links(collection, &rendered_name).await?;

    let mut template = Map::new();
    template.insert("policy".to_string(), Value::String(links.policy));
    template.insert("workspace".to_string(), Value::String(links.workspace));
    template.insert(
        "templateProperties".to_string(),
        Value::Object(properties.clone()),
    );
    Ok(template)
}

/// 托管对象集合路径 `/{collection}/`
pub(crate) fn collection_path(kind: ResourceKind) -> Result<String> {
    Ok(format!("/{}/", mo_collection(kind)?))
}

/// 托管对象路径 `/{collection}/{id}/`
pub(crate) fn item_path(kind: ResourceKind, id: i64) -> Result<String> {
    Ok(format!("/{}/{}/", mo_collection(kind)?, id))
}

/// 从属性栈读取主机名
pub(crate) fn hostname(properties: &Properties) -> Result<String> {
    properties
        .get("hostname")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| OneFuseError::MissingField("hostname".to_string()))
}

fn policy_collection(kind: ResourceKind) -> Result<&'static str> {
    kind.policy_collection()
        .ok_or_else(|| OneFuseError::ConfigError(format!("{:?} 没有策略集合", kind)))
}

fn mo_collection(kind: ResourceKind) -> Result<&'static str> {
    kind.mo_collection()
        .ok_or_else(|| OneFuseError::ConfigError(format!("{:?} 没有托管对象集合", kind)))
}
