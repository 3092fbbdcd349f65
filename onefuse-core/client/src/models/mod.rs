//! OneFuse 数据模型
//!
//! OneFuse 返回的都是 HAL 风格的 JSON（`_links` / `_embedded`），
//! 这里只对编排流程真正依赖的字段做强类型，其余内容保持为 `serde_json::Value`。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{OneFuseError, Result};

/// OneFuse API 路径前缀
pub const API_PREFIX: &str = "/api/v3/onefuse";

/// 属性栈：模板渲染与资源申请时传递的全部变量
pub type Properties = Map<String, Value>;

/// 资源类型，决定策略集合、托管对象集合以及异步超时上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Naming,
    Ipam,
    Dns,
    Ad,
    Scripting,
    AnsibleTower,
    Cmdb,
    Vra,
    Other,
}

impl ResourceKind {
    /// 策略集合名称
    pub fn policy_collection(&self) -> Option<&'static str> {
        match self {
            Self::Naming => Some("namingPolicies"),
            Self::Ipam => Some("ipamPolicies"),
            Self::Dns => Some("dnsPolicies"),
            Self::Ad => Some("microsoftADPolicies"),
            Self::Scripting => Some("scriptingPolicies"),
            Self::AnsibleTower => Some("ansibleTowerPolicies"),
            Self::Cmdb => Some("servicenowCMDBPolicies"),
            Self::Vra => Some("vraPolicies"),
            Self::Other => None,
        }
    }

    /// 托管对象集合名称
    pub fn mo_collection(&self) -> Option<&'static str> {
        match self {
            Self::Naming => Some("customNames"),
            Self::Ipam => Some("ipamReservations"),
            Self::Dns => Some("dnsReservations"),
            Self::Ad => Some("microsoftADComputerAccounts"),
            Self::Scripting => Some("scriptingDeployments"),
            Self::AnsibleTower => Some("ansibleTowerDeployments"),
            Self::Cmdb => Some("servicenowCMDBDeployments"),
            Self::Vra => Some("vraDeployments"),
            Self::Other => None,
        }
    }

    /// 根据请求路径的第一段判断资源类型
    pub fn from_path(path: &str) -> Self {
        let collection = collection_of(path).unwrap_or_default();
        [
            Self::Naming,
            Self::Ipam,
            Self::Dns,
            Self::Ad,
            Self::Scripting,
            Self::AnsibleTower,
            Self::Cmdb,
            Self::Vra,
        ]
        .into_iter()
        .find(|kind| kind.mo_collection() == Some(collection.as_str()))
        .unwrap_or(Self::Other)
    }
}

/// 托管对象 (Managed Object)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagedObject(Map<String, Value>);

impl ManagedObject {
    /// 从 JSON 值构造，非对象时报错
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(OneFuseError::ParseError(format!(
                "托管对象必须是 JSON 对象: {}",
                other
            ))),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn tracking_id(&self) -> Option<&str> {
        self.get_str("trackingId")
    }

    pub fn set_tracking_id(&mut self, tracking_id: impl Into<String>) {
        self.0
            .insert("trackingId".to_string(), Value::String(tracking_id.into()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// 获取 `_links.<rel>.href`
    pub fn link_href(&self, rel: &str) -> Option<&str> {
        self.0
            .get("_links")
            .and_then(|links| links.get(rel))
            .and_then(|link| link.get("href"))
            .and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Successful,
    Failed,
    /// 非终态（Pending / Running / 未知）
    InProgress(String),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }
}

impl From<&str> for JobState {
    fn from(value: &str) -> Self {
        match value {
            "Successful" => Self::Successful,
            "Failed" => Self::Failed,
            other => Self::InProgress(other.to_string()),
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Successful => write!(f, "Successful"),
            Self::Failed => write!(f, "Failed"),
            Self::InProgress(state) => write!(f, "{}", state),
        }
    }
}

/// 任务元数据 (`/jobMetadata/{id}/`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    pub id: i64,

    /// 任务状态原始字符串
    #[serde(default)]
    pub job_state: Option<String>,

    #[serde(default)]
    pub job_tracking_id: Option<String>,

    #[serde(default)]
    pub response_info: Option<ResponseInfo>,
}

/// 任务响应信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// 成功时为托管对象 JSON 字符串，失败时为错误信息
    #[serde(default)]
    pub payload: Value,
}

impl JobMetadata {
    pub fn state(&self) -> JobState {
        JobState::from(self.job_state.as_deref().unwrap_or(""))
    }

    pub fn payload(&self) -> Value {
        self.response_info
            .as_ref()
            .map(|info| info.payload.clone())
            .unwrap_or(Value::Null)
    }
}

/// 策略中申请资源所需的链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLinks {
    /// 策略自身 href
    pub policy: String,

    /// 工作区 href
    pub workspace: String,
}

impl PolicyLinks {
    pub fn from_policy(policy: &Value) -> Result<Self> {
        let href = |rel: &str| {
            link_href(policy, rel)
                .map(str::to_string)
                .ok_or_else(|| OneFuseError::MissingField(format!("_links.{}.href", rel)))
        };
        Ok(Self {
            policy: href("self")?,
            workspace: href("workspace")?,
        })
    }
}

/// 获取 JSON 记录的 `_links.<rel>.href`
pub fn link_href<'a>(value: &'a Value, rel: &str) -> Option<&'a str> {
    value
        .get("_links")
        .and_then(|links| links.get(rel))
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
}

/// 将 href 转换为相对于 API 前缀的请求路径
///
/// `https://host/api/v3/onefuse/endpoints/3/` -> `/endpoints/3/`
pub fn strip_api_prefix(href: &str) -> String {
    match href.find(API_PREFIX) {
        Some(pos) => href[pos + API_PREFIX.len()..].to_string(),
        None => href.to_string(),
    }
}

/// 请求路径或 href 的集合名称（第一段）
pub fn collection_of(href: &str) -> Option<String> {
    let path = strip_api_prefix(href);
    path.split('?')
        .next()
        .unwrap_or_default()
        .split('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_api_prefix() {
        assert_eq!(strip_api_prefix("/api/v3/onefuse/endpoints/3/"), "/endpoints/3/");
        assert_eq!(
            strip_api_prefix("https://of.example.com:443/api/v3/onefuse/jobMetadata/9/"),
            "/jobMetadata/9/"
        );
        assert_eq!(strip_api_prefix("/customNames/"), "/customNames/");
    }

    #[test]
    fn test_collection_of() {
        assert_eq!(
            collection_of("/api/v3/onefuse/moduleCredentials/7/").as_deref(),
            Some("moduleCredentials")
        );
        assert_eq!(
            collection_of("/namingPolicies/?page=2").as_deref(),
            Some("namingPolicies")
        );
        assert_eq!(collection_of("/"), None);
    }

    #[test]
    fn test_resource_kind_from_path() {
        assert_eq!(ResourceKind::from_path("/customNames/"), ResourceKind::Naming);
        assert_eq!(ResourceKind::from_path("/vraDeployments/5/"), ResourceKind::Vra);
        assert_eq!(ResourceKind::from_path("/propertySets/"), ResourceKind::Other);
    }

    #[test]
    fn test_job_state_parsing() {
        assert_eq!(JobState::from("Successful"), JobState::Successful);
        assert_eq!(JobState::from("Failed"), JobState::Failed);
        assert!(!JobState::from("Running").is_terminal());
        assert!(!JobState::from("").is_terminal());
    }

    #[test]
    fn test_policy_links() {
        let policy = json!({
            "name": "machine",
            "_links": {
                "self": { "href": "/api/v3/onefuse/namingPolicies/1/" },
                "workspace": { "href": "/api/v3/onefuse/workspaces/2/" }
            }
        });
        let links = PolicyLinks::from_policy(&policy).unwrap();
        assert_eq!(links.policy, "/api/v3/onefuse/namingPolicies/1/");
        assert_eq!(links.workspace, "/api/v3/onefuse/workspaces/2/");

        let broken = json!({ "_links": { "self": { "href": "/x/1/" } } });
        assert!(matches!(
            PolicyLinks::from_policy(&broken),
            Err(OneFuseError::MissingField(_))
        ));
    }

    #[test]
    fn test_managed_object_accessors() {
        let mut mo = ManagedObject::from_value(json!({
            "id": 12,
            "name": "web01",
            "_links": { "jobMetadata": { "href": "/api/v3/onefuse/jobMetadata/4/" } }
        }))
        .unwrap();
        mo.set_tracking_id("abc");

        assert_eq!(mo.id(), Some(12));
        assert_eq!(mo.name(), Some("web01"));
        assert_eq!(mo.tracking_id(), Some("abc"));
        assert_eq!(mo.link_href("jobMetadata"), Some("/api/v3/onefuse/jobMetadata/4/"));
        assert!(ManagedObject::from_value(json!("text")).is_err());
    }
}
