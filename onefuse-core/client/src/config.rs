//! 客户端配置
//!
//! 所有字段都有默认值，可以直接从 TOML 的 `[client]` 表反序列化。

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::ResourceKind;

/// OneFuse 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// 协议 (https / http)
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// 端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求来源，作为 SOURCE 请求头发送，OneFuse 任务中显示为 Source
    #[serde(default = "default_source")]
    pub source: String,

    /// 是否验证 SSL 证书
    #[serde(default)]
    pub verify_certs: bool,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// 任务轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// vRA 部署的任务轮询间隔（毫秒）
    #[serde(default = "default_vra_poll_interval_ms")]
    pub vra_poll_interval_ms: u64,

    /// 各模块异步任务超时上限
    #[serde(default)]
    pub timeouts: AsyncTimeouts,

    /// Property Toolkit 配置
    #[serde(default)]
    pub property_toolkit: PropertyToolkitConfig,
}

/// 异步任务超时上限（分钟）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncTimeouts {
    #[serde(default = "default_timeout_short")]
    pub naming: u64,

    #[serde(default = "default_timeout_short")]
    pub ipam: u64,

    #[serde(default = "default_timeout_short")]
    pub dns: u64,

    #[serde(default = "default_timeout_ad")]
    pub ad: u64,

    #[serde(default = "default_timeout_scripting")]
    pub scripting: u64,

    #[serde(default = "default_timeout_long")]
    pub ansible_tower: u64,

    #[serde(default = "default_timeout_long")]
    pub vra: u64,

    /// 其他资源（包括 ServiceNow CMDB）
    #[serde(default = "default_timeout_short")]
    pub other: u64,
}

/// Property Toolkit 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyToolkitConfig {
    /// 静态属性集前缀
    #[serde(default = "default_sps_prefix")]
    pub static_property_set_prefix: String,

    /// 最大执行轮数
    #[serde(default = "default_max_runs")]
    pub max_runs: u32,

    /// 合并属性集时忽略的属性
    #[serde(default = "default_ignore_properties")]
    pub ignore_properties: Vec<String>,

    /// 上游属性，其内容会被展开合并
    #[serde(default = "default_upstream_property")]
    pub upstream_property: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            port: default_port(),
            source: default_source(),
            verify_certs: false,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
            vra_poll_interval_ms: default_vra_poll_interval_ms(),
            timeouts: AsyncTimeouts::default(),
            property_toolkit: PropertyToolkitConfig::default(),
        }
    }
}

impl Default for AsyncTimeouts {
    fn default() -> Self {
        Self {
            naming: default_timeout_short(),
            ipam: default_timeout_short(),
            dns: default_timeout_short(),
            ad: default_timeout_ad(),
            scripting: default_timeout_scripting(),
            ansible_tower: default_timeout_long(),
            vra: default_timeout_long(),
            other: default_timeout_short(),
        }
    }
}

impl Default for PropertyToolkitConfig {
    fn default() -> Self {
        Self {
            static_property_set_prefix: default_sps_prefix(),
            max_runs: default_max_runs(),
            ignore_properties: default_ignore_properties(),
            upstream_property: default_upstream_property(),
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn vra_poll_interval(&self) -> Duration {
        Duration::from_millis(self.vra_poll_interval_ms)
    }
}

impl AsyncTimeouts {
    /// 按资源类型获取超时上限
    pub fn ceiling(&self, kind: ResourceKind) -> Duration {
        let minutes = match kind {
            ResourceKind::Naming => self.naming,
            ResourceKind::Ipam => self.ipam,
            ResourceKind::Dns => self.dns,
            ResourceKind::Ad => self.ad,
            ResourceKind::Scripting => self.scripting,
            ResourceKind::AnsibleTower => self.ansible_tower,
            ResourceKind::Vra => self.vra,
            ResourceKind::Cmdb | ResourceKind::Other => self.other,
        };
        Duration::from_secs(minutes.saturating_mul(60))
    }

    /// 按请求路径获取超时上限
    pub fn ceiling_for_path(&self, path: &str) -> Duration {
        self.ceiling(ResourceKind::from_path(path))
    }
}

// 默认值函数
fn default_protocol() -> String {
    "https".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_source() -> String {
    "PYTHON".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_vra_poll_interval_ms() -> u64 {
    30_000
}

fn default_timeout_short() -> u64 {
    10
}

fn default_timeout_ad() -> u64 {
    15
}

fn default_timeout_scripting() -> u64 {
    90
}

fn default_timeout_long() -> u64 {
    120
}

fn default_sps_prefix() -> String {
    "OneFuse_SPS_".to_string()
}

fn default_max_runs() -> u32 {
    3
}

fn default_ignore_properties() -> Vec<String> {
    vec![
        "OneFuse_VRA7_Props".to_string(),
        "OneFuse_VRA8_Props".to_string(),
        "OneFuse_TF_Props".to_string(),
    ]
}

fn default_upstream_property() -> String {
    "OneFuse_CB_Props".to_string()
}
