//! 主机对象属性扁平化
//!
//! CloudBolt 侧的服务器对象通过 `HostResource` 声明自己暴露哪些属性，
//! 这里把它们整理成发送给 OneFuse 的属性栈。

use onefuse_client::Properties;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::Result;

/// 密码类字段的掩码
pub const MASKED_VALUE: &str = "******";

/// 自定义字段（CloudBolt 参数）
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFieldValue {
    pub name: String,
    pub value: Value,

    /// 密码类型字段的值不会发送给 OneFuse
    pub is_password: bool,
}

/// 网卡所连接的网络
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    pub name: String,
    pub gateway: Option<String>,
    pub dns1: Option<String>,
    pub dns2: Option<String>,
}

/// 网卡
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nic {
    pub index: u32,
    pub mac: Option<String>,
    pub ip: Option<String>,

    /// 显示名称，同时作为 nicLabel 与 label
    pub display: Option<String>,

    /// 地址分配方式（dhcp / static）
    pub bootproto: Option<String>,
    pub network: Option<Network>,
}

/// 硬件信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hardware {
    pub cpu_count: Option<u32>,
    pub mem_size_gb: Option<f64>,

    /// 平台电源状态，包含 `POWERON` 视为开机
    pub power_status: Option<String>,

    /// 虚拟化平台上的服务器 id
    pub platform_uuid: Option<String>,
    pub disk_size_gb: Option<f64>,
}

/// CloudBolt 服务器对象
pub trait HostResource {
    /// 服务器自身的属性；外键已解析为名称
    fn attributes(&self) -> Vec<(String, Value)>;

    /// 自定义字段（参数）
    fn custom_fields(&self) -> Vec<CustomFieldValue>;

    fn owner_email(&self) -> Option<String>;

    fn nics(&self) -> Result<Vec<Nic>>;

    fn hostname(&self) -> Option<String>;

    fn dns_domain(&self) -> Option<String>;

    fn hardware(&self) -> Result<Hardware>;

    /// 设置自定义字段，字段不存在时由实现负责创建
    fn set_property(&mut self, key: &str, value: &str) -> Result<()>;

    fn save(&mut self) -> Result<()>;
}

/// 生成发送给 OneFuse 的属性栈
pub fn get_cb_object_properties(
    resource: &dyn HostResource,
    hook_point: Option<&str>,
) -> Properties {
    let mut properties = Properties::new();

    for (key, value) in resource.attributes() {
        let value = if key.to_lowercase().contains("password") {
            MASKED_VALUE.to_string()
        } else {
            stringify(&value)
        };
        properties.insert(key, Value::String(value));
    }

    for field in resource.custom_fields() {
        let value = if field.is_password {
            Value::String(MASKED_VALUE.to_string())
        } else {
            custom_field_value(&field.name, field.value)
        };
        properties.insert(field.name, value);
    }

    match resource.owner_email() {
        Some(email) => {
            properties.insert("owner_email".to_string(), Value::String(email));
        }
        None => warn!("无法确定所有者邮箱"),
    }

    match network_info(resource) {
        Ok(info) => properties.extend(info),
        Err(e) => warn!("无法获取服务器网络信息: {}", e),
    }

    match hardware_info(resource) {
        Ok(info) => properties.extend(info),
        Err(e) => warn!("无法获取服务器硬件信息: {}", e),
    }

    if let Some(hook_point) = hook_point {
        properties.insert("hook_point".to_string(), Value::String(hook_point.to_string()));
    }

    properties
}

/// 以 `{` 或 `[` 开头（但不是 `{{` 模板）的字符串尝试按 JSON 解析
fn custom_field_value(name: &str, value: Value) -> Value {
    match value {
        Value::String(text) => {
            let looks_like_json =
                (text.starts_with('{') || text.starts_with('[')) && !text.starts_with("{{");
            if !looks_like_json {
                return Value::String(text);
            }
            match serde_json::from_str(&text) {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("JSON 解析失败, 按字符串发送: {}", name);
                    Value::String(text)
                }
            }
        }
        other => Value::String(stringify(&other)),
    }
}

fn network_info(resource: &dyn HostResource) -> Result<Properties> {
    let hostname = resource.hostname();
    let dns_domain = resource.dns_domain();
    let mut info = Properties::new();

    for nic in resource.nics()? {
        let mut entry = Map::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                entry.insert(key.to_string(), Value::String(value));
            }
        };

        put("mac", nic.mac.clone());
        put("ipAddress", nic.ip.clone());
        put("nicLabel", nic.display.clone());
        put("assignment", nic.bootproto.clone());
        put("label", nic.display.clone());
        put("network", nic.network.as_ref().map(|n| n.name.clone()));
        put("hostname", hostname.clone());
        put(
            "fqdn",
            hostname
                .as_ref()
                .zip(dns_domain.as_ref())
                .map(|(host, domain)| format!("{}.{}", host, domain)),
        );
        put("gateway", nic.network.as_ref().and_then(|n| n.gateway.clone()));
        put("dnsSuffix", dns_domain.clone());

        let dns_servers: Vec<Value> = nic
            .network
            .iter()
            .flat_map(|n| [n.dns1.clone(), n.dns2.clone()])
            .flatten()
            .filter(|server| !server.is_empty())
            .map(Value::String)
            .collect();
        entry.insert("dnsServers".to_string(), Value::Array(dns_servers));

        info.insert(format!("OneFuse_VmNic{}", nic.index), Value::Object(entry));
    }

    debug!("网络信息: {:?}", info);
    Ok(info)
}

fn hardware_info(resource: &dyn HostResource) -> Result<Properties> {
    let hardware = resource.hardware()?;
    let mut entry = Map::new();

    if let Some(cpu_count) = hardware.cpu_count {
        entry.insert("cpuCount".to_string(), json!(cpu_count));
    }
    if let Some(mem_gb) = hardware.mem_size_gb {
        entry.insert("memoryMB".to_string(), number(mem_gb * 1024.0));
        entry.insert("memoryGB".to_string(), number(mem_gb));
    }
    if let Some(power_status) = &hardware.power_status {
        let state = if power_status.contains("POWERON") { "ON" } else { "OFF" };
        entry.insert("powerState".to_string(), Value::String(state.to_string()));
    }
    if let Some(uuid) = hardware.platform_uuid {
        entry.insert("platformUuid".to_string(), Value::String(uuid));
    }
    if let Some(disk_gb) = hardware.disk_size_gb {
        entry.insert("totalStorageGB".to_string(), number(disk_gb));
    }

    debug!("硬件信息: {:?}", entry);
    let mut info = Properties::new();
    info.insert("OneFuse_VmHardware".to_string(), Value::Object(entry));
    Ok(info)
}

/// 整数值输出为整数
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
