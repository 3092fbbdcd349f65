//! 属性栈工具函数
//!
//! CloudBolt 插件用 `OneFuse_<Module>Policy_<suffix>` 形式的参数声明要执行的策略，
//! 值的格式为 `<endpoint>:<policy>[:<extras>[:<extras2>]]`。

use onefuse_client::Properties;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{CloudBoltError, Result};

/// 脚本类 MO 超过该长度时清理输出
pub const SCRIPTING_OUTPUT_LIMIT: usize = 5000;

/// 反向执行顺序的钩子点
const DEPROVISION_ORDER: [&str; 4] = [
    "PostProvision",
    "PreApplication",
    "PreCreateResource",
    "HostnameOverwrite",
];

/// 从属性值解析出的连接与策略
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionPolicyValue {
    /// OneFuse 连接名称
    pub endpoint: String,
    pub policy: String,

    /// 模块相关的附加参数（DNS 区域、Ansible 主机列表等）
    pub extras: String,
    pub extras2: String,

    /// 属性名中前缀之后的部分
    pub suffix: String,
}

/// 前缀按正则表达式从属性名开头匹配
fn prefix_pattern(prefix: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", prefix)).map_err(|e| CloudBoltError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: e.to_string(),
    })
}

/// 解析所有匹配前缀的属性
pub fn get_connection_and_policy_values(
    prefix: &str,
    stack: &Properties,
) -> Result<Vec<ConnectionPolicyValue>> {
    let pattern = prefix_pattern(prefix)?;
    let mut values = Vec::new();

    for (key, value) in stack {
        if !pattern.is_match(key) {
            continue;
        }

        let text = convert_object_to_string(value);
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() < 2 {
            error!("OneFuse 属性值格式错误. 键: {}, 值: {}", key, text);
            return Err(CloudBoltError::InvalidPropertyValue {
                key: key.clone(),
                value: text,
            });
        }

        let part = |index: usize| parts.get(index).map(|s| s.to_string()).unwrap_or_default();
        values.push(ConnectionPolicyValue {
            endpoint: part(0),
            policy: part(1),
            extras: part(2),
            extras2: part(3),
            suffix: key.get(prefix.len()..).unwrap_or_default().to_string(),
        });
    }

    Ok(values)
}

/// 匹配前缀的属性名
pub fn get_matching_property_names(prefix: &str, stack: &Properties) -> Result<Vec<String>> {
    let pattern = prefix_pattern(prefix)?;
    let names: Vec<String> = stack.keys().filter(|key| pattern.is_match(key)).cloned().collect();
    debug!("匹配的属性名: {:?}", names);
    Ok(names)
}

/// 匹配前缀的属性值
pub fn get_matching_properties(prefix: &str, stack: &Properties) -> Result<Vec<Value>> {
    let pattern = prefix_pattern(prefix)?;
    let values: Vec<Value> = stack
        .iter()
        .filter(|(key, _)| pattern.is_match(key))
        .map(|(_, value)| value.clone())
        .collect();
    debug!("匹配的属性值: {:?}", values);
    Ok(values)
}

/// 清理 MO 中的作业输出，避免写回主机的参数过大
///
/// - `ansible_tower`：清空所有作业结果的 `output`
/// - `scripting`：序列化长度超过 [`SCRIPTING_OUTPUT_LIMIT`] 时清空输出，
///   长度按 `", "` / `": "` 分隔符并转义非 ASCII 字符计算
pub fn delete_output_job_results(managed_object: &mut Value, run_type: &str) {
    match run_type {
        "ansible_tower" => {
            for field in ["provisioningJobResults", "deprovisioningJobResults"] {
                if let Some(results) = managed_object.get_mut(field).and_then(Value::as_array_mut) {
                    for result in results.iter_mut().filter(|r| r.is_object()) {
                        result["output"] = Value::String(String::new());
                    }
                    debug!("已清理 Ansible Tower 输出: {} ({} 条)", field, results.len());
                }
            }
        }
        "scripting" => {
            let length = spaced_json_len(managed_object);
            if length <= SCRIPTING_OUTPUT_LIMIT {
                return;
            }
            debug!("MO 长度 {} 超过 {}, 清理脚本输出", length, SCRIPTING_OUTPUT_LIMIT);
            for field in ["provisioningDetails", "deprovisioningDetails"] {
                match managed_object.get_mut(field) {
                    Some(details) if details.is_object() => {
                        details["output"] = Value::Array(Vec::new());
                    }
                    _ => debug!("MO 不包含需要清理的 {}", field),
                }
            }
        }
        other => debug!("无效的 run_type: {}", other),
    }
}

/// 以 `", "` 和 `": "` 为分隔符、非 ASCII 字符转义为 `\uXXXX` 时的 JSON 文本长度
fn spaced_json_len(value: &Value) -> usize {
    match value {
        Value::Null | Value::Bool(true) => 4,
        Value::Bool(false) => 5,
        Value::Number(number) => number.to_string().len(),
        Value::String(text) => quoted_len(text),
        Value::Array(items) => {
            let separators = 2 * items.len().saturating_sub(1);
            2 + separators + items.iter().map(spaced_json_len).sum::<usize>()
        }
        Value::Object(map) => {
            let separators = 2 * map.len().saturating_sub(1);
            let entries: usize = map
                .iter()
                .map(|(key, value)| quoted_len(key) + 2 + spaced_json_len(value))
                .sum();
            2 + separators + entries
        }
    }
}

fn quoted_len(text: &str) -> usize {
    let body: usize = text
        .chars()
        .map(|c| match c {
            '"' | '\\' | '\n' | '\r' | '\t' | '\u{8}' | '\u{c}' => 2,
            c if (c as u32) < 0x20 => 6,
            c if c.is_ascii() => 1,
            c => 6 * c.len_utf16(),
        })
        .sum();
    body + 2
}

/// 按反向执行顺序排列待删除的属性
///
/// 钩子点依次为 PostProvision、PreApplication、PreCreateResource、HostnameOverwrite，
/// 同一钩子点内按 `OneFuse_Suffix` 降序。不属于这些钩子点的条目被丢弃。
pub fn sort_deprovision_props(props: Vec<Value>) -> Vec<Value> {
    let mut sorted = Vec::with_capacity(props.len());

    for state in DEPROVISION_ORDER {
        let mut group: Vec<Value> = props
            .iter()
            .filter(|prop| prop["OneFuse_CBHookPointString"] == state)
            .cloned()
            .collect();
        group.sort_by(|a, b| suffix_of(b).cmp(&suffix_of(a)));
        sorted.extend(group);
    }

    debug!("排序后的删除属性: {:?}", sorted);
    sorted
}

fn suffix_of(prop: &Value) -> String {
    convert_object_to_string(&prop["OneFuse_Suffix"])
}

/// 对象和数组序列化为 JSON，字符串原样返回
pub fn convert_object_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Object(_) | Value::Array(_) => {
            debug!("对象已转换为字符串");
            value.to_string()
        }
        other => other.to_string(),
    }
}
