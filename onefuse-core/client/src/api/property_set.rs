//! 静态属性集 (Static Property Set) API
//!
//! 属性栈中以 `OneFuse_SPS_` 开头的键保存属性集名称，
//! 属性集内容会被合并回属性栈供后续模板渲染使用。

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::OneFuseClient;
use crate::error::{OneFuseError, Result};
use crate::models::Properties;

const PROPERTY_SETS: &str = "propertySets";
const CREATE_PROPERTIES_PREFIX: &str = "OneFuse_CreateProperties_";

/// 静态属性集 API
pub struct PropertySetApi<'a> {
    client: &'a OneFuseClient,
}

impl<'a> PropertySetApi<'a> {
    pub(crate) fn new(client: &'a OneFuseClient) -> Self {
        Self { client }
    }

    /// 按名称获取属性集，要求唯一匹配
    pub async fn get_by_name(&self, name: &str) -> Result<Value> {
        self.client.get_policy_by_name(PROPERTY_SETS, name).await
    }

    /// 收集属性栈引用的所有属性集的属性
    ///
    /// 键按字母序处理，后面的属性集覆盖前面的同名属性。
    /// `upstream_property` 对应的对象会被展开到顶层，`ignore_properties` 中的键被丢弃。
    pub async fn get_sps_properties(
        &self,
        properties: &Properties,
        upstream_property: &str,
        ignore_properties: &[String],
    ) -> Result<Properties> {
        let prefix = &self.client.config().property_toolkit.static_property_set_prefix;
        let mut sps_keys: Vec<&String> = properties
            .keys()
            .filter(|k| k.starts_with(prefix.as_str()))
            .collect();
        sps_keys.sort();

        let mut sps_properties = Properties::new();
        for key in sps_keys {
            debug!("读取静态属性集, 键: {}", key);
            let sps_name = properties
                .get(key)
                .and_then(Value::as_str)
                .ok_or_else(|| OneFuseError::ParseError(format!("{} 的值不是属性集名称", key)))?;

            let sps = self.get_by_name(sps_name).await?;
            let props = match sps.get("properties") {
                Some(Value::Object(props)) => props,
                _ => {
                    warn!("属性集 {} 没有 properties 字段", sps_name);
                    continue;
                }
            };

            for (prop_key, prop_value) in props {
                if prop_key == upstream_property {
                    merge_upstream(&mut sps_properties, prop_key, prop_value);
                } else if ignore_properties.iter().any(|ignored| ignored == prop_key) {
                    debug!("忽略上游属性: {}", prop_key);
                } else {
                    sps_properties.insert(prop_key.clone(), prop_value.clone());
                }
            }
        }

        Ok(sps_properties)
    }

    /// 反复合并属性集直到不再出现新的属性集引用，最多 `max_runs` 轮
    pub async fn expand(&self, properties: &mut Properties) -> Result<()> {
        let toolkit = &self.client.config().property_toolkit;

        for run in 1..=toolkit.max_runs {
            let merged = self
                .get_sps_properties(
                    properties,
                    &toolkit.upstream_property,
                    &toolkit.ignore_properties,
                )
                .await?;

            let mut changed = false;
            for (key, value) in merged {
                if properties.get(&key) != Some(&value) {
                    properties.insert(key, value);
                    changed = true;
                }
            }

            debug!("属性集展开第 {} 轮, 有变化: {}", run, changed);
            if !changed {
                break;
            }
        }
        Ok(())
    }
}

fn merge_upstream(target: &mut Properties, key: &str, value: &Value) {
    let parsed;
    let upstream = match value {
        Value::Object(map) => map,
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => {
                parsed = map;
                &parsed
            }
            _ => {
                warn!("上游属性 {} 不是 JSON 对象, 跳过", key);
                return;
            }
        },
        _ => {
            warn!("上游属性 {} 不是 JSON 对象, 跳过", key);
            return;
        }
    };

    for (upstream_key, upstream_value) in upstream {
        target.insert(upstream_key.clone(), upstream_value.clone());
    }
}

/// 收集 `OneFuse_CreateProperties_*` 中的 `{"key", "value"}` 对
///
/// 值可以是对象或 JSON 字符串，键或值为空的条目被忽略。
pub fn get_create_properties(properties: &Properties) -> Result<Properties> {
    let mut create_properties = Properties::new();

    for (key, value) in properties {
        if !key.starts_with(CREATE_PROPERTIES_PREFIX) {
            continue;
        }
        debug!("解析创建属性: {}, 值: {}", key, value);

        let object = match value {
            Value::String(text) => serde_json::from_str::<Value>(text)
                .map_err(|e| OneFuseError::ParseError(format!("{}: {}", key, e)))?,
            other => other.clone(),
        };

        let pair_key = object.get("key").and_then(Value::as_str).unwrap_or_default();
        let pair_value = object.get("value").cloned().unwrap_or(Value::Null);
        if !pair_key.is_empty() && is_present(&pair_value) {
            create_properties.insert(pair_key.to_string(), pair_value);
        }
    }

    Ok(create_properties)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}
