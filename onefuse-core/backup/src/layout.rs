//! 备份目录布局
//!
//! ```text
//! <root>
//! |--- moduleCredentials
//! |    |--- svc_cred.json
//! |--- endpoints
//! |    |--- ansible_tower_cloudbolt_io.json
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;

/// 需要备份的策略类型，按恢复时的依赖顺序排列
pub const POLICY_TYPES: [&str; 13] = [
    "moduleCredentials",
    "endpoints",
    "validators",
    "namingSequences",
    "namingPolicies",
    "propertySets",
    "ipamPolicies",
    "dnsPolicies",
    "microsoftADPolicies",
    "ansibleTowerPolicies",
    "scriptingPolicies",
    "servicenowCMDBPolicies",
    "vraPolicies",
];

/// 记录的区分字段：`type` 优先，其次 `endpointType`
pub fn discriminator(record: &Value) -> Option<(&'static str, &str)> {
    ["type", "endpointType"].into_iter().find_map(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .map(|value| (field, value))
    })
}

/// 备份文件名 `<discriminator>_<name>.json` 或 `<name>.json`
pub fn backup_file_name(record: &Value) -> Option<String> {
    let name = record.get("name").and_then(Value::as_str)?;
    let stem = match discriminator(record) {
        Some((_, value)) => format!("{}_{}", value, name),
        None => name.to_string(),
    };
    Some(format!("{}.json", sanitize(&stem)))
}

/// 备份文件完整路径
pub fn backup_file_path(root: &Path, policy_type: &str, record: &Value) -> Option<PathBuf> {
    backup_file_name(record).map(|file_name| root.join(policy_type).join(file_name))
}

/// 名称中的路径分隔符替换为 `_`
fn sanitize(stem: &str) -> String {
    stem.replace(&['/', '\\'][..], "_")
}
