//! 从备份目录恢复策略
//!
//! 备份文件中的链接指向源环境的 id，恢复前按 (链接类型, 标题) 在目标环境中
//! 重新解析，因此同名的工作区、凭据、端点必须先于引用它们的策略存在。

use std::path::{Path, PathBuf};

use onefuse_client::{collection_of, link_href, Filter, OneFuseError};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::backup::BackupManager;
use crate::error::{BackupError, Result};
use crate::layout::{discriminator, POLICY_TYPES};

/// 恢复凭据时使用的占位密码
pub const PLACEHOLDER_PASSWORD: &str = "Pl@ceHolder123!";

/// 恢复结果，条目为 `<policy_type>/<file_name>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
    pub ambiguous: Vec<String>,
    pub failed: Vec<RestoreFailure>,
}

/// 单个文件的恢复失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreFailure {
    pub file: String,
    pub error: String,
}

impl RestoreSummary {
    /// 是否全部成功（跳过与歧义不算失败）
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 单个文件的恢复方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestoreOutcome {
    Created,
    Updated,
    Skipped,
}

impl BackupManager {
    /// 从备份目录恢复所有策略
    ///
    /// 已存在的同名记录只有在 `overwrite` 为 true 时才会被更新；
    /// 单个文件失败不会中断其余文件的恢复。
    pub async fn restore_policies_from_file_path(
        &self,
        root: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<RestoreSummary> {
        let root = root.as_ref();
        let mut summary = RestoreSummary::default();

        for policy_type in POLICY_TYPES {
            let type_dir = root.join(policy_type);
            if !fs::try_exists(&type_dir).await.unwrap_or(false) {
                info!("策略类型目录不存在, 跳过: {}", policy_type);
                continue;
            }
            info!("恢复策略类型: {}", policy_type);

            for file in list_backup_files(&type_dir).await? {
                let label = format!(
                    "{}/{}",
                    policy_type,
                    file.file_name().and_then(|name| name.to_str()).unwrap_or_default()
                );

                match self.restore_file(policy_type, &file, overwrite).await {
                    Ok(RestoreOutcome::Created) => summary.created.push(label),
                    Ok(RestoreOutcome::Updated) => summary.updated.push(label),
                    Ok(RestoreOutcome::Skipped) => summary.skipped.push(label),
                    Err(e @ BackupError::RestoreAmbiguous { .. }) => {
                        warn!("{}. 文件: {}", e, label);
                        summary.ambiguous.push(label);
                    }
                    Err(e) => {
                        error!("恢复失败: {}, 错误: {}", label, e);
                        summary.failed.push(RestoreFailure {
                            file: label,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            "恢复完成: 新建 {}, 更新 {}, 跳过 {}, 歧义 {}, 失败 {}",
            summary.created.len(),
            summary.updated.len(),
            summary.skipped.len(),
            summary.ambiguous.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    async fn restore_file(
        &self,
        policy_type: &str,
        file: &Path,
        overwrite: bool,
    ) -> Result<RestoreOutcome> {
        let content = fs::read_to_string(file)
            .await
            .map_err(|e| BackupError::io(file, e))?;
        let record: Value = serde_json::from_str(&content).map_err(|e| BackupError::json(file, e))?;

        let name = record
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| BackupError::InvalidFile {
                path: file.to_path_buf(),
                reason: "缺少 name 字段".to_string(),
            })?;

        let mut filter = Filter::iexact("name", name);
        if let Some((field, value)) = discriminator(&record) {
            filter = filter.and(field, value);
        }

        let existing = match self.client.find_by_filter(policy_type, &filter).await {
            Ok(existing) => existing,
            Err(OneFuseError::ApiRequestFailed { status: 404, .. }) => {
                warn!("OneFuse 不支持该策略类型: {}, 文件: {:?}", policy_type, file);
                return Ok(RestoreOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        match existing.len() {
            0 => {
                info!("创建 OneFuse 内容. 策略类型: {}, 文件: {:?}", policy_type, file);
                let mut content = self.create_restore_content(policy_type, &record).await?;
                if policy_type == "moduleCredentials" {
                    content.insert(
                        "password".to_string(),
                        Value::String(PLACEHOLDER_PASSWORD.to_string()),
                    );
                    warn!("凭据已恢复, 使用前必须更新其密码: {:?}", file);
                }

                let path = format!("/{}/", policy_type);
                self.client
                    .post(&path, &Value::Object(content))
                    .await?
                    .error_for_status("POST", &path)?;
                Ok(RestoreOutcome::Created)
            }
            1 if overwrite => {
                info!("更新 OneFuse 内容. 策略类型: {}, 文件: {:?}", policy_type, file);
                let id = existing[0]
                    .get("id")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| OneFuseError::MissingField(format!("{} 的 id", name)))?;
                let content = self.create_restore_content(policy_type, &record).await?;

                let path = format!("/{}/{}/", policy_type, id);
                self.client
                    .put(&path, &Value::Object(content))
                    .await?
                    .error_for_status("PUT", &path)?;
                Ok(RestoreOutcome::Updated)
            }
            1 => {
                info!("未开启覆盖, 策略 {} 已存在, 跳过", name);
                Ok(RestoreOutcome::Skipped)
            }
            count => Err(BackupError::RestoreAmbiguous {
                policy_type: policy_type.to_string(),
                name: name.to_string(),
                count,
            }),
        }
    }

    /// 生成可在目标环境提交的记录
    ///
    /// 去掉 `id`、`microsoftEndpoint` 与 `self` 链接，其余链接替换为目标环境中的 href。
    pub async fn create_restore_content(
        &self,
        policy_type: &str,
        record: &Value,
    ) -> Result<Map<String, Value>> {
        let fields = record.as_object().ok_or_else(|| BackupError::InvalidFile {
            path: PathBuf::from(policy_type),
            reason: "备份内容不是 JSON 对象".to_string(),
        })?;

        let mut content = Map::new();
        for (key, value) in fields {
            if key != "_links" && key != "id" && key != "microsoftEndpoint" {
                content.insert(key.clone(), value.clone());
            }
        }

        let links = match fields.get("_links").and_then(Value::as_object) {
            Some(links) => links,
            None => return Ok(content),
        };

        for (rel, link) in links {
            if rel == "self" {
                continue;
            }
            match link {
                Value::Object(_) => {
                    let href = self.get_link_id(policy_type, rel, link, record).await?;
                    content.insert(rel.clone(), Value::String(href));
                }
                Value::Array(items) => {
                    let mut hrefs = Vec::with_capacity(items.len());
                    for item in items {
                        let href = self.get_link_id(policy_type, rel, item, record).await?;
                        hrefs.push(Value::String(href));
                    }
                    content.insert(rel.clone(), Value::Array(hrefs));
                }
                other => warn!("未知的链接格式: {} = {}", rel, other),
            }
        }

        Ok(content)
    }

    /// 在目标环境中按 (链接类型, 标题) 查找链接对应的 href
    async fn get_link_id(
        &self,
        policy_type: &str,
        rel: &str,
        link: &Value,
        record: &Value,
    ) -> Result<String> {
        let invalid = |reason: String| BackupError::InvalidFile {
            path: PathBuf::from(policy_type),
            reason,
        };

        let href = link
            .get("href")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("链接 {} 缺少 href", rel)))?;
        let title = link
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("链接 {} 缺少 title", rel)))?;
        let link_type =
            collection_of(href).ok_or_else(|| invalid(format!("无法识别链接类型: {}", href)))?;

        let endpoint_type = if link_type == "endpoints" {
            endpoint_type_for(policy_type, record)
        } else {
            None
        };
        debug!("解析链接: {} -> {} / {} ({:?})", rel, link_type, title, endpoint_type);

        let target = self
            .client
            .resolve_policy(&link_type, title, endpoint_type.map(|value| ("type", value)))
            .await?;

        link_href(&target, "self")
            .map(str::to_string)
            .ok_or_else(|| {
                OneFuseError::MissingField(format!("{} 的 _links.self.href", title)).into()
            })
    }
}

/// 端点链接按策略类型确定端点的 `type`
fn endpoint_type_for<'a>(policy_type: &str, record: &'a Value) -> Option<&'a str> {
    match policy_type {
        "microsoftADPolicies" => Some("microsoft"),
        "ansibleTowerPolicies" => Some("ansible_tower"),
        "servicenowCMDBPolicies" => Some("servicenow"),
        _ => record.get("type").and_then(Value::as_str),
    }
}

/// 目录下的 `.json` 文件，按文件名排序
async fn list_backup_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| BackupError::io(dir, e))?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(|e| BackupError::io(dir, e))? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|file_type| file_type.is_file())
            .unwrap_or(false);

        if is_file && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        } else if is_file {
            debug!("忽略非备份文件: {:?}", path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_type_by_policy_type() {
        let record = json!({ "type": "infoblox" });
        assert_eq!(endpoint_type_for("microsoftADPolicies", &record), Some("microsoft"));
        assert_eq!(endpoint_type_for("ansibleTowerPolicies", &record), Some("ansible_tower"));
        assert_eq!(endpoint_type_for("servicenowCMDBPolicies", &record), Some("servicenow"));
        assert_eq!(endpoint_type_for("ipamPolicies", &record), Some("infoblox"));
        assert_eq!(endpoint_type_for("namingPolicies", &json!({})), None);
    }

    #[tokio::test]
    async fn test_list_backup_files_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let files = list_backup_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
