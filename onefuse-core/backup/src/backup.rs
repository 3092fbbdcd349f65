use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use onefuse_client::{embedded_items, link_href, strip_api_prefix, OneFuseClient, OneFuseError};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{BackupError, Result};
use crate::layout::{backup_file_path, POLICY_TYPES};

/// 策略备份/恢复管理器
pub struct BackupManager {
    pub(crate) client: OneFuseClient,
}

/// 备份结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    /// 每种策略类型写入的文件数
    pub written: BTreeMap<String, usize>,

    /// 目标 OneFuse 不支持 (404) 而跳过的策略类型
    pub skipped_types: Vec<String>,
}

impl BackupSummary {
    pub fn total_files(&self) -> usize {
        self.written.values().sum()
    }
}

impl BackupManager {
    /// 创建备份管理器
    pub fn new(client: OneFuseClient) -> Self {
        Self { client }
    }

    /// 备份所有策略到 `root` 目录
    ///
    /// 集合返回 404 时跳过该类型，其余错误直接返回。
    pub async fn backup_policies(&self, root: impl AsRef<Path>) -> Result<BackupSummary> {
        let root = root.as_ref();
        let mut summary = BackupSummary::default();

        for policy_type in POLICY_TYPES {
            info!("备份策略类型: {}", policy_type);
            match self.backup_policy_type(root, policy_type).await {
                Ok(count) => {
                    summary.written.insert(policy_type.to_string(), count);
                }
                Err(e) if e.is_not_found() => {
                    warn!("OneFuse 不支持该策略类型, 跳过: {}", policy_type);
                    summary.skipped_types.push(policy_type.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "备份完成: {} 个文件, 跳过 {} 个策略类型",
            summary.total_files(),
            summary.skipped_types.len()
        );
        Ok(summary)
    }

    /// 逐页备份一种策略类型，返回写入的文件数
    async fn backup_policy_type(&self, root: &Path, policy_type: &str) -> Result<usize> {
        let mut written = 0;
        let mut page_path = format!("/{}/", policy_type);

        loop {
            let page = self.client.get_json(&page_path).await?;

            for mut record in embedded_items(&page, policy_type) {
                if policy_type == "endpoints" {
                    self.inline_credential_title(&mut record).await?;
                }
                self.write_record(root, policy_type, &record).await?;
                written += 1;
            }

            match link_href(&page, "next") {
                Some(next) => page_path = next_page_path(policy_type, next),
                None => break,
            }
        }

        Ok(written)
    }

    /// 端点的凭据链接补上凭据名称，恢复时据此查找目标环境中的凭据
    async fn inline_credential_title(&self, record: &mut Value) -> Result<()> {
        let href = match link_href(record, "credential") {
            Some(href) => href.to_string(),
            None => return Ok(()),
        };

        // 凭据读取失败不能当作 404 跳过整个类型
        let credential = self
            .client
            .get_json(&strip_api_prefix(&href))
            .await
            .map_err(|e| BackupError::InvalidFile {
                path: PathBuf::from(&href),
                reason: format!("无法读取凭据链接: {}", e),
            })?;
        let name = credential
            .get("name")
            .cloned()
            .ok_or_else(|| OneFuseError::MissingField(format!("{} 的 name", href)))?;
        debug!("凭据名称: {}", name);

        if let Some(link) = record
            .get_mut("_links")
            .and_then(|links| links.get_mut("credential"))
            .and_then(Value::as_object_mut)
        {
            link.insert("title".to_string(), name);
        }
        Ok(())
    }

    async fn write_record(&self, root: &Path, policy_type: &str, record: &Value) -> Result<()> {
        let path = backup_file_path(root, policy_type, record).ok_or_else(|| {
            BackupError::InvalidFile {
                path: root.join(policy_type),
                reason: format!("记录缺少 name 字段: {}", record),
            }
        })?;
        debug!("备份 {} 策略: {:?}", policy_type, path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BackupError::io(parent, e))?;
        }

        let content =
            serde_json::to_string_pretty(record).map_err(|e| BackupError::json(&path, e))?;
        fs::write(&path, content)
            .await
            .map_err(|e| BackupError::io(&path, e))?;
        Ok(())
    }
}

/// 下一页 href 只保留查询串，拼回当前集合路径
fn next_page_path(policy_type: &str, next_href: &str) -> String {
    match next_href.split_once('?') {
        Some((_, query)) => format!("/{}/?{}", policy_type, query),
        None => strip_api_prefix(next_href),
    }
}
