use std::path::PathBuf;

use onefuse_client::OneFuseError;
use thiserror::Error;

/// 备份/恢复错误类型
#[derive(Error, Debug)]
pub enum BackupError {
    /// OneFuse API 错误
    #[error("OneFuse 客户端错误: {0}")]
    Client(#[from] OneFuseError),

    /// 文件读写错误
    #[error("文件读写失败 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 序列化/反序列化错误
    #[error("JSON 处理失败 {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 目标环境中存在多条同名记录
    #[error("目标中有 {count} 条 {policy_type} 记录匹配 {name}, 跳过恢复")]
    RestoreAmbiguous {
        policy_type: String,
        name: String,
        count: usize,
    },

    /// 备份文件内容无效
    #[error("无效的备份文件 {path:?}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },
}

impl BackupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// 是否为 404 (旧版本 OneFuse 不支持的模块)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Client(OneFuseError::ApiRequestFailed { status: 404, .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
