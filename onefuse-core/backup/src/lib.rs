//! OneFuse 策略备份与恢复
//!
//! - 备份：逐页读取每种策略类型，每条记录保存为一个 JSON 文件
//! - 恢复：按依赖顺序读取备份文件，在目标环境中重新解析链接后创建或更新
//!
//! # 示例
//!
//! ```ignore
//! use onefuse_backup::BackupManager;
//!
//! let backups = BackupManager::new(client);
//! backups.backup_policies("/var/opt/onefuse-backups").await?;
//! let summary = backups.restore_policies_from_file_path("/var/opt/onefuse-backups", false).await?;
//! ```

pub mod backup;
pub mod error;
pub mod layout;
pub mod restore;

pub use backup::{BackupManager, BackupSummary};
pub use error::{BackupError, Result};
pub use layout::{backup_file_name, POLICY_TYPES};
pub use restore::{RestoreFailure, RestoreSummary, PLACEHOLDER_PASSWORD};
