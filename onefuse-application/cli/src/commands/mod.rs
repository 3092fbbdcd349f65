//! CLI 命令处理模块

pub mod backup; // 备份与恢复
pub mod common; // 公共工具函数
pub mod connection;
pub mod deprovision;
pub mod get;
pub mod provision;
