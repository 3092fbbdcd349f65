//! 公共工具函数模块
//!
//! 提供各命令模块共享的功能，包括：
//! - 按连接配置创建 OneFuse 客户端
//! - 读取属性文件
//! - JSON 输出

use anyhow::{Context, Result};
use onefuse_client::{OneFuseClient, Properties};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::CliConfig;

/// 使用指定（或默认）连接创建客户端
pub fn create_client(config: &CliConfig, connection: Option<&str>) -> Result<OneFuseClient> {
    let (name, connection) = config.resolve_connection(connection)?;
    info!("使用连接: {} ({})", name, connection.host);

    OneFuseClient::new(
        &connection.host,
        &connection.username,
        &connection.password,
        config.client_config_for(connection),
    )
    .with_context(|| format!("创建 OneFuse 客户端失败: {}", name))
}

/// 读取属性文件，顶层必须是 JSON 对象
pub fn load_properties(path: &Path) -> Result<Properties> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("读取属性文件失败: {:?}", path))?;

    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("解析属性文件失败: {:?}", path))?;

    match value {
        Value::Object(properties) => Ok(properties),
        _ => anyhow::bail!("属性文件必须是 JSON 对象: {:?}", path),
    }
}

/// JSON 格式输出
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
