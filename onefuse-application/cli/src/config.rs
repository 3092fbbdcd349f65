//! CLI 配置管理
//!
//! **数据存储方式**: TOML 文件 (~/.config/onefuse/config.toml)
//!
//! ```toml
//! default_connection = "prod"
//! log_level = "info"
//!
//! [connections.prod]
//! host = "onefuse.example.com"
//! username = "admin"
//! password = "secret"
//!
//! [client]
//! poll_interval_ms = 5000
//! ```

use anyhow::{Context, Result};
use onefuse_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// 默认连接名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_connection: Option<String>,

    /// 日志级别，命令行 `--log-level` 优先
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// OneFuse 连接列表
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,

    /// 客户端配置（协议、端口、超时等）
    #[serde(default)]
    pub client: ClientConfig,
}

/// OneFuse 连接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// 主机地址
    pub host: String,

    pub username: String,
    pub password: String,

    /// 覆盖 `[client]` 中的端口
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// 覆盖 `[client]` 中的协议
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// 覆盖 `[client]` 中的证书校验开关
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_certs: Option<bool>,
}

impl CliConfig {
    /// 获取配置文件路径
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("无法获取用户主目录")?;
        Ok(home.join(".config").join("onefuse").join("config.toml"))
    }

    /// 加载配置
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 从指定路径加载配置，文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {:?}", path))
    }

    /// 保存配置
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建配置目录失败: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("序列化配置失败")?;

        fs::write(path, content).with_context(|| format!("写入配置文件失败: {:?}", path))?;

        Ok(())
    }

    /// 添加连接
    pub fn add_connection(&mut self, name: &str, connection: ConnectionConfig) -> Result<()> {
        if self.connections.contains_key(name) {
            anyhow::bail!("连接 {} 已存在", name);
        }

        self.connections.insert(name.to_string(), connection);

        // 第一个连接设为默认连接
        if self.default_connection.is_none() {
            self.default_connection = Some(name.to_string());
        }

        Ok(())
    }

    /// 移除连接
    pub fn remove_connection(&mut self, name: &str) -> Result<()> {
        if self.connections.remove(name).is_none() {
            anyhow::bail!("连接 {} 不存在", name);
        }

        if self.default_connection.as_deref() == Some(name) {
            self.default_connection = None;
        }

        Ok(())
    }

    /// 设置默认连接
    pub fn set_default_connection(&mut self, name: &str) -> Result<()> {
        if !self.connections.contains_key(name) {
            anyhow::bail!("连接 {} 不存在", name);
        }

        self.default_connection = Some(name.to_string());
        Ok(())
    }

    /// 选择连接：命令行指定的优先，否则使用默认连接
    pub fn resolve_connection(&self, name: Option<&str>) -> Result<(&str, &ConnectionConfig)> {
        let name = name
            .or(self.default_connection.as_deref())
            .context("未指定连接，请使用 --connection 或 `onefuse connection add` 添加连接")?;

        self.connections
            .get_key_value(name)
            .map(|(name, connection)| (name.as_str(), connection))
            .with_context(|| format!("连接 {} 不存在", name))
    }

    /// 合并连接级别的覆盖项，得到该连接的客户端配置
    pub fn client_config_for(&self, connection: &ConnectionConfig) -> ClientConfig {
        let mut config = self.client.clone();
        if let Some(port) = connection.port {
            config.port = port;
        }
        if let Some(protocol) = &connection.protocol {
            config.protocol = protocol.clone();
        }
        if let Some(verify_certs) = connection.verify_certs {
            config.verify_certs = verify_certs;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn connection(host: &str) -> ConnectionConfig {
        ConnectionConfig {
            host: host.to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            port: None,
            protocol: None,
            verify_certs: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.connections.is_empty());
        assert_eq!(config.default_connection, None);
        assert_eq!(config.client.port, 443);
        assert_eq!(config.client.source, "PYTHON");
    }

    #[test]
    fn test_add_remove_connection() {
        let mut config = CliConfig::default();

        config.add_connection("prod", connection("onefuse.example.com")).unwrap();
        assert_eq!(config.default_connection, Some("prod".to_string()));

        config.add_connection("lab", connection("onefuse.lab")).unwrap();
        assert_eq!(config.default_connection, Some("prod".to_string())); // 默认连接不变
        assert!(config.add_connection("lab", connection("other")).is_err());

        config.remove_connection("prod").unwrap();
        assert_eq!(config.default_connection, None);
        assert!(config.remove_connection("prod").is_err());
    }

    #[test]
    fn test_resolve_connection() {
        let mut config = CliConfig::default();
        assert!(config.resolve_connection(None).is_err());

        config.add_connection("prod", connection("onefuse.example.com")).unwrap();
        config.add_connection("lab", connection("onefuse.lab")).unwrap();

        let (name, prod) = config.resolve_connection(None).unwrap();
        assert_eq!(name, "prod");
        assert_eq!(prod.host, "onefuse.example.com");

        let (name, _) = config.resolve_connection(Some("lab")).unwrap();
        assert_eq!(name, "lab");

        let err = config.resolve_connection(Some("missing")).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_connection_overrides_client_config() {
        let mut config = CliConfig::default();
        config.client.poll_interval_ms = 1000;

        let lab = ConnectionConfig {
            port: Some(8443),
            protocol: Some("http".to_string()),
            verify_certs: Some(true),
            ..connection("onefuse.lab")
        };
        let client = config.client_config_for(&lab);
        assert_eq!(client.port, 8443);
        assert_eq!(client.protocol, "http");
        assert!(client.verify_certs);
        assert_eq!(client.poll_interval_ms, 1000);

        let plain = config.client_config_for(&connection("onefuse.example.com"));
        assert_eq!(plain.port, 443);
        assert_eq!(plain.protocol, "https");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("onefuse").join("config.toml");

        assert!(CliConfig::load_from(&path).unwrap().connections.is_empty());

        let mut config = CliConfig::default();
        config.log_level = Some("debug".to_string());
        config.client.timeouts.vra = 90;
        config
            .add_connection(
                "prod",
                ConnectionConfig {
                    port: Some(8443),
                    ..connection("onefuse.example.com")
                },
            )
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.default_connection, Some("prod".to_string()));
        assert_eq!(loaded.log_level, Some("debug".to_string()));
        assert_eq!(loaded.connections["prod"].port, Some(8443));
        assert_eq!(loaded.client.timeouts.vra, 90);
    }

    #[test]
    fn test_partial_client_table_uses_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            default_connection = "prod"

            [connections.prod]
            host = "onefuse.example.com"
            username = "admin"
            password = "secret"

            [client]
            poll_interval_ms = 2000
            "#,
        )
        .unwrap();

        assert_eq!(config.client.poll_interval_ms, 2000);
        assert_eq!(config.client.port, 443);
        assert_eq!(config.client.property_toolkit.max_runs, 3);
    }
}
