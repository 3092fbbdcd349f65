use onefuse_client::OneFuseError;
use thiserror::Error;

/// CloudBolt 适配器错误类型
#[derive(Error, Debug)]
pub enum CloudBoltError {
    /// OneFuse API 错误
    #[error("OneFuse 客户端错误: {0}")]
    Client(#[from] OneFuseError),

    /// 找不到带 onefuse 标签的连接信息
    #[error("未找到连接信息: {name} (标签: {label})")]
    ConnectionNotFound { name: String, label: String },

    /// OneFuse 属性值格式错误
    #[error("OneFuse 属性值格式错误. 键: {key}, 值: {value}")]
    InvalidPropertyValue { key: String, value: String },

    /// 属性名前缀不是合法的正则表达式
    #[error("无效的属性名前缀: {prefix}: {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    /// 主机平台操作失败
    #[error("主机操作失败: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, CloudBoltError>;
