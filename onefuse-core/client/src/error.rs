//! OneFuse 客户端错误定义

use thiserror::Error;

/// OneFuse 客户端错误类型
#[derive(Error, Debug)]
pub enum OneFuseError {
    /// 网络层失败（连接、TLS、读取响应体等）
    #[error("HTTP 错误: {0}")]
    HttpError(String),

    /// 服务端返回非 2xx 状态码
    #[error("API 请求失败 [{status}] {method} {path}: {body}")]
    ApiRequestFailed {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("未找到策略: {policy_type} 中不存在名为 {name} 的记录")]
    PolicyNotFound { policy_type: String, name: String },

    #[error("策略不唯一: {policy_type} 中有 {count} 条记录匹配 {name}")]
    AmbiguousPolicy {
        policy_type: String,
        name: String,
        count: usize,
    },

    #[error("模板渲染失败: {reason}. 模板: {template}")]
    TemplateRenderFailed { template: String, reason: String },

    /// 异步任务以 Failed 结束，payload 为服务端返回的错误信息
    #[error("OneFuse 任务失败 (job {job_id}) {state}: {payload}")]
    JobFailed {
        job_id: i64,
        state: String,
        payload: serde_json::Value,
    },

    #[error("操作超时: {path} 的任务超过 {seconds} 秒仍未完成")]
    Timeout { path: String, seconds: u64 },

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("响应缺少字段: {0}")]
    MissingField(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// OneFuse 客户端结果类型
pub type Result<T> = std::result::Result<T, OneFuseError>;
