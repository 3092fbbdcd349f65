//! HTTP 传输层
//!
//! `Transport` 只暴露四个显式的 HTTP 动词，上层的编排逻辑不关心底层是
//! reqwest 还是测试用的内存实现。

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONNECTION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{OneFuseError, Result};
use crate::models::API_PREFIX;

/// 响应头中的跟踪 ID
pub const TRACKING_ID_HEADER: &str = "Tracking-Id";

/// API 响应
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP 状态码
    pub status: u16,

    /// `Tracking-Id` 响应头
    pub tracking_id: Option<String>,

    /// 响应体；空响应为 `Null`，非 JSON 文本保存为字符串
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            tracking_id: None,
            body,
        }
    }

    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 非 2xx 时转换为 `ApiRequestFailed`
    pub fn error_for_status(self, method: &str, path: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(OneFuseError::ApiRequestFailed {
                method: method.to_string(),
                path: path.to_string(),
                status: self.status,
                body: body_text(&self.body),
            })
        }
    }
}

/// 响应体转文本，用于错误信息
pub fn body_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// OneFuse 传输层接口
///
/// `path` 均为相对于 `/api/v3/onefuse` 的路径，例如 `/namingPolicies/`。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse>;

    async fn post(&self, path: &str, body: &Value, tracking_id: Option<&str>)
        -> Result<ApiResponse>;

    async fn put(&self, path: &str, body: &Value, tracking_id: Option<&str>)
        -> Result<ApiResponse>;

    async fn delete(&self, path: &str, tracking_id: Option<&str>) -> Result<ApiResponse>;
}

/// 基于 reqwest 的 HTTP 传输实现
pub struct HttpTransport {
    /// API 基础 URL，形如 `https://host:443/api/v3/onefuse`
    base_url: String,

    /// HTTP 客户端
    http_client: Client,

    username: String,
    password: String,
}

impl HttpTransport {
    /// 创建新的 HTTP 传输
    pub fn new(host: &str, username: &str, password: &str, config: &ClientConfig) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(OneFuseError::ConfigError("OneFuse 主机地址为空".to_string()));
        }

        let base_url = format!(
            "{}://{}:{}{}",
            config.protocol,
            host.trim_end_matches('/'),
            config.port,
            API_PREFIX
        );
        Self::with_base_url(&base_url, username, password, config)
    }

    /// 使用完整的基础 URL 创建（测试或反向代理场景）
    pub fn with_base_url(
        base_url: &str,
        username: &str,
        password: &str,
        config: &ClientConfig,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!config.verify_certs)
            .default_headers(default_headers(&config.source)?)
            .build()
            .map_err(|e| OneFuseError::HttpError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 发送 HTTP 请求
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!("OneFuse API 请求: {} {}", method, url);

        let mut request = self
            .http_client
            .request(method, &url)
            .basic_auth(&self.username, Some(&self.password));

        if let Some(tracking_id) = tracking_id.filter(|id| !id.is_empty()) {
            request = request.header(TRACKING_ID_HEADER, tracking_id);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OneFuseError::HttpError(e.to_string()))?;

        let status = response.status().as_u16();
        let tracking_id = response
            .headers()
            .get(TRACKING_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let text = response
            .text()
            .await
            .map_err(|e| OneFuseError::HttpError(e.to_string()))?;

        debug!("OneFuse API 响应: {} {}", status, path);

        Ok(ApiResponse {
            status,
            tracking_id,
            body: parse_body(&text),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, None, None).await
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(body), tracking_id).await
    }

    async fn put(
        &self,
        path: &str,
        body: &Value,
        tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        self.send(Method::PUT, path, Some(body), tracking_id).await
    }

    async fn delete(&self, path: &str, tracking_id: Option<&str>) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, None, tracking_id).await
    }
}

/// 每个请求都携带的固定请求头
fn default_headers(source: &str) -> Result<HeaderMap> {
    let origin_host = gethostname::gethostname().to_string_lossy().to_string();

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CONNECTION, HeaderValue::from_static("Keep-Alive"));
    headers.insert(
        HeaderName::from_static("x-origin-host"),
        header_value(&origin_host)?,
    );
    headers.insert(HeaderName::from_static("source"), header_value(source)?);
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| OneFuseError::ConfigError(format!("无效的请求头值 {}: {}", value, e)))
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
