//! 模板渲染
//!
//! 策略名、主机列表、DNS 区域等字段都可能包含 Jinja 风格的占位符，
//! 提交前交给 OneFuse 的 `/templateTester/` 渲染。

use serde_json::{json, Value};
use tracing::{debug, error};

use crate::client::OneFuseClient;
use crate::error::{OneFuseError, Result};
use crate::models::Properties;
use crate::transport::body_text;

const TEMPLATE_TESTER_PATH: &str = "/templateTester/";

/// 是否包含模板定界符
pub fn needs_render(template: &str) -> bool {
    template.contains("{{") || template.contains("{%")
}

impl OneFuseClient {
    /// 渲染模板
    ///
    /// 不含 `{{` / `{%` 的字符串原样返回，不发起网络请求。
    pub async fn render(&self, template: &str, properties: &Properties) -> Result<String> {
        if !needs_render(template) {
            return Ok(template.to_string());
        }

        debug!("渲染模板: {}", template);
        self.render_remote(template, properties).await.map_err(|reason| {
            error!("模板渲染失败: {}. 模板: {}", reason, template);
            OneFuseError::TemplateRenderFailed {
                template: template.to_string(),
                reason,
            }
        })
    }

    async fn render_remote(
        &self,
        template: &str,
        properties: &Properties,
    ) -> std::result::Result<String, String> {
        let body = json!({
            "template": template,
            "templateProperties": properties,
        });

        let response = self
            .transport()
            .post(TEMPLATE_TESTER_PATH, &body, None)
            .await
            .map_err(|e| e.to_string())?;

        if !response.is_success() {
            return Err(format!(
                "[{}] {}",
                response.status,
                body_text(&response.body)
            ));
        }

        match response.body.get("value") {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(Value::Null) | None => Err("响应中缺少 value 字段".to_string()),
            Some(other) => Ok(other.to_string()),
        }
    }
}
