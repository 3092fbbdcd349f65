//! 异步任务编排
//!
//! 提交申请/删除请求后：
//! - 201 等同步响应：响应体即托管对象，跟踪 ID 来自 `Tracking-Id` 响应头
//! - 202 异步响应：响应体带任务 ID，按固定间隔轮询 `/jobMetadata/{id}/`
//!   直到 Successful / Failed，超过资源类型对应的上限则超时

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::client::OneFuseClient;
use crate::error::{OneFuseError, Result};
use crate::models::{link_href, strip_api_prefix, JobMetadata, JobState, ManagedObject};
use crate::transport::ApiResponse;

/// 申请请求使用的 HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Post,
    Put,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// 轮询参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// 两次查询之间的休眠时间
    pub interval: Duration,

    /// 超时上限
    pub ceiling: Duration,
}

/// 请求完成方式
#[derive(Debug)]
enum Completion {
    /// 同步完成，保留原始响应
    Immediate(ApiResponse),

    /// 异步任务以 Successful 结束
    Job(JobMetadata),
}

impl OneFuseClient {
    /// 提交申请请求并等待完成，使用默认轮询间隔
    pub async fn request(
        &self,
        path: &str,
        template: &Value,
        tracking_id: Option<&str>,
        method: RequestMethod,
    ) -> Result<ManagedObject> {
        let interval = self.config().poll_interval();
        self.request_with_interval(path, template, tracking_id, method, interval)
            .await
    }

    /// 提交申请请求并等待完成，指定轮询间隔
    pub async fn request_with_interval(
        &self,
        path: &str,
        template: &Value,
        tracking_id: Option<&str>,
        method: RequestMethod,
        interval: Duration,
    ) -> Result<ManagedObject> {
        debug!("提交 {} 请求: {}, 内容: {}", method.as_str(), path, template);

        let response = match method {
            RequestMethod::Post => self.transport().post(path, template, tracking_id).await?,
            RequestMethod::Put => self.transport().put(path, template, tracking_id).await?,
        };
        let response = response.error_for_status(method.as_str(), path)?;

        let poll = self.poll_settings(path, interval);
        let mo = match self.wait_for_job_completion(response, path, poll).await? {
            Completion::Job(job) => {
                debug!("OneFuse 任务成功: {}", job.id);
                let mut mo = unwrap_payload(&job.payload())?;
                if let Some(tracking_id) = job.job_tracking_id {
                    mo.set_tracking_id(tracking_id);
                }
                mo
            }
            Completion::Immediate(response) => {
                let mut mo = ManagedObject::from_value(response.body)?;
                match response.tracking_id {
                    Some(tracking_id) => mo.set_tracking_id(tracking_id),
                    None => warn!("同步响应缺少 Tracking-Id 响应头: {}", path),
                }
                mo
            }
        };

        debug!("托管对象: {}", serde_json::to_string(&mo).unwrap_or_default());
        Ok(mo)
    }

    /// 删除托管对象并等待删除任务完成
    ///
    /// 跟踪 ID 查询失败只记录警告，不会阻止删除。
    pub async fn deprovision(&self, path: &str) -> Result<()> {
        let tracking_id = self.tracking_id_from_mo(path).await;
        info!("删除对象: {}, tracking_id: {}", path, tracking_id);

        let response = self
            .transport()
            .delete(path, Some(&tracking_id))
            .await?
            .error_for_status("DELETE", path)?;

        let poll = self.poll_settings(path, self.config().poll_interval());
        self.wait_for_job_completion(response, path, poll).await?;

        info!("对象已从 OneFuse 删除: {}", path);
        Ok(())
    }

    /// 通过托管对象关联的任务获取跟踪 ID，失败时返回空字符串
    pub async fn tracking_id_from_mo(&self, path: &str) -> String {
        match self.lookup_tracking_id(path).await {
            Ok(tracking_id) => tracking_id,
            Err(e) => {
                warn!("无法确定托管对象的跟踪 ID: {} ({})", path, e);
                String::new()
            }
        }
    }

    /// 查询任务元数据
    pub async fn get_job(&self, job_id: i64) -> Result<JobMetadata> {
        let body = self.get_json(&format!("/jobMetadata/{}/", job_id)).await?;
        serde_json::from_value(body)
            .map_err(|e| OneFuseError::ParseError(format!("任务 {} 元数据: {}", job_id, e)))
    }

    async fn lookup_tracking_id(&self, path: &str) -> Result<String> {
        debug!("获取托管对象: {}", path);
        let mo = self.get_json(path).await?;
        let job_href = link_href(&mo, "jobMetadata")
            .ok_or_else(|| OneFuseError::MissingField("_links.jobMetadata.href".to_string()))?;

        let job = self.get_json(&strip_api_prefix(job_href)).await?;
        job.get("jobTrackingId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| OneFuseError::MissingField("jobTrackingId".to_string()))
    }

    fn poll_settings(&self, path: &str, interval: Duration) -> PollSettings {
        let ceiling = self.config().timeouts.ceiling_for_path(path);
        debug!("任务超时上限: {} 秒", ceiling.as_secs());
        PollSettings { interval, ceiling }
    }

    async fn wait_for_job_completion(
        &self,
        response: ApiResponse,
        path: &str,
        poll: PollSettings,
    ) -> Result<Completion> {
        debug!("OneFuse 响应状态: {}", response.status);
        if response.status != 202 {
            return Ok(Completion::Immediate(response));
        }

        let job_id = response
            .body
            .get("id")
            .and_then(|id| id.as_i64().or_else(|| id.as_str().and_then(|s| s.parse().ok())))
            .ok_or_else(|| OneFuseError::MissingField(format!("202 响应缺少任务 id: {}", path)))?;

        let started = Instant::now();
        let mut job = self.get_job(job_id).await?;
        let mut state = job.state();

        while !state.is_terminal() {
            debug!(
                "等待任务完成，休眠 {} 毫秒. 任务 {} 状态: {}",
                poll.interval.as_millis(),
                job_id,
                state
            );
            tokio::time::sleep(poll.interval).await;

            if started.elapsed() > poll.ceiling {
                error!("OneFuse 任务 {} 超过 {} 秒仍未完成", job_id, poll.ceiling.as_secs());
                return Err(OneFuseError::Timeout {
                    path: path.to_string(),
                    seconds: poll.ceiling.as_secs(),
                });
            }

            job = self.get_job(job_id).await?;
            state = job.state();
        }

        if state == JobState::Failed {
            let payload = job.payload();
            error!("OneFuse 任务失败: {} {}: {}", job_id, state, payload);
            return Err(OneFuseError::JobFailed {
                job_id,
                state: state.to_string(),
                payload,
            });
        }

        Ok(Completion::Job(job))
    }
}

/// 任务 payload 可能是 JSON 字符串，也可能已经是对象
fn unwrap_payload(payload: &Value) -> Result<ManagedObject> {
    match payload {
        Value::String(text) => {
            let value: Value = serde_json::from_str(text)
                .map_err(|e| OneFuseError::ParseError(format!("任务 payload: {}", e)))?;
            ManagedObject::from_value(value)
        }
        Value::Object(_) => ManagedObject::from_value(payload.clone()),
        other => Err(OneFuseError::ParseError(format!(
            "任务 payload 不是托管对象: {}",
            other
        ))),
    }
}
