//! 测试用的脚本化传输层
//!
//! 按 (方法, 路径) 预置响应队列。队列只剩最后一个响应时会一直返回它，
//! 便于模拟一直处于 Running 状态的任务。

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;
use crate::transport::{ApiResponse, Transport};

/// 记录下来的请求
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub tracking_id: Option<String>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<(String, String), VecDeque<ApiResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个响应
    pub fn respond(&self, method: &str, path: &str, response: ApiResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// 追加一组按顺序返回的响应
    pub fn respond_sequence(&self, method: &str, path: &str, responses: Vec<ApiResponse>) {
        for response in responses {
            self.respond(method, path, response);
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// 预置按名称查询策略的响应
    pub fn respond_policy(&self, collection: &str, id: i64, name: &str) {
        self.respond(
            "GET",
            &crate::policy::Filter::iexact("name", name).path(collection),
            list_response(collection, vec![policy(collection, id, name)]),
        );
    }

    /// 按方法查找最后一个请求
    pub fn last_request(&self, method: &str) -> Option<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.method == method)
            .cloned()
    }

    fn next(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            body: body.cloned(),
            tracking_id: tracking_id.map(str::to_string),
        });

        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(method.to_string(), path.to_string()));
        let response = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse::new(404, json!({ "detail": "Not found." }))))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.next("GET", path, None, None)
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        self.next("POST", path, Some(body), tracking_id)
    }

    async fn put(
        &self,
        path: &str,
        body: &Value,
        tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        self.next("PUT", path, Some(body), tracking_id)
    }

    async fn delete(&self, path: &str, tracking_id: Option<&str>) -> Result<ApiResponse> {
        self.next("DELETE", path, None, tracking_id)
    }
}

/// 列表响应 `{count, _embedded: {collection: items}}`
pub fn list_response(collection: &str, items: Vec<Value>) -> ApiResponse {
    let count = items.len();
    ApiResponse::new(
        200,
        json!({
            "count": count,
            "_embedded": { collection: items },
            "_links": {}
        }),
    )
}

/// 策略记录
pub fn policy(collection: &str, id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "_links": {
            "self": { "href": format!("/api/v3/onefuse/{}/{}/", collection, id), "title": name },
            "workspace": { "href": "/api/v3/onefuse/workspaces/2/", "title": "Default" }
        }
    })
}

/// 任务元数据
pub fn job(id: i64, state: &str, tracking_id: &str, payload: Value) -> ApiResponse {
    ApiResponse::new(
        200,
        json!({
            "id": id,
            "jobState": state,
            "jobTrackingId": tracking_id,
            "responseInfo": { "payload": payload }
        }),
    )
}
