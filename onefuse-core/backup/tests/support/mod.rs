// 内存版 OneFuse，用于备份/恢复集成测试
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use onefuse_client::{ApiResponse, ClientConfig, OneFuseClient, Result, Transport, API_PREFIX};
use serde_json::{json, Map, Value};

/// 记录的写请求
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Vec<Value>>,
    unsupported: BTreeSet<String>,
    failures: BTreeMap<String, u16>,
    next_id: i64,
    writes: Vec<WriteRequest>,
}

/// 有状态的 OneFuse 假实现：分配 id、按 iexact 过滤、分页、把 href 字段转换为链接
pub struct FakeOneFuse {
    state: Mutex<State>,
    page_size: usize,
}

impl FakeOneFuse {
    /// `first_id` 用于让不同环境的 id 不重叠
    pub fn new(first_id: i64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                next_id: first_id,
                ..Default::default()
            }),
            page_size: 2,
        })
    }

    pub fn client(self: &Arc<Self>) -> OneFuseClient {
        OneFuseClient::with_transport(self.clone(), ClientConfig::default())
    }

    /// 模拟旧版本 OneFuse 不支持的集合
    pub fn unsupported(&self, collection: &str) {
        self.state.lock().unwrap().unsupported.insert(collection.to_string());
    }

    /// 让某个集合的所有请求返回指定状态码
    pub fn fail(&self, collection: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(collection.to_string(), status);
    }

    /// 直接写入一条记录，字段中的 href 会被转换为链接，返回 self href
    pub fn seed(&self, collection: &str, fields: Value) -> String {
        let mut state = self.state.lock().unwrap();
        let record = state.create(collection, fields);
        self_href(&record)
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn find(&self, collection: &str, name: &str) -> Option<Value> {
        self.records(collection)
            .into_iter()
            .find(|record| record["name"] == name)
    }

    pub fn writes(&self) -> Vec<WriteRequest> {
        self.state.lock().unwrap().writes.clone()
    }

    fn handle(&self, method: &str, path: &str, body: Option<&Value>) -> ApiResponse {
        let mut state = self.state.lock().unwrap();
        if let Some(body) = body {
            state.writes.push(WriteRequest {
                method: method.to_string(),
                path: path.to_string(),
                body: body.clone(),
            });
        }

        let (route, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
        let collection = match segments.first() {
            Some(collection) => collection.to_string(),
            None => return not_found(),
        };
        if state.unsupported.contains(&collection) {
            return not_found();
        }
        if let Some(status) = state.failures.get(&collection) {
            return ApiResponse::new(*status, json!({ "detail": "Server error." }));
        }
        let id = segments.get(1).and_then(|id| id.parse::<i64>().ok());

        match (method, id) {
            ("GET", None) => state.list(&collection, query, self.page_size),
            ("GET", Some(id)) => match state.get(&collection, id) {
                Some(record) => ApiResponse::new(200, record),
                None => not_found(),
            },
            ("POST", None) => {
                let record = state.create(&collection, body.cloned().unwrap_or(Value::Null));
                ApiResponse::new(201, record)
            }
            ("PUT", Some(id)) => {
                match state.update(&collection, id, body.cloned().unwrap_or(Value::Null)) {
                    Some(record) => ApiResponse::new(200, record),
                    None => not_found(),
                }
            }
            _ => ApiResponse::new(405, json!({ "detail": "Method not allowed." })),
        }
    }
}

impl State {
    fn list(&self, collection: &str, query: &str, page_size: usize) -> ApiResponse {
        let mut filters = Vec::new();
        let mut page = 1usize;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            if let Some(filter) = pair.strip_prefix("filter=") {
                filters = parse_filter(filter);
            } else if let Some(number) = pair.strip_prefix("page=") {
                page = number.parse().unwrap_or(1);
            }
        }

        let matches: Vec<Value> = self
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        filters.iter().all(|(field, value)| {
                            record
                                .get(field)
                                .and_then(Value::as_str)
                                .map(|actual| actual.eq_ignore_ascii_case(value))
                                .unwrap_or(false)
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let start = (page - 1) * page_size;
        let items: Vec<Value> = matches.iter().skip(start).take(page_size).cloned().collect();

        let mut links = json!({
            "self": { "href": format!("{}/{}/?page={}", API_PREFIX, collection, page) }
        });
        if start + page_size < matches.len() {
            links["next"] = json!({
                "href": format!("{}/{}/?page={}", API_PREFIX, collection, page + 1)
            });
        }

        ApiResponse::new(
            200,
            json!({
                "count": matches.len(),
                "_embedded": { collection: items },
                "_links": links
            }),
        )
    }

    fn get(&self, collection: &str, id: i64) -> Option<Value> {
        self.collections
            .get(collection)?
            .iter()
            .find(|record| record["id"] == id)
            .cloned()
    }

    fn create(&mut self, collection: &str, fields: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        let record = self.materialize(collection, id, fields);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    fn update(&mut self, collection: &str, id: i64, fields: Value) -> Option<Value> {
        self.get(collection, id)?;
        let record = self.materialize(collection, id, fields);
        let records = self.collections.get_mut(collection)?;
        let slot = records.iter_mut().find(|r| r["id"] == id)?;
        *slot = record.clone();
        Some(record)
    }

    /// 服务端视图：href 字段变成带标题的 `_links`
    fn materialize(&self, collection: &str, id: i64, fields: Value) -> Value {
        let mut record = Map::new();
        let mut links = Map::new();
        let name = fields.get("name").cloned().unwrap_or(Value::Null);

        for (key, value) in fields.as_object().cloned().unwrap_or_default() {
            match &value {
                Value::String(href) if href.starts_with(API_PREFIX) => {
                    links.insert(key, self.link_to(href));
                }
                Value::Array(items)
                    if !items.is_empty()
                        && items
                            .iter()
                            .all(|i| i.as_str().map_or(false, |s| s.starts_with(API_PREFIX))) =>
                {
                    let list = items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|href| self.link_to(href))
                        .collect();
                    links.insert(key, Value::Array(list));
                }
                _ => {
                    record.insert(key, value.clone());
                }
            }
        }

        links.insert(
            "self".to_string(),
            json!({ "href": format!("{}/{}/{}/", API_PREFIX, collection, id), "title": name }),
        );
        record.insert("id".to_string(), json!(id));
        record.insert("_links".to_string(), Value::Object(links));
        Value::Object(record)
    }

    fn link_to(&self, href: &str) -> Value {
        let title = self
            .collections
            .values()
            .flatten()
            .find(|record| self_href(record) == href)
            .and_then(|record| record.get("name").cloned())
            .unwrap_or(Value::Null);
        json!({ "href": href, "title": title })
    }
}

/// `name.iexact:"a%20b";type.iexact:"x"`
fn parse_filter(filter: &str) -> Vec<(String, String)> {
    filter
        .split(';')
        .filter_map(|clause| {
            let (field, value) = clause.split_once(".iexact:")?;
            let value = value.trim_matches('"');
            let value = urlencoding::decode(value).ok()?.into_owned();
            Some((field.to_string(), value))
        })
        .collect()
}

fn self_href(record: &Value) -> String {
    record["_links"]["self"]["href"].as_str().unwrap_or_default().to_string()
}

fn not_found() -> ApiResponse {
    ApiResponse::new(404, json!({ "detail": "Not found." }))
}

#[async_trait]
impl Transport for FakeOneFuse {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        Ok(self.handle("GET", path, None))
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        _tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        Ok(self.handle("POST", path, Some(body)))
    }

    async fn put(
        &self,
        path: &str,
        body: &Value,
        _tracking_id: Option<&str>,
    ) -> Result<ApiResponse> {
        Ok(self.handle("PUT", path, Some(body)))
    }

    async fn delete(&self, path: &str, _tracking_id: Option<&str>) -> Result<ApiResponse> {
        Ok(self.handle("DELETE", path, None))
    }
}
