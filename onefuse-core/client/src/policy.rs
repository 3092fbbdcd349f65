//! 策略解析
//!
//! 通过 `?filter=field.iexact:"value"` 按名称（以及可选的区分字段）查找记录。
//! 解析要求恰好一条匹配，零条或多条都会报错，绝不猜测。

use serde_json::Value;
use tracing::debug;

use crate::client::OneFuseClient;
use crate::error::{OneFuseError, Result};
use crate::models::PolicyLinks;

/// 列表查询过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<(String, String)>,
}

impl Filter {
    /// `field.iexact:"value"`
    pub fn iexact(field: &str, value: &str) -> Self {
        Self::default().and(field, value)
    }

    pub fn and(mut self, field: &str, value: &str) -> Self {
        self.clauses.push((field.to_string(), value.to_string()));
        self
    }

    /// 查询字符串，值经过 URL 编码
    pub fn to_query(&self) -> String {
        self.clauses
            .iter()
            .map(|(field, value)| format!("{}.iexact:\"{}\"", field, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// 带过滤条件的集合路径
    pub fn path(&self, collection: &str) -> String {
        format!("/{}/?filter={}", collection, self.to_query())
    }
}

/// 从列表响应中取出 `_embedded.<collection>`
pub fn embedded_items(body: &Value, collection: &str) -> Vec<Value> {
    body.get("_embedded")
        .and_then(|embedded| embedded.get(collection))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

impl OneFuseClient {
    /// 按过滤条件列出集合中的记录（不做唯一性校验）
    pub async fn find_by_filter(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let (_, items) = self.query(collection, filter).await?;
        Ok(items)
    }

    /// 返回 (服务端总数, 当前页记录)
    async fn query(&self, collection: &str, filter: &Filter) -> Result<(usize, Vec<Value>)> {
        let path = filter.path(collection);
        debug!("查询记录: {}", path);

        let body = self.get_json(&path).await?;
        let items = embedded_items(&body, collection);

        // count 为服务端总数，分页时可能大于当前页条目数
        let count = body
            .get("count")
            .and_then(Value::as_u64)
            .map(|count| count as usize)
            .unwrap_or(items.len())
            .max(items.len());
        Ok((count, items))
    }

    /// 按任意唯一字段查找记录
    pub async fn get_object_by_unique_field(
        &self,
        collection: &str,
        value: &str,
        field: &str,
    ) -> Result<Value> {
        self.resolve_unique(collection, value, &Filter::iexact(field, value))
            .await
    }

    /// 按名称查找策略
    pub async fn get_policy_by_name(&self, collection: &str, name: &str) -> Result<Value> {
        self.get_object_by_unique_field(collection, name, "name").await
    }

    /// 按名称与可选的区分字段（如 `type`、`endpointType`）解析策略
    pub async fn resolve_policy(
        &self,
        policy_type: &str,
        name: &str,
        discriminator: Option<(&str, &str)>,
    ) -> Result<Value> {
        let mut filter = Filter::iexact("name", name);
        if let Some((field, value)) = discriminator {
            filter = filter.and(field, value);
        }
        self.resolve_unique(policy_type, name, &filter).await
    }

    /// 按名称解析策略并提取 self / workspace 链接
    pub async fn resolve_policy_links(&self, policy_type: &str, name: &str) -> Result<PolicyLinks> {
        let policy = self.get_policy_by_name(policy_type, name).await?;
        PolicyLinks::from_policy(&policy)
    }

    async fn resolve_unique(&self, collection: &str, name: &str, filter: &Filter) -> Result<Value> {
        let (count, mut items) = self.query(collection, filter).await?;
        match count {
            0 => Err(OneFuseError::PolicyNotFound {
                policy_type: collection.to_string(),
                name: name.to_string(),
            }),
            1 => items
                .pop()
                .ok_or_else(|| OneFuseError::MissingField(format!("_embedded.{}", collection))),
            count => Err(OneFuseError::AmbiguousPolicy {
                policy_type: collection.to_string(),
                name: name.to_string(),
                count,
            }),
        }
    }
}
