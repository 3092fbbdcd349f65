//! OneFuse 连接信息
//!
//! CloudBolt 中的 OneFuse 连接保存为带 `onefuse` 标签的连接信息记录。

use onefuse_client::{ClientConfig, OneFuseClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{CloudBoltError, Result};

/// 连接信息必须带有的标签
pub const CONNECTION_LABEL: &str = "onefuse";

/// 通过 CloudBolt 发起的请求使用的 SOURCE
pub const CLOUDBOLT_SOURCE: &str = "CLOUDBOLT";

/// 连接信息记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub name: String,
    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub protocol: Option<String>,
    pub username: String,
    pub password: String,

    #[serde(default)]
    pub labels: Vec<String>,
}

/// 连接信息来源
pub trait ConnectionStore {
    fn connection_records(&self) -> Result<Vec<ConnectionRecord>>;
}

/// 按名称（不区分大小写）查找带 onefuse 标签的连接信息
pub fn find_connection(store: &dyn ConnectionStore, name: &str) -> Result<ConnectionRecord> {
    store
        .connection_records()?
        .into_iter()
        .find(|record| {
            record.name.eq_ignore_ascii_case(name)
                && record.labels.iter().any(|label| label == CONNECTION_LABEL)
        })
        .ok_or_else(|| {
            error!("未找到连接信息: {}, 标签: {}", name, CONNECTION_LABEL);
            CloudBoltError::ConnectionNotFound {
                name: name.to_string(),
                label: CONNECTION_LABEL.to_string(),
            }
        })
}

/// 使用连接信息创建 OneFuse 客户端
///
/// 协议和端口取自连接信息（未设置时保留 `config` 中的值），SOURCE 固定为 `CLOUDBOLT`。
pub fn connect(
    store: &dyn ConnectionStore,
    name: &str,
    mut config: ClientConfig,
) -> Result<OneFuseClient> {
    let record = find_connection(store, name)?;

    config.source = CLOUDBOLT_SOURCE.to_string();
    if let Some(port) = record.port {
        config.port = port;
    }
    if let Some(protocol) = &record.protocol {
        config.protocol = protocol.clone();
    }

    debug!("使用连接信息 {} 连接 {}", record.name, record.host);
    Ok(OneFuseClient::new(&record.host, &record.username, &record.password, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Records(Vec<ConnectionRecord>);

    impl ConnectionStore for Records {
        fn connection_records(&self) -> Result<Vec<ConnectionRecord>> {
            Ok(self.0.clone())
        }
    }

    fn record(name: &str, labels: &[&str]) -> ConnectionRecord {
        ConnectionRecord {
            name: name.to_string(),
            host: "onefuse.example.com".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let record: ConnectionRecord = serde_json::from_value(json!({
            "name": "onefuse",
            "host": "onefuse.example.com",
            "username": "admin",
            "password": "secret"
        }))
        .unwrap();

        assert_eq!(record.port, None);
        assert!(record.labels.is_empty());
    }

    #[test]
    fn test_find_connection_requires_label() {
        let store = Records(vec![record("onefuse", &["vmware"]), record("OneFuse", &["onefuse"])]);

        let found = find_connection(&store, "ONEFUSE").unwrap();
        assert_eq!(found.name, "OneFuse");

        let err = find_connection(&store, "missing").unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(matches!(err, CloudBoltError::ConnectionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_connect_uses_record_and_cloudbolt_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/onefuse/namingPolicies/"))
            .and(header("SOURCE", CLOUDBOLT_SOURCE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0 })))
            .expect(1)
            .mount(&server)
            .await;

        let address = server.address();
        let store = Records(vec![ConnectionRecord {
            host: address.ip().to_string(),
            port: Some(address.port()),
            protocol: Some("http".to_string()),
            ..record("onefuse", &["onefuse"])
        }]);

        let client = connect(&store, "onefuse", ClientConfig::default()).unwrap();
        assert_eq!(client.config().source, CLOUDBOLT_SOURCE);
        assert_eq!(client.config().port, address.port());

        let body = client.get_json("/namingPolicies/").await.unwrap();
        assert_eq!(body["count"], 0);
    }
}
