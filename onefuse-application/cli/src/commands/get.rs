//! 原始 GET 请求

use anyhow::{Context, Result};

use super::common::{create_client, print_json};
use crate::config::CliConfig;

pub async fn handle(config: &CliConfig, connection: Option<&str>, path: &str) -> Result<()> {
    let client = create_client(config, connection)?;
    let body = client
        .get_json(path)
        .await
        .with_context(|| format!("GET {} 失败", path))?;
    print_json(&body)
}
