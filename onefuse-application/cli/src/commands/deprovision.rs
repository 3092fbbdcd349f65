//! 资源释放命令

use anyhow::{Context, Result};
use colored::Colorize;

use super::common::{create_client, print_json};
use crate::config::CliConfig;
use crate::Module;

pub async fn handle(
    config: &CliConfig,
    connection: Option<&str>,
    module: Module,
    id: i64,
) -> Result<()> {
    let client = create_client(config, connection)?;

    let result = match module {
        Module::Naming => client.naming().deprovision(id).await,
        Module::Ipam => client.ipam().deprovision(id).await,
        Module::Dns => client.dns().deprovision(id).await,
        Module::Ad => client.ad().deprovision(id).await,
        Module::AnsibleTower => client.ansible_tower().deprovision(id).await,
        Module::Scripting => client.scripting().deprovision(id).await,
        Module::Servicenow => client.cmdb().deprovision(id).await,
        Module::Vra => client.vra().deprovision(id).await,
    };

    let path = result.with_context(|| format!("释放资源失败: {:?} {}", module, id))?;
    println!("{} 已释放 {}", "✓".green().bold(), path.cyan());

    Ok(())
}

pub async fn move_ou(config: &CliConfig, connection: Option<&str>, id: i64) -> Result<()> {
    let client = create_client(config, connection)?;
    let managed_object = client
        .ad()
        .move_ou(id)
        .await
        .with_context(|| format!("移动 OU 失败: {}", id))?;

    print_json(&managed_object.into_value())
}
