//! 连接管理命令

use anyhow::Result;
use colored::Colorize;

use crate::config::{CliConfig, ConnectionConfig};
use crate::ConnectionAction;

pub fn handle(mut config: CliConfig, action: ConnectionAction) -> Result<()> {
    match action {
        ConnectionAction::Add {
            name,
            host,
            username,
            password,
            port,
            protocol,
            verify_certs,
        } => {
            let connection = ConnectionConfig {
                host: host.clone(),
                username,
                password,
                port,
                protocol,
                verify_certs: verify_certs.then_some(true),
            };
            config.add_connection(&name, connection)?;
            config.save()?;

            println!("{} 连接 {} 添加成功", "✓".green().bold(), name.cyan().bold());
            println!("  地址: {}", host.yellow());
        }
        ConnectionAction::List => list_connections(&config),
        ConnectionAction::Remove { name } => {
            config.remove_connection(&name)?;
            config.save()?;
            println!("{} 连接 {} 已移除", "✓".green().bold(), name.cyan().bold());
        }
        ConnectionAction::Default { name } => {
            config.set_default_connection(&name)?;
            config.save()?;
            println!("{} 默认连接: {}", "✓".green().bold(), name.cyan().bold());
        }
    }

    Ok(())
}

fn list_connections(config: &CliConfig) {
    if config.connections.is_empty() {
        println!("{}", "没有配置任何连接".yellow());
        println!("\n使用以下命令添加连接:");
        println!(
            "  {} onefuse connection add <NAME> <HOST> -u <USERNAME> -p <PASSWORD>",
            "$".bright_black()
        );
        return;
    }

    println!("{}\n", "配置的连接列表:".bold());

    for (name, connection) in &config.connections {
        let marker = if config.default_connection.as_deref() == Some(name.as_str()) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        let client = config.client_config_for(connection);

        println!("{} {}", marker, name.cyan().bold());
        println!(
            "    地址: {}",
            format!("{}://{}:{}", client.protocol, connection.host, client.port).yellow()
        );
        println!("    用户: {}", connection.username.bright_black());
        println!();
    }
}
