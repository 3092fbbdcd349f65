//! OneFuse CLI 应用

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "onefuse")]
#[command(about = "OneFuse 命令行工具 - 资源申请、释放与策略备份", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别（默认取配置文件中的 log_level，再默认 info）
    #[arg(short, long)]
    log_level: Option<String>,

    /// 连接名称（默认使用配置文件中的 default_connection）
    #[arg(short, long, global = true)]
    connection: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET 任意 API 路径并输出 JSON
    Get {
        /// API 路径，例如 /namingPolicies/
        path: String,
    },

    /// 备份所有策略
    Backup {
        /// 备份目录
        dir: String,
    },

    /// 从备份目录恢复策略
    Restore {
        /// 备份目录
        dir: String,

        /// 覆盖已存在的同名策略
        #[arg(long)]
        overwrite: bool,
    },

    /// 申请资源
    Provision {
        #[command(subcommand)]
        module: ProvisionModule,
    },

    /// 释放资源
    Deprovision {
        /// 模块
        #[arg(value_enum)]
        module: Module,

        /// 托管对象 ID
        id: i64,
    },

    /// 将 AD 计算机账户移动到最终 OU
    MoveOu {
        /// AD 计算机账户 ID
        id: i64,
    },

    /// 连接管理
    Connection {
        #[command(subcommand)]
        action: ConnectionAction,
    },
}

/// 申请资源的公共参数
#[derive(Args)]
pub struct ProvisionArgs {
    /// 策略名称
    #[arg(long)]
    policy: String,

    /// 属性文件（JSON 对象）
    #[arg(long)]
    properties: String,

    /// 关联已有任务的 Tracking-Id
    #[arg(long)]
    tracking_id: Option<String>,

    /// 申请前展开静态属性集
    #[arg(long)]
    expand_property_sets: bool,
}

#[derive(Subcommand)]
pub enum ProvisionModule {
    /// 命名
    Naming {
        #[command(flatten)]
        args: ProvisionArgs,
    },

    /// IPAM
    Ipam {
        #[command(flatten)]
        args: ProvisionArgs,
    },

    /// DNS 记录
    Dns {
        #[command(flatten)]
        args: ProvisionArgs,

        /// IP 地址
        #[arg(long)]
        ip: String,

        /// DNS 区域（逗号分隔，可包含模板）
        #[arg(long, value_delimiter = ',')]
        zones: Vec<String>,
    },

    /// AD 计算机账户
    Ad {
        #[command(flatten)]
        args: ProvisionArgs,
    },

    /// Ansible Tower
    AnsibleTower {
        #[command(flatten)]
        args: ProvisionArgs,

        /// 主机列表（逗号分隔，可包含模板）
        #[arg(long, default_value = "")]
        hosts: String,

        /// limit 参数
        #[arg(long, default_value = "")]
        limit: String,
    },

    /// 脚本
    Scripting {
        #[command(flatten)]
        args: ProvisionArgs,
    },

    /// ServiceNow CMDB
    Servicenow {
        #[command(flatten)]
        args: ProvisionArgs,
    },

    /// vRA 部署
    Vra {
        #[command(flatten)]
        args: ProvisionArgs,

        /// 部署名称（可包含模板）
        #[arg(long)]
        deployment_name: String,
    },
}

/// 可释放资源的模块
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Module {
    Naming,
    Ipam,
    Dns,
    Ad,
    AnsibleTower,
    Scripting,
    Servicenow,
    Vra,
}

#[derive(Subcommand)]
pub enum ConnectionAction {
    /// 添加连接
    Add {
        /// 连接名称
        name: String,
        /// OneFuse 主机地址
        host: String,
        /// 用户名
        #[arg(long, short = 'u')]
        username: String,
        /// 密码
        #[arg(long, short = 'p')]
        password: String,
        /// 端口
        #[arg(long)]
        port: Option<u16>,
        /// 协议 (https/http)
        #[arg(long)]
        protocol: Option<String>,
        /// 校验 SSL 证书
        #[arg(long)]
        verify_certs: bool,
    },
    /// 列出连接
    List,
    /// 移除连接
    Remove { name: String },
    /// 设置默认连接
    Default { name: String },
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load()?;

    // 初始化日志
    let log_level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or("info");
    tracing_subscriber::fmt().with_max_level(parse_level(log_level)).init();

    info!("OneFuse CLI 启动");

    let connection = cli.connection.as_deref();

    // 处理命令
    match cli.command {
        Commands::Get { path } => commands::get::handle(&config, connection, &path).await?,
        Commands::Backup { dir } => commands::backup::backup(&config, connection, &dir).await?,
        Commands::Restore { dir, overwrite } => {
            commands::backup::restore(&config, connection, &dir, overwrite).await?
        }
        Commands::Provision { module } => {
            commands::provision::handle(&config, connection, module).await?
        }
        Commands::Deprovision { module, id } => {
            commands::deprovision::handle(&config, connection, module, id).await?
        }
        Commands::MoveOu { id } => commands::deprovision::move_ou(&config, connection, id).await?,
        Commands::Connection { action } => commands::connection::handle(config, action)?,
    }

    Ok(())
}
