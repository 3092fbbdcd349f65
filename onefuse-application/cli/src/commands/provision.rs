//! 资源申请命令

use anyhow::{Context, Result};
use onefuse_client::{OneFuseClient, Properties};
use std::path::Path;
use tracing::info;

use super::common::{create_client, load_properties, print_json};
use crate::config::CliConfig;
use crate::{ProvisionArgs, ProvisionModule};

impl ProvisionModule {
    fn args(&self) -> &ProvisionArgs {
        match self {
            Self::Naming { args }
            | Self::Ipam { args }
            | Self::Dns { args, .. }
            | Self::Ad { args }
            | Self::AnsibleTower { args, .. }
            | Self::Scripting { args }
            | Self::Servicenow { args }
            | Self::Vra { args, .. } => args,
        }
    }
}

pub async fn handle(
    config: &CliConfig,
    connection: Option<&str>,
    module: ProvisionModule,
) -> Result<()> {
    let client = create_client(config, connection)?;
    let args = module.args();
    let properties = prepare_properties(&client, args).await?;

    let policy = args.policy.as_str();
    let tracking_id = args.tracking_id.as_deref();
    info!("申请资源, 策略: {}", policy);

    let result = match &module {
        ProvisionModule::Naming { .. } => {
            client.naming().provision(policy, &properties, tracking_id).await
        }
        ProvisionModule::Ipam { .. } => {
            client.ipam().provision(policy, &properties, tracking_id).await
        }
        ProvisionModule::Dns { ip, zones, .. } => {
            client
                .dns()
                .provision(policy, &properties, ip, zones, tracking_id)
                .await
        }
        ProvisionModule::Ad { .. } => client.ad().provision(policy, &properties, tracking_id).await,
        ProvisionModule::AnsibleTower { hosts, limit, .. } => {
            client
                .ansible_tower()
                .provision(policy, &properties, hosts, limit, tracking_id)
                .await
        }
        ProvisionModule::Scripting { .. } => {
            client.scripting().provision(policy, &properties, tracking_id).await
        }
        ProvisionModule::Servicenow { .. } => {
            client.cmdb().provision(policy, &properties, tracking_id).await
        }
        ProvisionModule::Vra { deployment_name, .. } => {
            client
                .vra()
                .provision(policy, &properties, deployment_name, tracking_id)
                .await
        }
    };

    let managed_object = result.with_context(|| format!("申请资源失败, 策略: {}", policy))?;
    print_json(&managed_object.into_value())
}

/// 读取属性文件，需要时展开静态属性集
async fn prepare_properties(client: &OneFuseClient, args: &ProvisionArgs) -> Result<Properties> {
    let mut properties = load_properties(Path::new(&args.properties))?;

    if args.expand_property_sets {
        client
            .property_sets()
            .expand(&mut properties)
            .await
            .context("展开静态属性集失败")?;
    }

    Ok(properties)
}
