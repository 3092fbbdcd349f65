//! 将 OneFuse 返回的属性渲染后写回服务器对象

use onefuse_client::{OneFuseClient, Properties};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::resource::HostResource;
use crate::utilities::convert_object_to_string;

/// 渲染属性的键和值并写入服务器与属性栈
///
/// 渲染时使用的是不断更新的属性栈，后面的属性可以引用前面刚写入的值。
/// 键或值渲染为空的条目被忽略；全部写完后只保存一次服务器对象。
pub async fn render_and_apply_properties(
    client: &OneFuseClient,
    properties: &Properties,
    resource: &mut dyn HostResource,
    stack: &mut Properties,
) -> Result<()> {
    for (key, value) in properties {
        let rendered_key = client.render(key, stack).await?;
        let rendered_value = client.render(&convert_object_to_string(value), stack).await?;

        if rendered_key.is_empty() || rendered_value.is_empty() {
            continue;
        }

        debug!("设置属性: {} 为: {}", rendered_key, rendered_value);
        resource.set_property(&rendered_key, &rendered_value)?;
        stack.insert(rendered_key, Value::String(rendered_value));
    }

    resource.save()
}
