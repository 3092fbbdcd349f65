//! CloudBolt 主机适配器
//!
//! 把 CloudBolt 服务器对象整理成 OneFuse 属性栈，并把 OneFuse 返回的属性写回服务器。
//! 宿主平台通过 [`HostResource`] 与 [`ConnectionStore`] 两个 trait 接入。
//!
//! # 示例
//!
//! ```ignore
//! use onefuse_cloudbolt::{connect, get_cb_object_properties, render_and_apply_properties};
//!
//! let client = connect(&store, "onefuse", ClientConfig::default())?;
//! let mut stack = get_cb_object_properties(&server, Some("pre_create_resource"));
//! let mo = client.naming().provision("machine", &stack, None).await?;
//! render_and_apply_properties(&client, &properties, &mut server, &mut stack).await?;
//! ```

pub mod apply;
pub mod connection;
pub mod error;
pub mod resource;
pub mod utilities;

pub use apply::render_and_apply_properties;
pub use connection::{
    connect, find_connection, ConnectionRecord, ConnectionStore, CLOUDBOLT_SOURCE,
    CONNECTION_LABEL,
};
pub use error::{CloudBoltError, Result};
pub use resource::{
    get_cb_object_properties, CustomFieldValue, Hardware, HostResource, Network, Nic, MASKED_VALUE,
};
pub use utilities::{
    convert_object_to_string, delete_output_job_results, get_connection_and_policy_values,
    get_matching_properties, get_matching_property_names, sort_deprovision_props,
    ConnectionPolicyValue, SCRIPTING_OUTPUT_LIMIT,
};
