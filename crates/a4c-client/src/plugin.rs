//! 插件注册表 REST 响应模型。
//!
//! 响应结构（`GET /rest/plugins`）：
//! - 外层为 A4C 统一包装 [`RestResponse`]（`data` + `error`，此处只读取 `data`）
//! - `data` 为分页结果 [`PluginPage`]，其 `data` 数组即插件列表
//!
//! 约定：
//! - 只声明用到的字段，未知字段一律忽略，以便兼容不同版本服务器
//! - 该模块仅定义数据结构，不执行任何 IO
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use serde::Deserialize;

/// A4C REST 接口的统一响应包装。
#[derive(Debug, Clone, Deserialize)]
pub struct RestResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
}

/// 插件列表分页结果。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginPage {
    #[serde(default)]
    pub data: Vec<PluginRecord>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// 服务器上已注册的一个插件实例。
///
/// 字段说明：
/// - `id`：服务器分配的实例 ID（删除时使用）
/// - `descriptor`：插件描述，其 `id` 为逻辑名
/// - `enabled`：是否启用（部分版本不返回）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginRecord {
    pub id: String,
    pub descriptor: PluginDescriptor,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl PluginRecord {
    /// 插件逻辑名（跨版本识别“同一个插件”）。
    pub fn logical_name(&self) -> &str {
        &self.descriptor.id
    }

    /// 是否与目标逻辑名一致（精确匹配）。
    pub fn matches(&self, plugin_name: &str) -> bool {
        self.logical_name() == plugin_name
    }
}

/// 插件描述（来自插件包内的描述文件）。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 将列表接口的响应体解析为插件列表（保持服务器返回顺序）。
///
/// 返回值：
/// - `data` 或 `data.data` 缺失时返回空列表
pub fn parse_plugin_list(body: &[u8]) -> serde_json::Result<Vec<PluginRecord>> {
    Ok(parse_plugin_page(body)?.data)
}

/// 解析列表接口的分页结果；`data` 缺失时返回空分页。
pub fn parse_plugin_page(body: &[u8]) -> serde_json::Result<PluginPage> {
    let response: RestResponse<PluginPage> = serde_json::from_slice(body)?;
    Ok(response.data.unwrap_or_default())
}
