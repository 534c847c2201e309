//! 插件注册表客户端与刷新编排。
//!
//! 接口（相对服务器根地址）：
//! - `GET /rest/plugins`：列出插件
//! - `POST /rest/plugins`：multipart 上传插件包（字段名 `file`）
//! - `DELETE /rest/plugins/{id}`：删除插件实例
//!
//! 刷新策略：
//! - 服务器不提供“原地更新”接口，因此先删除所有逻辑名匹配的实例，再上传一次新包
//! - 任一接口返回非 2xx 即中止并返回 [`RegistrarError::RegistryOperation`]
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::Path;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::Response;
use tracing::{debug, info, warn};

use crate::config::PLUGINS_PATH;
use crate::error::{RegistrarError, RegistryOperation, Result};
use crate::plugin::{self, PluginRecord};
use crate::session::Session;

/// 插件集合接口，所有调用复用已登录的会话。
#[derive(Debug)]
pub struct PluginsApi<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> PluginsApi<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            url: format!("{}{}", session.root_url(), PLUGINS_PATH),
            session,
        }
    }

    /// 列出服务器上的全部插件（保持服务器返回顺序）。
    ///
    /// 异常处理：
    /// - 传输失败：[`RegistrarError::Http`]
    /// - 响应体无法解析：[`RegistrarError::Decode`]
    /// - 非 2xx：[`RegistrarError::RegistryOperation`]
    pub fn list(&self) -> Result<Vec<PluginRecord>> {
        let response = self
            .session
            .client()
            .get(&self.url)
            .send()
            .map_err(|e| RegistrarError::http(&self.url, e))?;
        let response = check_status(response, RegistryOperation::List)?;
        let body = response
            .bytes()
            .map_err(|e| RegistrarError::http(&self.url, e))?;
        let page = plugin::parse_plugin_page(&body).map_err(|source| RegistrarError::Decode {
            url: self.url.clone(),
            source,
        })?;
        match page.total_results {
            Some(total) => debug!("listed {} of {total} plugin(s)", page.data.len()),
            None => debug!("listed {} plugin(s)", page.data.len()),
        }
        Ok(page.data)
    }

    /// 上传插件包。
    ///
    /// 参数：
    /// - `payload`：插件包路径（调用前已校验，此处再次确认存在）
    ///
    /// 说明：
    /// - 文件句柄由 multipart 表单持有，请求结束（含失败）后随表单释放
    pub fn create(&self, payload: &Path) -> Result<Response> {
        if !payload.exists() {
            return Err(RegistrarError::Precondition {
                path: payload.to_path_buf(),
            });
        }
        info!("Registering plugin {}", payload.display());
        let form = Form::new()
            .file("file", payload)
            .map_err(|source| RegistrarError::Io {
                path: payload.to_path_buf(),
                source,
            })?;
        let response = self
            .session
            .client()
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|e| RegistrarError::http(&self.url, e))?;
        check_status(
            response,
            RegistryOperation::Create {
                path: payload.to_path_buf(),
            },
        )
    }

    /// 删除指定 ID 的插件实例。
    pub fn delete(&self, id: &str) -> Result<Response> {
        info!("Deleting plugin {id}");
        let url = format!("{}/{}", self.url, id);
        let response = self
            .session
            .client()
            .delete(&url)
            .send()
            .map_err(|e| RegistrarError::http(&url, e))?;
        check_status(response, RegistryOperation::Delete { id: id.to_string() })
    }
}

/// 刷新结果。
///
/// 字段说明：
/// - `deleted`：按列表顺序删除的实例 ID
/// - `created`：是否已上传新包
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub deleted: Vec<String>,
    pub created: bool,
}

/// 删除所有逻辑名为 `plugin_name` 的插件，然后上传 `plugin_file` 一次。
///
/// 异常处理：
/// - 任一步骤失败立即返回，已完成的删除不回滚
pub fn refresh_plugin(
    session: &Session,
    plugin_name: &str,
    plugin_file: &Path,
) -> Result<RefreshReport> {
    let api = PluginsApi::new(session);
    let mut report = RefreshReport::default();
    for record in api.list()? {
        if record.matches(plugin_name) {
            api.delete(&record.id)?;
            report.deleted.push(record.id);
        }
    }
    api.create(plugin_file)?;
    report.created = true;
    Ok(report)
}

/// 只读检测：返回逻辑名为 `plugin_name` 的已注册插件。
pub fn find_registered(session: &Session, plugin_name: &str) -> Result<Vec<PluginRecord>> {
    let api = PluginsApi::new(session);
    Ok(api
        .list()?
        .into_iter()
        .filter(|record| record.matches(plugin_name))
        .collect())
}

fn check_status(response: Response, operation: RegistryOperation) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    warn!("{operation} rejected with status {status}");
    Err(RegistrarError::RegistryOperation {
        operation,
        status: status.as_u16(),
    })
}
