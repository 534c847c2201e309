//! 运行参数与默认值约定。
//!
//! 目标：
//! - 在任何网络调用之前一次性确定全部参数，之后以引用方式传给各组件
//! - 集中管理默认值（服务器地址、账号、超时、插件名、插件包路径）
//!
//! 说明：
//! - 环境变量/命令行的读取由二进制入口负责；本模块只接收已解析的值
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RegistrarError, Result};

/// 默认服务器地址。
pub const DEFAULT_ROOT_URL: &str = "http://127.0.0.1:8091";
/// 默认登录用户名。
pub const DEFAULT_USERNAME: &str = "admin";
/// 默认登录密码。
pub const DEFAULT_PASSWORD: &str = "admin";
/// 默认就绪等待时长（秒）。
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// 默认插件逻辑名（插件描述中的 `id`）。
pub const DEFAULT_PLUGIN_NAME: &str = "a4c-brooklyn-provider";

/// 默认插件包相对于可执行文件所在目录的位置。
pub const DEFAULT_PLUGIN_RELATIVE_PATH: &str =
    "../a4c-brooklyn-plugin/target/a4c-brooklyn-plugin-0.10.0-SNAPSHOT.zip";

/// 插件集合接口路径。
pub const PLUGINS_PATH: &str = "/rest/plugins";
/// 登录接口路径。
pub const LOGIN_PATH: &str = "/login";

/// 插件注册所需的全部运行参数。
///
/// 字段说明：
/// - `root_url`：服务器根地址（不含结尾 `/`）
/// - `username` / `password`：登录凭据
/// - `timeout_secs`：就绪等待的最大秒数
/// - `plugin_name`：要替换的插件逻辑名
/// - `plugin_file`：待上传的插件包（绝对路径）
/// - `poll_interval`：就绪探测的间隔（每次计一个 tick）
/// - `probe_timeout`：单次就绪探测请求的超时
#[derive(Debug, Clone)]
pub struct Config {
    pub root_url: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
    pub plugin_name: String,
    pub plugin_file: PathBuf,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
}

impl Config {
    /// 以默认值创建配置，仅需指定插件包路径。
    pub fn new(plugin_file: PathBuf) -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
            plugin_file,
            poll_interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(5),
        }
    }

    /// 设置服务器根地址（去掉结尾的 `/`）。
    pub fn with_root_url(mut self, raw: &str) -> Self {
        self.root_url = normalize_root_url(raw);
        self
    }

    /// 校验前置条件：插件包必须存在。
    ///
    /// 异常处理：
    /// - 路径不存在时返回 [`RegistrarError::Precondition`]，调用方应在发起任何网络请求前终止。
    pub fn validate(&self) -> Result<()> {
        if !self.plugin_file.exists() {
            return Err(RegistrarError::Precondition {
                path: self.plugin_file.clone(),
            });
        }
        Ok(())
    }

    /// 插件集合接口完整地址。
    pub fn plugins_url(&self) -> String {
        format!("{}{}", self.root_url, PLUGINS_PATH)
    }

    /// 登录接口完整地址。
    pub fn login_url(&self) -> String {
        format!("{}{}", self.root_url, LOGIN_PATH)
    }
}

/// 去掉地址结尾的 `/`，便于拼接接口路径。
pub fn normalize_root_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// 解析插件包路径。
///
/// 参数：
/// - `explicit`：显式指定的路径（`BROOKLYN_PLUGIN` 或 `--plugin`）
/// - `script_dir`：可执行文件所在目录，用于计算默认路径
///
/// 返回值：
/// - 显式路径：相对当前目录转换为绝对路径
/// - 未指定：`script_dir` + [`DEFAULT_PLUGIN_RELATIVE_PATH`] 的绝对路径
///
/// 异常处理：
/// - 无法获取当前目录时返回错误。
pub fn resolve_plugin_file(explicit: Option<&Path>, script_dir: &Path) -> Result<PathBuf> {
    let raw = match explicit {
        Some(p) => p.to_path_buf(),
        None => script_dir.join(DEFAULT_PLUGIN_RELATIVE_PATH),
    };
    let abs = std::path::absolute(&raw).map_err(|source| RegistrarError::Io {
        path: raw.clone(),
        source,
    })?;
    Ok(lexically_normalize(&abs))
}

// `..` is folded without touching the filesystem; the archive may not exist yet.
fn lexically_normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}
