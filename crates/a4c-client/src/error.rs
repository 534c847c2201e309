//! 错误类型定义。
//!
//! 分类：
//! - 前置条件错误：插件包不存在，网络调用之前即失败
//! - 就绪超时：在 `TIMEOUT` 秒内服务器始终无法连通
//! - 认证错误：登录接口返回非 2xx
//! - 注册表操作错误：列表/删除/上传接口返回非 2xx
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 库内统一的 `Result` 别名。
pub type Result<T> = std::result::Result<T, RegistrarError>;

/// 插件注册流程中可能出现的错误。
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// 插件包路径不存在。
    #[error("Cannot find plugin at {}", .path.display())]
    Precondition { path: PathBuf },

    /// 等待服务器就绪超时。
    #[error("Timed out waiting for server at {url} to respond after {max_wait_secs} seconds")]
    ReadinessTimeout { url: String, max_wait_secs: u64 },

    /// 登录被拒绝（非 2xx）。
    #[error("Couldn't sign in to server with given credentials. Server responded: {status}")]
    Authentication { status: u16 },

    /// 插件注册表接口返回非 2xx。
    #[error("Failed to {operation}. Server responded: {status}")]
    RegistryOperation {
        operation: RegistryOperation,
        status: u16,
    },

    /// 传输层失败或响应体解码失败。
    #[error("Request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 响应体不是预期的 JSON 结构。
    #[error("Unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegistrarError {
    /// 将 `reqwest` 错误与请求地址绑定，便于排障。
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }
}

/// 注册表操作种类（用于错误信息）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOperation {
    List,
    Delete { id: String },
    Create { path: PathBuf },
}

impl fmt::Display for RegistryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list plugins"),
            Self::Delete { id } => write!(f, "delete plugin {id}"),
            Self::Create { path } => write!(f, "register plugin {}", path.display()),
        }
    }
}
