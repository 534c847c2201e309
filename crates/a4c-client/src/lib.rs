//! Alien4Cloud 插件注册客户端库。
//!
//! 功能：
//! - 解析运行参数（服务器地址、账号、超时、插件名与插件包路径）
//! - 等待 A4C 服务器可达（就绪探测）
//! - 建立带 Cookie 的会话并登录
//! - 列出/删除/上传插件，并按逻辑名“先删后传”刷新插件
//!
//! 约定：
//! - 全部调用为同步阻塞 IO，单线程顺序执行
//! - 错误统一以 [`error::RegistrarError`] 向上返回
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod config;
pub mod error;
pub mod plugin;
pub mod readiness;
pub mod registry;
pub mod session;

pub use config::Config;
pub use error::{RegistrarError, Result};
