//! 带 Cookie 的认证会话。
//!
//! 流程：
//! - [`Session::open`]：对根地址发起一次匿名 GET，仅为拿到服务器下发的会话 Cookie（如 `JSESSIONID`）
//! - [`Session::sign_in`]：以表单提交用户名/密码到 `/login`，2xx 即登录成功
//!
//! 约束：
//! - 会话在进程内只创建一次，后续所有注册表调用复用同一个 Cookie 罐
//! - 不做显式登出，进程退出即丢弃
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::{RegistrarError, Result};

/// 已建立的 HTTP 会话。
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    root_url: String,
}

impl Session {
    /// 创建会话并获取会话 Cookie。
    ///
    /// 异常处理：
    /// - 客户端构建失败或根地址不可达时返回 [`RegistrarError::Http`]
    /// - 根地址返回的状态码不做检查
    pub fn open(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| RegistrarError::http(&config.root_url, e))?;
        let response = client
            .get(&config.root_url)
            .send()
            .map_err(|e| RegistrarError::http(&config.root_url, e))?;
        debug!("session opened, root responded {}", response.status());
        Ok(Self {
            client,
            root_url: config.root_url.clone(),
        })
    }

    /// 使用配置中的凭据登录。
    ///
    /// 异常处理：
    /// - 非 2xx 返回 [`RegistrarError::Authentication`]（携带状态码），不重试
    pub fn sign_in(&self, config: &Config) -> Result<()> {
        let url = config.login_url();
        let form = [
            ("username", config.username.as_str()),
            ("password", config.password.as_str()),
        ];
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .map_err(|e| RegistrarError::http(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistrarError::Authentication {
                status: status.as_u16(),
            });
        }
        debug!("signed in as {}", config.username);
        Ok(())
    }

    /// 底层 HTTP 客户端（携带会话 Cookie）。
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }
}
