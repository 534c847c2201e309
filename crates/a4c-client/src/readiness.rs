//! 服务器就绪探测。
//!
//! 行为：
//! - 反复对根地址发起普通 GET；任何传输层失败（拒绝连接、超时、DNS）一律视为“未就绪”
//! - 每次失败后休眠一个探测间隔并计一个 tick，tick 数达到上限或总等待时间耗尽即超时
//! - 只要收到 HTTP 响应（无论状态码）即视为就绪
//! - 首次重试时打印一次“等待”日志；只有打印过该日志才打印“就绪”日志
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{RegistrarError, Result};

/// 就绪探测结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// 首次探测即成功（不打印任何日志）。
    AlreadyUp,
    /// 经过 `ticks` 次重试后成功。
    BecameReady { ticks: u64 },
}

/// 等待服务器就绪。
///
/// 参数：
/// - `config`：使用其中的 `root_url`、`timeout_secs`、`poll_interval`、`probe_timeout`
///
/// 说明：
/// - 单次探测的超时取 `probe_timeout` 与剩余等待时间中的较小值，总耗时不超过 `timeout_secs`
///
/// 异常处理：
/// - 探测客户端构建失败返回 [`RegistrarError::Http`]
/// - 超时返回 [`RegistrarError::ReadinessTimeout`]
pub fn wait_for_server_ready(config: &Config) -> Result<Readiness> {
    let client = reqwest::blocking::Client::builder()
        .build()
        .map_err(|e| RegistrarError::http(&config.root_url, e))?;

    poll_until_ready(
        &config.root_url,
        config.timeout_secs,
        config.poll_interval,
        |remaining| {
            let request = client
                .get(&config.root_url)
                .timeout(remaining.min(config.probe_timeout));
            match request.send() {
                Ok(_) => true,
                Err(e) => {
                    debug!("readiness probe failed: {e}");
                    false
                }
            }
        },
    )
}

/// 以给定探测函数轮询，直到其返回 `true`、tick 数达到 `max_wait_secs` 或等待时间耗尽。
///
/// 参数：
/// - `url`：仅用于日志与错误信息
/// - `max_wait_secs`：最大等待秒数，同时也是最大 tick 数
/// - `interval`：两次探测之间的休眠时长
/// - `probe`：单次探测，入参为剩余等待时间，返回是否可达
pub fn poll_until_ready<F>(
    url: &str,
    max_wait_secs: u64,
    interval: Duration,
    mut probe: F,
) -> Result<Readiness>
where
    F: FnMut(Duration) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(max_wait_secs);
    let mut ticks = 0u64;
    let mut logged = false;
    while ticks < max_wait_secs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        if probe(remaining) {
            if logged {
                info!("Server ready");
                return Ok(Readiness::BecameReady { ticks });
            }
            return Ok(Readiness::AlreadyUp);
        }
        if !logged {
            info!("Waiting up to {max_wait_secs} seconds for A4C server at {url} to respond");
            logged = true;
        }
        ticks += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());
        thread::sleep(interval.min(remaining));
    }
    Err(RegistrarError::ReadinessTimeout {
        url: url.to_string(),
        max_wait_secs,
    })
}
