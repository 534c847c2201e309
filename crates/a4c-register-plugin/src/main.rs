//! A4C Brooklyn 插件注册工具。
//!
//! 职责：
//! - 解析参数（命令行 > 环境变量 > 默认值），确认插件包存在
//! - 等待 A4C 服务器可达，建立会话并登录
//! - 删除同逻辑名的已注册插件，再上传新的插件包
//!
//! 退出码：
//! - 成功为 0；任何失败打印错误信息后以非 0 退出
//!
//! 作者：A4C Brooklyn 插件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::io::IsTerminal;
use std::path::PathBuf;

use a4c_client::config::{
    self, DEFAULT_PASSWORD, DEFAULT_PLUGIN_NAME, DEFAULT_ROOT_URL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USERNAME,
};
use a4c_client::readiness;
use a4c_client::registry;
use a4c_client::session::Session;
use a4c_client::Config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

/// 命令行参数。
///
/// 说明：
/// - 每个参数都可由同名环境变量提供（`ALIEN_URL`、`ALIEN_USER` 等）
/// - 未指定 `--plugin` / `BROOKLYN_PLUGIN` 时，按可执行文件位置推算插件包路径
#[derive(Debug, Parser)]
#[command(name = "a4c-register-plugin", version)]
struct Cli {
    #[arg(long, env = "ALIEN_URL", default_value = DEFAULT_ROOT_URL)]
    url: String,

    #[arg(long, env = "ALIEN_USER", default_value = DEFAULT_USERNAME)]
    user: String,

    #[arg(long, env = "ALIEN_PASSWORD", default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    password: String,

    /// 等待服务器就绪的最大秒数。
    #[arg(long, env = "TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[arg(long, env = "BROOKLYN_PLUGIN_NAME", default_value = DEFAULT_PLUGIN_NAME)]
    plugin_name: String,

    #[arg(long, env = "BROOKLYN_PLUGIN")]
    plugin: Option<PathBuf>,

    /// 只输出警告与错误（默认日志级别由 info 提升为 warn）。
    #[arg(long, default_value_t = false)]
    silent: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// 支持的子命令（缺省为 `refresh`）。
#[derive(Debug, Subcommand)]
enum Commands {
    /// 删除同名插件并上传新包。
    Refresh,
    /// 仅列出已注册的同名插件（不做修改）。
    Detect,
}

/// 程序入口：初始化日志、解析参数并分发子命令。
fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level(cli.silent).parse()?)
                .add_directive("reqwest=warn".parse()?)
                .add_directive("hyper=warn".parse()?),
        )
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;

    match cli.command.as_ref().unwrap_or(&Commands::Refresh) {
        Commands::Refresh => refresh(&config),
        Commands::Detect => detect(&config),
    }
}

/// 默认日志级别：`--silent` 时只保留警告与错误。
fn default_level(silent: bool) -> &'static str {
    if silent {
        "warn"
    } else {
        "info"
    }
}

/// 由命令行参数构建运行配置。
///
/// 异常处理：
/// - 无法定位可执行文件（用于推算默认插件包路径）时返回错误
fn build_config(cli: &Cli) -> Result<Config> {
    let script_dir = match &cli.plugin {
        Some(_) => PathBuf::from("."),
        None => std::env::current_exe()
            .context("locate current executable")?
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let plugin_file = config::resolve_plugin_file(cli.plugin.as_deref(), &script_dir)?;

    let mut config = Config::new(plugin_file).with_root_url(&cli.url);
    config.username = cli.user.clone();
    config.password = cli.password.clone();
    config.timeout_secs = cli.timeout;
    config.plugin_name = cli.plugin_name.clone();
    Ok(config)
}

/// 等待就绪并登录，返回可用于注册表调用的会话。
fn connect(config: &Config) -> Result<Session> {
    readiness::wait_for_server_ready(config)?;
    let session = Session::open(config)?;
    session.sign_in(config)?;
    Ok(session)
}

/// 执行刷新：删除同逻辑名插件后上传新包。
///
/// 异常处理：
/// - 插件包不存在时在任何网络请求之前返回错误
fn refresh(config: &Config) -> Result<()> {
    config.validate()?;
    let session = connect(config)?;
    let report = registry::refresh_plugin(&session, &config.plugin_name, &config.plugin_file)?;
    info!(
        "Plugin {} refreshed from {} ({} previous instance(s) removed)",
        config.plugin_name,
        config.plugin_file.display(),
        report.deleted.len()
    );
    Ok(())
}

/// 列出已注册的同逻辑名插件，结果输出到 stdout。
fn detect(config: &Config) -> Result<()> {
    let session = connect(config)?;
    let found = registry::find_registered(&session, &config.plugin_name)?;
    if found.is_empty() {
        println!("none");
    }
    for plugin in &found {
        println!("{} ({})", plugin.logical_name(), plugin.id);
    }
    Ok(())
}
