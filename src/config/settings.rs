// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含浏览器、抓取行为与认证三部分配置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 抓取配置
    pub scraping: ScrapingSettings,
    /// 认证配置
    #[serde(default)]
    pub auth: AuthSettings,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 是否无头模式运行
    pub headless: bool,
    /// 远程Chrome调试地址，设置后不再本地启动浏览器
    pub remote_debugging_url: Option<String>,
    /// User-Agent
    pub user_agent: String,
    /// 视口宽度
    pub viewport_width: u32,
    /// 视口高度
    pub viewport_height: u32,
    /// 单次导航超时时间（毫秒）
    pub navigation_timeout_ms: u64,
    /// 额外的Chrome启动参数
    pub chrome_args: Vec<String>,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapingSettings {
    /// 站点根地址
    pub base_url: String,
    /// 等待页面内容稳定的超时时间（毫秒）
    pub settle_timeout_ms: u64,
    /// 页面稳定检测的轮询间隔（毫秒）
    pub settle_poll_ms: u64,
    /// 默认分页预算
    pub default_page_budget: u32,
    /// 全进程每分钟允许的导航次数
    pub navigations_per_minute: u32,
    /// 整体抓取超时时间（秒），为空表示不限制
    pub scrape_timeout_secs: Option<u64>,
    /// 下一页导航失败后的初始退避时间（毫秒）
    pub retry_backoff_ms: u64,
}

/// 认证配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// li_at cookie
    pub cookie: Option<String>,
    /// 登录邮箱
    pub email: Option<String>,
    /// 登录密码
    pub password: Option<String>,
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

impl ScrapingSettings {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }

    pub fn scrape_timeout(&self) -> Option<Duration> {
        self.scrape_timeout_secs.map(Duration::from_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `LINKEDRS__*` 环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LINKEDRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅包含内置默认值的配置
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Browser
            .set_default("browser.headless", true)?
            .set_default("browser.user_agent", DEFAULT_USER_AGENT)?
            .set_default("browser.viewport_width", 1920)?
            .set_default("browser.viewport_height", 1080)?
            .set_default("browser.navigation_timeout_ms", 15_000)?
            .set_default(
                "browser.chrome_args",
                vec![
                    "--disable-blink-features=AutomationControlled",
                    "--disable-dev-shm-usage",
                    "--disable-gpu",
                    "--no-first-run",
                    "--no-default-browser-check",
                ],
            )?
            // Scraping
            .set_default("scraping.base_url", "https://www.linkedin.com")?
            .set_default("scraping.settle_timeout_ms", 5_000)?
            .set_default("scraping.settle_poll_ms", 250)?
            .set_default("scraping.default_page_budget", 1)?
            .set_default("scraping.navigations_per_minute", 30)?
            .set_default("scraping.retry_backoff_ms", 1_500)
    }
}
