// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{BrowserSession, NavigationError, PageHandle};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

// readyState plus DOM size, sampled until two consecutive samples agree
const SETTLE_PROBE_JS: &str =
    "document.readyState === 'complete' ? document.documentElement.outerHTML.length : -1";

/// Chromium 浏览器会话
///
/// 基于chromiumoxide，一个会话独占一个浏览器实例和一个标签页
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
    settle_poll: Duration,
}

fn browser_error(e: impl std::fmt::Display) -> NavigationError {
    NavigationError::Browser(e.to_string())
}

/// 落地URL路径的第一段（小写）
pub(crate) fn first_segment(final_url: &str) -> Option<String> {
    let url = Url::parse(final_url).ok()?;
    let segment = url.path_segments()?.find(|s| !s.is_empty())?;
    Some(segment.to_ascii_lowercase())
}

/// 判断落地URL是否为拦截页面
///
/// 只看路径的第一段，目标自身的slug不参与判断
pub(crate) fn blocked_reason(final_url: &str) -> Option<&'static str> {
    match first_segment(final_url)?.as_str() {
        "checkpoint" => Some("security challenge"),
        "authwall" => Some("auth wall"),
        "login" | "uas" => Some("redirected to login"),
        _ => None,
    }
}

/// 落地页是否为站点的404页面
pub(crate) fn is_not_found_page(final_url: &str) -> bool {
    first_segment(final_url).is_some_and(|s| s == "404")
}

impl ChromiumSession {
    /// 启动或连接Chromium并打开一个空白标签页
    ///
    /// # 参数
    ///
    /// * `settings` - 浏览器配置
    /// * `settle_poll` - 页面稳定检测的轮询间隔
    ///
    /// # 返回值
    ///
    /// * `Ok(ChromiumSession)` - 可用的会话
    /// * `Err(NavigationError)` - 启动或连接失败
    pub async fn launch(
        settings: &BrowserSettings,
        settle_poll: Duration,
    ) -> Result<Self, NavigationError> {
        let (browser, mut handler) = if let Some(ref url) = settings.remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url.as_str())
                .await
                .map_err(|e| browser_error(format!("Failed to connect to remote Chrome: {}", e)))?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .window_size(settings.viewport_width, settings.viewport_height)
                .request_timeout(settings.navigation_timeout());

            if !settings.headless {
                builder = builder.with_head();
            }
            for arg in &settings.chrome_args {
                builder = builder.arg(arg.as_str());
            }

            Browser::launch(builder.build().map_err(browser_error)?)
                .await
                .map_err(browser_error)?
        };

        // Spawn a handler to process browser events
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(browser_error)?;
        page.set_user_agent(settings.user_agent.as_str())
            .await
            .map_err(browser_error)?;

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout: settings.navigation_timeout(),
            settle_poll,
        })
    }

    /// 设置 li_at 登录cookie
    pub async fn set_session_cookie(&self, value: &str) -> Result<(), NavigationError> {
        let cookie = CookieParam::builder()
            .name("li_at")
            .value(value)
            .domain(".linkedin.com")
            .path("/")
            .http_only(true)
            .secure(true)
            .build()
            .map_err(browser_error)?;
        self.page.set_cookie(cookie).await.map_err(browser_error)?;
        Ok(())
    }

    /// 在当前页面的输入框中键入文本
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<(), NavigationError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| browser_error(format!("Input failed, element not found: {}", e)))?
            .click()
            .await
            .map_err(browser_error)?
            .type_str(text)
            .await
            .map_err(|e| browser_error(format!("Input failed: {}", e)))?;
        Ok(())
    }

    /// 点击元素并等待随之发生的导航完成
    pub async fn click_and_wait(&mut self, selector: &str) -> Result<PageHandle, NavigationError> {
        let before = self.current_url().await?;
        let timeout = self.navigation_timeout;
        let page = &self.page;
        tokio::time::timeout(timeout, async {
            page.find_element(selector)
                .await
                .map_err(|e| browser_error(format!("Click failed, element not found: {}", e)))?
                .click()
                .await
                .map_err(|e| browser_error(format!("Click failed: {}", e)))?;
            page.wait_for_navigation().await.map_err(browser_error)?;
            Ok::<_, NavigationError>(())
        })
        .await
        .map_err(|_| NavigationError::Timeout(timeout))??;

        let after = self.current_url().await?;
        Ok(PageHandle::new(before, after))
    }

    async fn current_url(&self) -> Result<String, NavigationError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(browser_error)?
            .unwrap_or_default())
    }

    /// 加载URL并返回落地地址，不对落地页面做任何判定
    pub async fn load(&mut self, url: &str) -> Result<String, NavigationError> {
        let timeout = self.navigation_timeout;
        // goto waits for the load event by default
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(timeout))?
            .map_err(browser_error)?;
        self.current_url().await
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<PageHandle, NavigationError> {
        let final_url = self.load(url).await?;
        if let Some(reason) = blocked_reason(&final_url) {
            return Err(NavigationError::Blocked(format!("{} at {}", reason, final_url)));
        }
        if is_not_found_page(&final_url) {
            return Err(NavigationError::NotFound(url.to_string()));
        }

        Ok(PageHandle::new(url, final_url))
    }

    async fn wait_for_stable(
        &mut self,
        _page: &PageHandle,
        timeout: Duration,
    ) -> Result<(), NavigationError> {
        let deadline = Instant::now() + timeout;
        let mut previous: Option<i64> = None;

        loop {
            let sample = self
                .page
                .evaluate(SETTLE_PROBE_JS)
                .await
                .map_err(browser_error)?
                .into_value::<i64>()
                .map_err(browser_error)?;

            if sample > 0 && previous == Some(sample) {
                return Ok(());
            }
            previous = Some(sample);

            if Instant::now() + self.settle_poll > deadline {
                return Err(NavigationError::Timeout(timeout));
            }
            tokio::time::sleep(self.settle_poll).await;
        }
    }

    async fn content(&mut self, _page: &PageHandle) -> Result<String, NavigationError> {
        self.page.content().await.map_err(browser_error)
    }

    async fn close(&mut self) -> Result<(), NavigationError> {
        self.browser.close().await.map_err(browser_error)?;
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
