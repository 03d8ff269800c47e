// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

/// 导航错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    /// 导航或页面稳定等待超时
    #[error("Navigation timed out after {0:?}")]
    Timeout(Duration),
    /// 被站点拦截（安全验证、登录墙、限流）
    #[error("Blocked: {0}")]
    Blocked(String),
    /// 页面不存在
    #[error("Page not found: {0}")]
    NotFound(String),
    /// 浏览器控制错误
    #[error("Browser error: {0}")]
    Browser(String),
}

impl NavigationError {
    /// 用于指标标签的简短名称
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationError::Timeout(_) => "timeout",
            NavigationError::Blocked(_) => "blocked",
            NavigationError::NotFound(_) => "not_found",
            NavigationError::Browser(_) => "browser",
        }
    }
}

/// 已加载页面的句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHandle {
    /// 请求的URL
    pub requested_url: String,
    /// 重定向后的最终URL
    pub final_url: String,
}

impl PageHandle {
    pub fn new(requested_url: impl Into<String>, final_url: impl Into<String>) -> Self {
        Self {
            requested_url: requested_url.into(),
            final_url: final_url.into(),
        }
    }

    /// 是否被重定向到了其他页面
    pub fn was_redirected(&self) -> bool {
        self.requested_url.trim_end_matches('/') != self.final_url.trim_end_matches('/')
    }
}

/// 浏览器会话特质
///
/// 一个会话对应一个有状态的标签页，同一时刻只能加载一个页面，
/// 因此所有操作都需要 `&mut self`
#[async_trait]
pub trait BrowserSession: Send {
    /// 导航到指定URL
    async fn navigate(&mut self, url: &str) -> Result<PageHandle, NavigationError>;

    /// 等待页面内容稳定
    async fn wait_for_stable(
        &mut self,
        page: &PageHandle,
        timeout: Duration,
    ) -> Result<(), NavigationError>;

    /// 读取当前页面的完整HTML
    async fn content(&mut self, page: &PageHandle) -> Result<String, NavigationError>;

    /// 查询当前页面中第一个匹配元素的文本，不存在时返回 `None`
    async fn query_content(
        &mut self,
        page: &PageHandle,
        selector: &str,
    ) -> Result<Option<String>, NavigationError> {
        let html = self.content(page).await?;
        let selector = Selector::parse(selector)
            .map_err(|e| NavigationError::Browser(format!("invalid selector '{}': {}", selector, e)))?;
        let document = Html::parse_document(&html);
        let text = document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string());
        Ok(text)
    }

    /// 关闭会话并释放浏览器资源
    async fn close(&mut self) -> Result<(), NavigationError> {
        Ok(())
    }

    /// 会话实现名称
    fn name(&self) -> &'static str;
}
