// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{BrowserSession, NavigationError, PageHandle};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// 预设的导航失败
#[derive(Debug, Clone)]
struct ScriptedFailure {
    error: NavigationError,
    /// 剩余失败次数，`None` 表示永远失败
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct LogState {
    navigations: Vec<String>,
    closed: bool,
}

/// 回放会话的导航日志
///
/// 克隆后共享同一份记录，会话被装箱交给调用方后仍可观察
#[derive(Debug, Clone, Default)]
pub struct ReplayLog(Arc<Mutex<LogState>>);

impl ReplayLog {
    /// 按顺序记录的全部导航URL
    pub fn navigations(&self) -> Vec<String> {
        self.0.lock().navigations.clone()
    }

    pub fn navigation_count(&self) -> usize {
        self.0.lock().navigations.len()
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().closed
    }
}

/// 回放引擎
///
/// 以URL为键返回预先录制的HTML快照，可按URL预设导航失败与页面稳定超时，
/// 并记录每一次导航。用于离线回放与测试
#[derive(Debug, Default)]
pub struct ReplaySession {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    failures: HashMap<String, ScriptedFailure>,
    unstable: HashSet<String>,
    log: ReplayLog,
    current: Option<String>,
}

fn key(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl ReplaySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个页面快照
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.insert_page(url, html);
        self
    }

    pub fn insert_page(&mut self, url: &str, html: impl Into<String>) {
        self.pages.insert(key(url), html.into());
    }

    /// 导航到 `from` 时落地到 `to`
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(key(from), to.to_string());
        self
    }

    /// 对该URL的每一次导航都返回指定错误
    pub fn with_failure(mut self, url: &str, error: NavigationError) -> Self {
        self.failures.insert(
            key(url),
            ScriptedFailure {
                error,
                remaining: None,
            },
        );
        self
    }

    /// 对该URL的前 `times` 次导航返回指定错误，之后正常返回
    pub fn with_failures(mut self, url: &str, error: NavigationError, times: u32) -> Self {
        self.failures.insert(
            key(url),
            ScriptedFailure {
                error,
                remaining: Some(times),
            },
        );
        self
    }

    /// 该URL的页面永远不会稳定，`wait_for_stable` 返回超时
    pub fn with_unstable_page(mut self, url: &str) -> Self {
        self.unstable.insert(key(url));
        self
    }

    /// 从目录加载快照：每个 `*.html` 文件的首行为 `<!-- url: ... -->` 注释
    pub fn from_dir(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut session = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let html = std::fs::read_to_string(&path)?;
            let url = html
                .lines()
                .next()
                .and_then(|line| line.trim().strip_prefix("<!-- url:"))
                .and_then(|rest| rest.strip_suffix("-->"))
                .map(|u| u.trim().to_string());
            match url {
                Some(url) => session.insert_page(&url, html),
                None => tracing::warn!("Skipping snapshot without url header: {}", path.display()),
            }
        }
        Ok(session)
    }

    /// 共享的导航日志句柄
    pub fn log(&self) -> ReplayLog {
        self.log.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log.navigations()
    }

    pub fn navigation_count(&self) -> usize {
        self.log.navigation_count()
    }

    pub fn is_closed(&self) -> bool {
        self.log.is_closed()
    }
}

#[async_trait]
impl BrowserSession for ReplaySession {
    async fn navigate(&mut self, url: &str) -> Result<PageHandle, NavigationError> {
        {
            let mut log = self.log.0.lock();
            if log.closed {
                return Err(NavigationError::Browser("session is closed".to_string()));
            }
            log.navigations.push(url.to_string());
        }
        let k = key(url);

        if let Some(failure) = self.failures.get_mut(&k) {
            match failure.remaining {
                None => return Err(failure.error.clone()),
                Some(n) if n > 0 => {
                    failure.remaining = Some(n - 1);
                    return Err(failure.error.clone());
                }
                Some(_) => {}
            }
        }

        let final_url = self.redirects.get(&k).cloned().unwrap_or_else(|| url.to_string());
        if !self.pages.contains_key(&key(&final_url)) {
            self.current = None;
            return Err(NavigationError::NotFound(url.to_string()));
        }

        self.current = Some(key(&final_url));
        Ok(PageHandle::new(url, final_url))
    }

    async fn wait_for_stable(
        &mut self,
        page: &PageHandle,
        timeout: Duration,
    ) -> Result<(), NavigationError> {
        if self.unstable.contains(&key(&page.final_url)) {
            return Err(NavigationError::Timeout(timeout));
        }
        Ok(())
    }

    async fn content(&mut self, page: &PageHandle) -> Result<String, NavigationError> {
        let k = key(&page.final_url);
        if self.current.as_deref() != Some(k.as_str()) {
            return Err(NavigationError::Browser(format!(
                "page {} is no longer loaded",
                page.final_url
            )));
        }
        self.pages
            .get(&k)
            .cloned()
            .ok_or_else(|| NavigationError::NotFound(page.final_url.clone()))
    }

    async fn close(&mut self) -> Result<(), NavigationError> {
        self.log.0.lock().closed = true;
        self.current = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}
