// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::extract::GroupExtractor;
use crate::domain::models::company::Company;
use crate::domain::models::fields::{FieldSelection, PageBudget};
use crate::domain::models::person::Person;
use crate::domain::models::record::ScrapedRecord;
use crate::domain::models::target::{EntityKind, ScrapeTarget};
use crate::domain::services::cancellation::CancellationFlag;
use crate::domain::services::orchestrator::{ScrapeContext, ScrapeOrchestrator};
use crate::engines::auth::{self, Credentials};
use crate::engines::chromium_engine::ChromiumSession;
use crate::engines::throttle::NavigationThrottle;
use crate::engines::traits::BrowserSession;
use crate::utils::errors::ScrapeError;
use std::future::Future;
use tracing::{info, warn};

/// 已登录的抓取会话
///
/// 持有一个浏览器标签页，同一时刻只执行一次抓取。
/// 并发抓取多个目标时，每个目标应使用各自的会话，
/// 通过 [`LinkedInSession::with_throttle`] 共享全局限流器
pub struct LinkedInSession {
    browser: Box<dyn BrowserSession>,
    settings: Settings,
    throttle: NavigationThrottle,
    cancel: CancellationFlag,
}

impl LinkedInSession {
    /// 启动浏览器并登录
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `credentials` - cookie 或账号密码
    ///
    /// # 返回值
    ///
    /// * `Ok(LinkedInSession)` - 已登录的会话
    /// * `Err(ScrapeError)` - 浏览器启动失败或认证失败
    pub async fn open(settings: Settings, credentials: &Credentials) -> Result<Self, ScrapeError> {
        let mut chromium = ChromiumSession::launch(&settings.browser, settings.scraping.settle_poll())
            .await
            .map_err(|e| ScrapeError::NoSession(e.to_string()))?;

        if let Err(e) = auth::authenticate(&mut chromium, credentials, &settings.scraping.base_url).await {
            if let Err(close_err) = chromium.close().await {
                warn!("Failed to close browser after authentication error: {}", close_err);
            }
            return Err(e);
        }

        info!("Session authenticated");
        Ok(Self::from_session(Box::new(chromium), settings))
    }

    /// 使用已有的浏览器会话（例如回放引擎）
    pub fn from_session(browser: Box<dyn BrowserSession>, settings: Settings) -> Self {
        let throttle = NavigationThrottle::per_minute(settings.scraping.navigations_per_minute);
        Self {
            browser,
            settings,
            throttle,
            cancel: CancellationFlag::new(),
        }
    }

    /// 与其他会话共享同一个导航限流器
    pub fn with_throttle(mut self, throttle: NavigationThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn throttle(&self) -> &NavigationThrottle {
        &self.throttle
    }

    /// 用于从其他任务取消当前抓取的标志
    ///
    /// 取消请求只作用于正在进行的抓取（没有进行中的抓取时作用于下一次），
    /// 每次抓取返回后标志被清除
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    async fn run<T: GroupExtractor>(
        &mut self,
        target: &ScrapeTarget,
        selection: &FieldSelection,
        budget: PageBudget,
    ) -> Result<ScrapedRecord<T>, ScrapeError> {
        let ctx = ScrapeContext::new(&self.settings.scraping, self.throttle.clone(), self.cancel.clone());
        let result = ScrapeOrchestrator::new(self.browser.as_mut(), ctx)
            .scrape::<T>(target, selection, budget)
            .await;
        // a cancel request is consumed by the scrape it interrupted
        self.cancel.reset();
        result
    }

    /// 抓取个人主页
    ///
    /// 人脉列表使用配置中的默认分页预算
    pub async fn get_profile(
        &mut self,
        url: &str,
        selection: &FieldSelection,
    ) -> Result<ScrapedRecord<Person>, ScrapeError> {
        let target = ScrapeTarget::parse(url, EntityKind::Person)?;
        let budget = PageBudget(self.settings.scraping.default_page_budget);
        self.run::<Person>(&target, selection, budget).await
    }

    /// 抓取公司主页
    ///
    /// `max_pages` 限制员工列表最多加载的页数，`0` 表示跳过
    pub async fn get_company(
        &mut self,
        url: &str,
        selection: &FieldSelection,
        max_pages: u32,
    ) -> Result<ScrapedRecord<Company>, ScrapeError> {
        let target = ScrapeTarget::parse(url, EntityKind::Company)?;
        self.run::<Company>(&target, selection, PageBudget(max_pages)).await
    }

    /// 关闭浏览器
    pub async fn close(mut self) -> Result<(), ScrapeError> {
        self.browser
            .close()
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))
    }
}

/// 在作用域内使用会话，任何退出路径上都会关闭浏览器
///
/// # 示例
///
/// ```no_run
/// use linkedrs::config::settings::Settings;
/// use linkedrs::engines::auth::Credentials;
/// use linkedrs::session::with_session;
/// use linkedrs::{EntityKind, FieldSelection};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = Settings::new()?;
/// let credentials = Credentials::from_settings(&settings.auth)?;
/// let record = with_session(settings, &credentials, |session| {
///     Box::pin(async move {
///         session
///             .get_company("https://www.linkedin.com/company/rust-foundation/", &FieldSelection::all(EntityKind::Company), 1)
///             .await
///     })
/// })
/// .await?;
/// println!("{}", serde_json::to_string_pretty(&record)?);
/// # Ok(())
/// # }
/// ```
pub async fn with_session<R, F>(
    settings: Settings,
    credentials: &Credentials,
    f: F,
) -> Result<R, ScrapeError>
where
    F: for<'a> FnOnce(&'a mut LinkedInSession) -> std::pin::Pin<Box<dyn Future<Output = Result<R, ScrapeError>> + Send + 'a>>,
{
    let mut session = LinkedInSession::open(settings, credentials).await?;
    let result = f(&mut session).await;
    if let Err(e) = session.close().await {
        warn!("Failed to close session: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::fields::FieldGroup;
    use crate::engines::replay_engine::ReplaySession;

    const PROFILE: &str = "https://www.linkedin.com/in/jane-doe/";

    fn settings() -> Settings {
        let mut settings = Settings::defaults().unwrap();
        settings.scraping.navigations_per_minute = 0;
        settings.scraping.default_page_budget = 0;
        settings
    }

    #[tokio::test]
    async fn test_get_profile_over_replay() {
        let replay = ReplaySession::new().with_page(
            PROFILE,
            r#"<html><body><main><h1>Jane Doe</h1></main></body></html>"#,
        );
        let mut session = LinkedInSession::from_session(Box::new(replay), settings());
        let record = session
            .get_profile("https://linkedin.com/in/jane-doe?trk=x", &FieldSelection::all(EntityKind::Person))
            .await
            .unwrap();

        assert_eq!(record.data().name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.data().linkedin_url.as_deref(), Some(PROFILE));
        // secondary pages are not recorded, so every one of them is a field error
        assert!(record.error_for(FieldGroup::Experience).is_some());
        // zero default budget: connections are skipped, not failed
        assert!(record.error_for(FieldGroup::Connections).is_none());
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_covers_a_single_scrape() {
        let replay = ReplaySession::new().with_page(
            PROFILE,
            r#"<html><body><main><h1>Jane Doe</h1></main></body></html>"#,
        );
        let log = replay.log();
        let mut session = LinkedInSession::from_session(Box::new(replay), settings());
        let minimal = FieldSelection::minimal(EntityKind::Person);

        session.cancellation_flag().cancel();
        let first = session.get_profile(PROFILE, &minimal).await.unwrap();
        assert!(!first.is_complete());
        assert_eq!(log.navigation_count(), 0);

        let second = session.get_profile(PROFILE, &minimal).await.unwrap();
        assert!(second.is_complete());
        assert!(second.is_success());
        assert_eq!(second.data().name.as_deref(), Some("Jane Doe"));
        assert_eq!(log.navigation_count(), 1);
        assert!(!session.cancellation_flag().is_cancelled());
    }

    #[tokio::test]
    async fn test_wrong_kind_fails_fast() {
        let mut session = LinkedInSession::from_session(Box::new(ReplaySession::new()), settings());
        let err = session
            .get_company(PROFILE, &FieldSelection::all(EntityKind::Company), 1)
            .await
            .unwrap_err();
        assert!(err.is_precondition());
    }
}
