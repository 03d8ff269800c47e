// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapingSettings;
use crate::domain::extract::{unavailable_reason, GroupExtractor};
use crate::domain::models::fields::{FieldGroup, FieldSelection, PageBudget};
use crate::domain::models::record::{EntityRecord, Extraction, RecordBuilder, ScrapedRecord};
use crate::domain::models::target::ScrapeTarget;
use crate::domain::services::cancellation::CancellationFlag;
use crate::domain::services::pagination::{self, PaginationCursor};
use crate::domain::services::planner::{self, NavigationPlan, PlanStep, VisitKind};
use crate::engines::throttle::NavigationThrottle;
use crate::engines::traits::{BrowserSession, PageHandle};
use crate::utils::errors::ScrapeError;
use crate::utils::retry_policy::RetryPolicy;
use metrics::counter;
use scraper::Html;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 一次抓取的运行参数
///
/// 包含重试策略、页面稳定等待、全局限流、取消标志与整体超时
#[derive(Debug, Clone)]
pub struct ScrapeContext {
    pub retry: RetryPolicy,
    pub settle_timeout: Duration,
    pub throttle: NavigationThrottle,
    pub cancel: CancellationFlag,
    pub scrape_timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl ScrapeContext {
    pub fn new(settings: &ScrapingSettings, throttle: NavigationThrottle, cancel: CancellationFlag) -> Self {
        Self {
            retry: RetryPolicy::with_backoff(settings.retry_backoff()),
            settle_timeout: settings.settle_timeout(),
            throttle,
            cancel,
            scrape_timeout: settings.scrape_timeout(),
            deadline: None,
        }
    }

    /// 开始计时，返回带截止时间的副本
    pub fn start(&self) -> Self {
        Self {
            deadline: self.scrape_timeout.map(|t| Instant::now() + t),
            ..self.clone()
        }
    }

    /// 是否应在下一个步骤边界停止
    pub fn stop_reason(&self) -> Option<&'static str> {
        if self.cancel.is_cancelled() {
            return Some("cancelled");
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some("timed out"),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            retry: RetryPolicy::immediate(),
            settle_timeout: Duration::from_secs(1),
            throttle: NavigationThrottle::unlimited(),
            cancel: CancellationFlag::new(),
            scrape_timeout: None,
            deadline: None,
        }
    }
}

/// 编排状态
#[derive(Debug)]
enum ScrapeState {
    Visiting(usize),
    Extracting(usize, PageHandle),
    Paginating(usize, PageHandle),
    Done,
}

/// 抓取编排器
///
/// 在一个浏览器会话上顺序执行导航计划：导航、等待稳定、提取、分页，
/// 把每个字段组的结果或错误累积进记录。只有前置条件错误与主页面
/// 导航失败会中止抓取，其余失败都作为字段错误返回
pub struct ScrapeOrchestrator<'s, S: BrowserSession + ?Sized> {
    session: &'s mut S,
    ctx: ScrapeContext,
}

impl<'s, S: BrowserSession + ?Sized> ScrapeOrchestrator<'s, S> {
    pub fn new(session: &'s mut S, ctx: ScrapeContext) -> Self {
        Self { session, ctx }
    }

    /// 执行一次抓取
    ///
    /// # 参数
    ///
    /// * `target` - 已解析的抓取目标
    /// * `selection` - 字段选择
    /// * `budget` - 列表子资源的分页预算
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapedRecord)` - 最终记录（可能带字段错误或被标记为不完整）
    /// * `Err(ScrapeError)` - 前置条件错误、主页面导航失败或目标不可用
    pub async fn scrape<T: GroupExtractor>(
        &mut self,
        target: &ScrapeTarget,
        selection: &FieldSelection,
        budget: PageBudget,
    ) -> Result<ScrapedRecord<T>, ScrapeError> {
        if target.kind() != T::KIND {
            return Err(ScrapeError::InvalidTarget {
                url: target.to_string(),
                expected: T::KIND,
                reason: format!("URL points to a {} page", target.kind()),
            });
        }

        let scrape_id = Uuid::new_v4();
        info!(scrape_id = %scrape_id, target = %target, state = "planning", "Scrape started");
        let plan = planner::plan(target, selection, budget)?;
        let ctx = self.ctx.start();
        let mut builder = RecordBuilder::<T>::new(target.url().as_str());
        let mut complete = true;
        let mut state = ScrapeState::Visiting(0);

        loop {
            debug!(scrape_id = %scrape_id, state = ?state, "Scrape state");
            state = match state {
                ScrapeState::Visiting(i) => match ctx.stop_reason() {
                    Some(reason) => {
                        warn!(scrape_id = %scrape_id, step = i, reason, "Scrape stopped early");
                        cancel_remaining(&plan, i, reason, &mut builder);
                        complete = false;
                        ScrapeState::Done
                    }
                    None => self.visit(&plan, i, &ctx, &mut builder).await?,
                },
                ScrapeState::Extracting(i, page) => {
                    self.extract::<T>(target, &plan.steps()[i], &page, &mut builder).await?;
                    next(i, &plan)
                }
                ScrapeState::Paginating(i, page) => {
                    self.paginate::<T>(&plan.steps()[i], page, plan.budget(), &ctx, &mut builder)
                        .await;
                    next(i, &plan)
                }
                ScrapeState::Done => break,
            };
        }

        let record = builder.finish(complete);
        info!(
            scrape_id = %scrape_id,
            target = %target,
            success = record.is_success(),
            complete = record.is_complete(),
            errors = record.scraping_errors().len(),
            "Scrape finished"
        );
        Ok(record)
    }

    /// 导航到计划中的第 `i` 步
    async fn visit<T: EntityRecord>(
        &mut self,
        plan: &NavigationPlan,
        i: usize,
        ctx: &ScrapeContext,
        builder: &mut RecordBuilder<T>,
    ) -> Result<ScrapeState, ScrapeError> {
        let step = &plan.steps()[i];
        ctx.throttle.acquire().await;
        info!(url = %step.url, step = i, session = self.session.name(), "Navigating");

        let page = match self.session.navigate(&step.url).await {
            Ok(page) => {
                counter!("linkedrs_navigations_total", "outcome" => "ok").increment(1);
                page
            }
            Err(e) => {
                counter!("linkedrs_navigations_total", "outcome" => e.kind()).increment(1);
                if step.kind == VisitKind::Primary {
                    return Err(ScrapeError::PrimaryNavigation(e));
                }
                warn!(url = %step.url, error = %e, "Secondary page unreachable");
                let reason = format!("navigation to {} failed: {}", step.url, e);
                for &group in &step.groups {
                    field_error(builder, group, reason.clone());
                }
                return Ok(next(i, plan));
            }
        };

        if let Err(e) = self.session.wait_for_stable(&page, ctx.settle_timeout).await {
            warn!(url = %step.url, error = %e, "Page did not settle");
            builder.warn(format!("{} did not settle ({}); extracted what rendered", step.url, e));
        }

        Ok(match step.kind {
            VisitKind::List => ScrapeState::Paginating(i, page),
            VisitKind::Primary | VisitKind::Secondary => ScrapeState::Extracting(i, page),
        })
    }

    /// 在已加载的页面上运行该步骤的全部提取操作
    async fn extract<T: GroupExtractor>(
        &mut self,
        target: &ScrapeTarget,
        step: &PlanStep,
        page: &PageHandle,
        builder: &mut RecordBuilder<T>,
    ) -> Result<(), ScrapeError> {
        let primary = step.kind == VisitKind::Primary;
        let html = match self.session.content(page).await {
            Ok(html) => html,
            Err(e) if primary => return Err(ScrapeError::PrimaryNavigation(e)),
            Err(e) => {
                let reason = format!("could not read {}: {}", step.url, e);
                for &group in &step.groups {
                    field_error(builder, group, reason.clone());
                }
                return Ok(());
            }
        };

        let results: Vec<(FieldGroup, Extraction<T::Fragment>)> = {
            let document = Html::parse_document(&html);
            if primary {
                if let Some(reason) = unavailable_reason(&document) {
                    return Err(ScrapeError::TargetUnavailable(format!("{}: {}", target, reason)));
                }
            }
            step.groups
                .iter()
                .map(|&group| (group, T::extract_group(group, &document)))
                .collect()
        };

        for (group, extraction) in results {
            if let Extraction::Failed(reason) = &extraction {
                warn!(group = %group, url = %step.url, reason = %reason, "Field extraction failed");
                counter!("linkedrs_field_errors_total", "group" => group.as_str()).increment(1);
                if primary {
                    builder.mark_unsuccessful();
                }
            }
            builder.record(group, extraction);
        }
        Ok(())
    }

    /// 从已加载的列表第一页开始分页收集
    async fn paginate<T: EntityRecord>(
        &mut self,
        step: &PlanStep,
        first_page: PageHandle,
        budget: PageBudget,
        ctx: &ScrapeContext,
        builder: &mut RecordBuilder<T>,
    ) {
        for &group in &step.groups {
            let cursor = PaginationCursor::new(step.url.clone(), budget);
            let outcome =
                pagination::collect(&mut *self.session, first_page.clone(), cursor, group, ctx).await;

            if let Some(reason) = outcome.error {
                field_error(builder, group, reason);
                continue;
            }
            if let Some(warning) = outcome.warning {
                builder.warn(warning);
                builder.mark_partial(group);
            }
            if let Some(fragment) = T::list_fragment(group, outcome.entries) {
                builder.record(group, Extraction::Value(fragment));
            }
        }
    }
}

fn next(i: usize, plan: &NavigationPlan) -> ScrapeState {
    if i + 1 < plan.len() {
        ScrapeState::Visiting(i + 1)
    } else {
        ScrapeState::Done
    }
}

fn field_error<T: EntityRecord>(builder: &mut RecordBuilder<T>, group: FieldGroup, reason: String) {
    counter!("linkedrs_field_errors_total", "group" => group.as_str()).increment(1);
    builder.fail(group, reason);
}

/// 为第 `from` 步及之后尚未执行的字段组记录取消原因
fn cancel_remaining<T: EntityRecord>(
    plan: &NavigationPlan,
    from: usize,
    reason: &str,
    builder: &mut RecordBuilder<T>,
) {
    if from == 0 {
        builder.mark_unsuccessful();
    }
    for step in &plan.steps()[from..] {
        for &group in &step.groups {
            if !builder.has_error(group) {
                builder.fail(group, format!("{} before extraction", reason));
            }
        }
    }
}
