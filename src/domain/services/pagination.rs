// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::extract::lists::{extract_list_page, ListPage};
use crate::domain::models::fields::{FieldGroup, PageBudget};
use crate::domain::models::record::ListEntry;
use crate::domain::services::orchestrator::ScrapeContext;
use crate::engines::traits::{BrowserSession, NavigationError, PageHandle};
use metrics::counter;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// 分页游标
///
/// 记录下一页位置、已收集的条目（按稳定标识去重）与剩余页数预算
#[derive(Debug, Clone)]
pub struct PaginationCursor {
    base_url: String,
    next_page: u32,
    seen: HashSet<String>,
    items: Vec<ListEntry>,
    remaining: u32,
}

impl PaginationCursor {
    /// 从列表第一页开始的游标
    pub fn new(base_url: impl Into<String>, budget: PageBudget) -> Self {
        Self {
            base_url: base_url.into(),
            next_page: 1,
            seen: HashSet::new(),
            items: Vec::new(),
            remaining: budget.pages(),
        }
    }

    /// 第 `page` 页的地址，第一页为列表原始地址
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            return self.base_url.clone();
        }
        match Url::parse(&self.base_url) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("page", &page.to_string());
                url.to_string()
            }
            Err(_) => format!("{}?page={}", self.base_url, page),
        }
    }

    /// 下一页地址；预算耗尽时为 `None`
    pub fn next_url(&self) -> Option<String> {
        (self.remaining > 0).then(|| self.page_url(self.next_page))
    }

    /// 记录一次页面加载
    fn consume_page(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
        self.next_page += 1;
    }

    /// 合并一页条目，返回新增数量
    pub fn merge(&mut self, entries: Vec<ListEntry>) -> usize {
        let before = self.items.len();
        for entry in entries {
            if self.seen.insert(entry.url.clone()) {
                self.items.push(entry);
            }
        }
        self.items.len() - before
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn items(&self) -> &[ListEntry] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ListEntry> {
        self.items
    }
}

/// 分页收集的结果
#[derive(Debug, Clone, Default)]
pub struct PaginationOutcome {
    /// 去重后的条目，保持首次出现的顺序
    pub entries: Vec<ListEntry>,
    /// 实际加载的列表页数
    pub pages_loaded: u32,
    /// 站点已表明没有更多页面
    pub exhausted: bool,
    /// 提前结束的原因（软边界，不是错误）
    pub warning: Option<String>,
    /// 第一页就无法提取时的失败原因
    pub error: Option<String>,
}

impl PaginationOutcome {
    /// 列表是否因失败或取消提前结束
    pub fn is_partial(&self) -> bool {
        self.warning.is_some()
    }
}

fn read_page(group: FieldGroup, html: &str) -> Result<ListPage, String> {
    let document = Html::parse_document(html);
    extract_list_page(group, &document)
}

/// 沿分页列表逐页收集条目
///
/// `first_page` 是已经加载好的第一页（计入预算）。以下情况停止：
/// 预算耗尽、站点没有下一页、取消，或下一页导航连续失败。
/// 连续失败只产生警告，已收集的条目照常返回
pub async fn collect<S>(
    session: &mut S,
    first_page: PageHandle,
    mut cursor: PaginationCursor,
    group: FieldGroup,
    ctx: &ScrapeContext,
) -> PaginationOutcome
where
    S: BrowserSession + ?Sized,
{
    let mut outcome = PaginationOutcome::default();
    let mut page = first_page;
    cursor.consume_page();

    loop {
        outcome.pages_loaded += 1;
        counter!("linkedrs_list_pages_total", "group" => group.as_str()).increment(1);

        let extracted = match session.content(&page).await {
            Ok(html) => read_page(group, &html),
            Err(e) => Err(e.to_string()),
        };
        let list_page = match extracted {
            Ok(list_page) => list_page,
            Err(reason) if outcome.pages_loaded == 1 => {
                outcome.error = Some(reason);
                break;
            }
            Err(reason) => {
                outcome.warning = Some(format!(
                    "{} list ended at page {}: {}",
                    group, outcome.pages_loaded, reason
                ));
                break;
            }
        };

        let added = cursor.merge(list_page.entries);
        debug!(
            group = %group,
            page = outcome.pages_loaded,
            added,
            total = cursor.items().len(),
            "List page merged"
        );

        if !list_page.has_next {
            outcome.exhausted = true;
            break;
        }
        let Some(next_url) = cursor.next_url() else {
            debug!(group = %group, "Page budget spent");
            break;
        };
        if let Some(reason) = ctx.stop_reason() {
            outcome.warning = Some(format!("{} list {} after {} pages", group, reason, outcome.pages_loaded));
            break;
        }

        match next_page(session, &next_url, ctx).await {
            Ok(handle) => {
                cursor.consume_page();
                page = handle;
            }
            Err(e) => {
                warn!(group = %group, url = %next_url, error = %e, "Giving up on next list page");
                outcome.warning = Some(format!(
                    "{} list ended after {} pages: {}",
                    group, outcome.pages_loaded, e
                ));
                break;
            }
        }
    }

    outcome.entries = cursor.into_items();
    info!(
        group = %group,
        pages = outcome.pages_loaded,
        entries = outcome.entries.len(),
        partial = outcome.is_partial(),
        "List collected"
    );
    outcome
}

/// 导航到下一页，按重试策略退避重试
///
/// 任何类型的导航错误都计入连续失败次数
async fn next_page<S>(session: &mut S, url: &str, ctx: &ScrapeContext) -> Result<PageHandle, NavigationError>
where
    S: BrowserSession + ?Sized,
{
    let mut failures = 0;
    loop {
        ctx.throttle.acquire().await;
        match session.navigate(url).await {
            Ok(handle) => {
                counter!("linkedrs_navigations_total", "outcome" => "ok").increment(1);
                if let Err(e) = session.wait_for_stable(&handle, ctx.settle_timeout).await {
                    debug!(url = %url, error = %e, "List page did not settle");
                }
                return Ok(handle);
            }
            Err(e) => {
                counter!("linkedrs_navigations_total", "outcome" => e.kind()).increment(1);
                failures += 1;
                if !ctx.retry.should_retry(failures) {
                    return Err(e);
                }
                let backoff = ctx.retry.calculate_backoff(failures);
                debug!(url = %url, attempt = failures, backoff_ms = backoff.as_millis() as u64, "Retrying list page");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
