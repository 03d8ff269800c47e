// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 分页列表页面（公司员工、个人人脉）的单页提取

use crate::domain::extract::dom::{self, css, first, first_text};
use crate::domain::models::fields::FieldGroup;
use crate::domain::models::record::ListEntry;
use crate::domain::models::target::normalize_profile_url;
use scraper::{ElementRef, Html, Selector};

/// 单个列表页的提取结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub entries: Vec<ListEntry>,
    /// 页面上是否存在可用的下一页控件
    pub has_next: bool,
}

struct ListLayout {
    item: &'static str,
    name: &'static str,
    subtitle: &'static str,
}

const EMPLOYEES: ListLayout = ListLayout {
    item: "main [role='list'] > li, main li.org-people-profile-card__profile-card-spacing",
    name: ".artdeco-entity-lockup__title, .org-people-profile-card__profile-title",
    subtitle: "div.t-14.t-black.t-normal, .artdeco-entity-lockup__subtitle",
};

const CONNECTIONS: ListLayout = ListLayout {
    item: "li.mn-connection-card",
    name: ".mn-connection-card__name",
    subtitle: ".mn-connection-card__occupation",
};

fn layout(group: FieldGroup) -> Result<ListLayout, String> {
    match group {
        FieldGroup::Employees => Ok(EMPLOYEES),
        FieldGroup::Connections => Ok(CONNECTIONS),
        other => Err(format!("field group '{}' is not a list", other)),
    }
}

fn entry(item: ElementRef<'_>, profile_links: &Selector, layout: &ListLayout) -> Result<Option<ListEntry>, String> {
    let Some(url) = item
        .select(profile_links)
        .filter_map(dom::href)
        .find_map(normalize_profile_url)
    else {
        // "LinkedIn Member" cards carry no profile link
        return Ok(None);
    };

    Ok(Some(ListEntry {
        url,
        name: first_text(item, layout.name)?,
        subtitle: first_text(item, layout.subtitle)?,
    }))
}

/// 提取列表页中的条目与下一页状态
///
/// 没有可识别的条目链接的卡片会被跳过；页内重复的条目只保留第一次出现
pub fn extract_list_page(group: FieldGroup, doc: &Html) -> Result<ListPage, String> {
    let layout = layout(group)?;
    if first(doc, "main")?.is_none() {
        return Err("page has no main content".to_string());
    }

    let items = css(layout.item)?;
    let profile_links = css("a[href*='/in/']")?;

    let mut entries: Vec<ListEntry> = Vec::new();
    for item in doc.select(&items) {
        if let Some(found) = entry(item, &profile_links, &layout)? {
            if !entries.iter().any(|e| e.url == found.url) {
                entries.push(found);
            }
        }
    }

    let buttons = css("button")?;
    let has_next = doc.select(&buttons).any(|b| {
        let enabled = b.value().attr("disabled").is_none();
        let label = b.value().attr("aria-label").unwrap_or_default();
        let text = dom::text_of(b).to_lowercase();
        enabled && (label.eq_ignore_ascii_case("next") || text.contains("show more results"))
    });

    Ok(ListPage { entries, has_next })
}
