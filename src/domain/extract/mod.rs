// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 页面提取操作
//!
//! 每个操作读取一个已加载页面的DOM，产出单个字段组的片段。
//! 提取操作不做导航，只在同步作用域内解析HTML

pub mod company;
pub mod dom;
pub mod lists;
pub mod person;
pub mod text;

use crate::domain::models::company::{Company, CompanyFragment};
use crate::domain::models::fields::FieldGroup;
use crate::domain::models::person::{Person, PersonFragment};
use crate::domain::models::record::{EntityRecord, Extraction};
use scraper::{ElementRef, Html};

const UNAVAILABLE_MARKERS: &[&str] = &[
    "page not found",
    "this page doesn’t exist",
    "this page doesn't exist",
    "profile is not available",
    "this linkedin page isn’t available",
    "this linkedin page isn't available",
];

/// 按字段组分派提取操作的实体
pub trait GroupExtractor: EntityRecord {
    fn extract_group(group: FieldGroup, doc: &Html) -> Extraction<Self::Fragment>;
}

impl GroupExtractor for Person {
    fn extract_group(group: FieldGroup, doc: &Html) -> Extraction<PersonFragment> {
        match group {
            FieldGroup::Basic => person::extract_basic(doc),
            FieldGroup::About => person::extract_about(doc),
            FieldGroup::Experience => person::extract_experience(doc),
            FieldGroup::Education => person::extract_education(doc),
            FieldGroup::Interests => person::extract_interests(doc),
            FieldGroup::Honors => person::extract_honors(doc),
            FieldGroup::Languages => person::extract_languages(doc),
            FieldGroup::ContactInfo => person::extract_contact_info(doc),
            other => Extraction::Failed(format!("no page extractor for '{}' on a person", other)),
        }
    }
}

impl GroupExtractor for Company {
    fn extract_group(group: FieldGroup, doc: &Html) -> Extraction<CompanyFragment> {
        match group {
            FieldGroup::Basic => company::extract_basic(doc),
            FieldGroup::About => company::extract_about(doc),
            FieldGroup::Specialties => company::extract_specialties(doc),
            FieldGroup::ShowcasePages => company::extract_showcase_pages(doc),
            FieldGroup::AffiliatedCompanies => company::extract_affiliated_companies(doc),
            other => Extraction::Failed(format!("no page extractor for '{}' on a company", other)),
        }
    }
}

/// 主页面是否表明目标不存在或不可访问
///
/// 返回值为页面给出的原因
pub fn unavailable_reason(doc: &Html) -> Option<String> {
    let headings = dom::css("title, h1, h2").ok()?;
    for heading in doc.select(&headings) {
        let text = dom::text_of(heading);
        let lower = text.to_lowercase();
        if UNAVAILABLE_MARKERS.iter().any(|m| lower.contains(m)) {
            return Some(text);
        }
    }

    match dom::first(doc, "form.join-form, .authwall-join-form") {
        Ok(Some(_)) => Some("page requires sign-in".to_string()),
        _ => None,
    }
}

/// 详情页（`details/*`）中的顶层列表项
///
/// * `Ok(Some(items))` - 找到列表项
/// * `Ok(None)` - 页面有列表容器或空状态提示，但没有条目
/// * `Err(_)` - 页面结构与预期不符
pub(crate) fn details_items(doc: &Html) -> Result<Option<Vec<ElementRef<'_>>>, String> {
    let Some(main) = dom::first(doc, "main")? else {
        return Err("page has no main content".to_string());
    };

    let paged = dom::css(".pvs-list__paged-list-item")?;
    let items: Vec<ElementRef<'_>> = main
        .select(&paged)
        .filter(|item| {
            !item
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().classes().any(|c| c == "pvs-list__paged-list-item"))
        })
        .collect();
    if !items.is_empty() {
        return Ok(Some(items));
    }

    let containers = dom::css(".pvs-list__container, .pvs-list, .artdeco-empty-state")?;
    if main.select(&containers).next().is_some()
        || dom::text_of(main).contains("Nothing to see for now")
    {
        return Ok(None);
    }
    Err("no list container on details page".to_string())
}
