// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 公司主页各字段组的提取操作

use crate::domain::extract::dom::{self, css, first, text_of, visible_lines};
use crate::domain::extract::text::{parse_headcount, parse_year};
use crate::domain::models::company::{CompanyBasics, CompanyFragment, CompanyOverview, CompanySummary};
use crate::domain::models::record::Extraction;
use crate::domain::models::target::normalize_profile_url;
use crate::domain::services::normalizer;
use scraper::{ElementRef, Html};

/// 主页面头部：名称、标语、行业、规模与关注者
pub fn extract_basic(doc: &Html) -> Extraction<CompanyFragment> {
    basic(doc).into()
}

fn basic(doc: &Html) -> Result<Option<CompanyFragment>, String> {
    let Some(name) = dom::doc_text(doc, "h1")? else {
        return Err("company header has no name heading".to_string());
    };

    let mut basics = CompanyBasics {
        name: normalizer::normalize_text(&name),
        tagline: dom::doc_text(doc, ".org-top-card-summary__tagline")?,
        ..Default::default()
    };

    let info_items = css(".org-top-card-summary-info-list__info-item")?;
    for item in doc.select(&info_items).map(text_of) {
        let lower = item.to_lowercase();
        if lower.contains("follower") {
            basics.followers = Some(item);
        } else if lower.contains("employee") {
            basics.headcount = parse_headcount(&item);
            basics.company_size = Some(item);
        } else if basics.industry.is_none() && !item.is_empty() {
            basics.industry = Some(item);
        }
    }

    // fall back to the "10K+ employees" link in the header
    if basics.company_size.is_none() {
        let links = css("a")?;
        if let Some(text) = doc
            .select(&links)
            .map(text_of)
            .find(|t| t.to_lowercase().contains("employees") && t.len() < 60)
        {
            basics.headcount = parse_headcount(&text);
            basics.company_size = Some(text);
        }
    }

    Ok(Some(CompanyFragment::Basic(basics)))
}

/// About 页面 `dl` 中的标签与取值
fn about_details(doc: &Html) -> Result<Vec<(String, Vec<String>)>, String> {
    if first(doc, "main")?.is_none() {
        return Err("page has no main content".to_string());
    }

    let lists = css("dl")?;
    let mut details: Vec<(String, Vec<String>)> = Vec::new();
    for list in doc.select(&lists) {
        for child in list.child_elements() {
            match child.value().name() {
                "dt" => details.push((text_of(child), Vec::new())),
                "dd" => {
                    let value = text_of(child);
                    if let (Some((_, values)), false) = (details.last_mut(), value.is_empty()) {
                        values.push(value);
                    }
                }
                _ => {}
            }
        }
    }
    Ok(details)
}

fn detail<'a>(details: &'a [(String, Vec<String>)], label: &str) -> Option<&'a str> {
    details
        .iter()
        .find(|(l, _)| l.eq_ignore_ascii_case(label))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

/// About 页面的概览与详情
pub fn extract_about(doc: &Html) -> Extraction<CompanyFragment> {
    about(doc).into()
}

fn about(doc: &Html) -> Result<Option<CompanyFragment>, String> {
    let details = about_details(doc)?;

    let about_us = match dom::section_by_heading(doc, "Overview")? {
        Some(section) => {
            let paragraphs = css("p")?;
            let raw: Vec<String> = section
                .select(&paragraphs)
                .flat_map(|p| p.text().map(str::to_string).collect::<Vec<_>>())
                .collect();
            let normalized = normalizer::normalize(&raw);
            (!normalized.is_empty()).then(|| normalized.join("\n\n"))
        }
        None => None,
    };

    let website = match first(doc, "dd a[href]")?.and_then(dom::href) {
        Some(href) if !href.contains("linkedin.com") && href.starts_with("http") => {
            Some(href.to_string())
        }
        _ => detail(&details, "Website").map(str::to_string),
    };

    let overview = CompanyOverview {
        about_us,
        website,
        industry: detail(&details, "Industry").map(str::to_string),
        company_size: detail(&details, "Company size").map(str::to_string),
        headquarters: detail(&details, "Headquarters").map(str::to_string),
        founded: detail(&details, "Founded").and_then(parse_year),
        company_type: detail(&details, "Type").map(str::to_string),
    };

    if overview == CompanyOverview::default() {
        return Ok(None);
    }
    Ok(Some(CompanyFragment::About(overview)))
}

/// About 页面详情中的专长列表
pub fn extract_specialties(doc: &Html) -> Extraction<CompanyFragment> {
    specialties(doc).into()
}

fn specialties(doc: &Html) -> Result<Option<CompanyFragment>, String> {
    let details = about_details(doc)?;
    let Some(raw) = detail(&details, "Specialties") else {
        return Ok(None);
    };
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().trim_start_matches("and ").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Ok((!items.is_empty()).then_some(CompanyFragment::Specialties(items)))
}

/// 侧栏中的关联页面（展示页与关联公司）
fn affiliated_entries(doc: &Html) -> Result<Option<Vec<CompanySummary>>, String> {
    if first(doc, "main")?.is_none() {
        return Err("page has no main content".to_string());
    }

    let mut sections: Vec<ElementRef<'_>> = Vec::new();
    for heading in ["Affiliated pages", "Showcase pages"] {
        if let Some(section) = dom::section_by_heading(doc, heading)? {
            if !sections.iter().any(|s| s.id() == section.id()) {
                sections.push(section);
            }
        }
    }
    if sections.is_empty() {
        return Ok(None);
    }

    let items = css("li")?;
    let links = css("a[href*='/company/'], a[href*='/showcase/']")?;
    let mut entries: Vec<CompanySummary> = Vec::new();
    for item in sections.iter().flat_map(|s| s.select(&items)) {
        let Some(url) = item
            .select(&links)
            .find_map(dom::href)
            .and_then(normalize_profile_url)
        else {
            continue;
        };
        if entries.iter().any(|e| e.linkedin_url.as_deref() == Some(url.as_str())) {
            continue;
        }
        let lines = visible_lines(item)?;
        let Some(name) = lines.first().cloned() else {
            continue;
        };
        let followers = lines
            .iter()
            .find(|l| l.to_lowercase().contains("follower"))
            .cloned();
        let industry = lines
            .iter()
            .skip(1)
            .find(|l| !l.to_lowercase().contains("follower") && !l.eq_ignore_ascii_case("follow"))
            .cloned();
        entries.push(CompanySummary {
            name,
            linkedin_url: Some(url),
            industry,
            followers,
        });
    }
    Ok(Some(entries))
}

fn is_showcase(summary: &CompanySummary) -> bool {
    summary
        .linkedin_url
        .as_deref()
        .is_some_and(|u| u.contains("/showcase/"))
}

/// 展示页
pub fn extract_showcase_pages(doc: &Html) -> Extraction<CompanyFragment> {
    affiliated_entries(doc)
        .map(|entries| {
            entries
                .map(|e| e.into_iter().filter(is_showcase).collect::<Vec<_>>())
                .filter(|e| !e.is_empty())
                .map(CompanyFragment::ShowcasePages)
        })
        .into()
}

/// 关联公司
pub fn extract_affiliated_companies(doc: &Html) -> Extraction<CompanyFragment> {
    affiliated_entries(doc)
        .map(|entries| {
            entries
                .map(|e| e.into_iter().filter(|s| !is_showcase(s)).collect::<Vec<_>>())
                .filter(|e| !e.is_empty())
                .map(CompanyFragment::AffiliatedCompanies)
        })
        .into()
}
