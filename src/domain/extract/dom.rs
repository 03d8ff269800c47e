// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::normalizer;
use scraper::{ElementRef, Html, Selector};

/// 解析CSS选择器，失败时返回诊断信息
pub fn css(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid selector '{}': {}", selector, e))
}

/// 元素的全部文本，空白已折叠
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 元素中对用户可见的文本行
///
/// 页面会把同一文本同时写进 `aria-hidden` 与 `visually-hidden` 两个 span，
/// 优先读取 `aria-hidden="true"` 的 span，没有时退回整个元素的文本
pub fn visible_lines(el: ElementRef<'_>) -> Result<Vec<String>, String> {
    let spans = css("span[aria-hidden='true']")?;
    let mut lines: Vec<String> = el
        .select(&spans)
        // nested aria-hidden spans would repeat their parent's text
        .filter(|span| {
            !span.ancestors().filter_map(ElementRef::wrap).any(|a| {
                a.value().name() == "span" && a.value().attr("aria-hidden") == Some("true")
            })
        })
        .map(text_of)
        .collect();

    if lines.is_empty() {
        lines = el
            .text()
            .flat_map(|t| t.lines())
            .map(str::to_string)
            .collect();
    }
    Ok(normalizer::normalize(&lines)
        .into_iter()
        .flat_map(|p| p.lines().map(str::to_string).collect::<Vec<_>>())
        .collect())
}

/// 第一个匹配元素的文本
pub fn first_text(root: ElementRef<'_>, selector: &str) -> Result<Option<String>, String> {
    let sel = css(selector)?;
    Ok(root
        .select(&sel)
        .map(text_of)
        .find(|t| !t.is_empty())
        .and_then(|t| normalizer::normalize_text(&t)))
}

/// 文档中第一个匹配元素
pub fn first<'a>(doc: &'a Html, selector: &str) -> Result<Option<ElementRef<'a>>, String> {
    let sel = css(selector)?;
    Ok(doc.select(&sel).next())
}

/// 文档中第一个匹配元素的文本
pub fn doc_text(doc: &Html, selector: &str) -> Result<Option<String>, String> {
    Ok(first(doc, selector)?.map(text_of).filter(|t| !t.is_empty()))
}

/// 以锚点元素（例如 `#about`）为起点，向上找到所在的 `section`
pub fn section_by_anchor<'a>(doc: &'a Html, anchor_id: &str) -> Result<Option<ElementRef<'a>>, String> {
    let Some(anchor) = first(doc, &format!("#{}", anchor_id))? else {
        return Ok(None);
    };
    Ok(anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "section"))
}

/// 标题文字包含 `heading` 的第一个 `section`
pub fn section_by_heading<'a>(doc: &'a Html, heading: &str) -> Result<Option<ElementRef<'a>>, String> {
    let sections = css("section")?;
    let headings = css("h2, h3")?;
    let needle = heading.to_lowercase();
    Ok(doc.select(&sections).find(|section| {
        section
            .select(&headings)
            .any(|h| text_of(h).to_lowercase().contains(&needle))
    }))
}

/// 链接地址
pub fn href(el: ElementRef<'_>) -> Option<&str> {
    el.value().attr("href").map(str::trim).filter(|h| !h.is_empty())
}

/// 将站内相对链接补全为绝对地址，并去掉查询参数
pub fn absolute_url(href: &str) -> String {
    let href = href.split(['?', '#']).next().unwrap_or(href);
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("https://www.linkedin.com/{}", href.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_lines_prefers_aria_hidden() {
        let doc = Html::parse_fragment(
            r#"<div>
                <span aria-hidden="true">Staff Engineer</span>
                <span class="visually-hidden">Staff Engineer</span>
                <span aria-hidden="true">Acme · Full-time</span>
            </div>"#,
        );
        let root = doc.root_element();
        assert_eq!(
            visible_lines(root).unwrap(),
            vec!["Staff Engineer", "Acme · Full-time"]
        );
    }

    #[test]
    fn test_section_lookup() {
        let doc = Html::parse_document(
            r#"<main><section><div id="about"></div><p>Hello</p></section>
               <section><h2>Overview</h2><p>We build</p></section></main>"#,
        );
        let about = section_by_anchor(&doc, "about").unwrap().unwrap();
        assert_eq!(first_text(about, "p").unwrap().as_deref(), Some("Hello"));
        assert!(section_by_anchor(&doc, "missing").unwrap().is_none());
        let overview = section_by_heading(&doc, "overview").unwrap().unwrap();
        assert_eq!(first_text(overview, "p").unwrap().as_deref(), Some("We build"));
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("/company/acme/?trk=x"),
            "https://www.linkedin.com/company/acme/"
        );
        assert_eq!(absolute_url("https://acme.dev"), "https://acme.dev");
    }
}
