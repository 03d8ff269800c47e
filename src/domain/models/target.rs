// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ScrapeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

const CANONICAL_ORIGIN: &str = "https://www.linkedin.com";

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Company,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => write!(f, "person"),
            EntityKind::Company => write!(f, "company"),
        }
    }
}

/// 抓取目标
///
/// 规范化后的主页URL与实体类型，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTarget {
    url: Url,
    kind: EntityKind,
    slug: String,
}

impl ScrapeTarget {
    /// 解析并校验目标URL
    ///
    /// # 参数
    ///
    /// * `raw` - 个人主页或公司主页URL
    /// * `expected` - 期望的实体类型
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeTarget)` - 规范化后的目标
    /// * `Err(ScrapeError::InvalidTarget)` - URL无效或实体类型不符
    pub fn parse(raw: &str, expected: EntityKind) -> Result<Self, ScrapeError> {
        let invalid = |reason: String| ScrapeError::InvalidTarget {
            url: raw.to_string(),
            expected,
            reason,
        };

        let parsed = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        if host != "linkedin.com" && !host.ends_with(".linkedin.com") {
            return Err(invalid(format!("host '{}' is not linkedin.com", host)));
        }

        let mut segments = parsed
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter();

        let section = segments.next().unwrap_or_default();
        let slug = segments.next().unwrap_or_default();

        let detected = match section {
            "in" => EntityKind::Person,
            "company" | "showcase" => EntityKind::Company,
            other => {
                return Err(invalid(format!(
                    "path section '/{}' is neither a profile nor a company page",
                    other
                )))
            }
        };

        if detected != expected {
            return Err(invalid(format!(
                "URL points to a {} page, expected a {} page",
                detected, expected
            )));
        }

        if slug.is_empty() {
            return Err(invalid("missing profile identifier".to_string()));
        }

        let canonical = format!("{}/{}/{}/", CANONICAL_ORIGIN, section, slug);
        let url = Url::parse(&canonical).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            url,
            kind: expected,
            slug: slug.to_string(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// 拼接主页下的子路径，例如 `details/experience/`
    pub fn join(&self, relative: &str) -> String {
        match self.url.join(relative) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.url, relative),
        }
    }
}

impl fmt::Display for ScrapeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// 规范化列表项中的个人主页链接，作为跨页去重的稳定标识
///
/// 去掉查询参数与片段，补全站点前缀，统一为 `https://www.linkedin.com/in/<slug>/`
pub fn normalize_profile_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", CANONICAL_ORIGIN, href)
    } else {
        format!("{}/{}", CANONICAL_ORIGIN, href)
    };

    let parsed = Url::parse(&absolute).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|p| !p.is_empty()).collect();

    match segments.as_slice() {
        [section @ ("in" | "company" | "showcase"), slug, ..] => {
            Some(format!("{}/{}/{}/", CANONICAL_ORIGIN, section, slug))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_url_is_canonicalized() {
        let target =
            ScrapeTarget::parse("https://linkedin.com/in/jane-doe?trk=abc#top", EntityKind::Person)
                .unwrap();
        assert_eq!(target.url().as_str(), "https://www.linkedin.com/in/jane-doe/");
        assert_eq!(target.slug(), "jane-doe");
        assert_eq!(target.kind(), EntityKind::Person);
    }

    #[test]
    fn test_company_sub_page_resolves_to_root() {
        let target =
            ScrapeTarget::parse("https://www.linkedin.com/company/acme/about/", EntityKind::Company)
                .unwrap();
        assert_eq!(target.url().as_str(), "https://www.linkedin.com/company/acme/");
        assert_eq!(target.join("about/"), "https://www.linkedin.com/company/acme/about/");
    }

    #[test]
    fn test_wrong_entity_kind_is_rejected() {
        let err = ScrapeTarget::parse("https://www.linkedin.com/company/acme/", EntityKind::Person)
            .unwrap_err();
        match err {
            ScrapeError::InvalidTarget { expected, reason, .. } => {
                assert_eq!(expected, EntityKind::Person);
                assert!(reason.contains("company page"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_host_and_garbage_are_rejected() {
        assert!(ScrapeTarget::parse("https://example.com/in/jane/", EntityKind::Person).is_err());
        assert!(ScrapeTarget::parse("not a url", EntityKind::Person).is_err());
        assert!(ScrapeTarget::parse("https://www.linkedin.com/in/", EntityKind::Person).is_err());
        assert!(ScrapeTarget::parse("ftp://www.linkedin.com/in/jane", EntityKind::Person).is_err());
        assert!(ScrapeTarget::parse("https://www.linkedin.com/feed/", EntityKind::Company).is_err());
    }

    #[test]
    fn test_normalize_profile_url() {
        assert_eq!(
            normalize_profile_url("/in/john-smith?miniProfileUrn=urn%3Ali"),
            Some("https://www.linkedin.com/in/john-smith/".to_string())
        );
        assert_eq!(
            normalize_profile_url("https://www.linkedin.com/in/john-smith/overlay/about-this-profile/"),
            Some("https://www.linkedin.com/in/john-smith/".to_string())
        );
        assert_eq!(normalize_profile_url("/search/results/people/"), None);
        assert_eq!(normalize_profile_url(""), None);
    }
}
