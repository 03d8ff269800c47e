// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<from>(?:[A-Z][a-z]{2}\s+)?\d{4}|Present)\s*[-–]\s*(?P<to>(?:[A-Z][a-z]{2}\s+)?\d{4}|Present)(?:\s*·\s*(?P<duration>.+))?$")
        .expect("valid date range pattern")
});

static SINGLE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Z][a-z]{2}\s+)?\d{4}$").expect("valid single date pattern")
});

static COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<num>\d[\d,]*(?:\.\d+)?)\s*(?P<unit>[KkMm])?").expect("valid count pattern")
});

const EMPLOYMENT_TYPES: &[&str] = &[
    "Full-time",
    "Part-time",
    "Self-employed",
    "Freelance",
    "Contract",
    "Internship",
    "Apprenticeship",
    "Seasonal",
];

/// 日期区间的拆分结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
    pub duration: Option<String>,
}

/// 拆分 `"Oct 2024 - Present · 3 mos"` 形式的日期区间
pub fn split_date_range(text: &str) -> Option<DateRange> {
    let text = text.trim();
    if let Some(caps) = DATE_RANGE.captures(text) {
        return Some(DateRange {
            from: caps.name("from").map(|m| m.as_str().to_string()),
            to: caps.name("to").map(|m| m.as_str().to_string()),
            duration: caps.name("duration").map(|m| m.as_str().trim().to_string()),
        });
    }

    // single date, optionally followed by a duration
    let (date, duration) = match text.split_once('·') {
        Some((d, rest)) => (d.trim(), Some(rest.trim().to_string())),
        None => (text, None),
    };
    if SINGLE_DATE.is_match(date) {
        return Some(DateRange {
            from: Some(date.to_string()),
            to: None,
            duration,
        });
    }
    None
}

pub fn looks_like_date_range(text: &str) -> bool {
    split_date_range(text).is_some()
}

/// 识别雇佣类型
pub fn detect_employment_type(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    EMPLOYMENT_TYPES
        .iter()
        .find(|t| lower.contains(&t.to_lowercase()))
        .copied()
}

/// 拆分 `"Acme · Full-time"` 为公司名与雇佣类型
pub fn split_company_and_type(text: &str) -> (String, Option<String>) {
    match text.split_once('·') {
        Some((company, rest)) => {
            let employment = detect_employment_type(rest).map(str::to_string);
            (company.trim().to_string(), employment)
        }
        None => match detect_employment_type(text) {
            Some(t) if text.trim().eq_ignore_ascii_case(t) => (String::new(), Some(t.to_string())),
            _ => (text.trim().to_string(), None),
        },
    }
}

/// 解析 `"Skills: Rust · Tokio"` 形式的技能行
pub fn parse_skills(line: &str) -> Option<Vec<String>> {
    let rest = line.trim().strip_prefix("Skills:")?;
    let separator = if rest.contains('·') { '·' } else { ',' };
    Some(
        rest.split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_number(num: &str, unit: Option<&str>) -> Option<f64> {
    let value: f64 = num.replace(',', "").parse().ok()?;
    let multiplier = match unit.map(|u| u.to_ascii_lowercase()) {
        Some(u) if u == "k" => 1_000.0,
        Some(u) if u == "m" => 1_000_000.0,
        _ => 1.0,
    };
    Some(value * multiplier)
}

/// 从公司规模文字中解析员工数下限
///
/// `"10K+ employees"` → 10000，`"1,001-5,000 employees"` → 1001
pub fn parse_headcount(text: &str) -> Option<u64> {
    let caps = COUNT.captures(text)?;
    let value = parse_number(caps.name("num")?.as_str(), caps.name("unit").map(|m| m.as_str()))?;
    Some(value.round() as u64)
}

/// 解析 `"500+ connections"`、`"1.2K followers"` 之类的计数
pub fn parse_count(text: &str) -> Option<u32> {
    parse_headcount(text).and_then(|n| u32::try_from(n).ok())
}

/// 解析成立年份
pub fn parse_year(text: &str) -> Option<u16> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|s| s.len() == 4)
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_date_range() {
        let range = split_date_range("Oct 2024 - Present · 3 mos").unwrap();
        assert_eq!(range.from.as_deref(), Some("Oct 2024"));
        assert_eq!(range.to.as_deref(), Some("Present"));
        assert_eq!(range.duration.as_deref(), Some("3 mos"));

        let range = split_date_range("2015 – 2019").unwrap();
        assert_eq!(range.from.as_deref(), Some("2015"));
        assert_eq!(range.to.as_deref(), Some("2019"));
        assert_eq!(range.duration, None);

        let single = split_date_range("Jan 2020").unwrap();
        assert_eq!(single.from.as_deref(), Some("Jan 2020"));
        assert_eq!(single.to, None);

        assert!(split_date_range("Berlin, Germany").is_none());
        assert!(!looks_like_date_range("Acme · Full-time"));
    }

    #[test]
    fn test_company_and_employment_type() {
        assert_eq!(
            split_company_and_type("Acme · Full-time"),
            ("Acme".to_string(), Some("Full-time".to_string()))
        );
        assert_eq!(split_company_and_type("Acme"), ("Acme".to_string(), None));
        assert_eq!(detect_employment_type("freelance"), Some("Freelance"));
    }

    #[test]
    fn test_parse_skills() {
        assert_eq!(
            parse_skills("Skills: Rust · Tokio · gRPC"),
            Some(vec!["Rust".into(), "Tokio".into(), "gRPC".into()])
        );
        assert_eq!(parse_skills("Skills: A, B"), Some(vec!["A".into(), "B".into()]));
        assert_eq!(parse_skills("Built things"), None);
    }

    #[test]
    fn test_parse_headcount() {
        assert_eq!(parse_headcount("10K+ employees"), Some(10_000));
        assert_eq!(parse_headcount("1,001-5,000 employees"), Some(1_001));
        assert_eq!(parse_headcount("10,001+ employees"), Some(10_001));
        assert_eq!(parse_headcount("1.2M followers"), Some(1_200_000));
        assert_eq!(parse_headcount("employees"), None);
        assert_eq!(parse_count("500+ connections"), Some(500));
        assert_eq!(parse_year("Founded 1998"), Some(1998));
    }
}
