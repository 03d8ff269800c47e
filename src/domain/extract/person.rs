// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 个人主页各字段组的提取操作
//!
//! 每个操作只读取一个已加载的页面，不触发导航。
//! 区块不存在返回 `Extraction::Empty`，结构无法识别返回 `Extraction::Failed`。

use crate::domain::extract::dom::{self, css, first, text_of, visible_lines};
use crate::domain::extract::text::{
    detect_employment_type, parse_count, parse_skills, split_company_and_type, split_date_range,
};
use crate::domain::extract::details_items;
use crate::domain::models::person::{
    BasicInfo, ContactInfo, Education, Experience, Honor, Interest, InterestKind, Language,
    PersonFragment,
};
use crate::domain::models::record::Extraction;
use crate::domain::services::normalizer;
use scraper::{ElementRef, Html};

/// 主页面头部：姓名、头衔、所在地、求职状态与人脉数
pub fn extract_basic(doc: &Html) -> Extraction<PersonFragment> {
    basic(doc).into()
}

fn basic(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let name = match dom::doc_text(doc, ".mt2.relative h1")? {
        Some(name) => Some(name),
        None => dom::doc_text(doc, "main h1")?,
    };
    let Some(name) = name else {
        return Err("profile header has no name heading".to_string());
    };

    let headline = dom::doc_text(doc, "div.text-body-medium.break-words")?
        .or(dom::doc_text(doc, "div.text-body-medium")?)
        .and_then(|h| normalizer::normalize_text(&h))
        .filter(|h| *h != name);

    let location = dom::doc_text(doc, ".text-body-small.inline.t-black--light.break-words")?;

    let open_to_work = first(doc, ".pv-top-card-profile-picture img")?.map(|img| {
        img.value()
            .attr("title")
            .is_some_and(|title| title.contains("#OPEN_TO_WORK"))
    });

    let items = css("main li")?;
    let connection_count = doc
        .select(&items)
        .map(text_of)
        .filter(|t| t.len() < 40 && t.to_lowercase().contains("connection"))
        .find_map(|t| parse_count(&t));

    Ok(Some(PersonFragment::Basic(BasicInfo {
        name: normalizer::normalize_text(&name),
        headline,
        location,
        open_to_work,
        connection_count,
    })))
}

/// 主页面的 About 区块
pub fn extract_about(doc: &Html) -> Extraction<PersonFragment> {
    about(doc).into()
}

fn about(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let Some(section) = dom::section_by_anchor(doc, "about")? else {
        return Ok(None);
    };

    let text_spans = css(
        ".inline-show-more-text span[aria-hidden='true'], \
         .pv-shared-text-with-see-more span[aria-hidden='true']",
    )?;
    // each text node is a line break in the rendered about text
    let raw: Vec<String> = section
        .select(&text_spans)
        .flat_map(|span| span.text().map(str::to_string).collect::<Vec<_>>())
        .collect();

    if raw.is_empty() {
        return Err("about section has no text container".to_string());
    }

    let paragraphs = normalizer::normalize(&raw);
    Ok((!paragraphs.is_empty()).then_some(PersonFragment::About(paragraphs)))
}

fn is_location_like(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.chars().count() <= 80
        && !line.ends_with('.')
        && (line.contains(',')
            || lower.contains("remote")
            || lower.contains("on-site")
            || lower.contains("hybrid"))
}

fn company_link(item: ElementRef<'_>) -> Result<Option<String>, String> {
    let links = css("a[href*='/company/'], a[href*='/school/']")?;
    Ok(item
        .select(&links)
        .find_map(dom::href)
        .and_then(crate::domain::models::target::normalize_profile_url)
        .or_else(|| item.select(&links).find_map(dom::href).map(dom::absolute_url)))
}

fn parse_role(lines: &[String], institution: Option<&str>) -> Option<Experience> {
    let (title, rest) = lines.split_first()?;
    let mut exp = Experience {
        position_title: Some(title.clone()),
        institution_name: institution.map(str::to_string),
        ..Default::default()
    };
    let mut description: Vec<String> = Vec::new();

    for line in rest {
        if let Some(skills) = parse_skills(line) {
            exp.skills.extend(skills);
            continue;
        }
        if exp.from_date.is_none() {
            if let Some(range) = split_date_range(line) {
                exp.from_date = range.from;
                exp.to_date = range.to;
                exp.duration = range.duration;
                continue;
            }
            if exp.institution_name.is_none() {
                let (company, employment) = split_company_and_type(line);
                exp.institution_name = Some(company).filter(|c| !c.is_empty());
                exp.employment_type = employment;
                continue;
            }
            if exp.employment_type.is_none() {
                if let Some(t) = detect_employment_type(line) {
                    exp.employment_type = Some(t.to_string());
                    continue;
                }
            }
        }
        if exp.from_date.is_some()
            && exp.location.is_none()
            && description.is_empty()
            && is_location_like(line)
        {
            exp.location = Some(line.clone());
            continue;
        }
        description.push(line.clone());
    }

    if !description.is_empty() {
        exp.description = Some(description.join("\n"));
    }
    Some(exp)
}

fn experience_entries(item: ElementRef<'_>) -> Result<Vec<Experience>, String> {
    let lines = visible_lines(item)?;
    let linkedin_url = company_link(item)?;

    let nested = css(".pvs-entity__sub-components li")?;
    let sub_roles: Vec<Vec<String>> = item
        .select(&nested)
        .map(visible_lines)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|sub| sub.iter().any(|l| split_date_range(l).is_some()))
        .collect();

    // several roles at one company: the header names the company, each sub item is a role
    if let Some(first_sub) = sub_roles.first().and_then(|s| s.first()) {
        let header_len = lines.iter().position(|l| l == first_sub).unwrap_or(lines.len());
        let company = lines.first().filter(|_| header_len > 0).map(String::as_str);
        let header_type = lines[..header_len]
            .iter()
            .skip(1)
            .find_map(|l| detect_employment_type(l));
        return Ok(sub_roles
            .iter()
            .filter_map(|role| parse_role(role, company))
            .map(|mut exp| {
                exp.linkedin_url = linkedin_url.clone();
                if exp.employment_type.is_none() {
                    exp.employment_type = header_type.map(str::to_string);
                }
                exp
            })
            .collect());
    }

    Ok(parse_role(&lines, None)
        .map(|mut exp| {
            exp.linkedin_url = linkedin_url;
            exp
        })
        .into_iter()
        .collect())
}

/// 工作经历详情页
pub fn extract_experience(doc: &Html) -> Extraction<PersonFragment> {
    experience(doc).into()
}

fn experience(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let Some(items) = details_items(doc)? else {
        return Ok(None);
    };
    let mut experiences = Vec::new();
    for item in items {
        experiences.extend(experience_entries(item)?);
    }
    if experiences.is_empty() {
        return Err("experience entries had no readable text".to_string());
    }
    Ok(Some(PersonFragment::Experience(experiences)))
}

/// 教育经历详情页
pub fn extract_education(doc: &Html) -> Extraction<PersonFragment> {
    education(doc).into()
}

fn education(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let Some(items) = details_items(doc)? else {
        return Ok(None);
    };

    let mut educations = Vec::new();
    for item in items {
        let lines = visible_lines(item)?;
        let Some((school, rest)) = lines.split_first() else {
            continue;
        };
        let mut edu = Education {
            institution_name: Some(school.clone()),
            linkedin_url: company_link(item)?,
            ..Default::default()
        };
        let mut description = Vec::new();
        for line in rest {
            if let Some(skills) = parse_skills(line) {
                edu.skills.extend(skills);
            } else if let Some(range) = split_date_range(line).filter(|_| edu.from_date.is_none()) {
                edu.from_date = range.from;
                edu.to_date = range.to;
            } else if edu.degree.is_none() && edu.from_date.is_none() && description.is_empty() {
                edu.degree = Some(line.clone());
            } else {
                description.push(line.clone());
            }
        }
        if !description.is_empty() {
            edu.description = Some(description.join("\n"));
        }
        educations.push(edu);
    }

    if educations.is_empty() {
        return Err("education entries had no readable text".to_string());
    }
    Ok(Some(PersonFragment::Education(educations)))
}

fn interest_kind(url: &str) -> InterestKind {
    if url.contains("/in/") {
        InterestKind::Influencer
    } else if url.contains("/company/") || url.contains("/showcase/") {
        InterestKind::Company
    } else if url.contains("/groups/") {
        InterestKind::Group
    } else if url.contains("/newsletters/") {
        InterestKind::Newsletter
    } else if url.contains("/school/") {
        InterestKind::School
    } else {
        InterestKind::Other
    }
}

/// 兴趣详情页（当前选中的标签页）
pub fn extract_interests(doc: &Html) -> Extraction<PersonFragment> {
    interests(doc).into()
}

fn interests(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let Some(items) = details_items(doc)? else {
        return Ok(None);
    };
    let links = css("a[href]")?;

    let mut interests = Vec::new();
    for item in items {
        let lines = visible_lines(item)?;
        let Some(name) = lines.first() else {
            continue;
        };
        let url = item.select(&links).find_map(dom::href).map(dom::absolute_url);
        let kind = url.as_deref().map(interest_kind).unwrap_or(InterestKind::Other);
        let followers = lines
            .iter()
            .skip(1)
            .find(|l| {
                let lower = l.to_lowercase();
                lower.contains("follower") || lower.contains("member")
            })
            .cloned();
        interests.push(Interest {
            name: name.clone(),
            kind,
            url,
            followers,
        });
    }

    if interests.is_empty() {
        return Err("interest entries had no readable text".to_string());
    }
    Ok(Some(PersonFragment::Interests(interests)))
}

/// 荣誉奖项详情页
pub fn extract_honors(doc: &Html) -> Extraction<PersonFragment> {
    honors(doc).into()
}

fn honors(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let Some(items) = details_items(doc)? else {
        return Ok(None);
    };

    let mut honors = Vec::new();
    for item in items {
        let lines = visible_lines(item)?;
        let Some((title, rest)) = lines.split_first() else {
            continue;
        };
        let mut honor = Honor {
            title: title.clone(),
            issuer: None,
            date: None,
            associated_with: None,
            description: None,
        };
        let mut description = Vec::new();
        for line in rest {
            if let Some(issued) = line.strip_prefix("Issued by ") {
                let (issuer, date) = match issued.split_once('·') {
                    Some((issuer, date)) => (issuer.trim(), Some(date.trim().to_string())),
                    None => (issued.trim(), None),
                };
                honor.issuer = Some(issuer.to_string());
                honor.date = date;
            } else if let Some(assoc) = line.strip_prefix("Associated with ") {
                honor.associated_with = Some(assoc.trim().to_string());
            } else if honor.date.is_none() && split_date_range(line).is_some() {
                honor.date = Some(line.clone());
            } else {
                description.push(line.clone());
            }
        }
        if !description.is_empty() {
            honor.description = Some(description.join("\n"));
        }
        honors.push(honor);
    }

    if honors.is_empty() {
        return Err("honor entries had no readable text".to_string());
    }
    Ok(Some(PersonFragment::Honors(honors)))
}

/// 语言能力详情页
pub fn extract_languages(doc: &Html) -> Extraction<PersonFragment> {
    languages(doc).into()
}

fn languages(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let Some(items) = details_items(doc)? else {
        return Ok(None);
    };

    let mut languages = Vec::new();
    for item in items {
        let lines = visible_lines(item)?;
        if let Some((name, rest)) = lines.split_first() {
            languages.push(Language {
                name: name.clone(),
                proficiency: rest.first().cloned(),
            });
        }
    }

    if languages.is_empty() {
        return Err("language entries had no readable text".to_string());
    }
    Ok(Some(PersonFragment::Languages(languages)))
}

/// 联系方式浮层
pub fn extract_contact_info(doc: &Html) -> Extraction<PersonFragment> {
    contact_info(doc).into()
}

fn contact_info(doc: &Html) -> Result<Option<PersonFragment>, String> {
    let sections = css("section.pv-contact-info__contact-type")?;
    let heading = css("h3")?;
    let links = css("a[href]")?;
    let values = css("li, span.t-14")?;

    let found: Vec<ElementRef<'_>> = doc.select(&sections).collect();
    if found.is_empty() {
        let overlay = first(doc, "#pv-contact-info, .pv-contact-info, [role='dialog']")?;
        return match overlay {
            Some(_) => Ok(None),
            None => Err("contact info overlay not rendered".to_string()),
        };
    }

    let mut info = ContactInfo::default();
    for section in found {
        let label = section
            .select(&heading)
            .next()
            .map(text_of)
            .unwrap_or_default()
            .to_lowercase();
        let first_link = section.select(&links).next();
        let link_text = first_link.map(text_of).filter(|t| !t.is_empty());
        let plain_text = section
            .select(&values)
            .map(text_of)
            .find(|t| !t.is_empty())
            .or_else(|| link_text.clone());

        if label.contains("email") {
            info.email = link_text.or_else(|| {
                first_link
                    .and_then(dom::href)
                    .and_then(|h| h.strip_prefix("mailto:"))
                    .map(str::to_string)
            });
        } else if label.contains("phone") {
            info.phone = plain_text;
        } else if label.contains("website") {
            info.websites = section
                .select(&links)
                .filter_map(dom::href)
                .map(str::to_string)
                .collect();
        } else if label.contains("twitter") || label == "x" {
            info.twitter = link_text;
        } else if label.contains("birthday") {
            info.birthday = plain_text;
        } else if label.contains("profile") {
            info.linkedin_url = first_link.and_then(dom::href).map(dom::absolute_url);
        }
    }

    if info.is_empty() && info.linkedin_url.is_none() {
        return Ok(None);
    }
    Ok(Some(PersonFragment::ContactInfo(Some(info))))
}
