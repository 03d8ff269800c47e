// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::EntityKind;
use crate::utils::errors::ScrapeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 字段组
///
/// 可独立请求的实体字段子集，每个字段组只来源于一个页面。
/// 枚举名称是公开契约的一部分，序列化为 snake_case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Basic,
    About,
    Experience,
    Education,
    Interests,
    Honors,
    Languages,
    ContactInfo,
    Connections,
    Specialties,
    ShowcasePages,
    AffiliatedCompanies,
    Employees,
}

const PERSON_GROUPS: &[FieldGroup] = &[
    FieldGroup::Basic,
    FieldGroup::About,
    FieldGroup::Experience,
    FieldGroup::Education,
    FieldGroup::Interests,
    FieldGroup::Honors,
    FieldGroup::Languages,
    FieldGroup::ContactInfo,
    FieldGroup::Connections,
];

const COMPANY_GROUPS: &[FieldGroup] = &[
    FieldGroup::Basic,
    FieldGroup::About,
    FieldGroup::Specialties,
    FieldGroup::ShowcasePages,
    FieldGroup::AffiliatedCompanies,
    FieldGroup::Employees,
];

/// 字段组的数据来源页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageSource {
    /// 主页面，始终最先访问
    Primary,
    /// 独立的二级页面，值为相对主页的路径
    Secondary(&'static str),
    /// 分页列表页面，值为站点内的绝对路径或相对主页的路径
    List(ListPath),
}

/// 列表页面的定位方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListPath {
    /// 相对主页，例如 `people/`
    Relative(&'static str),
    /// 站点根路径，例如 `/mynetwork/invite-connect/connections/`
    SiteRoot(&'static str),
}

impl FieldGroup {
    /// 指定实体类型的全部字段组（稳定顺序）
    pub fn for_kind(kind: EntityKind) -> &'static [FieldGroup] {
        match kind {
            EntityKind::Person => PERSON_GROUPS,
            EntityKind::Company => COMPANY_GROUPS,
        }
    }

    pub fn belongs_to(self, kind: EntityKind) -> bool {
        Self::for_kind(kind).contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldGroup::Basic => "basic",
            FieldGroup::About => "about",
            FieldGroup::Experience => "experience",
            FieldGroup::Education => "education",
            FieldGroup::Interests => "interests",
            FieldGroup::Honors => "honors",
            FieldGroup::Languages => "languages",
            FieldGroup::ContactInfo => "contact_info",
            FieldGroup::Connections => "connections",
            FieldGroup::Specialties => "specialties",
            FieldGroup::ShowcasePages => "showcase_pages",
            FieldGroup::AffiliatedCompanies => "affiliated_companies",
            FieldGroup::Employees => "employees",
        }
    }

    /// 字段组在指定实体类型下的来源页面
    pub fn source(self, kind: EntityKind) -> PageSource {
        match (kind, self) {
            (_, FieldGroup::Basic) => PageSource::Primary,
            (EntityKind::Person, FieldGroup::About) => PageSource::Primary,
            (EntityKind::Person, FieldGroup::Experience) => PageSource::Secondary("details/experience/"),
            (EntityKind::Person, FieldGroup::Education) => PageSource::Secondary("details/education/"),
            (EntityKind::Person, FieldGroup::Interests) => PageSource::Secondary("details/interests/"),
            (EntityKind::Person, FieldGroup::Honors) => PageSource::Secondary("details/honors/"),
            (EntityKind::Person, FieldGroup::Languages) => PageSource::Secondary("details/languages/"),
            (EntityKind::Person, FieldGroup::ContactInfo) => {
                PageSource::Secondary("overlay/contact-info/")
            }
            (EntityKind::Person, FieldGroup::Connections) => {
                PageSource::List(ListPath::SiteRoot("/mynetwork/invite-connect/connections/"))
            }
            (EntityKind::Company, FieldGroup::Employees) => {
                PageSource::List(ListPath::Relative("people/"))
            }
            // about, specialties and the affiliated pages sidebar share the about page
            (
                EntityKind::Company,
                FieldGroup::About
                | FieldGroup::Specialties
                | FieldGroup::ShowcasePages
                | FieldGroup::AffiliatedCompanies,
            ) => PageSource::Secondary("about/"),
            // groups of the other entity kind never reach planning: FieldSelection::new rejects them
            _ => PageSource::Primary,
        }
    }

    /// 是否为分页列表字段组
    pub fn is_list(self) -> bool {
        matches!(self, FieldGroup::Connections | FieldGroup::Employees)
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldGroup {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PERSON_GROUPS
            .iter()
            .chain(COMPANY_GROUPS.iter())
            .copied()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| ScrapeError::InvalidSelection(format!("unknown field group '{}'", s.trim())))
    }
}

/// 字段选择
///
/// 显式的集合型配置，在规划阶段一次性解析为导航计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    kind: EntityKind,
    groups: BTreeSet<FieldGroup>,
}

impl FieldSelection {
    /// 构建字段选择，拒绝不属于该实体类型的字段组
    pub fn new(
        kind: EntityKind,
        groups: impl IntoIterator<Item = FieldGroup>,
    ) -> Result<Self, ScrapeError> {
        let groups: BTreeSet<FieldGroup> = groups.into_iter().collect();
        if let Some(foreign) = groups.iter().find(|g| !g.belongs_to(kind)) {
            return Err(ScrapeError::InvalidSelection(format!(
                "field group '{}' does not apply to a {}",
                foreign, kind
            )));
        }
        Ok(Self { kind, groups })
    }

    /// 仅主页面字段，不产生额外导航
    pub fn minimal(kind: EntityKind) -> Self {
        Self {
            kind,
            groups: BTreeSet::from([FieldGroup::Basic]),
        }
    }

    /// 该实体类型的全部字段组
    pub fn all(kind: EntityKind) -> Self {
        Self {
            kind,
            groups: FieldGroup::for_kind(kind).iter().copied().collect(),
        }
    }

    /// 职业相关字段（仅个人主页）
    pub fn career() -> Self {
        Self {
            kind: EntityKind::Person,
            groups: BTreeSet::from([
                FieldGroup::Basic,
                FieldGroup::About,
                FieldGroup::Experience,
                FieldGroup::Education,
            ]),
        }
    }

    /// 从预设名称或逗号分隔的字段组名称解析
    pub fn parse(kind: EntityKind, spec: &str) -> Result<Self, ScrapeError> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::minimal(kind)),
            "all" => Ok(Self::all(kind)),
            "career" if kind == EntityKind::Person => Ok(Self::career()),
            _ => {
                let groups = spec
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(FieldGroup::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                Self::new(kind, groups)
            }
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn contains(&self, group: FieldGroup) -> bool {
        self.groups.contains(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = FieldGroup> + '_ {
        self.groups.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// 分页预算
///
/// 列表子资源最多允许加载的页数，`0` 表示完全跳过
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageBudget(pub u32);

impl PageBudget {
    pub const NONE: PageBudget = PageBudget(0);

    pub fn pages(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for PageBudget {
    fn from(value: u32) -> Self {
        PageBudget(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names_are_stable() {
        let person: Vec<&str> = FieldGroup::for_kind(EntityKind::Person)
            .iter()
            .map(|g| g.as_str())
            .collect();
        assert_eq!(
            person,
            vec![
                "basic",
                "about",
                "experience",
                "education",
                "interests",
                "honors",
                "languages",
                "contact_info",
                "connections"
            ]
        );

        let company: Vec<&str> = FieldGroup::for_kind(EntityKind::Company)
            .iter()
            .map(|g| g.as_str())
            .collect();
        assert_eq!(
            company,
            vec![
                "basic",
                "about",
                "specialties",
                "showcase_pages",
                "affiliated_companies",
                "employees"
            ]
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&FieldGroup::AffiliatedCompanies).unwrap();
        assert_eq!(json, "\"affiliated_companies\"");
        let back: FieldGroup = serde_json::from_str("\"contact_info\"").unwrap();
        assert_eq!(back, FieldGroup::ContactInfo);
    }

    #[test]
    fn test_selection_rejects_foreign_groups() {
        let err = FieldSelection::new(EntityKind::Person, [FieldGroup::Employees]).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidSelection(_)));

        let err = FieldSelection::parse(EntityKind::Company, "basic,experience").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidSelection(_)));
    }

    #[test]
    fn test_selection_parsing() {
        let sel = FieldSelection::parse(EntityKind::Person, "basic, experience,contact-info").unwrap();
        assert!(sel.contains(FieldGroup::Basic));
        assert!(sel.contains(FieldGroup::Experience));
        assert!(sel.contains(FieldGroup::ContactInfo));
        assert!(!sel.contains(FieldGroup::About));

        assert_eq!(
            FieldSelection::parse(EntityKind::Company, "ALL").unwrap(),
            FieldSelection::all(EntityKind::Company)
        );
        assert_eq!(
            FieldSelection::parse(EntityKind::Person, "minimal").unwrap(),
            FieldSelection::minimal(EntityKind::Person)
        );
        assert!(FieldSelection::parse(EntityKind::Person, "bogus").is_err());
    }

    #[test]
    fn test_company_secondary_groups_share_about_page() {
        for group in [
            FieldGroup::About,
            FieldGroup::Specialties,
            FieldGroup::ShowcasePages,
            FieldGroup::AffiliatedCompanies,
        ] {
            assert_eq!(group.source(EntityKind::Company), PageSource::Secondary("about/"));
        }
        assert_eq!(FieldGroup::About.source(EntityKind::Person), PageSource::Primary);
        assert!(FieldGroup::Employees.is_list());
        assert!(!FieldGroup::Honors.is_list());
    }

    #[test]
    fn test_every_group_has_a_source_for_both_kinds() {
        for kind in [EntityKind::Person, EntityKind::Company] {
            for group in FieldGroup::for_kind(kind) {
                let source = group.source(kind);
                assert_eq!(matches!(source, PageSource::List(_)), group.is_list(), "{group}");
            }
        }
        // foreign groups resolve without panicking; selections never carry them
        assert_eq!(FieldGroup::Employees.source(EntityKind::Person), PageSource::Primary);
        assert_eq!(FieldGroup::Experience.source(EntityKind::Company), PageSource::Primary);
        assert_eq!(
            FieldGroup::Employees.source(EntityKind::Company),
            PageSource::List(ListPath::Relative("people/"))
        );
    }
}
