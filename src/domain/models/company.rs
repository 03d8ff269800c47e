// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::fields::FieldGroup;
use crate::domain::models::record::{EntityRecord, ListEntry};
use crate::domain::models::target::EntityKind;
use serde::{Deserialize, Serialize};

/// 员工
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub linkedin_url: String,
}

impl From<ListEntry> for Employee {
    fn from(entry: ListEntry) -> Self {
        Self {
            name: entry.name,
            designation: entry.subtitle,
            linkedin_url: entry.url,
        }
    }
}

/// 展示页或关联公司摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub name: String,
    pub linkedin_url: Option<String>,
    pub industry: Option<String>,
    pub followers: Option<String>,
}

/// 主页面头部信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyBasics {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub headcount: Option<u64>,
    pub followers: Option<String>,
}

/// About 页面上的概览与详情
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyOverview {
    pub about_us: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub headquarters: Option<String>,
    pub founded: Option<u16>,
    pub company_type: Option<String>,
}

/// 公司主页记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub linkedin_url: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub headcount: Option<u64>,
    pub followers: Option<String>,
    pub about_us: Option<String>,
    pub website: Option<String>,
    pub headquarters: Option<String>,
    pub founded: Option<u16>,
    pub company_type: Option<String>,
    pub specialties: Vec<String>,
    pub showcase_pages: Vec<CompanySummary>,
    pub affiliated_companies: Vec<CompanySummary>,
    pub employees: Vec<Employee>,
}

/// 单个字段组的提取结果片段
#[derive(Debug, Clone, PartialEq)]
pub enum CompanyFragment {
    Basic(CompanyBasics),
    About(CompanyOverview),
    Specialties(Vec<String>),
    ShowcasePages(Vec<CompanySummary>),
    AffiliatedCompanies(Vec<CompanySummary>),
    Employees(Vec<Employee>),
}

impl EntityRecord for Company {
    type Fragment = CompanyFragment;

    const KIND: EntityKind = EntityKind::Company;

    fn set_linkedin_url(&mut self, url: &str) {
        self.linkedin_url = Some(url.to_string());
    }

    fn apply(&mut self, fragment: CompanyFragment) {
        match fragment {
            CompanyFragment::Basic(basics) => {
                self.name = basics.name;
                self.tagline = basics.tagline;
                self.followers = basics.followers;
                // the about page carries the authoritative values when both were visited
                self.industry = self.industry.take().or(basics.industry);
                self.company_size = self.company_size.take().or(basics.company_size);
                self.headcount = self.headcount.or(basics.headcount);
            }
            CompanyFragment::About(overview) => {
                self.about_us = overview.about_us;
                self.website = overview.website;
                self.headquarters = overview.headquarters;
                self.founded = overview.founded;
                self.company_type = overview.company_type;
                if overview.industry.is_some() {
                    self.industry = overview.industry;
                }
                if let Some(size) = overview.company_size {
                    self.headcount = crate::domain::extract::text::parse_headcount(&size)
                        .or(self.headcount);
                    self.company_size = Some(size);
                }
            }
            CompanyFragment::Specialties(items) => self.specialties = items,
            CompanyFragment::ShowcasePages(items) => self.showcase_pages = items,
            CompanyFragment::AffiliatedCompanies(items) => self.affiliated_companies = items,
            CompanyFragment::Employees(items) => self.employees = items,
        }
    }

    fn list_fragment(group: FieldGroup, entries: Vec<ListEntry>) -> Option<CompanyFragment> {
        match group {
            FieldGroup::Employees => Some(CompanyFragment::Employees(
                entries.into_iter().map(Employee::from).collect(),
            )),
            _ => None,
        }
    }
}
