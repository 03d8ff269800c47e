// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::fields::FieldGroup;
use crate::domain::models::record::{EntityRecord, ListEntry};
use crate::domain::models::target::EntityKind;
use serde::{Deserialize, Serialize};

/// 工作经历
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub position_title: Option<String>,
    pub institution_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub employment_type: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub skills: Vec<String>,
}

/// 教育经历
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub degree: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub description: Option<String>,
    pub skills: Vec<String>,
}

/// 关注的对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestKind {
    Influencer,
    Company,
    Group,
    Newsletter,
    School,
    Other,
}

/// 兴趣 / 关注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InterestKind,
    pub url: Option<String>,
    pub followers: Option<String>,
}

/// 荣誉奖项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Honor {
    pub title: String,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub associated_with: Option<String>,
    pub description: Option<String>,
}

/// 语言能力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub proficiency: Option<String>,
}

/// 联系方式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub websites: Vec<String>,
    pub twitter: Option<String>,
    pub birthday: Option<String>,
    pub linkedin_url: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.websites.is_empty()
            && self.twitter.is_none()
            && self.birthday.is_none()
    }
}

/// 人脉
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub name: Option<String>,
    pub occupation: Option<String>,
    pub url: String,
}

impl From<ListEntry> for Connection {
    fn from(entry: ListEntry) -> Self {
        Self {
            name: entry.name,
            occupation: entry.subtitle,
            url: entry.url,
        }
    }
}

/// 主页面上的基本信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfo {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub open_to_work: Option<bool>,
    pub connection_count: Option<u32>,
}

/// 个人主页记录
///
/// 所有字段始终存在于序列化结果中；未请求的字段组表现为空集合或 null
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub linkedin_url: Option<String>,
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub about: Vec<String>,
    pub open_to_work: Option<bool>,
    pub connection_count: Option<u32>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub interests: Vec<Interest>,
    pub honors: Vec<Honor>,
    pub languages: Vec<Language>,
    pub contact_info: Option<ContactInfo>,
    pub connections: Vec<Connection>,
}

impl Person {
    /// 最近一段经历的公司名称
    pub fn current_company(&self) -> Option<&str> {
        self.experiences.first().and_then(|e| e.institution_name.as_deref())
    }

    /// 最近一段经历的职位名称
    pub fn current_job_title(&self) -> Option<&str> {
        self.experiences.first().and_then(|e| e.position_title.as_deref())
    }
}

/// 单个字段组的提取结果片段
#[derive(Debug, Clone, PartialEq)]
pub enum PersonFragment {
    Basic(BasicInfo),
    About(Vec<String>),
    Experience(Vec<Experience>),
    Education(Vec<Education>),
    Interests(Vec<Interest>),
    Honors(Vec<Honor>),
    Languages(Vec<Language>),
    ContactInfo(Option<ContactInfo>),
    Connections(Vec<Connection>),
}

impl EntityRecord for Person {
    type Fragment = PersonFragment;

    const KIND: EntityKind = EntityKind::Person;

    fn set_linkedin_url(&mut self, url: &str) {
        self.linkedin_url = Some(url.to_string());
    }

    fn apply(&mut self, fragment: PersonFragment) {
        match fragment {
            PersonFragment::Basic(basic) => {
                self.name = basic.name;
                self.headline = basic.headline;
                self.location = basic.location;
                self.open_to_work = basic.open_to_work;
                self.connection_count = basic.connection_count;
            }
            PersonFragment::About(about) => self.about = about,
            PersonFragment::Experience(items) => self.experiences = items,
            PersonFragment::Education(items) => self.educations = items,
            PersonFragment::Interests(items) => self.interests = items,
            PersonFragment::Honors(items) => self.honors = items,
            PersonFragment::Languages(items) => self.languages = items,
            PersonFragment::ContactInfo(info) => self.contact_info = info,
            PersonFragment::Connections(items) => self.connections = items,
        }
    }

    fn list_fragment(group: FieldGroup, entries: Vec<ListEntry>) -> Option<PersonFragment> {
        match group {
            FieldGroup::Connections => Some(PersonFragment::Connections(
                entries.into_iter().map(Connection::from).collect(),
            )),
            _ => None,
        }
    }
}
