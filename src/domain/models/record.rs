// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::fields::FieldGroup;
use crate::domain::models::target::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 单个字段组的提取结果
///
/// 区分有值、合法的空值与提取失败三种情况
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    /// 成功提取到的值
    Value(T),
    /// 页面上不存在对应区块，不算失败
    Empty,
    /// 页面结构与预期不符，携带诊断信息
    Failed(String),
}

impl<T> Extraction<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        match self {
            Extraction::Value(v) => Extraction::Value(f(v)),
            Extraction::Empty => Extraction::Empty,
            Extraction::Failed(reason) => Extraction::Failed(reason),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed(_))
    }
}

/// `Ok(None)` 表示区块不存在，`Err` 携带结构不匹配的诊断信息
impl<T> From<Result<Option<T>, String>> for Extraction<T> {
    fn from(result: Result<Option<T>, String>) -> Self {
        match result {
            Ok(Some(value)) => Extraction::Value(value),
            Ok(None) => Extraction::Empty,
            Err(reason) => Extraction::Failed(reason),
        }
    }
}

/// 列表页中的一项
///
/// `url` 为规范化后的个人主页地址，作为跨页去重的稳定标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub url: String,
    pub name: Option<String>,
    pub subtitle: Option<String>,
}

/// 可由编排器逐步填充的实体记录
pub trait EntityRecord: Default + Serialize + Send + 'static {
    /// 单个字段组的提取片段
    type Fragment: Send;

    const KIND: EntityKind;

    fn set_linkedin_url(&mut self, url: &str);

    /// 将片段合并进记录
    fn apply(&mut self, fragment: Self::Fragment);

    /// 将分页控制器收集的列表项转换为片段
    fn list_fragment(group: FieldGroup, entries: Vec<ListEntry>) -> Option<Self::Fragment>;
}

/// 抓取结果记录
///
/// 实体字段平铺在顶层，外加字段错误表等元数据。
/// 只能由编排器构建，返回后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedRecord<T> {
    #[serde(flatten)]
    data: T,
    scraping_errors: BTreeMap<FieldGroup, String>,
    warnings: Vec<String>,
    partial_lists: BTreeSet<FieldGroup>,
    success: bool,
    complete: bool,
    scraped_at: DateTime<Utc>,
}

impl<T> ScrapedRecord<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    /// 字段组名称到失败原因的映射
    pub fn scraping_errors(&self) -> &BTreeMap<FieldGroup, String> {
        &self.scraping_errors
    }

    pub fn error_for(&self, group: FieldGroup) -> Option<&str> {
        self.scraping_errors.get(&group).map(String::as_str)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// 提前结束的列表字段组
    pub fn partial_lists(&self) -> &BTreeSet<FieldGroup> {
        &self.partial_lists
    }

    /// 主页面提取是否成功
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// 导航计划是否执行完毕（未被取消或超时）
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }
}

/// 编排过程中的可变累加器
pub(crate) struct RecordBuilder<T: EntityRecord> {
    data: T,
    scraping_errors: BTreeMap<FieldGroup, String>,
    warnings: Vec<String>,
    partial_lists: BTreeSet<FieldGroup>,
    success: bool,
}

impl<T: EntityRecord> RecordBuilder<T> {
    pub(crate) fn new(linkedin_url: &str) -> Self {
        let mut data = T::default();
        data.set_linkedin_url(linkedin_url);
        Self {
            data,
            scraping_errors: BTreeMap::new(),
            warnings: Vec::new(),
            partial_lists: BTreeSet::new(),
            success: true,
        }
    }

    /// 合并一个字段组的提取结果，返回是否记为失败
    pub(crate) fn record(&mut self, group: FieldGroup, extraction: Extraction<T::Fragment>) -> bool {
        match extraction {
            Extraction::Value(fragment) => {
                self.data.apply(fragment);
                false
            }
            Extraction::Empty => false,
            Extraction::Failed(reason) => {
                self.fail(group, reason);
                true
            }
        }
    }

    /// 记录字段组失败；同一字段组只保留第一条原因
    pub(crate) fn fail(&mut self, group: FieldGroup, reason: impl Into<String>) {
        self.scraping_errors.entry(group).or_insert_with(|| reason.into());
    }

    pub(crate) fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub(crate) fn mark_partial(&mut self, group: FieldGroup) {
        self.partial_lists.insert(group);
    }

    pub(crate) fn mark_unsuccessful(&mut self) {
        self.success = false;
    }

    pub(crate) fn has_error(&self, group: FieldGroup) -> bool {
        self.scraping_errors.contains_key(&group)
    }

    pub(crate) fn finish(self, complete: bool) -> ScrapedRecord<T> {
        ScrapedRecord {
            data: self.data,
            scraping_errors: self.scraping_errors,
            warnings: self.warnings,
            partial_lists: self.partial_lists,
            success: self.success,
            complete,
            scraped_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::company::{Company, CompanyBasics, CompanyFragment};

    #[test]
    fn test_record_serializes_flat_with_metadata() {
        let mut builder = RecordBuilder::<Company>::new("https://www.linkedin.com/company/acme/");
        builder.record(
            FieldGroup::Basic,
            Extraction::Value(CompanyFragment::Basic(CompanyBasics {
                name: Some("Acme".into()),
                ..Default::default()
            })),
        );
        builder.record(FieldGroup::Specialties, Extraction::Empty);
        builder.record(FieldGroup::About, Extraction::Failed("no overview section".into()));

        let record = builder.finish(true);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["name"], "Acme");
        assert_eq!(value["linkedin_url"], "https://www.linkedin.com/company/acme/");
        assert_eq!(value["scraping_errors"]["about"], "no overview section");
        assert!(value["scraping_errors"].get("specialties").is_none());
        assert_eq!(value["specialties"], serde_json::json!([]));
        assert_eq!(value["success"], true);
        assert_eq!(value["complete"], true);
        assert!(value["scraped_at"].is_string());
    }

    #[test]
    fn test_first_failure_reason_wins() {
        let mut builder = RecordBuilder::<Company>::new("https://www.linkedin.com/company/acme/");
        builder.fail(FieldGroup::About, "navigation timed out");
        builder.fail(FieldGroup::About, "cancelled before extraction");
        let record = builder.finish(false);
        assert_eq!(record.error_for(FieldGroup::About), Some("navigation timed out"));
        assert!(!record.is_complete());
    }

    #[test]
    fn test_extraction_map_preserves_variant() {
        let failed: Extraction<u8> = Extraction::Failed("x".into());
        assert!(failed.map(|v| v + 1).is_failed());
        assert_eq!(Extraction::Value(1u8).map(|v| v + 1), Extraction::Value(2));
        assert_eq!(Extraction::<u8>::Empty.map(|v| v + 1), Extraction::Empty);
    }
}
