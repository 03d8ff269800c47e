// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::fields::{FieldGroup, FieldSelection, ListPath, PageBudget, PageSource};
use crate::domain::models::target::ScrapeTarget;
use crate::utils::errors::ScrapeError;
use std::collections::BTreeSet;

/// 导航步骤类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    /// 主页面
    Primary,
    /// 二级页面，加载一次即可满足其全部字段组
    Secondary,
    /// 分页列表的第一页，后续页交给分页控制器
    List,
}

/// 导航计划中的一步
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub url: String,
    pub kind: VisitKind,
    /// 该页面负责的字段组
    pub groups: BTreeSet<FieldGroup>,
}

/// 导航计划
///
/// 有序且去重的页面访问序列，主页面总是第一步
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPlan {
    target: ScrapeTarget,
    steps: Vec<PlanStep>,
    budget: PageBudget,
    /// 已请求但因分页预算为0而跳过的字段组
    skipped: Vec<FieldGroup>,
}

impl NavigationPlan {
    pub fn target(&self) -> &ScrapeTarget {
        &self.target
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn budget(&self) -> PageBudget {
        self.budget
    }

    pub fn skipped(&self) -> &[FieldGroup] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 计划中所有页面的URL（按访问顺序）
    pub fn urls(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().map(|s| s.url.as_str())
    }

    /// 计划覆盖的全部字段组
    pub fn planned_groups(&self) -> BTreeSet<FieldGroup> {
        self.steps.iter().flat_map(|s| s.groups.iter().copied()).collect()
    }
}

/// 根据字段选择与分页预算计算导航计划
///
/// 纯函数：相同输入总是得到相同计划。未被选择的字段组不会产生导航，
/// 同一页面只访问一次
///
/// # 参数
///
/// * `target` - 已解析的抓取目标
/// * `selection` - 字段选择
/// * `budget` - 分页预算，为0时排除所有列表页面
///
/// # 返回值
///
/// * `Ok(NavigationPlan)` - 导航计划
/// * `Err(ScrapeError::InvalidSelection)` - 字段选择的实体类型与目标不一致
pub fn plan(
    target: &ScrapeTarget,
    selection: &FieldSelection,
    budget: PageBudget,
) -> Result<NavigationPlan, ScrapeError> {
    let kind = target.kind();
    if selection.kind() != kind {
        return Err(ScrapeError::InvalidSelection(format!(
            "{} field groups requested for {} target {}",
            selection.kind(),
            kind,
            target
        )));
    }

    let mut steps = vec![PlanStep {
        url: target.url().to_string(),
        kind: VisitKind::Primary,
        groups: BTreeSet::new(),
    }];
    let mut skipped = Vec::new();

    for group in selection.groups() {
        let (url, visit) = match group.source(kind) {
            PageSource::Primary => {
                steps[0].groups.insert(group);
                continue;
            }
            PageSource::Secondary(path) => (target.join(path), VisitKind::Secondary),
            PageSource::List(_) if budget.is_zero() => {
                skipped.push(group);
                continue;
            }
            PageSource::List(ListPath::Relative(path)) | PageSource::List(ListPath::SiteRoot(path)) => {
                (target.join(path), VisitKind::List)
            }
        };

        match steps.iter_mut().find(|s| s.url == url) {
            Some(step) => {
                step.groups.insert(group);
            }
            None => steps.push(PlanStep {
                url,
                kind: visit,
                groups: BTreeSet::from([group]),
            }),
        }
    }

    // list pages run last so a failed pagination never delays the cheap pages
    steps.sort_by_key(|s| match s.kind {
        VisitKind::Primary => 0,
        VisitKind::Secondary => 1,
        VisitKind::List => 2,
    });

    tracing::debug!(
        target = %target,
        steps = steps.len(),
        skipped = ?skipped,
        "Navigation plan resolved"
    );

    Ok(NavigationPlan {
        target: target.clone(),
        steps,
        budget,
        skipped,
    })
}
