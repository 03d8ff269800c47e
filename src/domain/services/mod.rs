// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 抓取流程的核心逻辑：
/// - 内容规范化（normalizer）：清理与去重页面文本
/// - 导航规划（planner）：由字段选择与分页预算得出页面访问计划
/// - 分页控制（pagination）：在预算内逐页收集列表条目
/// - 抓取编排（orchestrator）：执行计划并累积记录与字段错误
/// - 取消（cancellation）：在导航步骤之间中止抓取
pub mod cancellation;
pub mod normalizer;
pub mod orchestrator;
pub mod pagination;
pub mod planner;
