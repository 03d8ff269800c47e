// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了抓取的核心数据结构，包括：
/// - 抓取目标（target）：规范化的主页URL与实体类型
/// - 字段组（fields）：字段选择、页面来源与分页预算
/// - 个人与公司记录（person / company）
/// - 抓取结果（record）：实体数据加字段错误表
pub mod company;
pub mod fields;
pub mod person;
pub mod record;
pub mod target;
