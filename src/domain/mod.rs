// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含抓取的核心逻辑，包括：
/// - 领域模型（models）：目标、字段组、实体记录与结果
/// - 提取操作（extract）：从已加载页面中读取单个字段组
/// - 服务（services）：内容规范化、导航规划、分页与编排
///
/// 领域层不依赖具体的浏览器实现，只通过 `BrowserSession` 抽象访问页面。
pub mod extract;
pub mod models;
pub mod services;
