// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use linkedrs::config::settings::Settings;
use linkedrs::engines::replay_engine::{ReplayLog, ReplaySession};
use linkedrs::LinkedInSession;
use std::path::PathBuf;

/// 录制的快照目录
pub fn fixtures(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// 不限流、不退避的测试配置
pub fn test_settings() -> Settings {
    let mut settings = Settings::defaults().expect("built-in defaults must deserialize");
    settings.scraping.navigations_per_minute = 0;
    settings.scraping.retry_backoff_ms = 0;
    settings.scraping.settle_timeout_ms = 100;
    settings
}

/// 把回放会话包装为调用方会话，并返回共享的导航日志
pub fn replay_session(replay: ReplaySession) -> (LinkedInSession, ReplayLog) {
    let log = replay.log();
    (LinkedInSession::from_session(Box::new(replay), test_settings()), log)
}

/// 员工列表页
pub fn people_page(names: &[&str], has_next: bool) -> String {
    let items: String = names
        .iter()
        .map(|name| {
            let slug = name.to_lowercase().replace(' ', "-");
            format!(
                r#"<li><a href="/in/{slug}/"><div class="artdeco-entity-lockup__title">{name}</div></a>
                   <div class="artdeco-entity-lockup__subtitle">Employee</div></li>"#
            )
        })
        .collect();
    let next = if has_next {
        r#"<button aria-label="Next">Next</button>"#
    } else {
        r#"<button aria-label="Next" disabled>Next</button>"#
    };
    format!(r#"<html><body><main><ul role="list">{items}</ul>{next}</main></body></html>"#)
}
