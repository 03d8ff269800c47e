// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{bail, Context};
use linkedrs::config::settings::Settings;
use linkedrs::engines::auth::Credentials;
use linkedrs::session::LinkedInSession;
use linkedrs::utils::telemetry;
use linkedrs::{EntityKind, FieldSelection};
use tracing::info;

const USAGE: &str = "usage: linkedrs <person|company> <url> [fields] [max_pages]";

/// 主函数
///
/// 加载配置、登录并抓取一个目标，将记录以JSON输出到标准输出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (kind, url) = match (args.first().map(String::as_str), args.get(1)) {
        (Some("person"), Some(url)) => (EntityKind::Person, url.as_str()),
        (Some("company"), Some(url)) => (EntityKind::Company, url.as_str()),
        _ => bail!(USAGE),
    };
    let selection = match args.get(2) {
        Some(fields) => FieldSelection::parse(kind, fields)?,
        None => FieldSelection::all(kind),
    };

    let settings = Settings::new().context("failed to load configuration")?;
    let max_pages = match args.get(3) {
        Some(pages) => pages.parse::<u32>().context("max_pages must be a non-negative integer")?,
        None => settings.scraping.default_page_budget,
    };
    let credentials = Credentials::from_settings(&settings.auth)
        .context("set LINKEDRS__AUTH__COOKIE or LINKEDRS__AUTH__EMAIL / LINKEDRS__AUTH__PASSWORD")?;

    info!("Opening browser session");
    let mut session = LinkedInSession::open(settings, &credentials).await?;

    let output = match kind {
        EntityKind::Person => session
            .get_profile(url, &selection)
            .await
            .map(|record| serde_json::to_string_pretty(&record)),
        EntityKind::Company => session
            .get_company(url, &selection, max_pages)
            .await
            .map(|record| serde_json::to_string_pretty(&record)),
    };
    session.close().await?;

    println!("{}", output??);
    Ok(())
}
