// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::replay_session;
use linkedrs::engines::replay_engine::ReplaySession;
use linkedrs::engines::traits::NavigationError;
use linkedrs::{EntityKind, FieldGroup, FieldSelection, ScrapeError};

const PROFILE: &str = "https://www.linkedin.com/in/ada-lovelace/";
const CONNECTIONS: &str = "https://www.linkedin.com/mynetwork/invite-connect/connections/";

const HOME: &str = r#"<html><body><main>
  <section>
    <div class="mt2 relative">
      <h1>Ada Lovelace</h1>
      <div class="text-body-medium break-words">Analyst at Analytical Engines</div>
      <span class="text-body-small inline t-black--light break-words">London, United Kingdom</span>
    </div>
    <ul><li>500+ connections</li></ul>
  </section>
  <section>
    <div id="about"></div>
    <div class="inline-show-more-text">
      <span aria-hidden="true">Poetical science.<br><br>Poetical science.<br><br>Notes on the engine. …see more</span>
    </div>
  </section>
</main></body></html>"#;

const EXPERIENCE: &str = r#"<html><body><main><ul class="pvs-list">
  <li class="pvs-list__paged-list-item">
    <a href="/company/analytical-engines/"><span aria-hidden="true">Analyst</span></a>
    <span aria-hidden="true">Analytical Engines · Freelance</span>
    <span aria-hidden="true">Jun 1842 - Present · 182 yrs</span>
    <span aria-hidden="true">London, England</span>
  </li>
</ul></main></body></html>"#;

const EDUCATION: &str = r#"<html><body><main>
  <div class="pvs-list__container"></div>
</main></body></html>"#;

const HONORS: &str = r#"<html><body><main>
  <div class="artdeco-empty-state"><p>Nothing to see for now</p></div>
</main></body></html>"#;

const LANGUAGES: &str = r#"<html><body><main><ul class="pvs-list">
  <li class="pvs-list__paged-list-item">
    <span aria-hidden="true">English</span>
    <span aria-hidden="true">Native or bilingual proficiency</span>
  </li>
</ul></main></body></html>"#;

const CONTACT: &str = r#"<html><body><div role="dialog" id="pv-contact-info">
  <section class="pv-contact-info__contact-type">
    <h3>Email</h3>
    <a href="mailto:ada@engines.example">ada@engines.example</a>
  </section>
</div></body></html>"#;

const CONNECTION_LIST: &str = r#"<html><body><main><ul>
  <li class="mn-connection-card">
    <a href="/in/charles-babbage/"><span class="mn-connection-card__name">Charles Babbage</span></a>
    <span class="mn-connection-card__occupation">Inventor</span>
  </li>
</ul></main></body></html>"#;

fn details(section: &str) -> String {
    format!("{}details/{}/", PROFILE, section)
}

fn full_profile() -> ReplaySession {
    ReplaySession::new()
        .with_page(PROFILE, HOME)
        .with_page(&details("experience"), EXPERIENCE)
        .with_page(&details("education"), EDUCATION)
        .with_page(&details("honors"), HONORS)
        .with_page(&details("languages"), LANGUAGES)
        .with_page(&format!("{}overlay/contact-info/", PROFILE), CONTACT)
        .with_page(CONNECTIONS, CONNECTION_LIST)
        .with_failure(&details("interests"), NavigationError::Blocked("rate limited".into()))
}

#[tokio::test]
async fn test_full_profile_scrape_isolates_failures() {
    let (mut session, log) = replay_session(full_profile());

    let record = session
        .get_profile(PROFILE, &FieldSelection::all(EntityKind::Person))
        .await
        .unwrap();
    let person = record.data();

    assert_eq!(person.name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(person.headline.as_deref(), Some("Analyst at Analytical Engines"));
    assert_eq!(person.location.as_deref(), Some("London, United Kingdom"));
    assert_eq!(person.connection_count, Some(500));
    assert_eq!(person.about, vec!["Poetical science.", "Notes on the engine."]);

    assert_eq!(person.current_job_title(), Some("Analyst"));
    assert_eq!(person.current_company(), Some("Analytical Engines"));
    let job = &person.experiences[0];
    assert_eq!(job.employment_type.as_deref(), Some("Freelance"));
    assert_eq!(job.from_date.as_deref(), Some("Jun 1842"));
    assert_eq!(job.to_date.as_deref(), Some("Present"));
    assert_eq!(job.location.as_deref(), Some("London, England"));
    assert_eq!(
        job.linkedin_url.as_deref(),
        Some("https://www.linkedin.com/company/analytical-engines/")
    );

    // legitimately empty sections are not errors
    assert!(person.educations.is_empty());
    assert!(person.honors.is_empty());
    assert_eq!(person.languages[0].proficiency.as_deref(), Some("Native or bilingual proficiency"));
    assert_eq!(
        person.contact_info.as_ref().and_then(|c| c.email.as_deref()),
        Some("ada@engines.example")
    );
    assert_eq!(person.connections[0].name.as_deref(), Some("Charles Babbage"));
    assert_eq!(person.connections[0].occupation.as_deref(), Some("Inventor"));

    let errors: Vec<_> = record.scraping_errors().keys().copied().collect();
    assert_eq!(errors, vec![FieldGroup::Interests]);
    assert!(record.is_success());
    assert!(record.is_complete());

    // every distinct page exactly once
    assert_eq!(log.navigation_count(), 8);
}

#[tokio::test]
async fn test_profile_serializes_error_map_by_group_name() {
    let (mut session, _log) = replay_session(full_profile());
    let selection = FieldSelection::parse(EntityKind::Person, "basic,interests").unwrap();

    let record = session.get_profile(PROFILE, &selection).await.unwrap();
    let json = serde_json::to_value(&record).unwrap();

    assert!(json["scraping_errors"]["interests"].as_str().unwrap().contains("rate limited"));
    assert_eq!(json["experiences"], serde_json::json!([]));
    assert!(json["contact_info"].is_null());
    assert!(json["scraped_at"].is_string());
}

#[tokio::test]
async fn test_blocked_primary_page_fails_the_scrape() {
    let (mut session, _log) = replay_session(
        ReplaySession::new().with_failure(PROFILE, NavigationError::Blocked("checkpoint".into())),
    );
    let err = session
        .get_profile(PROFILE, &FieldSelection::career())
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::PrimaryNavigation(_)));
    assert!(!err.is_precondition());
}

#[tokio::test]
async fn test_company_url_for_profile_is_invalid_target() {
    let (mut session, log) = replay_session(full_profile());
    let err = session
        .get_profile("https://www.linkedin.com/company/acme/", &FieldSelection::minimal(EntityKind::Person))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidTarget { .. }));
    assert_eq!(log.navigation_count(), 0);
}
