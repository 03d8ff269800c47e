// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{fixtures, people_page, replay_session};
use linkedrs::engines::replay_engine::ReplaySession;
use linkedrs::engines::traits::NavigationError;
use linkedrs::{EntityKind, FieldGroup, FieldSelection, ScrapeError};
use std::time::Duration;

const ACME: &str = "https://www.linkedin.com/company/acme/";
const ACME_ABOUT: &str = "https://www.linkedin.com/company/acme/about/";
const ACME_PEOPLE: &str = "https://www.linkedin.com/company/acme/people/";

const ACME_HOME: &str = r#"<html><body><main>
    <h1>Acme</h1>
    <div class="org-top-card-summary-info-list__info-item">Manufacturing</div>
</main></body></html>"#;

#[tokio::test]
async fn test_company_from_recorded_snapshots() {
    let replay = ReplaySession::from_dir(fixtures("company")).unwrap();
    let (mut session, log) = replay_session(replay);

    let record = session
        .get_company(
            "https://www.linkedin.com/company/initech/about/",
            &FieldSelection::all(EntityKind::Company),
            3,
        )
        .await
        .unwrap();
    let company = record.data();

    assert_eq!(company.linkedin_url.as_deref(), Some("https://www.linkedin.com/company/initech/"));
    assert_eq!(company.name.as_deref(), Some("Initech"));
    assert_eq!(company.tagline.as_deref(), Some("Software that works, mostly"));
    assert_eq!(company.followers.as_deref(), Some("12,408 followers"));
    assert_eq!(company.industry.as_deref(), Some("Software Development"));
    assert_eq!(company.company_size.as_deref(), Some("1,001-5,000 employees"));
    assert_eq!(company.headcount, Some(1_001));
    assert_eq!(company.website.as_deref(), Some("https://initech.example/"));
    assert_eq!(company.headquarters.as_deref(), Some("Austin, Texas"));
    assert_eq!(company.company_type.as_deref(), Some("Privately Held"));
    assert_eq!(company.founded, Some(1996));
    assert_eq!(
        company.about_us.as_deref(),
        Some("Initech builds TPS report tooling for enterprises.\n\nHeadquartered in Austin.")
    );
    assert_eq!(company.specialties, vec!["TPS reports", "Staplers", "Middle management"]);

    assert_eq!(company.showcase_pages.len(), 1);
    assert_eq!(company.showcase_pages[0].name, "Initech Labs");
    assert_eq!(company.affiliated_companies.len(), 1);
    assert_eq!(
        company.affiliated_companies[0].linkedin_url.as_deref(),
        Some("https://www.linkedin.com/company/initrode/")
    );

    let employees: Vec<_> = company.employees.iter().filter_map(|e| e.name.as_deref()).collect();
    assert_eq!(employees, vec!["Bill Lumbergh", "Peter Gibbons", "Milton Waddams"]);

    assert!(record.scraping_errors().is_empty());
    assert!(record.partial_lists().is_empty());
    assert!(record.is_success());
    // home, about, two list pages; the source reported no third page
    assert_eq!(log.navigation_count(), 4);

    session.close().await.unwrap();
    assert!(log.is_closed());
}

#[tokio::test]
async fn test_minimal_scrape_issues_one_navigation_and_keeps_full_schema() {
    let (mut session, log) = replay_session(
        ReplaySession::new()
            .with_page(ACME, ACME_HOME)
            .with_page(ACME_PEOPLE, people_page(&["A"], false)),
    );

    let record = session
        .get_company(ACME, &FieldSelection::minimal(EntityKind::Company), 0)
        .await
        .unwrap();

    assert_eq!(log.navigations(), vec![ACME.to_string()]);
    assert!(record.scraping_errors().is_empty());

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["name"], "Acme");
    for key in ["specialties", "showcase_pages", "affiliated_companies", "employees"] {
        assert_eq!(json[key], serde_json::json!([]), "{key} should be an empty list");
    }
    for key in ["about_us", "website", "headquarters", "founded", "company_type"] {
        assert!(json.get(key).is_some_and(|v| v.is_null()), "{key} should be null");
    }
    assert_eq!(json["scraping_errors"], serde_json::json!({}));
    assert_eq!(json["complete"], true);
}

#[tokio::test]
async fn test_failed_about_navigation_yields_single_field_error() {
    let (mut session, _log) = replay_session(
        ReplaySession::new()
            .with_page(ACME, ACME_HOME)
            .with_failure(ACME_ABOUT, NavigationError::Timeout(Duration::from_secs(15))),
    );
    let selection = FieldSelection::parse(EntityKind::Company, "basic,about").unwrap();

    let record = session.get_company(ACME, &selection, 0).await.unwrap();

    assert_eq!(record.data().name.as_deref(), Some("Acme"));
    assert!(record.data().about_us.is_none());
    assert!(record.data().website.is_none());
    assert_eq!(record.scraping_errors().len(), 1);
    assert!(record.error_for(FieldGroup::About).is_some());
    assert!(record.is_success());
}

#[tokio::test]
async fn test_overlapping_employee_pages_are_merged() {
    let (mut session, log) = replay_session(
        ReplaySession::new()
            .with_page(ACME, ACME_HOME)
            .with_page(ACME_PEOPLE, people_page(&["A", "B", "C"], true))
            .with_page(&format!("{}?page=2", ACME_PEOPLE), people_page(&["C", "D"], true))
            .with_page(&format!("{}?page=3", ACME_PEOPLE), people_page(&["E"], false)),
    );
    let selection = FieldSelection::parse(EntityKind::Company, "basic,employees").unwrap();

    let record = session.get_company(ACME, &selection, 2).await.unwrap();

    let names: Vec<_> = record.data().employees.iter().filter_map(|e| e.name.as_deref()).collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
    let urls: Vec<_> = record.data().employees.iter().map(|e| e.linkedin_url.as_str()).collect();
    assert_eq!(urls[3], "https://www.linkedin.com/in/d/");
    // the third page is never requested
    assert!(!log.navigations().iter().any(|u| u.ends_with("page=3")));
}

#[tokio::test]
async fn test_person_url_is_rejected_without_navigation() {
    let (mut session, log) = replay_session(ReplaySession::new());
    let err = session
        .get_company(
            "https://www.linkedin.com/in/jane-doe/",
            &FieldSelection::all(EntityKind::Company),
            1,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::InvalidTarget { expected: EntityKind::Company, .. }));
    assert_eq!(log.navigation_count(), 0);
}

#[tokio::test]
async fn test_cancelled_session_returns_incomplete_record() {
    let (mut session, log) = replay_session(ReplaySession::new().with_page(ACME, ACME_HOME));
    session.cancellation_flag().cancel();

    let record = session
        .get_company(ACME, &FieldSelection::all(EntityKind::Company), 1)
        .await
        .unwrap();

    assert!(!record.is_complete());
    assert_eq!(log.navigation_count(), 0);
    assert_eq!(record.error_for(FieldGroup::About), Some("cancelled before extraction"));
}
