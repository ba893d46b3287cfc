//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use leadbook_core::{
  lead::{LeadSource, LeadStatus, NewLead},
  metrics::month_start,
  query::{DateRange, LeadQuery, SortField, SortOrder, SortSpec},
  seed::{DEFAULT_SEED_COUNT, LeadGenerator},
  store::LeadStore,
};
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(s: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn lead(first: &str, last: &str, company: &str) -> NewLead {
  NewLead {
    first_name: first.into(),
    last_name: last.into(),
    email: format!("{first}.{last}@example.com"),
    company: Some(company.into()),
    estimated_value: 1_000.0,
    ..NewLead::default()
  }
}

fn with_status(mut input: NewLead, status: LeadStatus) -> NewLead {
  input.lead_status = status;
  input
}

fn created(mut input: NewLead, when: &str) -> NewLead {
  input.created_at = Some(at(when));
  input
}

// ─── Inserts and lookups ─────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_lead() {
  let s = store().await;

  let mut input = lead("Ada", "Lovelace", "Analytical Engines");
  input.email = "  ADA@Example.com ".into();
  input.tags = vec!["Enterprise".into(), "Hot Lead".into()];
  input.last_contact_date = Some(at("2024-02-01T08:30:00Z"));
  input.lead_source = LeadSource::ColdCall;

  let stored = s.insert_lead(input).await.unwrap();
  assert_eq!(stored.email, "ada@example.com");
  assert_eq!(stored.created_at, stored.updated_at);

  let fetched = s.get_lead(stored.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "ada@example.com");
  assert_eq!(fetched.lead_source, LeadSource::ColdCall);
  assert_eq!(fetched.lead_status, LeadStatus::New);
  assert_eq!(fetched.tags, &["Enterprise", "Hot Lead"]);
  assert_eq!(fetched.last_contact_date, Some(at("2024-02-01T08:30:00Z")));
}

#[tokio::test]
async fn inserted_lead_equals_its_read_back() {
  let s = store().await;

  let mut input = lead("Ada", "Lovelace", "A");
  input.created_at = Some(at("2024-03-01T10:00:00.123456789Z"));
  input.last_contact_date = Some(at("2024-03-02T11:00:00.987654321Z"));
  let backdated = s.insert_lead(input).await.unwrap();
  assert_eq!(backdated.created_at, at("2024-03-01T10:00:00.123456Z"));
  assert_eq!(s.get_lead(backdated.id).await.unwrap(), Some(backdated));

  let fresh = s.insert_lead(lead("Grace", "Hopper", "B")).await.unwrap();
  assert_eq!(s.get_lead(fresh.id).await.unwrap(), Some(fresh));
}

#[tokio::test]
async fn get_missing_lead_returns_none() {
  let s = store().await;
  assert!(s.get_lead(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
  let s = store().await;
  s.insert_lead(lead("Ada", "Lovelace", "A")).await.unwrap();

  let mut dup = lead("Other", "Person", "B");
  dup.email = "ADA.Lovelace@example.com".into();
  let err = s.insert_lead(dup).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateEmail(e) if e == "ada.lovelace@example.com"));
}

#[tokio::test]
async fn insert_rejects_missing_required_fields() {
  let s = store().await;
  let mut input = lead("Ada", "Lovelace", "A");
  input.first_name = "   ".into();
  assert!(matches!(s.insert_lead(input).await, Err(Error::Core(_))));
}

#[tokio::test]
async fn insert_many_is_atomic() {
  let s = store().await;
  let batch = vec![
    lead("A", "One", "X"),
    lead("B", "Two", "X"),
    lead("A", "One", "Y"),
  ];
  assert!(matches!(s.insert_many(batch).await, Err(Error::DuplicateEmail(_))));

  let listing = s.list_leads(&LeadQuery::default().plan()).await.unwrap();
  assert_eq!(listing.total, 0);
}

#[tokio::test]
async fn clear_removes_everything() {
  let s = store().await;
  s.insert_many(vec![lead("A", "One", "X"), lead("B", "Two", "X")])
    .await
    .unwrap();
  assert_eq!(s.clear().await.unwrap(), 2);
  let listing = s.list_leads(&LeadQuery::default().plan()).await.unwrap();
  assert_eq!(listing.total, 0);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_is_case_insensitive_substring() {
  let s = store().await;
  s.insert_lead(lead("Grace", "Hopper", "Acme Corp")).await.unwrap();
  s.insert_lead(lead("Alan", "Turing", "Bletchley Labs")).await.unwrap();

  let query = LeadQuery { search: Some("acme".into()), ..LeadQuery::default() };
  let listing = s.list_leads(&query.plan()).await.unwrap();
  assert_eq!(listing.total, 1);
  assert_eq!(listing.leads[0].company.as_deref(), Some("Acme Corp"));

  let query = LeadQuery { search: Some("TURING".into()), ..LeadQuery::default() };
  assert_eq!(s.list_leads(&query.plan()).await.unwrap().total, 1);

  // Pattern metacharacters are matched literally.
  let query = LeadQuery { search: Some("%".into()), ..LeadQuery::default() };
  assert_eq!(s.list_leads(&query.plan()).await.unwrap().total, 0);
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
  let s = store().await;
  s.insert_lead(lead("Zoé", "Durand", "Éclair Ltd")).await.unwrap();
  s.insert_lead(lead("Alan", "Turing", "Bletchley Labs")).await.unwrap();

  for needle in ["Éclair", "éclair", "ÉCLAIR", "ZOÉ"] {
    let query = LeadQuery { search: Some(needle.into()), ..LeadQuery::default() };
    let plan = query.plan();
    let listing = s.list_leads(&plan).await.unwrap();
    assert_eq!(listing.total, 1, "{needle}");
    assert!(plan.filter.matches(&listing.leads[0]), "{needle}");
  }
}

#[tokio::test]
async fn filters_are_anded() {
  let s = store().await;
  let mut a = with_status(lead("A", "One", "X"), LeadStatus::Qualified);
  a.assigned_to = Some("Emily Davis".into());
  a.lead_source = LeadSource::Referral;
  let mut b = with_status(lead("B", "Two", "X"), LeadStatus::Qualified);
  b.assigned_to = Some("David Wilson".into());
  b.lead_source = LeadSource::Referral;
  let c = with_status(lead("C", "Three", "X"), LeadStatus::Lost);
  s.insert_many(vec![a, b, c]).await.unwrap();

  let query = LeadQuery {
    status: Some(LeadStatus::Qualified),
    source: Some(LeadSource::Referral),
    assigned_to: Some("Emily Davis".into()),
    ..LeadQuery::default()
  };
  let listing = s.list_leads(&query.plan()).await.unwrap();
  assert_eq!(listing.total, 1);
  assert_eq!(listing.leads[0].first_name, "A");
}

#[tokio::test]
async fn date_range_is_inclusive_on_boundary_days() {
  let s = store().await;
  s.insert_many(vec![
    created(lead("Before", "X", "X"), "2024-04-30T23:59:59Z"),
    created(lead("Start", "X", "X"), "2024-05-01T00:00:00Z"),
    created(lead("Middle", "X", "X"), "2024-05-15T12:00:00Z"),
    created(lead("EndDay", "X", "X"), "2024-05-31T18:45:00Z"),
    created(lead("After", "X", "X"), "2024-06-01T00:00:00Z"),
  ])
  .await
  .unwrap();

  let query = LeadQuery {
    created: DateRange::parse(Some("2024-05-01"), Some("2024-05-31")).unwrap(),
    sort: SortSpec { field: SortField::CreatedAt, order: SortOrder::Asc },
    ..LeadQuery::default()
  };
  let listing = s.list_leads(&query.plan()).await.unwrap();
  let names: Vec<_> = listing.leads.iter().map(|l| l.first_name.as_str()).collect();
  assert_eq!(names, ["Start", "Middle", "EndDay"]);
}

#[tokio::test]
async fn pages_are_disjoint_and_concatenate_to_full_result() {
  let s = store().await;
  let mut batch = Vec::new();
  for i in 0..25 {
    let mut input = lead(&format!("L{i:02}"), "Same", "X");
    // Identical values force the id tie-breaker to decide the order.
    input.estimated_value = if i % 2 == 0 { 500.0 } else { 750.0 };
    batch.push(input);
  }
  s.insert_many(batch).await.unwrap();

  let sort = SortSpec { field: SortField::EstimatedValue, order: SortOrder::Desc };
  let full = LeadQuery { sort, limit: 100, ..LeadQuery::default() };
  let everything: Vec<Uuid> = s
    .list_leads(&full.plan())
    .await
    .unwrap()
    .leads
    .iter()
    .map(|l| l.id)
    .collect();
  assert_eq!(everything.len(), 25);

  let mut paged = Vec::new();
  for page in 1..=3 {
    let query = LeadQuery { sort, page, limit: 10, ..LeadQuery::default() };
    let listing = s.list_leads(&query.plan()).await.unwrap();
    assert_eq!(listing.total, 25);
    assert!(listing.leads.len() <= 10);
    paged.extend(listing.leads.iter().map(|l| l.id));
  }
  assert_eq!(paged, everything);
  assert_eq!(paged.iter().collect::<HashSet<_>>().len(), 25);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
  let s = store().await;
  s.insert_lead(lead("A", "One", "X")).await.unwrap();
  let query = LeadQuery { page: 5, ..LeadQuery::default() };
  let listing = s.list_leads(&query.plan()).await.unwrap();
  assert!(listing.leads.is_empty());
  assert_eq!(listing.total, 1);
}

#[tokio::test]
async fn sql_filter_agrees_with_reference_predicate() {
  let s = store().await;
  let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
  let mut generator = LeadGenerator::new(StdRng::seed_from_u64(5), now);
  s.insert_many(generator.generate_batch(200)).await.unwrap();

  let all = s
    .list_leads(&LeadQuery { limit: 100, ..LeadQuery::default() }.plan())
    .await
    .unwrap()
    .total;
  assert_eq!(all, 200);

  let query = LeadQuery {
    search: Some("an".into()),
    status: Some(LeadStatus::New),
    created: DateRange::since(now - Duration::days(180)),
    limit: 100,
    ..LeadQuery::default()
  };
  let plan = query.plan();
  let listing = s.list_leads(&plan).await.unwrap();
  assert!(listing.leads.iter().all(|l| plan.filter.matches(l)));

  let mut expected = 0;
  for page in 1..=2 {
    let every = LeadQuery { page, limit: 100, ..LeadQuery::default() };
    let leads = s.list_leads(&every.plan()).await.unwrap().leads;
    expected += leads.iter().filter(|l| plan.filter.matches(l)).count();
  }
  assert_eq!(listing.total as usize, expected);
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn metrics_over_fixed_statuses() {
  let s = store().await;
  s.insert_many(vec![
    with_status(lead("A", "One", "X"), LeadStatus::New),
    with_status(lead("B", "Two", "X"), LeadStatus::New),
    with_status(lead("C", "Three", "X"), LeadStatus::Converted),
    with_status(lead("D", "Four", "X"), LeadStatus::Lost),
  ])
  .await
  .unwrap();

  let metrics = s
    .metrics(DateRange::default(), month_start(Utc::now()))
    .await
    .unwrap();
  assert_eq!(metrics.total_leads, 4);
  assert_eq!(metrics.converted_leads, 1);
  assert_eq!(metrics.conversion_rate.to_string(), "25.00");
  assert_eq!(metrics.leads_by_status.get(&LeadStatus::New), Some(&2));
  assert_eq!(metrics.leads_by_status.get(&LeadStatus::Contacted), None);
  assert_eq!(metrics.total_pipeline_value, 4_000.0);
  assert_eq!(metrics.leads_this_month, 4);
}

#[tokio::test]
async fn metrics_on_empty_store() {
  let s = store().await;
  let metrics = s
    .metrics(DateRange::default(), month_start(Utc::now()))
    .await
    .unwrap();
  assert_eq!(metrics.total_leads, 0);
  assert_eq!(metrics.conversion_rate.percent(), 0.0);
  assert!(metrics.leads_by_status.is_empty());
  assert_eq!(metrics.total_pipeline_value, 0.0);
}

#[tokio::test]
async fn metrics_range_does_not_scope_monthly_count() {
  let s = store().await;
  s.insert_many(vec![
    created(lead("Old", "X", "X"), "2023-01-10T10:00:00Z"),
    created(with_status(lead("Recent", "X", "X"), LeadStatus::Converted), "2024-05-10T10:00:00Z"),
    created(lead("Newer", "X", "X"), "2024-05-20T10:00:00Z"),
  ])
  .await
  .unwrap();

  let range = DateRange::parse(Some("2023-01-01"), Some("2023-12-31")).unwrap();
  let may = at("2024-05-01T00:00:00Z");
  let metrics = s.metrics(range, may).await.unwrap();
  assert_eq!(metrics.total_leads, 1);
  assert_eq!(metrics.converted_leads, 0);
  assert_eq!(metrics.leads_this_month, 2);
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seeded_store_sums_to_seed_count() {
  let s = store().await;
  s.insert_lead(lead("Stale", "Record", "X")).await.unwrap();

  s.clear().await.unwrap();
  let mut generator = LeadGenerator::new(StdRng::seed_from_u64(1), Utc::now());
  let written = s
    .insert_many(generator.generate_batch(DEFAULT_SEED_COUNT))
    .await
    .unwrap();
  assert_eq!(written, DEFAULT_SEED_COUNT);

  let metrics = s
    .metrics(DateRange::default(), month_start(Utc::now()))
    .await
    .unwrap();
  let sum: u64 = metrics.leads_by_status.values().sum();
  assert_eq!(sum, DEFAULT_SEED_COUNT as u64);
  assert_eq!(metrics.total_leads, DEFAULT_SEED_COUNT as u64);
}
