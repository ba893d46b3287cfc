//! Synthetic lead generation for demo and development stores.
//!
//! Produces realistic-looking records from fixed word lists. The statistical
//! shape (status weights, value range, optional fields) matches what the
//! dashboard is tuned for; the exact values are not meaningful.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, seq::SliceRandom};

use crate::lead::{LeadSource, LeadStatus, NewLead};

pub const DEFAULT_SEED_COUNT: usize = 750;

/// Relative frequency of each status; sums to 1.0.
pub const STATUS_WEIGHTS: [(LeadStatus, f64); 5] = [
  (LeadStatus::New, 0.40),
  (LeadStatus::Contacted, 0.30),
  (LeadStatus::Qualified, 0.15),
  (LeadStatus::Converted, 0.10),
  (LeadStatus::Lost, 0.05),
];

pub const SALES_REPS: [&str; 8] = [
  "John Smith",
  "Sarah Johnson",
  "Michael Brown",
  "Emily Davis",
  "David Wilson",
  "Jessica Martinez",
  "Robert Taylor",
  "Amanda Anderson",
];

pub const TAGS: [&str; 5] = ["Enterprise", "SMB", "Startup", "Hot Lead", "Follow-up"];

const FIRST_NAMES: &[&str] = &[
  "James", "Mary", "Liam", "Olivia", "Noah", "Emma", "Oliver", "Ava", "Elijah",
  "Sophia", "Lucas", "Isabella", "Mason", "Mia", "Ethan", "Amelia", "Logan",
  "Harper", "Aiden", "Evelyn", "Caleb", "Abigail", "Henry", "Ella", "Owen",
  "Scarlett", "Samuel", "Grace", "Julian", "Chloe", "Mateo", "Priya", "Kenji",
  "Fatima", "Diego", "Ingrid", "Tariq", "Yuki", "Nadia", "Rafael",
];

const LAST_NAMES: &[&str] = &[
  "Garcia", "Miller", "Rodriguez", "Lopez", "Gonzalez", "Thomas", "Moore",
  "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
  "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King",
  "Wright", "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams",
  "Nelson", "Baker", "Hall", "Rivera", "Campbell", "Mitchell", "Carter",
  "Okafor", "Lindqvist",
];

const COMPANY_STEMS: &[&str] = &[
  "Acme", "Globex", "Initech", "Umbrella", "Stark", "Wayne", "Hooli", "Vandelay",
  "Soylent", "Cyberdyne", "Tyrell", "Massive", "Pied Piper", "Wonka",
  "Northwind", "Contoso", "Blue Harbor", "Summit", "Redwood", "Ironclad",
];

const COMPANY_SUFFIXES: &[&str] = &[
  "Corp", "Inc", "LLC", "Group", "Labs", "Systems", "Holdings", "Partners",
  "Technologies", "Industries",
];

const JOB_TITLES: &[&str] = &[
  "Chief Executive Officer",
  "Chief Technology Officer",
  "VP of Sales",
  "VP of Marketing",
  "Head of Procurement",
  "Operations Manager",
  "Product Manager",
  "Engineering Manager",
  "IT Director",
  "Marketing Specialist",
  "Account Executive",
  "Purchasing Agent",
  "Founder",
  "Business Analyst",
];

const EMAIL_DOMAINS: &[&str] = &[
  "gmail.com", "yahoo.com", "outlook.com", "hotmail.com", "proton.me",
  "icloud.com",
];

const NOTE_SENTENCES: &[&str] = &[
  "Interested in an annual contract.",
  "Asked for a follow-up demo next quarter.",
  "Budget approval pending from finance.",
  "Currently evaluating two competitors.",
  "Met at the regional trade show booth.",
  "Requested pricing for the enterprise tier.",
  "Decision maker is out of office until next month.",
  "Wants an integration with their existing CRM.",
  "Referred by an existing customer.",
  "Prefers contact by email over phone.",
];

/// Pick a status from [`STATUS_WEIGHTS`] for a uniform `draw` in `[0, 1)`.
///
/// Walks the cumulative weights and returns the first bucket whose upper edge
/// is at or above the draw. Falls back to `New` when rounding leaves the
/// cumulative sum just short of the draw.
pub fn weighted_status(draw: f64) -> LeadStatus {
  let mut cumulative = 0.0;
  for (status, weight) in STATUS_WEIGHTS {
    cumulative += weight;
    if draw <= cumulative {
      return status;
    }
  }
  LeadStatus::New
}

/// Generates synthetic leads with unique email addresses.
pub struct LeadGenerator<R: Rng> {
  rng:         R,
  now:         DateTime<Utc>,
  seen_emails: HashSet<String>,
}

impl<R: Rng> LeadGenerator<R> {
  /// `now` anchors the creation and last-contact windows.
  pub fn new(rng: R, now: DateTime<Utc>) -> Self {
    Self { rng, now, seen_emails: HashSet::new() }
  }

  pub fn generate_batch(&mut self, count: usize) -> Vec<NewLead> {
    (0..count).map(|_| self.generate()).collect()
  }

  pub fn generate(&mut self) -> NewLead {
    let first_name = (*self.pick(FIRST_NAMES)).to_owned();
    let last_name = (*self.pick(LAST_NAMES)).to_owned();
    let email = self.unique_email(&first_name, &last_name);
    let created_at = self.now - Duration::seconds(self.rng.gen_range(0..=365 * 86_400));

    NewLead {
      phone: Some(self.phone()),
      company: Some(format!(
        "{} {}",
        self.pick(COMPANY_STEMS),
        self.pick(COMPANY_SUFFIXES)
      )),
      job_title: Some((*self.pick(JOB_TITLES)).to_owned()),
      lead_source: *self.pick(&LeadSource::CHANNELS),
      lead_status: weighted_status(self.rng.r#gen::<f64>()),
      assigned_to: Some(self.pick(&SALES_REPS).to_string()),
      estimated_value: f64::from(self.rng.gen_range(1_000u32..=100_000)),
      notes: self.rng.gen_bool(0.6).then(|| self.notes()),
      tags: self.tags(),
      last_contact_date: self.rng.gen_bool(0.5).then(|| {
        self.now - Duration::seconds(self.rng.gen_range(0..=30 * 86_400))
      }),
      created_at: Some(created_at),
      first_name,
      last_name,
      email,
    }
  }

  fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
    &items[self.rng.gen_range(0..items.len())]
  }

  /// `first.last@domain`, with a numeric suffix on the local part if that
  /// address was already handed out.
  fn unique_email(&mut self, first: &str, last: &str) -> String {
    let domain = self.pick(EMAIL_DOMAINS);
    let local = format!("{first}.{last}").to_lowercase().replace(' ', "");
    let mut candidate = format!("{local}@{domain}");
    let mut suffix = 1;
    while self.seen_emails.contains(&candidate) {
      candidate = format!("{local}{suffix}@{domain}");
      suffix += 1;
    }
    self.seen_emails.insert(candidate.clone());
    candidate
  }

  fn phone(&mut self) -> String {
    format!(
      "+1 ({:03}) {:03}-{:04}",
      self.rng.gen_range(200..=989),
      self.rng.gen_range(200..=999),
      self.rng.gen_range(0..=9999)
    )
  }

  fn notes(&mut self) -> String {
    let count = self.rng.gen_range(2..=4);
    NOTE_SENTENCES
      .choose_multiple(&mut self.rng, count)
      .copied()
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn tags(&mut self) -> Vec<String> {
    let count = self.rng.gen_range(0..=3);
    TAGS
      .choose_multiple(&mut self.rng, count)
      .map(|t| (*t).to_owned())
      .collect()
  }
}
