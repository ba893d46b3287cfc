//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use leadbook_core::{
  lead::{Lead, LeadSource, LeadStatus},
  metrics::LeadMetrics,
  query::{LeadPage, LeadQuery, SortField},
};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::client::ApiClient;

/// Page sizes offered by `z`.
pub const PAGE_SIZES: [u32; 3] = [10, 20, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sort fields offered by `f`.
pub const SORT_FIELDS: [SortField; 3] =
  [SortField::CreatedAt, SortField::EstimatedValue, SortField::LastName];

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Metric cards and the lead table.
  Dashboard,
  /// The lead table with the selected lead's detail pane.
  LeadDetail,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  /// Filters, sort and pagination for the lead table.
  pub query: LeadQuery,

  /// Text being typed after `/`; applied to `query.search` on Enter.
  pub search_input: String,

  /// Whether the user is typing a search.
  pub search_active: bool,

  /// The most recently fetched page of leads.
  pub leads: Option<LeadPage>,

  /// The most recently fetched metrics.
  pub metrics: Option<LeadMetrics>,

  /// Row index within `leads.data`.
  pub cursor: usize,

  /// Lead shown in the detail pane.
  pub selected: Option<Lead>,

  /// Display name of the logged-in user.
  pub user_name: String,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient, user_name: String) -> Self {
    Self {
      screen: Screen::Dashboard,
      query: LeadQuery { limit: DEFAULT_PAGE_SIZE, ..LeadQuery::default() },
      search_input: String::new(),
      search_active: false,
      leads: None,
      metrics: None,
      cursor: 0,
      selected: None,
      user_name,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch metrics and the first page of leads concurrently. Only a failed
  /// lead fetch is fatal.
  pub async fn load_initial(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    let client = self.client.clone();
    let (metrics, leads) = tokio::join!(client.analytics(), client.list_leads(&self.query));

    self.status_msg = String::new();
    match metrics {
      Ok(m) => self.metrics = Some(m),
      Err(e) => {
        tracing::warn!(error = %e, "failed to load metrics");
        self.status_msg = format!("Error: {e}");
      }
    }
    self.leads = Some(leads?);
    self.cursor = 0;
    Ok(())
  }

  /// Re-issue the list fetch for the current query. Errors are shown in the
  /// status bar and the previous page is kept.
  pub async fn reload_leads(&mut self) {
    self.status_msg = "Loading leads…".into();
    match self.client.list_leads(&self.query).await {
      Ok(page) => {
        self.leads = Some(page);
        self.cursor = 0;
        self.status_msg = String::new();
      }
      Err(e) => {
        tracing::warn!(error = %e, "failed to load leads");
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  async fn open_detail(&mut self, id: Uuid) {
    self.status_msg = "Loading…".into();
    match self.client.get_lead(id).await {
      Ok(lead) => {
        self.selected = Some(lead);
        self.screen = Screen::LeadDetail;
        self.status_msg = String::new();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  // ── Query transitions ─────────────────────────────────────────────────────
  //
  // Each returns `true` when the list has to be fetched again.

  pub fn total_pages(&self) -> u64 { self.leads.as_ref().map_or(0, |p| p.total_pages) }

  pub fn cursor_lead(&self) -> Option<&Lead> {
    self.leads.as_ref().and_then(|p| p.data.get(self.cursor))
  }

  pub fn apply_search(&mut self) -> bool {
    let search = Some(self.search_input.trim().to_owned()).filter(|s| !s.is_empty());
    self.search_active = false;
    if search == self.query.search {
      return false;
    }
    self.query.search = search;
    self.query.page = 1;
    true
  }

  pub fn cycle_status(&mut self) -> bool {
    let options: Vec<_> = LeadStatus::iter().collect();
    self.query.status = cycle(&options, self.query.status);
    self.query.page = 1;
    true
  }

  pub fn cycle_source(&mut self) -> bool {
    self.query.source = cycle(&LeadSource::CHANNELS, self.query.source);
    self.query.page = 1;
    true
  }

  pub fn cycle_sort_field(&mut self) -> bool {
    let next = SORT_FIELDS
      .iter()
      .position(|f| *f == self.query.sort.field)
      .map_or(0, |i| (i + 1) % SORT_FIELDS.len());
    self.query.sort.field = SORT_FIELDS[next];
    self.query.page = 1;
    true
  }

  pub fn toggle_sort_order(&mut self) -> bool {
    self.query.sort.order = self.query.sort.order.toggled();
    self.query.page = 1;
    true
  }

  pub fn cycle_page_size(&mut self) -> bool {
    let next = PAGE_SIZES
      .iter()
      .position(|s| *s == self.query.limit)
      .map_or(0, |i| (i + 1) % PAGE_SIZES.len());
    self.query.limit = PAGE_SIZES[next];
    self.query.page = 1;
    true
  }

  pub fn next_page(&mut self) -> bool {
    if u64::from(self.query.page) >= self.total_pages() {
      return false;
    }
    self.query.page += 1;
    true
  }

  pub fn prev_page(&mut self) -> bool {
    if self.query.page <= 1 {
      return false;
    }
    self.query.page -= 1;
    true
  }

  pub fn clear_filters(&mut self) -> bool {
    self.search_input.clear();
    self.query = LeadQuery {
      limit: self.query.limit,
      sort: self.query.sort,
      ..LeadQuery::default()
    };
    true
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.search_active {
      return Ok(self.handle_search_key(key).await);
    }

    match self.screen {
      Screen::Dashboard => Ok(self.handle_table_key(key).await),
      Screen::LeadDetail => Ok(self.handle_detail_key(key).await),
    }
  }

  async fn handle_search_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search_input = self.query.search.clone().unwrap_or_default();
      }
      KeyCode::Enter => {
        if self.apply_search() {
          self.reload_leads().await;
        }
      }
      KeyCode::Backspace => {
        self.search_input.pop();
      }
      KeyCode::Char(c) => self.search_input.push(c),
      _ => {}
    }
    true
  }

  async fn handle_table_key(&mut self, key: KeyEvent) -> bool {
    let reload = match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.leads.as_ref().map_or(0, |p| p.data.len());
        if self.cursor + 1 < len {
          self.cursor += 1;
        }
        false
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
        false
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_lead().map(|l| l.id) {
          self.open_detail(id).await;
        }
        false
      }

      KeyCode::Char('/') => {
        self.search_active = true;
        false
      }
      KeyCode::Char('s') => self.cycle_status(),
      KeyCode::Char('o') => self.cycle_source(),
      KeyCode::Char('f') => self.cycle_sort_field(),
      KeyCode::Char('r') => self.toggle_sort_order(),
      KeyCode::Char('z') => self.cycle_page_size(),
      KeyCode::Char('n') | KeyCode::PageDown => self.next_page(),
      KeyCode::Char('p') | KeyCode::PageUp => self.prev_page(),
      KeyCode::Char('c') => self.clear_filters(),

      _ => false,
    };
    if reload {
      self.reload_leads().await;
    }
    true
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::Dashboard;
        self.selected = None;
      }
      _ => {}
    }
    true
  }
}

/// Step through `None` (all), then each option, then back to `None`.
fn cycle<T: Copy + PartialEq>(options: &[T], current: Option<T>) -> Option<T> {
  match current {
    None => options.first().copied(),
    Some(cur) => options
      .iter()
      .position(|o| *o == cur)
      .and_then(|i| options.get(i + 1))
      .copied(),
  }
}
