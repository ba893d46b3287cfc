//! Dashboard rendering. Lays out the header, metric cards, filter bar, lead table and status bar.

pub mod lead_detail;
pub mod lead_table;
pub mod metrics;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(5), // metric cards
      Constraint::Length(1), // filter bar
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  metrics::draw(f, rows[1], app);
  draw_filters(f, rows[2], app);
  draw_body(f, rows[3], app);
  draw_status(f, rows[4], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    " leadbook  [/] search  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{} ", app.user_name),
    Style::default().fg(Color::Gray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Filter bar ───────────────────────────────────────────────────────────────

fn draw_filters(f: &mut Frame, area: Rect, app: &App) {
  let q = &app.query;
  let label = Style::default().fg(Color::DarkGray);
  let value = Style::default().fg(Color::Yellow);

  let search = if app.search_active {
    format!("{}_", app.search_input)
  } else {
    q.search.clone().unwrap_or_else(|| "—".into())
  };

  let spans = vec![
    Span::styled(" search ", label),
    Span::styled(search, value),
    Span::styled("  status ", label),
    Span::styled(q.status.map_or("All", |s| s.as_str()), value),
    Span::styled("  source ", label),
    Span::styled(q.source.map_or("All", |s| s.as_str()), value),
    Span::styled("  sort ", label),
    Span::styled(format!("{} {}", q.sort.field, q.sort.order), value),
    Span::styled("  page ", label),
    Span::styled(format!("{}/{}", q.page, app.total_pages().max(1)), value),
    Span::styled("  per page ", label),
    Span::styled(q.limit.to_string(), value),
  ];
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  if app.screen == Screen::LeadDetail && app.selected.is_some() {
    let cols = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
      .split(area);
    lead_table::draw(f, cols[0], app);
    lead_detail::draw(f, cols[1], app);
  } else {
    lead_table::draw(f, area, app);
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    _ if app.search_active => ("SEARCH", "Type to search  Enter apply  Esc cancel"),
    Screen::Dashboard => (
      "NORMAL",
      "↑↓ move  Enter detail  s status  o source  f sort  r order  n/p page  z size  c clear",
    ),
    Screen::LeadDetail => ("DETAIL", "Esc back  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

/// Whole-dollar amount with thousands separators, e.g. `$1,234,567`.
pub fn money(value: f64) -> String {
  let whole = value.round().abs() as u64;
  let digits = whole.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  let sign = if value < 0.0 && whole > 0 { "-" } else { "" };
  format!("{sign}${out}")
}

#[cfg(test)]
mod tests {
  use super::money;

  #[test]
  fn money_groups_thousands() {
    assert_eq!(money(0.0), "$0");
    assert_eq!(money(999.4), "$999");
    assert_eq!(money(1000.0), "$1,000");
    assert_eq!(money(1_234_567.0), "$1,234,567");
  }
}
