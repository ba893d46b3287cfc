//! Lead table: one row per lead on the current page.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::{metrics::status_color, money};
use crate::app::{App, Screen};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let border = if app.screen == Screen::Dashboard {
    Color::Gray
  } else {
    Color::DarkGray
  };

  let Some(page) = &app.leads else {
    let block = Block::default()
      .title(" Leads ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));
    f.render_widget(Paragraph::new("No data.").block(block), area);
    return;
  };

  let title = format!(
    " Leads ({} total, page {}/{}) ",
    page.total,
    page.page,
    page.total_pages.max(1)
  );
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  if page.data.is_empty() {
    f.render_widget(
      Paragraph::new("No leads match the current filters.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let header = Row::new([
    "Name", "Company", "Email", "Status", "Source", "Value", "Assigned to", "Created",
  ])
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows = page.data.iter().map(|lead| {
    Row::new(vec![
      Cell::from(lead.full_name()),
      Cell::from(lead.company.clone().unwrap_or_default()),
      Cell::from(lead.email.clone()),
      Cell::from(lead.lead_status.as_str())
        .style(Style::default().fg(status_color(lead.lead_status))),
      Cell::from(lead.lead_source.as_str()),
      Cell::from(money(lead.estimated_value)),
      Cell::from(lead.assigned_to.clone().unwrap_or_default()),
      Cell::from(lead.created_at.format("%Y-%m-%d").to_string()),
    ])
  });

  let widths = [
    Constraint::Percentage(15),
    Constraint::Percentage(15),
    Constraint::Percentage(20),
    Constraint::Length(10),
    Constraint::Length(15),
    Constraint::Length(10),
    Constraint::Percentage(12),
    Constraint::Length(10),
  ];

  let table = Table::new(rows, widths)
    .header(header)
    .block(block)
    .row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    );

  let mut state = TableState::default().with_selected(Some(app.cursor));
  f.render_stateful_widget(table, area, &mut state);
}
