//! Metric cards along the top of the dashboard.

use leadbook_core::lead::LeadStatus;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use strum::IntoEnumIterator;

use super::money;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(m) = &app.metrics else {
    let block = Block::default()
      .title(" Metrics ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("Metrics unavailable.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Ratio(1, 6),
      Constraint::Ratio(1, 6),
      Constraint::Ratio(1, 6),
      Constraint::Ratio(1, 6),
      Constraint::Ratio(1, 6),
      Constraint::Ratio(1, 6),
    ])
    .split(area);

  card(f, cols[0], "Total leads", m.total_leads.to_string(), Color::White);
  card(f, cols[1], "Converted", m.converted_leads.to_string(), Color::Green);
  card(f, cols[2], "Conversion", format!("{}%", m.conversion_rate), Color::Cyan);
  card(f, cols[3], "Pipeline", money(m.total_pipeline_value), Color::Yellow);
  card(f, cols[4], "This month", m.leads_this_month.to_string(), Color::Magenta);

  let breakdown: Vec<Line> = LeadStatus::iter()
    .filter_map(|s| m.leads_by_status.get(&s).map(|n| (s, *n)))
    .map(|(s, n)| {
      Line::from(vec![
        Span::styled(format!("{:<10}", s.as_str()), Style::default().fg(status_color(s))),
        Span::raw(n.to_string()),
      ])
    })
    .collect();
  let block = Block::default()
    .title(" By status ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(Paragraph::new(breakdown).block(block), cols[5]);
}

fn card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color) {
  let block = Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let text = Paragraph::new(Line::from(Span::styled(
    value,
    Style::default().fg(color).add_modifier(Modifier::BOLD),
  )))
  .alignment(Alignment::Center)
  .block(block);
  f.render_widget(text, area);
}

pub fn status_color(status: LeadStatus) -> Color {
  match status {
    LeadStatus::New => Color::Blue,
    LeadStatus::Contacted => Color::Yellow,
    LeadStatus::Qualified => Color::Magenta,
    LeadStatus::Converted => Color::Green,
    LeadStatus::Lost => Color::Red,
  }
}
