//! Detail pane for the lead opened with Enter.

use leadbook_core::lead::Lead;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{metrics::status_color, money};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(lead) = &app.selected else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", lead.full_name()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));

  f.render_widget(
    Paragraph::new(lines(lead))
      .block(block)
      .wrap(Wrap { trim: false }),
    area,
  );
}

fn lines(lead: &Lead) -> Vec<Line<'static>> {
  let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "—".into());

  let mut out = vec![
    field("email", lead.email.clone()),
    field("phone", opt(&lead.phone)),
    field("company", opt(&lead.company)),
    field("job title", opt(&lead.job_title)),
    Line::from(""),
    Line::from(vec![
      label("status"),
      Span::styled(
        lead.lead_status.as_str(),
        Style::default().fg(status_color(lead.lead_status)),
      ),
    ]),
    field("source", lead.lead_source.as_str().to_owned()),
    field("value", money(lead.estimated_value)),
    field("assigned to", opt(&lead.assigned_to)),
    Line::from(""),
    field(
      "last contact",
      lead
        .last_contact_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".into()),
    ),
    field("created", lead.created_at.format("%Y-%m-%d %H:%M").to_string()),
    field("updated", lead.updated_at.format("%Y-%m-%d %H:%M").to_string()),
  ];

  if !lead.tags.is_empty() {
    out.push(field("tags", lead.tags.join(", ")));
  }
  if let Some(notes) = &lead.notes {
    out.push(Line::from(""));
    out.push(Line::from(label("notes")));
    out.push(Line::from(notes.clone()));
  }
  out
}

fn label(name: &'static str) -> Span<'static> {
  Span::styled(
    format!("{name:<14}"),
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  )
}

fn field(name: &'static str, value: String) -> Line<'static> {
  Line::from(vec![label(name), Span::raw(value)])
}
