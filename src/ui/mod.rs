pub mod components;
pub mod labels;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use crate::dashboard::{ArtifactStatus, Dashboard};
use crate::ui::renderfns::{draw_footer, draw_header, source_color};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let [header_area, body_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  let labels = app.labels();
  let owner = app
    .dashboard()
    .map(|d| d.profile.name.clone())
    .unwrap_or_default();
  draw_header(
    frame,
    header_area,
    &owner,
    app.section().title(labels),
    &app.shortcuts(),
  );

  if let Some(error) = app.error() {
    draw_error(frame, body_area, labels, error);
  } else if let Some(view) = app.current_view_mut() {
    view.render(frame, body_area);
  } else {
    draw_loading(frame, body_area, labels.loading);
  }

  app.command().render_overlay(frame, body_area);

  draw_footer(frame, footer_area, &app.breadcrumb(), status_line(app));
}

fn draw_loading(frame: &mut Frame, area: Rect, text: &str) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let paragraph = Paragraph::new(text)
    .block(block)
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Yellow));
  frame.render_widget(paragraph, area);
}

fn draw_error(frame: &mut Frame, area: Rect, labels: &labels::Labels, error: &str) {
  let block = Block::default()
    .title(format!(" {} ", labels.load_failed))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let lines = vec![
    Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
    Line::default(),
    Line::from(Span::styled(
      labels.retry_hint,
      Style::default().fg(Color::DarkGray),
    )),
  ];
  frame.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
    area,
  );
}

/// Right side of the footer: transient message, load progress or data origin
fn status_line(app: &App) -> Line<'static> {
  if let Some(message) = app.message() {
    return Line::from(Span::styled(
      format!("{} ", message),
      Style::default().fg(Color::Yellow),
    ));
  }
  if app.is_loading() {
    return Line::from(Span::styled(
      format!("{} ", app.labels().loading),
      Style::default().fg(Color::Yellow),
    ));
  }
  match app.dashboard() {
    Some(dashboard) => source_line(dashboard),
    None => Line::default(),
  }
}

/// Combined data source, plus the oldest cache entry that was served
fn source_line(dashboard: &Dashboard) -> Line<'static> {
  let source = dashboard.overall_source();
  let detail = match dashboard.oldest_entry() {
    Some(ArtifactStatus {
      key,
      modified_at: Some(modified),
      ..
    }) => format!(" {} {} ", key, modified.format("%d.%m.%Y %H:%M")),
    _ => format!(" {} ", dashboard.loaded_at.format("%d.%m.%Y %H:%M")),
  };
  Line::from(vec![
    Span::styled(source.label(), Style::default().fg(source_color(source))),
    Span::styled(detail, Style::default().fg(Color::DarkGray)),
  ])
}

/// Clamp a selection index into `0..len`, `None` for an empty list.
pub fn clamp_selection(selected: Option<usize>, len: usize) -> Option<usize> {
  if len == 0 {
    None
  } else {
    Some(selected.unwrap_or(0).min(len - 1))
  }
}
