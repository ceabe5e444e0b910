use crate::dashboard::Dashboard;
use crate::ui::labels::{labels, Labels};
use crate::ui::renderfns::{score_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap};
use std::sync::Arc;

/// Per-tool proficiency of one category, next to the tool comments
pub struct CategoryDetailView {
  dashboard: Arc<Dashboard>,
  labels: &'static Labels,
  category: String,
  scroll: u16,
}

impl CategoryDetailView {
  pub fn new(dashboard: Arc<Dashboard>, category: String) -> Self {
    let labels = labels(dashboard.locale);
    Self {
      dashboard,
      labels,
      category,
      scroll: 0,
    }
  }

  fn render_chart(&self, frame: &mut Frame, area: Rect) {
    let mean = self
      .dashboard
      .aggregates
      .get(&self.category)
      .map(|a| a.mean)
      .unwrap_or_default();
    let block = Block::default()
      .title(format!(" {} ({}) ", self.category, mean))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let bars: Vec<Bar> = self
      .dashboard
      .category_detail(&self.category)
      .into_iter()
      .map(|tool| {
        let color = score_color(tool.proficiency);
        Bar::default()
          .label(Line::from(truncate(&tool.tool, 24)))
          .value(tool.proficiency.clamp(0.0, 100.0) as u64)
          .text_value(tool.proficiency.to_string())
          .style(Style::default().fg(color))
          .value_style(Style::default().fg(Color::Black).bg(color))
      })
      .collect();

    let chart = BarChart::default()
      .block(block)
      .direction(Direction::Horizontal)
      .bar_width(1)
      .bar_gap(0)
      .max(100)
      .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
  }

  fn render_comments(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));

    let lines: Vec<Line> = self
      .dashboard
      .category_detail(&self.category)
      .into_iter()
      .map(|tool| {
        let comment = if tool.comment.is_empty() {
          Span::styled(self.labels.no_comment, Style::default().fg(Color::DarkGray))
        } else {
          Span::raw(tool.comment.clone())
        };
        Line::from(vec![
          Span::styled(format!("{}: ", tool.tool), Style::default().bold()),
          comment,
        ])
      })
      .collect();

    frame.render_widget(
      Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((self.scroll, 0)),
      area,
    );
  }
}

impl View for CategoryDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.scroll = self.scroll.saturating_add(1);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [chart_area, comments_area] =
      Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);
    self.render_chart(frame, chart_area);
    self.render_comments(frame, comments_area);
  }

  fn breadcrumb_label(&self) -> String {
    self.category.clone()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::at(10, "j/k", "scroll"),
      Shortcut::at(30, "q", "back"),
    ]
  }
}
