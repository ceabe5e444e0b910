use crate::dashboard::Dashboard;
use crate::ui::labels::{labels, Labels};
use crate::ui::renderfns::{score_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::CategoryDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap};
use std::sync::Arc;

const LABEL_WIDTH: usize = 24;

/// Category ranking as a horizontal bar chart, with a preview of the selected category
pub struct SkillsView {
  dashboard: Arc<Dashboard>,
  labels: &'static Labels,
  selected: usize,
}

impl SkillsView {
  pub fn new(dashboard: Arc<Dashboard>) -> Self {
    let labels = labels(dashboard.locale);
    Self {
      dashboard,
      labels,
      selected: 0,
    }
  }

  fn selected_category(&self) -> Option<&str> {
    self
      .dashboard
      .aggregates
      .ranked
      .get(self.selected)
      .map(|a| a.category.as_str())
  }

  fn move_selection(&mut self, delta: isize) {
    let len = self.dashboard.aggregates.ranked.len();
    if len == 0 {
      return;
    }
    self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
  }

  fn render_chart(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.labels.skills))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let excluded = &self.dashboard.aggregates.excluded;
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [chart_area, excluded_area] = Layout::vertical([
      Constraint::Min(1),
      Constraint::Length(if excluded.is_empty() { 0 } else { 1 }),
    ])
    .areas(inner);

    let bars: Vec<Bar> = self
      .dashboard
      .aggregates
      .ranked
      .iter()
      .enumerate()
      .map(|(i, aggregate)| {
        let color = score_color(aggregate.mean as f64);
        let style = if i == self.selected {
          Style::default().fg(color).add_modifier(Modifier::REVERSED)
        } else {
          Style::default().fg(color)
        };
        Bar::default()
          .label(Line::from(truncate(&aggregate.category, LABEL_WIDTH)))
          .value(aggregate.mean.clamp(0, 100) as u64)
          .text_value(aggregate.mean.to_string())
          .style(style)
          .value_style(Style::default().fg(Color::Black).bg(color))
      })
      .collect();

    let chart = BarChart::default()
      .direction(Direction::Horizontal)
      .bar_width(1)
      .bar_gap(0)
      .max(100)
      .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, chart_area);

    if !excluded.is_empty() {
      let line = Line::from(vec![
        Span::styled(
          format!("{}: ", self.labels.excluded),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(excluded.join(", "), Style::default().fg(Color::Yellow)),
      ]);
      frame.render_widget(Paragraph::new(line), excluded_area);
    }
  }

  fn render_preview(&self, frame: &mut Frame, area: Rect) {
    let category = self.selected_category().unwrap_or_default();
    let block = Block::default()
      .title(format!(" {} ", category))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));

    let lines: Vec<Line> = self
      .dashboard
      .category_detail(category)
      .into_iter()
      .map(|tool| {
        Line::from(vec![
          Span::styled(
            format!("{:>3} ", tool.proficiency),
            Style::default().fg(score_color(tool.proficiency)),
          ),
          Span::styled(tool.tool.clone(), Style::default().bold()),
          Span::styled(
            if tool.comment.is_empty() {
              String::new()
            } else {
              format!("  {}", tool.comment)
            },
            Style::default().fg(Color::DarkGray),
          ),
        ])
      })
      .collect();

    frame.render_widget(
      Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
      area,
    );
  }
}

impl View for SkillsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.move_selection(1);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.move_selection(-1);
        ViewAction::None
      }
      KeyCode::Enter => match self.selected_category() {
        Some(category) => ViewAction::Push(Box::new(CategoryDetailView::new(
          self.dashboard.clone(),
          category.to_string(),
        ))),
        None => ViewAction::None,
      },
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [chart_area, preview_area] =
      Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
    self.render_chart(frame, chart_area);
    self.render_preview(frame, preview_area);
  }

  fn breadcrumb_label(&self) -> String {
    self.labels.skills.to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    super::root_shortcuts(&[Shortcut::at(25, "enter", "details")])
  }
}
