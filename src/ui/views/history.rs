use crate::dashboard::{Dashboard, HistorySort, SortKey};
use crate::records::{CvRecord, DATE_FORMAT};
use crate::tenure::format_tenure;
use crate::ui::clamp_selection;
use crate::ui::labels::{labels, Labels};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::CvDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use std::sync::Arc;

/// Work history table. Only the latest position is shown until expanded.
pub struct HistoryView {
  dashboard: Arc<Dashboard>,
  labels: &'static Labels,
  sort: HistorySort,
  expanded: bool,
  table_state: TableState,
}

impl HistoryView {
  pub fn new(dashboard: Arc<Dashboard>) -> Self {
    let labels = labels(dashboard.locale);
    Self {
      dashboard,
      labels,
      sort: HistorySort::default(),
      expanded: false,
      table_state: TableState::default().with_selected(Some(0)),
    }
  }

  fn visible(&self) -> Vec<&CvRecord> {
    let mut rows = self.dashboard.history(self.sort);
    if !self.expanded {
      rows.truncate(1);
    }
    rows
  }

  fn sort_label(&self) -> &'static str {
    match self.sort.key {
      SortKey::Start => self.labels.start,
      SortKey::Company => self.labels.company,
      SortKey::Position => self.labels.position,
      SortKey::Tenure => self.labels.tenure,
    }
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let locale = self.dashboard.locale;
    let arrow = if self.sort.descending { "↓" } else { "↑" };
    let title = format!(
      " {} ({} {}) ",
      self.labels.history,
      self.sort_label(),
      arrow
    );

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let header = Row::new(vec![
      self.labels.start,
      self.labels.company,
      self.labels.position,
      self.labels.tenure,
      self.labels.work,
    ])
    .style(Style::default().fg(Color::Yellow).bold());

    let rows: Vec<Row> = self
      .visible()
      .into_iter()
      .map(|record| {
        Row::new(vec![
          Cell::from(record.start.format(DATE_FORMAT).to_string()),
          Cell::from(Span::styled(
            record.company.clone(),
            Style::default().fg(Color::Cyan),
          )),
          Cell::from(record.position.clone()),
          Cell::from(format_tenure(record.tenure_days(), locale)),
          Cell::from(record.summary.clone()),
        ])
      })
      .collect();
    let len = rows.len();

    let table = Table::new(
      rows,
      [
        Constraint::Length(10),
        Constraint::Percentage(20),
        Constraint::Percentage(20),
        Constraint::Length(18),
        Constraint::Min(10),
      ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

    self
      .table_state
      .select(clamp_selection(self.table_state.selected(), len));
    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}

impl View for HistoryView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.table_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.table_state.select_previous();
        ViewAction::None
      }
      KeyCode::Char('s') => {
        self.sort.key = self.sort.key.next();
        ViewAction::None
      }
      KeyCode::Char('o') => {
        self.sort.descending = !self.sort.descending;
        ViewAction::None
      }
      KeyCode::Char('e') => {
        self.expanded = !self.expanded;
        ViewAction::None
      }
      KeyCode::Enter => {
        let selected = self
          .table_state
          .selected()
          .and_then(|i| self.visible().get(i).map(|r| (*r).clone()));
        match selected {
          Some(record) => ViewAction::Push(Box::new(CvDetailView::new(
            record,
            self.dashboard.locale,
          ))),
          None => ViewAction::None,
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let hidden = self.dashboard.cv.len().saturating_sub(self.visible().len());
    let [table_area, hint_area] = Layout::vertical([
      Constraint::Min(3),
      Constraint::Length(if hidden > 0 { 1 } else { 0 }),
    ])
    .areas(area);

    self.render_table(frame, table_area);

    if hidden > 0 {
      let hint = Paragraph::new(format!(" {} (+{})", self.labels.show_all, hidden))
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(hint, hint_area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    self.labels.history.to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    super::root_shortcuts(&[
      Shortcut::at(22, "s", "sort"),
      Shortcut::at(23, "o", "order"),
      Shortcut::at(24, "e", "expand"),
    ])
  }
}
