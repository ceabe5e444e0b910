use crate::records::{CvRecord, DATE_FORMAT};
use crate::tenure::{format_tenure, Locale};
use crate::ui::labels::{labels, Labels};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Full text of one work history entry
pub struct CvDetailView {
  record: CvRecord,
  locale: Locale,
  labels: &'static Labels,
  scroll: u16,
}

impl CvDetailView {
  pub fn new(record: CvRecord, locale: Locale) -> Self {
    Self {
      record,
      locale,
      labels: labels(locale),
      scroll: 0,
    }
  }

  fn period(&self) -> String {
    let tenure = format_tenure(self.record.tenure_days(), self.locale);
    let range = format!(
      "{} – {}",
      self.record.start.format(DATE_FORMAT),
      self.record.end.format(DATE_FORMAT)
    );
    if tenure.is_empty() {
      range
    } else {
      format!("{} ({})", range, tenure)
    }
  }

  fn section(&self, title: &'static str, body: &str) -> Vec<Line<'static>> {
    let mut lines = vec![
      Line::default(),
      Line::from(Span::styled(title, Style::default().fg(Color::Yellow).bold())),
    ];
    lines.extend(body.lines().map(|l| Line::raw(l.to_string())));
    lines
  }
}

impl View for CvDetailView {
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
    let block = Block::default()
      .title(format!(" {} ", self.record.company))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let mut lines = vec![
      Line::from(Span::styled(
        self.record.position.clone(),
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::from(Span::styled(self.period(), Style::default().fg(Color::DarkGray))),
    ];
    if !self.record.summary.is_empty() {
      lines.extend(self.section(self.labels.work, &self.record.summary));
    }
    if !self.record.achievements.is_empty() {
      lines.extend(self.section(self.labels.achievements, &self.record.achievements));
    }

    frame.render_widget(
      Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((self.scroll, 0)),
      area,
    );
  }

  fn breadcrumb_label(&self) -> String {
    self.record.company.clone()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::at(10, "j/k", "scroll"),
      Shortcut::at(30, "q", "back"),
    ]
  }
}
