use crate::dashboard::{Dashboard, ImageSlot};
use crate::ui::labels::{labels, Labels};
use crate::ui::renderfns::{draw_picture, picture_height, picture_width};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::sync::Arc;

/// Photo, contacts, links, certificate and notes
pub struct ProfileView {
  dashboard: Arc<Dashboard>,
  labels: &'static Labels,
}

impl ProfileView {
  pub fn new(dashboard: Arc<Dashboard>) -> Self {
    let labels = labels(dashboard.locale);
    Self { dashboard, labels }
  }

  fn picture_columns(&self, slot: ImageSlot) -> (u16, u16) {
    match self.dashboard.picture(slot) {
      Some(image) => (picture_width(image), picture_height(image)),
      None => (0, 0),
    }
  }

  fn render_contacts(&self, frame: &mut Frame, area: Rect) {
    let profile = &self.dashboard.profile;
    let mut lines = vec![
      Line::from(Span::styled(
        profile.name.clone(),
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::from(Span::styled(
        profile.title.clone(),
        Style::default().fg(Color::Yellow),
      )),
      Line::default(),
    ];
    for contact in [&profile.phone, &profile.email].into_iter().flatten() {
      lines.push(Line::raw(contact.clone()));
    }
    frame.render_widget(Paragraph::new(lines), area);
  }

  fn render_links(&self, frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = self
      .dashboard
      .profile
      .links
      .iter()
      .flat_map(|link| {
        [
          Line::from(Span::styled(link.label.clone(), Style::default().bold())),
          Line::from(Span::styled(
            link.url.clone(),
            Style::default().fg(Color::DarkGray),
          )),
        ]
      })
      .collect();
    frame.render_widget(Paragraph::new(lines), area);
  }

  fn render_certificate(&self, frame: &mut Frame, area: Rect) {
    let Some(certificate) = &self.dashboard.profile.certificate else {
      return;
    };

    let (columns, _) = self.picture_columns(ImageSlot::Certificate);
    let [picture_area, text_area] =
      Layout::horizontal([Constraint::Length(columns), Constraint::Min(0)]).areas(area);

    if let Some(image) = self.dashboard.picture(ImageSlot::Certificate) {
      draw_picture(frame, picture_area, image);
    }

    let lines = vec![
      Line::from(Span::styled(
        self.labels.certificate,
        Style::default().fg(Color::DarkGray),
      )),
      Line::from(Span::styled(certificate.label.clone(), Style::default().bold())),
      Line::from(Span::styled(
        certificate.url.clone(),
        Style::default().fg(Color::DarkGray),
      )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), text_area);
  }

  fn render_notes(&self, frame: &mut Frame, area: Rect) {
    let notes = &self.dashboard.profile.notes;
    if notes.is_empty() {
      return;
    }

    let mut lines = vec![Line::from(Span::styled(
      self.labels.notes,
      Style::default().fg(Color::Yellow).bold(),
    ))];
    lines.extend(notes.iter().map(|note| Line::raw(format!("• {}", note))));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
  }
}

impl View for ProfileView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.labels.profile))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (photo_width, photo_height) = self.picture_columns(ImageSlot::Photo);
    let (_, certificate_height) = self.picture_columns(ImageSlot::Certificate);

    let [top, certificate, notes] = Layout::vertical([
      Constraint::Length(photo_height.max(6)),
      Constraint::Length(certificate_height.max(3) + 1),
      Constraint::Min(0),
    ])
    .areas(inner);

    let [photo_area, contacts_area, links_area] = Layout::horizontal([
      Constraint::Length(photo_width),
      Constraint::Min(20),
      Constraint::Percentage(40),
    ])
    .areas(top);

    if let Some(image) = self.dashboard.picture(ImageSlot::Photo) {
      draw_picture(frame, photo_area, image);
    }
    self.render_contacts(frame, contacts_area);
    self.render_links(frame, links_area);
    self.render_certificate(frame, certificate);
    self.render_notes(frame, notes);
  }

  fn breadcrumb_label(&self) -> String {
    self.labels.profile.to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    super::root_shortcuts(&[])
  }
}
