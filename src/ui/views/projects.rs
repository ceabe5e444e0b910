use crate::dashboard::{Dashboard, ImageSlot};
use crate::ui::labels::{labels, Labels};
use crate::ui::renderfns::{draw_picture, picture_height, picture_width};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::sync::Arc;

/// Demo projects, each with its screenshot
pub struct ProjectsView {
  dashboard: Arc<Dashboard>,
  labels: &'static Labels,
}

impl ProjectsView {
  pub fn new(dashboard: Arc<Dashboard>) -> Self {
    let labels = labels(dashboard.locale);
    Self { dashboard, labels }
  }

  fn row_height(&self, index: usize) -> u16 {
    ImageSlot::demo(index)
      .and_then(|slot| self.dashboard.picture(slot))
      .map(picture_height)
      .unwrap_or(0)
      .max(2)
      + 1
  }
}

impl View for ProjectsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.labels.projects))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let demos = &self.dashboard.profile.demos;
    let mut constraints: Vec<Constraint> = (0..demos.len())
      .map(|i| Constraint::Length(self.row_height(i)))
      .collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    for (i, demo) in demos.iter().enumerate() {
      let picture = ImageSlot::demo(i).and_then(|slot| self.dashboard.picture(slot));
      let columns = picture.map(picture_width).unwrap_or(0);

      let [picture_area, text_area] =
        Layout::horizontal([Constraint::Length(columns), Constraint::Min(0)])
          .areas(rows[i]);

      if let Some(image) = picture {
        draw_picture(frame, picture_area, image);
      }

      let lines = vec![
        Line::from(Span::styled(demo.label.clone(), Style::default().bold())),
        Line::from(Span::styled(
          demo.url.clone(),
          Style::default().fg(Color::DarkGray),
        )),
      ];
      frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), text_area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    self.labels.projects.to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    super::root_shortcuts(&[])
  }
}
