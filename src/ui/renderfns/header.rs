use crate::ui::view::Shortcut;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, owner, section and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  owner: &str,
  section: &str,
  shortcuts: &[Shortcut],
) {
  let mut spans = vec![
    Span::styled(" cvdash ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  if !owner.is_empty() {
    spans.push(Span::styled(
      format!(" {} ", owner),
      Style::default().fg(Color::White),
    ));
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
  }

  spans.push(Span::styled(
    format!(" {} ", section),
    Style::default().fg(Color::Yellow).bold(),
  ));
  spans.push(Span::raw(" "));

  // Shortcuts - keys and brackets highlighted, descriptions dimmed
  for (i, shortcut) in ordered(shortcuts).into_iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

fn ordered(shortcuts: &[Shortcut]) -> Vec<&Shortcut> {
  let mut sorted: Vec<&Shortcut> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.order);
  sorted
}
