use crate::cache::CacheSource;
use ratatui::prelude::Color;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for a proficiency or category score (0–100)
pub fn score_color(score: f64) -> Color {
  if score >= 75.0 {
    Color::Green
  } else if score >= 50.0 {
    Color::Cyan
  } else if score >= 25.0 {
    Color::Yellow
  } else {
    Color::Red
  }
}

/// Get the display color for where dashboard data came from
pub fn source_color(source: CacheSource) -> Color {
  match source {
    CacheSource::Network => Color::Green,
    CacheSource::CacheFresh => Color::Cyan,
    CacheSource::Offline => Color::Yellow,
  }
}
