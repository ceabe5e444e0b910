//! The contract between the app's view stack and the screens on it.

use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Key hint in the header bar. Hints are listed by ascending `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
  pub order: u8,
  pub key: &'static str,
  pub label: &'static str,
}

impl Shortcut {
  pub const fn at(order: u8, key: &'static str, label: &'static str) -> Self {
    Self { order, key, label }
  }
}

/// What the view stack should do after a key press.
pub enum ViewAction {
  None,
  /// Open a drill-down screen on top of the current one
  Push(Box<dyn View>),
  /// Close the current screen; closing the last one quits
  Pop,
}

/// A screen over a loaded [`Dashboard`](crate::dashboard::Dashboard).
///
/// Views are only built once a render pass has succeeded and own an `Arc` of
/// its result. Global keys (sections, refresh, the palette) are routed by the
/// app before a view sees them.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Trail segment, e.g. the company of an opened work record
  fn breadcrumb_label(&self) -> String;

  fn shortcuts(&self) -> Vec<Shortcut>;
}
