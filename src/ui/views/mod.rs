mod category_detail;
mod cv_detail;
mod history;
mod profile;
mod projects;
mod skills;

pub use category_detail::CategoryDetailView;
pub use cv_detail::CvDetailView;
pub use history::HistoryView;
pub use profile::ProfileView;
pub use projects::ProjectsView;
pub use skills::SkillsView;

use crate::ui::view::Shortcut;

/// Header shortcuts shared by the section roots, plus view-specific extras.
pub(super) fn root_shortcuts(extra: &[Shortcut]) -> Vec<Shortcut> {
  let mut shortcuts = vec![
    Shortcut::at(10, ":", "command"),
    Shortcut::at(15, "1-4", "section"),
    Shortcut::at(20, "r", "refresh"),
    Shortcut::at(30, "q", "quit"),
  ];
  shortcuts.extend(extra.iter().copied());
  shortcuts
}
