//! The `:` command table and ranked lookup for the palette.

use crate::app::Section;

/// What the app does when a command is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  Open(Section),
  Refresh,
  Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "profile",
    aliases: &["p", "contacts", "info"],
    description: "Photo, contacts and certificate",
    action: CommandAction::Open(Section::Profile),
  },
  Command {
    name: "skills",
    aliases: &["s", "skill", "expertise"],
    description: "Expertise by category",
    action: CommandAction::Open(Section::Skills),
  },
  Command {
    name: "projects",
    aliases: &["d", "demo", "demos"],
    description: "Demo projects",
    action: CommandAction::Open(Section::Projects),
  },
  Command {
    name: "history",
    aliases: &["h", "cv", "jobs"],
    description: "Work history",
    action: CommandAction::Open(Section::History),
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Fetch everything from Google again",
    action: CommandAction::Refresh,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit cvdash",
    action: CommandAction::Quit,
  },
];

/// How well a command matches the typed text, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Match {
  Name,
  Alias,
  NamePrefix,
  AliasPrefix,
  NameContains,
  AliasContains,
}

impl Command {
  fn any_alias(&self, test: impl Fn(&str) -> bool) -> bool {
    self.aliases.iter().any(|&alias| test(alias))
  }

  fn rank(&self, input: &str) -> Option<Match> {
    if self.name == input {
      Some(Match::Name)
    } else if self.any_alias(|a| a == input) {
      Some(Match::Alias)
    } else if self.name.starts_with(input) {
      Some(Match::NamePrefix)
    } else if self.any_alias(|a| a.starts_with(input)) {
      Some(Match::AliasPrefix)
    } else if self.name.contains(input) {
      Some(Match::NameContains)
    } else if self.any_alias(|a| a.contains(input)) {
      Some(Match::AliasContains)
    } else {
      None
    }
  }
}

/// Commands matching `input`, best match first. Ties keep table order.
pub fn suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  let mut ranked: Vec<(Match, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| cmd.rank(&input).map(|rank| (rank, cmd)))
    .collect();
  ranked.sort_by_key(|(rank, _)| *rank);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}
