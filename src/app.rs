use crate::cache::FetchMode;
use crate::commands::CommandAction;
use crate::config::Config;
use crate::dashboard::{Dashboard, DashboardLoader};
use crate::event::{Event, EventHandler};
use crate::query::{Query, QueryState};
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::labels::{labels, Labels};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::{HistoryView, ProfileView, ProjectsView, SkillsView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Top-level dashboard sections, reachable with 1-4 or `:` commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
  Profile,
  Skills,
  Projects,
  History,
}

impl Section {
  pub const ALL: [Section; 4] = [
    Section::Profile,
    Section::Skills,
    Section::Projects,
    Section::History,
  ];

  pub fn from_key(c: char) -> Option<Self> {
    let index = c.to_digit(10)?.checked_sub(1)?;
    Self::ALL.get(index as usize).copied()
  }

  pub fn next(self) -> Self {
    match self {
      Section::Profile => Section::Skills,
      Section::Skills => Section::Projects,
      Section::Projects => Section::History,
      Section::History => Section::Profile,
    }
  }

  pub fn title(self, labels: &'static Labels) -> &'static str {
    match self {
      Section::Profile => labels.profile,
      Section::Skills => labels.skills,
      Section::Projects => labels.projects,
      Section::History => labels.history,
    }
  }

  pub fn root_view(self, dashboard: Arc<Dashboard>) -> Box<dyn View> {
    match self {
      Section::Profile => Box::new(ProfileView::new(dashboard)),
      Section::Skills => Box::new(SkillsView::new(dashboard)),
      Section::Projects => Box::new(ProjectsView::new(dashboard)),
      Section::History => Box::new(HistoryView::new(dashboard)),
    }
  }
}

/// Main application state
pub struct App {
  labels: &'static Labels,

  /// Background render pass
  query: Query<Arc<Dashboard>>,

  /// Read and cleared by the fetcher when a pass starts
  force: Arc<AtomicBool>,

  section: Section,

  /// Navigation stack - root is always at index 0, empty until the first pass lands
  view_stack: Vec<Box<dyn View>>,

  command: CommandInput,

  /// Transient status line text, cleared on the next key
  message: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, mode: FetchMode) -> Result<Self> {
    let loader = Arc::new(DashboardLoader::new(&config)?);
    let force = Arc::new(AtomicBool::new(mode == FetchMode::Force));

    let flag = force.clone();
    let query = Query::new(move || {
      let loader = loader.clone();
      // Swapped here, not inside the future, so the mode is fixed when the pass starts
      let mode = if flag.swap(false, Ordering::SeqCst) {
        FetchMode::Force
      } else {
        FetchMode::IfStale
      };
      async move {
        loader
          .load(mode)
          .await
          .map(Arc::new)
          .map_err(|e| e.to_string())
      }
    });

    Ok(Self::with_query(labels(config.locale), query, force))
  }

  pub fn with_query(
    labels: &'static Labels,
    query: Query<Arc<Dashboard>>,
    force: Arc<AtomicBool>,
  ) -> Self {
    Self {
      labels,
      query,
      force,
      section: Section::Profile,
      view_stack: Vec::new(),
      command: CommandInput::new(),
      message: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = match Terminal::new(CrosstermBackend::new(stdout())) {
      Ok(mut terminal) => self.main_loop(&mut terminal).await,
      Err(e) => Err(e.into()),
    };

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    self.start();

    while !self.should_quit() {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  /// Kick off the first render pass
  pub fn start(&mut self) {
    self.query.fetch();
  }

  /// Poll the pending pass and rebuild views when it finished.
  pub fn tick(&mut self) {
    if !self.query.poll() {
      return;
    }

    match self.query.state() {
      QueryState::Success(dashboard) => {
        let dashboard = dashboard.clone();
        info!(section = ?self.section, "dashboard ready");
        // Pushed detail views may point at rows that no longer exist
        self.view_stack = vec![self.section.root_view(dashboard)];
      }
      QueryState::Error(e) => error!(error = %e, "render pass failed"),
      _ => {}
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) {
    self.message = None;

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.command.handle_key(key) {
      KeyResult::Event(CommandEvent::Run(cmd)) => {
        self.run_command(cmd.action);
        return;
      }
      KeyResult::Event(CommandEvent::Unknown(input)) => {
        self.message = Some(format!("unknown command: {}", input));
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
      KeyResult::NotHandled => {}
    }

    if self.query.error().is_some() {
      // Error panel: only retry and quit
      match key.code {
        KeyCode::Char('r') => self.reload(FetchMode::IfStale),
        KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
        _ => {}
      }
      return;
    }

    match key.code {
      KeyCode::Char('r') => return self.reload(FetchMode::Force),
      KeyCode::Tab => return self.switch_section(self.section.next()),
      KeyCode::Char(c) => {
        if let Some(section) = Section::from_key(c) {
          return self.switch_section(section);
        }
      }
      _ => {}
    }

    let Some(view) = self.view_stack.last_mut() else {
      if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
        self.should_quit = true;
      }
      return;
    };

    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  /// Start a new render pass. Ignored while one is running.
  pub fn reload(&mut self, mode: FetchMode) {
    if self.query.is_loading() {
      self.message = Some(format!("{} ", self.labels.loading));
      return;
    }
    info!(?mode, "reload requested");
    self.force.store(mode == FetchMode::Force, Ordering::SeqCst);
    self.query.fetch();
  }

  pub fn switch_section(&mut self, section: Section) {
    self.section = section;
    if let Some(dashboard) = self.query.data().cloned() {
      self.view_stack = vec![section.root_view(dashboard)];
    }
  }

  fn run_command(&mut self, action: CommandAction) {
    match action {
      CommandAction::Open(section) => self.switch_section(section),
      CommandAction::Refresh => self.reload(FetchMode::Force),
      CommandAction::Quit => self.should_quit = true,
    }
  }

  pub fn labels(&self) -> &'static Labels {
    self.labels
  }

  pub fn section(&self) -> Section {
    self.section
  }

  pub fn dashboard(&self) -> Option<&Arc<Dashboard>> {
    self.query.data()
  }

  pub fn error(&self) -> Option<&str> {
    self.query.error()
  }

  pub fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  pub fn message(&self) -> Option<&str> {
    self.message.as_deref()
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }

  pub fn current_view_mut(&mut self) -> Option<&mut (dyn View + 'static)> {
    self.view_stack.last_mut().map(|v| v.as_mut())
  }

  pub fn shortcuts(&self) -> Vec<Shortcut> {
    match self.view_stack.last() {
      Some(view) => view.shortcuts(),
      None => vec![
        Shortcut::at(20, "r", "retry"),
        Shortcut::at(30, "q", "quit"),
      ],
    }
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    if self.view_stack.is_empty() {
      return vec![self.section.title(self.labels).to_string()];
    }
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }
}
