use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::gecko::GeckoClient;
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::MarketView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::time::Duration;

const DEFAULT_TITLE: &str = "coin9s";
const TICK_RATE: Duration = Duration::from_millis(250);

/// Owns the view stack and drives the terminal
pub struct App {
  /// Navigation stack, root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  config: Config,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = GeckoClient::new(&config)?;
    let root = MarketView::new(client, config.vs_currency.clone());

    Ok(Self::with_root(config, Box::new(root)))
  }

  fn with_root(config: Config, root: Box<dyn View>) -> Self {
    Self {
      view_stack: vec![root],
      config,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        if let Some(view) = self.view_stack.last_mut() {
          view.tick();
        }
      }
      Event::Resize => {} // Redrawn on the next loop iteration
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => return,
    };

    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        tracing::debug!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn title(&self) -> &str {
    self.config.title.as_deref().unwrap_or(DEFAULT_TITLE)
  }

  pub fn api_url(&self) -> &str {
    &self.config.api.url
  }

  pub fn vs_currency(&self) -> &str {
    &self.config.vs_currency
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
