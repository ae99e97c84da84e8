use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Key hint rendered in the header as `<key> label`
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  /// Sort key in the header, lowest first
  pub priority: u8,
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(self, priority: u8) -> Self {
    Self { priority, ..self }
  }
}

/// What the app should do with the view stack after a key press
pub enum ViewAction {
  None,
  Push(Box<dyn View>),
  /// Go back; popping the root view quits
  Pop,
}

/// A screen on the view stack.
///
/// Only the top view receives keys and ticks. Views own their async work
/// (queries, feeds) and advance it from `tick()`.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Segment shown in the footer breadcrumb
  fn breadcrumb_label(&self) -> String;

  /// Right-aligned footer text, e.g. the last update time
  fn footer_note(&self) -> Option<String> {
    None
  }

  fn tick(&mut self) {}

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back").with_priority(90)]
  }
}
