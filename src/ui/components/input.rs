use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// How `TextInput` dealt with a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Edited the text or moved the cursor
  Consumed,
  /// Enter, with the current text
  Submitted(String),
  /// Esc
  Cancelled,
  /// Not an editing key
  NotHandled,
}

/// Single-line text input.
///
/// The cursor counts characters, not bytes, so coin names with accents or
/// CJK symbols edit correctly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
}

impl TextInput {
  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  fn len(&self) -> usize {
    self.buffer.chars().count()
  }

  /// Byte offset of the given character position
  fn byte_at(&self, pos: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(pos)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  fn delete_range(&mut self, from: usize, to: usize) {
    let (start, end) = (self.byte_at(from), self.byte_at(to));
    self.buffer.replace_range(start..end, "");
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.delete_range(self.cursor - 1, self.cursor);
          self.cursor -= 1;
        }
        InputResult::Consumed
      }
      KeyCode::Delete => {
        if self.cursor < self.len() {
          self.delete_range(self.cursor, self.cursor + 1);
        }
        InputResult::Consumed
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputResult::Consumed
      }
      KeyCode::Right => {
        self.cursor = (self.cursor + 1).min(self.len());
        InputResult::Consumed
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::End => {
        self.cursor = self.len();
        InputResult::Consumed
      }
      KeyCode::Char('a') if ctrl => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('e') if ctrl => {
        self.cursor = self.len();
        InputResult::Consumed
      }
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        self.delete_range(0, self.cursor);
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('w') if ctrl => {
        // Delete word before cursor
        let chars: Vec<char> = self.buffer.chars().take(self.cursor).collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1] == ' ' {
          start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
          start -= 1;
        }
        self.delete_range(start, self.cursor);
        self.cursor = start;
        InputResult::Consumed
      }
      KeyCode::Char(_) if ctrl => InputResult::NotHandled,
      KeyCode::Char(c) => {
        let at = self.byte_at(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
        InputResult::Consumed
      }
      _ => InputResult::NotHandled,
    }
  }
}
