use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar with the view breadcrumb and an optional note on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], note: Option<&str>) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let note = note.map(|n| format!("{} ", n)).unwrap_or_default();
  let [left, right] = Layout::horizontal([
    Constraint::Min(1),
    Constraint::Length(note.chars().count() as u16),
  ])
  .areas(area);

  let background = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(spans)).style(background), left);
  frame.render_widget(
    Paragraph::new(note).style(background.fg(Color::DarkGray)),
    right,
  );
}
