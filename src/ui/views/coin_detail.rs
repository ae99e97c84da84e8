use crate::gecko::{CoinDetail, MarketSource};
use crate::query::{Query, QueryStatus};
use crate::ui::renderfns::{
  change_color, format_amount, format_currency, format_number, format_percentage,
};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// View for a single coin's market data
pub struct CoinDetailView {
  name: String,
  vs_currency: String,
  query: Query<CoinDetail>,
}

impl CoinDetailView {
  pub fn new<S: MarketSource>(id: String, name: String, source: S, vs_currency: String) -> Self {
    let mut query = Query::new(move || {
      let source = source.clone();
      let id = id.clone();
      async move { source.coin(&id).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      name,
      vs_currency,
      query,
    }
  }

  fn label(text: &str) -> Span<'static> {
    Span::styled(format!("{:<22}", text), Style::default().fg(Color::DarkGray))
  }

  fn money(&self, value: Option<f64>) -> Span<'static> {
    Span::raw(format_currency(value, &self.vs_currency))
  }

  fn change(value: Option<f64>) -> Span<'static> {
    Span::styled(
      format!(" ({})", format_percentage(value)),
      Style::default().fg(change_color(value)),
    )
  }

  fn date(value: Option<DateTime<Utc>>) -> Span<'static> {
    let text = value
      .map(|d| format!("  on {}", d.format("%Y-%m-%d")))
      .unwrap_or_default();
    Span::styled(text, Style::default().fg(Color::DarkGray))
  }

  fn detail_lines(&self, coin: &CoinDetail) -> Vec<Line<'static>> {
    let rank = coin
      .market_cap_rank
      .map(|r| format!("#{}", r))
      .unwrap_or_else(|| "N/A".to_string());

    vec![
      Line::from(vec![
        Self::label("Price"),
        self.money(coin.current_price).bold(),
        Self::change(coin.price_change_percentage_24h),
      ]),
      Line::from(vec![
        Self::label("24h Change"),
        self.money(coin.price_change_24h),
      ]),
      Line::from(vec![
        Self::label("24h Range"),
        self.money(coin.low_24h),
        Span::styled(" - ", Style::default().fg(Color::DarkGray)),
        self.money(coin.high_24h),
      ]),
      Line::default(),
      Line::from(vec![
        Self::label("Market Cap"),
        Span::raw(format_number(coin.market_cap)),
        Self::change(coin.market_cap_change_percentage_24h),
      ]),
      Line::from(vec![Self::label("Market Cap Rank"), Span::raw(rank)]),
      Line::from(vec![
        Self::label("24h Volume"),
        Span::raw(format_number(coin.total_volume)),
      ]),
      Line::default(),
      Line::from(vec![
        Self::label("Circulating Supply"),
        Span::raw(format_amount(coin.circulating_supply)),
      ]),
      Line::from(vec![
        Self::label("Total Supply"),
        Span::raw(format_amount(coin.total_supply)),
      ]),
      Line::from(vec![
        Self::label("Max Supply"),
        Span::raw(format_amount(coin.max_supply)),
      ]),
      Line::default(),
      Line::from(vec![
        Self::label("All-Time High"),
        self.money(coin.ath),
        Self::change(coin.ath_change_percentage),
        Self::date(coin.ath_date),
      ]),
      Line::from(vec![
        Self::label("All-Time Low"),
        self.money(coin.atl),
        Self::change(coin.atl_change_percentage),
        Self::date(coin.atl_date),
      ]),
    ]
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let heading = match self.query.data() {
      Some(coin) if !coin.symbol.is_empty() => {
        format!("{} ({})", self.name, coin.symbol.to_uppercase())
      }
      _ => self.name.clone(),
    };
    let title = match self.query.status() {
      QueryStatus::Loading => format!(" {} (loading...) ", heading),
      _ => format!(" {} ", heading),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if let Some(error) = self.query.error() {
      lines.push(Line::styled(
        format!("Error: {}. Press 'r' to retry.", error),
        Style::default().fg(Color::Red),
      ));
      lines.push(Line::default());
    }

    match self.query.data() {
      Some(coin) => lines.extend(self.detail_lines(coin)),
      None if self.query.is_loading() => lines.push(Line::styled(
        "Loading coin details...",
        Style::default().fg(Color::DarkGray),
      )),
      None => {}
    }

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

impl View for CoinDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.name.clone()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("r", "refresh").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
