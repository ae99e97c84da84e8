use crate::gecko::{Coin, MarketSource, TrendingCoin};
use crate::market::{
  fetch_highlights, Highlights, HighlightsFetch, MarketFeed, SortField, HIGHLIGHT_LIMIT,
};
use crate::query::{Query, QueryStatus};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{
  change_color, format_currency, format_number, format_percentage, truncate,
};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::CoinDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

/// Rows shown in each highlight card
const CARD_ROWS: usize = 5;

/// Market overview: highlight cards above the paginated market table
pub struct MarketView<S: MarketSource> {
  source: S,
  vs_currency: String,
  feed: MarketFeed<S>,
  highlights_query: Query<HighlightsFetch>,
  highlights: Highlights,
  trending: Query<Vec<TrendingCoin>>,
  table_state: TableState,
  search: SearchInput,
}

impl<S: MarketSource> MarketView<S> {
  pub fn new(source: S, vs_currency: impl Into<String>) -> Self {
    let vs_currency = vs_currency.into();

    let highlights_source = source.clone();
    let highlights_currency = vs_currency.clone();
    let mut highlights_query = Query::new(move || {
      let source = highlights_source.clone();
      let currency = highlights_currency.clone();
      async move { Ok(fetch_highlights(&source, &currency, HIGHLIGHT_LIMIT).await) }
    });

    let trending_source = source.clone();
    let mut trending = Query::new(move || {
      let source = trending_source.clone();
      async move { source.trending().await.map_err(|e| e.to_string()) }
    });

    let mut feed = MarketFeed::new(source.clone(), vs_currency.clone());

    // Start fetching immediately
    feed.refresh();
    highlights_query.fetch();
    trending.fetch();

    Self {
      source,
      vs_currency,
      feed,
      highlights_query,
      highlights: Highlights::default(),
      trending,
      table_state: TableState::default(),
      search: SearchInput::new(),
    }
  }

  /// Reload every section
  fn refresh_all(&mut self) {
    self.feed.refresh();
    self.highlights_query.refetch();
    self.trending.refetch();
  }

  fn selected_coin(&self) -> Option<&Coin> {
    self
      .table_state
      .selected()
      .and_then(|i| self.feed.state().visible_at(i))
  }

  fn error_lines(&self) -> Vec<Line<'static>> {
    let sections = [
      ("Markets", self.feed.state().error()),
      ("Highlights", self.highlights.error.as_deref()),
      ("Trending", self.trending.error()),
    ];

    sections
      .into_iter()
      .filter_map(|(section, error)| {
        error.map(|e| {
          Line::from(vec![
            Span::styled(format!(" {}: ", section), Style::default().fg(Color::Red).bold()),
            Span::styled(e.to_string(), Style::default().fg(Color::Red)),
            Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
          ])
        })
      })
      .collect()
  }

  fn status_line(&self) -> Line<'static> {
    let state = self.feed.state();
    let sort = state.sort();

    let mut spans = vec![
      Span::styled(" Sort: ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        format!("{} {}", sort.field.label(), sort.direction.arrow()),
        Style::default().fg(Color::Cyan),
      ),
    ];

    let typed = self.search.value();
    if !state.search_term().is_empty() || !typed.is_empty() {
      spans.push(Span::styled("  Search: ", Style::default().fg(Color::DarkGray)));
      spans.push(Span::styled(
        format!("\"{}\"", typed),
        Style::default().fg(Color::Yellow),
      ));
      if state.search_pending() {
        spans.push(Span::styled(" ...", Style::default().fg(Color::DarkGray)));
      }
    }

    spans.push(Span::styled(
      format!("  {} coins, page {}", state.records().len(), state.page()),
      Style::default().fg(Color::DarkGray),
    ));

    if state.is_loading() {
      spans.push(Span::styled("  loading...", Style::default().fg(Color::Yellow)));
    } else if state.has_more() {
      spans.push(Span::styled(
        "  <n> load more",
        Style::default().fg(Color::DarkGray),
      ));
    }

    Line::from(spans)
  }

  fn render_highlights(&self, frame: &mut Frame, area: Rect) {
    let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
    let loading = self.highlights_query.is_loading();

    let coin_card = |coins: &[Coin]| -> Vec<Line<'static>> {
      coins
        .iter()
        .take(CARD_ROWS)
        .map(|coin| {
          Line::from(vec![
            Span::styled(
              format!("{:<6}", truncate(&coin.symbol.to_uppercase(), 6)),
              Style::default().bold(),
            ),
            Span::raw(format!(
              "{:>14} ",
              format_currency(coin.current_price, &self.vs_currency)
            )),
            Span::styled(
              format_percentage(coin.price_change_percentage_24h),
              Style::default().fg(change_color(coin.price_change_percentage_24h)),
            ),
          ])
        })
        .collect()
    };

    let trending_card: Vec<Line<'static>> = self
      .trending
      .data()
      .map(|coins| coins.as_slice())
      .unwrap_or(&[])
      .iter()
      .take(CARD_ROWS)
      .map(|coin| {
        let rank = coin
          .market_cap_rank
          .map(|r| format!("#{}", r))
          .unwrap_or_else(|| "-".to_string());
        Line::from(vec![
          Span::styled(format!("{:<6}", rank), Style::default().fg(Color::DarkGray)),
          Span::raw(truncate(&coin.name, 16)),
          Span::styled(
            format!(" {}", coin.symbol.to_uppercase()),
            Style::default().fg(Color::DarkGray),
          ),
        ])
      })
      .collect();

    let panels = [
      ("Top Gainers", coin_card(&self.highlights.gainers), loading),
      ("Top Losers", coin_card(&self.highlights.losers), loading),
      ("Highest Volume", coin_card(&self.highlights.volume), loading),
      ("Trending", trending_card, self.trending.is_loading()),
    ];

    for ((title, lines, loading), area) in panels.into_iter().zip(cards.iter()) {
      let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

      let body = if lines.is_empty() {
        let placeholder = if loading { "Loading..." } else { "No data" };
        Paragraph::new(placeholder).style(Style::default().fg(Color::DarkGray))
      } else {
        Paragraph::new(lines)
      };
      frame.render_widget(body.block(block), *area);
    }
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.feed.state().visible_len();
    ensure_valid_selection(&mut self.table_state, len);

    let state = self.feed.state();
    let title = if state.is_loading() && state.records().is_empty() {
      " Markets (loading...) ".to_string()
    } else {
      format!(" Markets ({}) ", len)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = if state.is_loading() {
        "Loading market data...".to_string()
      } else if !state.search_term().is_empty() {
        format!("No coins match \"{}\".", state.search_term())
      } else if state.error().is_some() {
        "Failed to load markets. Press 'r' to retry.".to_string()
      } else {
        "No coins found.".to_string()
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let sort = state.sort();
    let header_cell = |field: SortField, number: usize| {
      let label = if sort.field == field {
        format!("{} {}", field.label(), sort.direction.arrow())
      } else {
        format!("{} [{}]", field.label(), number)
      };
      let style = if sort.field == field {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      Cell::from(label).style(style)
    };

    let header = Row::new(
      SortField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| header_cell(*field, i + 1)),
    );

    let currency = self.vs_currency.as_str();
    let rows: Vec<Row> = state
      .visible()
      .map(|coin| {
        let rank = coin
          .market_cap_rank
          .map(|r| r.to_string())
          .unwrap_or_else(|| "-".to_string());
        Row::new(vec![
          Cell::from(rank).style(Style::default().fg(Color::DarkGray)),
          Cell::from(format_currency(coin.current_price, currency)),
          Cell::from(format_percentage(coin.price_change_percentage_24h))
            .style(Style::default().fg(change_color(coin.price_change_percentage_24h))),
          Cell::from(format_number(coin.market_cap)),
          Cell::from(format_number(coin.total_volume)),
          Cell::from(Line::from(vec![
            Span::raw(truncate(&coin.name, 24)),
            Span::styled(
              format!(" {}", coin.symbol.to_uppercase()),
              Style::default().fg(Color::DarkGray),
            ),
          ])),
        ])
      })
      .collect();

    let widths = [
      Constraint::Length(8),
      Constraint::Length(18),
      Constraint::Length(14),
      Constraint::Length(16),
      Constraint::Length(16),
      Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}

impl<S: MarketSource> View for MarketView<S> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Let search component try to handle first
    let result = self.search.handle_key(key);
    if let KeyResult::Event(SearchEvent::Changed(term)) = &result {
      self.feed.set_search_term(term.clone());
      self.table_state.select(Some(0));
    }
    if result.is_consumed() {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char(c @ '1'..='6') => {
        let index = c as usize - '1' as usize;
        self.feed.select_sort(SortField::ALL[index]);
        self.table_state.select(Some(0));
      }
      KeyCode::Char('d') => {
        self.feed.flip_direction();
        self.table_state.select(Some(0));
      }
      KeyCode::Char('n') => self.feed.load_more(),
      KeyCode::Char('r') => self.refresh_all(),
      KeyCode::Char('c') => {
        self.source.clear_cache();
        tracing::info!("response cache cleared");
      }
      KeyCode::Char('j') | KeyCode::Down => self.table_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.table_state.select_previous(),
      KeyCode::Enter => {
        if let Some(coin) = self.selected_coin() {
          return ViewAction::Push(Box::new(CoinDetailView::new(
            coin.id.clone(),
            coin.name.clone(),
            self.source.clone(),
            self.vs_currency.clone(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let errors = self.error_lines();
    let [highlights, status, errors_area, table] = Layout::vertical([
      Constraint::Length(CARD_ROWS as u16 + 2),
      Constraint::Length(1),
      Constraint::Length(errors.len() as u16),
      Constraint::Min(3),
    ])
    .areas(area);

    self.render_highlights(frame, highlights);
    frame.render_widget(Paragraph::new(self.status_line()), status);
    frame.render_widget(Paragraph::new(errors), errors_area);
    self.render_table(frame, table);

    // Let search component render its overlay
    self.search.render_overlay(frame, table);
  }

  fn breadcrumb_label(&self) -> String {
    format!("Markets [{}]", self.vs_currency.to_uppercase())
  }

  fn footer_note(&self) -> Option<String> {
    self
      .feed
      .state()
      .updated_at()
      .map(|at| format!("updated {}", at.format("%H:%M:%S")))
  }

  fn tick(&mut self) {
    self.feed.tick();

    if self.highlights_query.poll() && self.highlights_query.status() == &QueryStatus::Success {
      if let Some(fetch) = self.highlights_query.data() {
        self.highlights.apply(fetch.clone());
      }
    }

    self.trending.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.search.is_active() {
      return vec![
        ShortcutInfo::new("enter", "apply").with_priority(10),
        ShortcutInfo::new("esc", "clear").with_priority(20),
      ];
    }
    vec![
      ShortcutInfo::new("/", "search").with_priority(10),
      ShortcutInfo::new("1-6", "sort").with_priority(20),
      ShortcutInfo::new("d", "direction").with_priority(30),
      ShortcutInfo::new("n", "more").with_priority(40),
      ShortcutInfo::new("r", "refresh").with_priority(50),
      ShortcutInfo::new("c", "clear cache").with_priority(60),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gecko::{CoinDetail, MarketOrder, MarketParams};
  use color_eyre::{eyre::eyre, Result};
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use ratatui::Terminal;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  /// Serves a fixed market page; trending can be made to fail
  #[derive(Clone, Default)]
  struct FixedSource {
    fail_trending: bool,
    fail_markets: Arc<Mutex<bool>>,
    orders: Arc<Mutex<Vec<MarketOrder>>>,
    cleared: Arc<AtomicUsize>,
  }

  fn coin(name: &str, symbol: &str, price: f64) -> Coin {
    Coin {
      id: name.to_lowercase(),
      name: name.to_string(),
      symbol: symbol.to_string(),
      current_price: Some(price),
      ..Default::default()
    }
  }

  impl MarketSource for FixedSource {
    async fn markets(&self, params: MarketParams) -> Result<Vec<Coin>> {
      self.orders.lock().unwrap().push(params.order);
      if *self.fail_markets.lock().unwrap() && params.per_page != HIGHLIGHT_LIMIT {
        return Err(eyre!("Request to /coins/markets failed"));
      }
      Ok(vec![
        coin("Bitcoin", "btc", 67000.0),
        coin("Ethereum", "eth", 3500.0),
        coin("Litecoin", "ltc", 80.0),
      ])
    }

    async fn trending(&self) -> Result<Vec<TrendingCoin>> {
      if self.fail_trending {
        return Err(eyre!("HTTP 429: Too Many Requests"));
      }
      Ok(vec![TrendingCoin {
        id: "pepe".to_string(),
        name: "Pepe".to_string(),
        symbol: "pepe".to_string(),
        ..Default::default()
      }])
    }

    async fn coin(&self, id: &str) -> Result<CoinDetail> {
      Ok(CoinDetail {
        id: id.to_string(),
        ..Default::default()
      })
    }

    fn clear_cache(&self) {
      self.cleared.fetch_add(1, Ordering::SeqCst);
    }
  }

  fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
  }

  async fn settle<S: MarketSource>(view: &mut MarketView<S>) {
    for _ in 0..20 {
      tokio::task::yield_now().await;
    }
    view.tick();
  }

  fn screen<S: MarketSource>(view: &mut MarketView<S>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
    terminal.draw(|frame| view.render(frame, frame.area())).unwrap();
    terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|cell| cell.symbol())
      .collect()
  }

  #[tokio::test]
  async fn test_loads_all_sections() {
    let mut view = MarketView::new(FixedSource::default(), "usd");
    settle(&mut view).await;

    assert_eq!(view.feed.state().visible_len(), 3);
    assert_eq!(view.highlights.gainers.len(), 3);
    assert!(view.trending.data().is_some());

    let text = screen(&mut view);
    assert!(text.contains("Top Gainers"));
    assert!(text.contains("Trending"));
    assert!(text.contains("Bitcoin"));
    assert!(text.contains("$67,000.00"));
  }

  #[tokio::test]
  async fn test_trending_failure_is_independent() {
    let source = FixedSource {
      fail_trending: true,
      ..Default::default()
    };
    let mut view = MarketView::new(source, "usd");
    settle(&mut view).await;

    assert_eq!(view.trending.error(), Some("HTTP 429: Too Many Requests"));
    assert_eq!(view.feed.state().visible_len(), 3);
    assert!(view.feed.state().error().is_none());
    assert!(view.highlights.error.is_none());
    assert!(screen(&mut view).contains("Trending: HTTP 429"));
  }

  #[tokio::test]
  async fn test_market_failure_keeps_rows_and_trending() {
    let source = FixedSource::default();
    let mut view = MarketView::new(source.clone(), "usd");
    settle(&mut view).await;

    *source.fail_markets.lock().unwrap() = true;
    view.feed.refresh();
    settle(&mut view).await;

    assert_eq!(
      view.feed.state().error(),
      Some("Request to /coins/markets failed")
    );
    assert_eq!(view.feed.state().visible_len(), 3);
    assert!(view.trending.error().is_none());
  }

  #[tokio::test]
  async fn test_number_keys_select_sort() {
    let source = FixedSource::default();
    let mut view = MarketView::new(source.clone(), "usd");
    settle(&mut view).await;

    view.handle_key(key('2'));
    settle(&mut view).await;
    assert_eq!(view.feed.state().sort().field, SortField::CurrentPrice);
    assert_eq!(
      source.orders.lock().unwrap().last(),
      Some(&MarketOrder::PriceAsc)
    );

    view.handle_key(key('d'));
    settle(&mut view).await;
    assert_eq!(
      source.orders.lock().unwrap().last(),
      Some(&MarketOrder::PriceDesc)
    );
  }

  #[tokio::test]
  async fn test_search_keys_do_not_trigger_shortcuts() {
    let source = FixedSource::default();
    let mut view = MarketView::new(source.clone(), "usd");
    settle(&mut view).await;

    view.handle_key(key('/'));
    view.handle_key(key('c'));
    view.handle_key(key('2'));
    assert_eq!(source.cleared.load(Ordering::SeqCst), 0);
    assert_eq!(view.feed.state().sort().field, SortField::MarketCapRank);
    assert_eq!(view.search.value(), "c2");
    assert!(view.feed.state().search_pending());
  }

  #[tokio::test]
  async fn test_open_search_shows_typed_term_and_input_shortcuts() {
    let mut view = MarketView::new(FixedSource::default(), "usd");
    settle(&mut view).await;

    view.handle_key(key('/'));
    view.handle_key(key('e'));
    let keys: Vec<_> = view.shortcuts().iter().map(|s| s.key).collect();
    assert_eq!(keys, ["enter", "esc"]);
    assert!(screen(&mut view).contains("Search: \"e\" ..."));

    view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert!(view.shortcuts().iter().any(|s| s.key == "/"));
  }

  #[tokio::test]
  async fn test_clear_cache_key() {
    let source = FixedSource::default();
    let mut view = MarketView::new(source.clone(), "usd");
    view.handle_key(key('c'));
    assert_eq!(source.cleared.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_enter_opens_detail_and_q_pops() {
    let mut view = MarketView::new(FixedSource::default(), "usd");
    settle(&mut view).await;
    screen(&mut view);

    view.handle_key(key('j'));
    match view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)) {
      ViewAction::Push(detail) => assert_eq!(detail.breadcrumb_label(), "Ethereum"),
      _ => panic!("expected detail view"),
    }
    assert!(matches!(view.handle_key(key('q')), ViewAction::Pop));
  }
}
