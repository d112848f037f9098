//! Event loop and load state machine.
//!
//! Fetches run on tokio tasks and post a [`Fetched`] message back to the
//! loop. Table loads (top listing, search) share one job slot and chart loads
//! have their own; starting a new request in a slot aborts the previous task
//! and bumps the slot's generation, so a late answer from a superseded
//! request is dropped instead of overwriting newer data.

use crate::config::AppConfig;
use crate::data::{coin_rows, price_points, MarketClient, Transport};
use crate::ui::{Button, ChartWindow, LayoutManager};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures_util::StreamExt;
use ratatui::{backend::Backend, Terminal};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    LoadingListing,
    LoadingSearch,
    LoadingDetails,
    LoadingChart,
}

impl LoadState {
    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Idle => "IDLE",
            LoadState::LoadingListing => "LOADING TOP",
            LoadState::LoadingSearch => "SEARCHING",
            LoadState::LoadingDetails => "FETCHING PRICES",
            LoadState::LoadingChart => "LOADING CHART",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Table,
    Chart,
}

#[derive(Debug)]
pub enum Fetched {
    Listing {
        generation: u64,
        coins: Vec<Value>,
    },
    SearchMatched {
        generation: u64,
        query: String,
        matches: usize,
    },
    Details {
        generation: u64,
        query: String,
        coins: Vec<Value>,
    },
    Chart {
        generation: u64,
        coin_id: String,
        window: ChartWindow,
        prices: Vec<Value>,
    },
    Failed {
        generation: u64,
        kind: JobKind,
        reason: String,
    },
}

#[derive(Default)]
struct Job {
    generation: u64,
    phase: Option<LoadState>,
    handle: Option<JoinHandle<()>>,
}

impl Job {
    /// Aborts whatever is in flight and returns the generation for the new task.
    fn supersede(&mut self, phase: LoadState) -> u64 {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                tracing::debug!(phase = ?self.phase, "superseding in-flight request");
            }
            handle.abort();
        }
        self.generation += 1;
        self.phase = Some(phase);
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.phase.is_some() && self.generation == generation
    }

    fn finish(&mut self) {
        self.phase = None;
        self.handle = None;
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.phase = None;
    }
}

enum Step {
    Fetched(Fetched),
    Input(Option<std::io::Result<Event>>),
}

pub struct App<T> {
    client: MarketClient<T>,
    top_n: u32,
    pub layout: LayoutManager,
    pub focus: Focus,
    pub running: bool,
    table_job: Job,
    chart_job: Job,
    /// Coin whose chart is in flight; not yet on screen.
    pending_chart: Option<String>,
    tx: mpsc::UnboundedSender<Fetched>,
    rx: mpsc::UnboundedReceiver<Fetched>,
}

impl<T: Transport> App<T> {
    pub fn new(client: MarketClient<T>, config: &AppConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = Self {
            client,
            top_n: config.top_n,
            layout: LayoutManager::new(config.chart_window, config.chart_style.into()),
            focus: Focus::Search,
            running: true,
            table_job: Job::default(),
            chart_job: Job::default(),
            pending_chart: None,
            tx,
            rx,
        };
        app.set_focus(Focus::Search);
        app
    }

    pub fn window(&self) -> ChartWindow {
        self.layout.window.current()
    }

    /// Table loads take precedence over a pending chart in the status bar.
    pub fn state(&self) -> LoadState {
        self.table_job
            .phase
            .or(self.chart_job.phase)
            .unwrap_or(LoadState::Idle)
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.layout.search.focused = focus == Focus::Search;
        self.layout.table.focused = focus == Focus::Table;
    }

    fn set_message(&mut self, message: impl Into<String>) {
        self.layout.statusbar.message = message.into();
    }

    fn sync_status(&mut self) {
        let state = self.state();
        self.layout.statusbar.state = state.label();
        self.layout.statusbar.busy = state != LoadState::Idle;
    }

    pub fn load_top(&mut self) {
        let generation = self.table_job.supersede(LoadState::LoadingListing);
        let client = self.client.clone();
        let tx = self.tx.clone();
        let n = self.top_n;
        tracing::info!(n, "loading top coins");

        self.table_job.handle = Some(tokio::spawn(async move {
            let msg = match client.try_fetch_top(n).await {
                Ok(coins) => Fetched::Listing { generation, coins },
                Err(e) => Fetched::Failed {
                    generation,
                    kind: JobKind::Table,
                    reason: format!("Top {} failed: {}", n, e),
                },
            };
            let _ = tx.send(msg);
        }));
        self.set_message(format!("Loading top {}...", n));
        self.sync_status();
    }

    /// Blank queries are ignored and leave the table as it is.
    pub fn search(&mut self) {
        let query = self.layout.search.query().trim().to_string();
        if query.is_empty() {
            return;
        }

        let generation = self.table_job.supersede(LoadState::LoadingSearch);
        let client = self.client.clone();
        let tx = self.tx.clone();
        tracing::info!(%query, "searching");
        self.set_message(format!("Searching '{}'...", query));

        self.table_job.handle = Some(tokio::spawn(async move {
            let coins = match client.try_search_coins(&query).await {
                Ok(coins) => coins,
                Err(e) => {
                    let _ = tx.send(Fetched::Failed {
                        generation,
                        kind: JobKind::Table,
                        reason: format!("Search '{}' failed: {}", query, e),
                    });
                    return;
                }
            };

            let ids: Vec<String> = coins
                .iter()
                .map(|coin| {
                    coin.get("id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect();
            let matched = Fetched::SearchMatched {
                generation,
                query: query.clone(),
                matches: coins.len(),
            };
            if tx.send(matched).is_err() {
                return;
            }

            let details = client.fetch_market_details(&ids).await;
            let _ = tx.send(Fetched::Details {
                generation,
                query,
                coins: details,
            });
        }));
        self.sync_status();
    }

    /// A click on any cell of `row`. Rows outside the current table (a click
    /// that raced a reload) do nothing.
    pub fn click_row(&mut self, row: usize) {
        self.layout.table.select(row);
        self.open_chart(row);
    }

    pub fn open_chart(&mut self, row: usize) {
        let Some(coin_id) = self.layout.table.coin_at(row).map(str::to_string) else {
            tracing::debug!(row, rows = self.layout.table.len(), "no coin at row");
            return;
        };
        self.request_chart(coin_id);
    }

    fn request_chart(&mut self, coin_id: String) {
        let window = self.window();
        let generation = self.chart_job.supersede(LoadState::LoadingChart);
        let client = self.client.clone();
        let tx = self.tx.clone();
        tracing::info!(%coin_id, window = window.label(), "loading chart");
        self.set_message(format!("Loading {} chart for {}...", window.label(), coin_id));
        self.pending_chart = Some(coin_id.clone());

        self.chart_job.handle = Some(tokio::spawn(async move {
            let msg = match client
                .try_fetch_chart(&coin_id, window.days(), window.interval())
                .await
            {
                Ok(prices) => Fetched::Chart {
                    generation,
                    coin_id,
                    window,
                    prices,
                },
                Err(e) => Fetched::Failed {
                    generation,
                    kind: JobKind::Chart,
                    reason: format!("Chart for {} failed: {}", coin_id, e),
                },
            };
            let _ = tx.send(msg);
        }));
        self.sync_status();
    }

    /// Switches the chart window and redraws the coin being loaded, or
    /// failing that the one on the chart.
    pub fn cycle_window(&mut self) {
        self.layout.window.select_next();
        let coin_id = self
            .pending_chart
            .clone()
            .or_else(|| self.layout.chart.coin_id.clone());
        match coin_id {
            Some(coin_id) => self.request_chart(coin_id),
            None => self.set_message(format!("Chart window: {}", self.window().label())),
        }
    }

    pub fn handle_fetched(&mut self, msg: Fetched) {
        match msg {
            Fetched::Listing { generation, coins } => {
                if !self.table_job.is_current(generation) {
                    tracing::debug!(generation, "dropping stale listing");
                    return;
                }
                self.table_job.finish();
                let rows = coin_rows(&coins);
                tracing::info!(rows = rows.len(), "listing loaded");
                self.set_message(format!("Loaded top {} coins", rows.len()));
                self.layout.table.load(rows);
            }
            Fetched::SearchMatched {
                generation,
                query,
                matches,
            } => {
                if !self.table_job.is_current(generation) {
                    return;
                }
                self.table_job.phase = Some(LoadState::LoadingDetails);
                self.set_message(format!(
                    "{} matches for '{}', fetching prices...",
                    matches, query
                ));
            }
            Fetched::Details {
                generation,
                query,
                coins,
            } => {
                if !self.table_job.is_current(generation) {
                    tracing::debug!(generation, "dropping stale search result");
                    return;
                }
                self.table_job.finish();
                let rows = coin_rows(&coins);
                tracing::info!(rows = rows.len(), %query, "search loaded");
                self.set_message(format!("Found {} coins for '{}'", rows.len(), query));
                self.layout.table.load(rows);
            }
            Fetched::Chart {
                generation,
                coin_id,
                window,
                prices,
            } => {
                if !self.chart_job.is_current(generation) {
                    tracing::debug!(generation, %coin_id, "dropping stale chart");
                    return;
                }
                self.chart_job.finish();
                self.pending_chart = None;
                let points = price_points(&prices);
                if self.layout.chart.plot(&coin_id, points, window.title()) {
                    self.set_message(format!("{} {} chart", coin_id, window.label()));
                } else {
                    self.set_message(format!("No chart data for {}", coin_id));
                }
            }
            Fetched::Failed {
                generation,
                kind,
                reason,
            } => {
                let job = match kind {
                    JobKind::Table => &mut self.table_job,
                    JobKind::Chart => &mut self.chart_job,
                };
                if !job.is_current(generation) {
                    return;
                }
                job.finish();
                if kind == JobKind::Chart {
                    self.pending_chart = None;
                }
                tracing::warn!("{}", reason);
                self.set_message(reason);
            }
        }
        self.sync_status();
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::F(5) => self.load_top(),
            KeyCode::Char('t') if ctrl => self.load_top(),
            KeyCode::Char('w') if ctrl => self.cycle_window(),
            KeyCode::Tab | KeyCode::BackTab => match self.focus {
                Focus::Search => self.set_focus(Focus::Table),
                Focus::Table => self.set_focus(Focus::Search),
            },
            _ => match self.focus {
                Focus::Search => self.handle_search_key(key),
                Focus::Table => self.handle_table_key(key),
            },
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.search(),
            KeyCode::Down => self.set_focus(Focus::Table),
            KeyCode::Char(c) => self.layout.search.insert(c),
            KeyCode::Backspace => self.layout.search.backspace(),
            KeyCode::Delete => self.layout.search.delete(),
            KeyCode::Left => self.layout.search.move_left(),
            KeyCode::Right => self.layout.search.move_right(),
            KeyCode::Home => self.layout.search.move_home(),
            KeyCode::End => self.layout.search.move_end(),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.layout.table.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.layout.table.select_next(),
            KeyCode::Enter => {
                if let Some(row) = self.layout.table.selected() {
                    self.open_chart(row);
                }
            }
            KeyCode::Char('/') => self.set_focus(Focus::Search),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        let over_table = self.layout.table.contains(column, row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(button) = self.layout.search.button_at(column, row) {
                    match button {
                        Button::Search => self.search(),
                        Button::TopTen => self.load_top(),
                    }
                } else if self.layout.search.input_contains(column, row) {
                    self.set_focus(Focus::Search);
                } else if over_table {
                    self.set_focus(Focus::Table);
                    if let Some(index) = self.layout.table.row_at(column, row) {
                        self.click_row(index);
                    }
                }
            }
            MouseEventKind::ScrollDown if over_table => self.layout.table.select_next(),
            MouseEventKind::ScrollUp if over_table => self.layout.table.select_prev(),
            _ => {}
        }
    }

    /// Runs until the user quits. The top listing is requested on entry.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> std::io::Result<()> {
        let mut events = EventStream::new();
        self.load_top();

        while self.running {
            terminal.draw(|frame| self.layout.render(frame, frame.area()))?;

            let step = tokio::select! {
                Some(msg) = self.rx.recv() => Step::Fetched(msg),
                event = events.next() => Step::Input(event),
            };

            match step {
                Step::Fetched(msg) => self.handle_fetched(msg),
                Step::Input(Some(Ok(event))) => self.handle_event(event),
                Step::Input(Some(Err(err))) => return Err(err),
                Step::Input(None) => break,
            }
        }

        self.table_job.abort();
        self.chart_job.abort();
        self.pending_chart = None;
        Ok(())
    }
}
