use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::market_data::client::MarketApi;
use crate::market_data::poller::{MarketEvent, spawn_poller};
use crate::market_data::types::{Category, Item, MarketSnapshot};
use crate::state::snapshot_cache::SnapshotCache;
use crate::state::view::{ViewState, filter_items};
use crate::ui;

/// Poller→UI channel buffer. A handful of slots is plenty: at most one
/// event per refresh tick.
const EVENT_CHANNEL_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    Quit,
    /// Tear the data path down and start it fresh (error-screen retry).
    Retry,
}

pub struct App {
    pub screen: Screen,
    pub snapshot: Option<MarketSnapshot>,
    pub view: ViewState,
    /// Set while the data on screen is older than the last refresh attempt.
    pub stale_error: Option<String>,
    cache: SnapshotCache,
}

impl App {
    /// Seeds the UI from the cache so a previous session's snapshot is
    /// visible before the first network round-trip completes.
    pub fn new(cache: SnapshotCache) -> Self {
        let snapshot = cache.load();
        let screen = if snapshot.is_some() {
            info!("seeded view from cached snapshot");
            Screen::Ready
        } else {
            Screen::Loading
        };
        Self {
            screen,
            snapshot,
            view: ViewState::default(),
            stale_error: None,
            cache,
        }
    }

    pub fn apply_event(&mut self, event: MarketEvent) {
        match event {
            MarketEvent::Snapshot(snapshot) => {
                // Cache failures must never take the dashboard down.
                if let Err(err) = self.cache.save(&snapshot) {
                    warn!(error = %err, "failed to persist snapshot cache");
                }
                self.snapshot = Some(snapshot);
                self.screen = Screen::Ready;
                self.stale_error = None;
            }
            MarketEvent::InitialFetchFailed(reason) => {
                if self.snapshot.is_some() {
                    // Cached data stays on screen; just mark it stale.
                    self.stale_error = Some(reason);
                    self.screen = Screen::Ready;
                } else {
                    self.screen = Screen::Error(reason);
                }
            }
            MarketEvent::RefreshFailed(reason) => {
                self.stale_error = Some(reason);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match &self.screen {
            Screen::Error(_) => match key.code {
                KeyCode::Char('r') => return Action::Retry,
                KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
                _ => return Action::None,
            },
            Screen::Loading => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    return Action::Quit;
                }
                return Action::None;
            }
            Screen::Ready => {}
        }

        // Detail overlay swallows everything until it is closed.
        if self.view.detail.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.view.detail = None;
            }
            return Action::None;
        }

        if self.view.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.view.search_active = false,
                KeyCode::Backspace => {
                    self.view.search.pop();
                }
                KeyCode::Char(c) => self.view.search.push(c),
                _ => {}
            }
            return Action::None;
        }

        let visible_len = self.visible_len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('/') => self.view.search_active = true,
            KeyCode::Tab | KeyCode::Right => self.view.category = self.view.category.next(),
            KeyCode::BackTab | KeyCode::Left => self.view.category = self.view.category.prev(),
            KeyCode::Char('1') => self.view.category = Category::All,
            KeyCode::Char('2') => self.view.category = Category::Gold,
            KeyCode::Char('3') => self.view.category = Category::Currency,
            KeyCode::Char('4') => self.view.category = Category::Crypto,
            KeyCode::Down | KeyCode::Char('j') => self.view.move_cursor(1, visible_len),
            KeyCode::Up | KeyCode::Char('k') => self.view.move_cursor(-1, visible_len),
            KeyCode::Enter => {
                if let Some(item) = self.selected_item() {
                    self.view.detail = Some(item);
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(item) = self.selected_item() {
                    self.view.toggle_compare(&item);
                }
            }
            _ => {}
        }
        Action::None
    }

    fn visible_len(&self) -> usize {
        self.snapshot
            .as_ref()
            .map(|s| filter_items(s, self.view.category, &self.view.search).len())
            .unwrap_or(0)
    }

    fn selected_item(&self) -> Option<Item> {
        let snapshot = self.snapshot.as_ref()?;
        let items = filter_items(snapshot, self.view.category, &self.view.search);
        items.get(self.view.cursor).map(|item| (*item).clone())
    }
}

/// Main UI loop: redraw, then wait on either a terminal event or a poller
/// event. The poller handle is owned here and aborted on retry and on exit,
/// so no background fetch ever outlives the view.
pub async fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: Arc<dyn MarketApi>,
    refresh_interval: Duration,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
    let mut poller = spawn_poller(api.clone(), refresh_interval, tx.clone());
    let mut events = EventStream::new();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match app.handle_key(key) {
                            Action::Quit => break,
                            Action::Retry => {
                                // Release the old data path before starting
                                // a fresh one.
                                poller.abort();
                                app.screen = Screen::Loading;
                                app.stale_error = None;
                                poller = spawn_poller(api.clone(), refresh_interval, tx.clone());
                            }
                            Action::None => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        poller.abort();
                        return Err(err.into());
                    }
                    None => break,
                }
            }
            Some(event) = rx.recv() => app.apply_event(event),
        }
    }

    poller.abort();
    Ok(())
}
