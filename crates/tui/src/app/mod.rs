mod loader;
mod table;

use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::{Change, DateFilter, Debouncer, Store, SystemClock, TypeFilter, toggle_type};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    client::Client,
    config::AppConfig,
    error::{AppError, Result},
    local_state::FileStorage,
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

use loader::{LoadMessage, apply_load_result};
pub use table::TableSort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Table,
    Search,
    TypePicker,
    Detail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePicker {
    pub cursor: usize,
    pub selection: Vec<TypeFilter>,
}

impl TypePicker {
    pub fn current(&self) -> TypeFilter {
        TypeFilter::ALL[self.cursor.min(TypeFilter::ALL.len() - 1)]
    }

    fn toggle_current(&mut self) {
        let filter = self.current();
        let checked = !self.selection.contains(&filter);
        self.selection = toggle_type(&self.selection, filter, checked);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

/// Presentation state that never leaves the UI.
#[derive(Debug, Default)]
pub struct UiState {
    pub mode: Mode,
    pub show_help: bool,
    pub selected_row: usize,
    pub sort: TableSort,
    pub search_input: String,
    pub picker: TypePicker,
    pub detail_loading: bool,
    pub notice: Option<Notice>,
    pub last_refresh: Option<DateTime<Local>>,
    pub endpoint: String,
}

impl UiState {
    fn move_selection(&mut self, rows: usize, down: bool) {
        if rows == 0 {
            self.selected_row = 0;
            return;
        }
        self.selected_row = if down {
            (self.selected_row + 1).min(rows - 1)
        } else {
            self.selected_row.saturating_sub(1)
        };
    }
}

pub struct App {
    config: AppConfig,
    client: Client,
    pub store: Store<FileStorage>,
    pub ui: UiState,
    search: Debouncer<String>,
    results_tx: UnboundedSender<LoadMessage>,
    results_rx: UnboundedReceiver<LoadMessage>,
    generation: u64,
    rows_changed: Rc<Cell<bool>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url, config.retry_policy())?;
        let mut store = Store::builder(FileStorage::new(&config.state_path))
            .calendar(config.calendar()?)
            .clock(SystemClock)
            .build();

        let rows_changed = Rc::new(Cell::new(false));
        let flag = rows_changed.clone();
        store.subscribe(move |change, snapshot| {
            if matches!(
                change,
                Change::Transactions | Change::Criteria { .. } | Change::Derived
            ) {
                flag.set(true);
            }
            debug!(
                ?change,
                visible = snapshot.derived.transactions.len(),
                total = snapshot.derived.total_amount,
                "store changed"
            );
        });

        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let ui = UiState {
            search_input: store.criteria().search_term.clone(),
            endpoint: client.base_url().to_string(),
            ..UiState::default()
        };

        info!(
            base_url = %config.base_url,
            calendar = %store.calendar().name(),
            state = %store.storage().path().display(),
            criteria = ?store.criteria(),
            "dashboard starting"
        );

        Ok(Self {
            search: Debouncer::new(config.search_debounce()),
            config,
            client,
            store,
            ui,
            results_tx,
            results_rx,
            generation: 0,
            rows_changed,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = self.config.tick_rate();
        self.start_load();

        while !self.should_quit {
            self.tick(Instant::now());

            terminal
                .draw(|frame| ui::render(frame, &self.store, &self.ui))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(self.poll_timeout(tick_rate))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key, Instant::now());
                    }
                    _ => {}
                }
            }
            // Lets spawned requests make progress on this worker too.
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Wakes up early when a debounced search is due.
    fn poll_timeout(&self, tick_rate: Duration) -> Duration {
        self.search
            .deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .map_or(tick_rate, |until| until.min(tick_rate))
    }

    fn tick(&mut self, now: Instant) {
        while let Ok(message) = self.results_rx.try_recv() {
            self.handle_message(message);
        }

        if let Some(term) = self.search.poll(now) {
            self.apply_search(term);
        }

        if self.store.is_derived_stale() {
            info!("local date changed, refreshing derived state");
            self.store.refresh_derived();
        }

        if self.rows_changed.replace(false) {
            self.ui.selected_row = 0;
        }
    }

    fn start_load(&mut self) {
        self.generation += 1;
        info!(generation = self.generation, "loading transactions");
        self.store.set_loading(true);
        loader::spawn_fetch_all(self.client.clone(), self.generation, self.results_tx.clone());
    }

    fn handle_message(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::All { generation, result } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "dropping stale load");
                    return;
                }
                apply_load_result(&mut self.store, result);
                self.ui.last_refresh = Some(Local::now());
            }
            LoadMessage::One { id, result } => {
                let still_open = self
                    .store
                    .selected()
                    .is_some_and(|selected| selected.id == id);
                if !still_open {
                    return;
                }
                self.ui.detail_loading = false;
                match result {
                    Ok(transaction) => {
                        self.store.select_transaction(Some(transaction));
                        self.set_notice(NoticeLevel::Info, "Detalle actualizado.");
                    }
                    Err(err) => {
                        warn!(%id, status = ?err.status(), "refreshing transaction failed: {err}");
                        self.set_notice(NoticeLevel::Error, err.message().to_string());
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let action = map_key(key, self.ui.mode == Mode::Search);
        if action != AppAction::None {
            self.ui.notice = None;
        }

        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        if self.ui.show_help {
            if matches!(action, AppAction::Cancel | AppAction::Input('?')) {
                self.ui.show_help = false;
            }
            return;
        }

        match self.ui.mode {
            Mode::Table => self.handle_table(action),
            Mode::Search => self.handle_search(action, now),
            Mode::TypePicker => self.handle_picker(action),
            Mode::Detail => self.handle_detail(action),
        }
    }

    fn handle_table(&mut self, action: AppAction) {
        let rows = self.store.derived().transactions.len();
        match action {
            AppAction::Up => self.ui.move_selection(rows, false),
            AppAction::Down => self.ui.move_selection(rows, true),
            AppAction::Submit => self.open_detail(),
            AppAction::Input(ch) => match ch {
                'h' => self.store.set_date_filter(DateFilter::Today),
                'w' => self.store.set_date_filter(DateFilter::Week),
                'o' => self.store.set_date_filter(DateFilter::October),
                'f' => {
                    self.ui.picker = TypePicker {
                        cursor: 0,
                        selection: self.store.criteria().type_filter.clone(),
                    };
                    self.ui.mode = Mode::TypePicker;
                }
                '/' => {
                    self.ui.search_input = self.store.criteria().search_term.clone();
                    self.ui.mode = Mode::Search;
                }
                'x' => {
                    self.search.cancel();
                    self.ui.search_input.clear();
                    self.store.reset_filters();
                }
                'r' => self.start_load(),
                's' => self.ui.sort.cycle_column(),
                'S' => self.ui.sort.toggle_direction(),
                '?' => self.ui.show_help = true,
                _ => {}
            },
            AppAction::Cancel
            | AppAction::Backspace
            | AppAction::Quit
            | AppAction::None => {}
        }
    }

    fn handle_search(&mut self, action: AppAction, now: Instant) {
        match action {
            AppAction::Input(ch) => {
                self.ui.search_input.push(ch);
                self.search.push(self.ui.search_input.clone(), now);
            }
            AppAction::Backspace => {
                self.ui.search_input.pop();
                self.search.push(self.ui.search_input.clone(), now);
            }
            AppAction::Submit => {
                self.search.cancel();
                self.apply_search(self.ui.search_input.clone());
                self.ui.mode = Mode::Table;
            }
            AppAction::Cancel => {
                self.search.cancel();
                self.ui.search_input.clear();
                self.apply_search(String::new());
                self.ui.mode = Mode::Table;
            }
            AppAction::Up | AppAction::Down | AppAction::Quit | AppAction::None => {}
        }
    }

    fn apply_search(&mut self, term: String) {
        if term != self.store.criteria().search_term {
            self.store.set_search_term(term);
        }
    }

    fn handle_picker(&mut self, action: AppAction) {
        let last = TypeFilter::ALL.len() - 1;
        match action {
            AppAction::Up => self.ui.picker.cursor = self.ui.picker.cursor.saturating_sub(1),
            AppAction::Down => self.ui.picker.cursor = (self.ui.picker.cursor + 1).min(last),
            AppAction::Input(' ') => self.ui.picker.toggle_current(),
            AppAction::Submit => {
                let selection = std::mem::take(&mut self.ui.picker.selection);
                self.store.set_type_filter(selection);
                self.ui.mode = Mode::Table;
            }
            AppAction::Cancel => self.ui.mode = Mode::Table,
            AppAction::Input(_) | AppAction::Backspace | AppAction::Quit | AppAction::None => {}
        }
    }

    fn handle_detail(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel | AppAction::Input('b') => {
                self.store.clear_selection();
                self.ui.detail_loading = false;
                self.ui.mode = Mode::Table;
            }
            AppAction::Input('u') => self.refresh_detail(),
            _ => {}
        }
    }

    fn open_detail(&mut self) {
        let row = self
            .ui
            .sort
            .view(&self.store.derived().transactions)
            .get(self.ui.selected_row)
            .map(|tx| (*tx).clone());
        if let Some(transaction) = row {
            self.store.select_transaction(Some(transaction));
            self.ui.mode = Mode::Detail;
        }
    }

    fn refresh_detail(&mut self) {
        let Some(id) = self.store.selected().map(|tx| tx.id.clone()) else {
            return;
        };
        if self.ui.detail_loading {
            return;
        }
        self.ui.detail_loading = true;
        loader::spawn_fetch_one(self.client.clone(), id, self.results_tx.clone());
    }

    fn set_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.ui.notice = Some(Notice {
            message: message.into(),
            level,
        });
    }
}
