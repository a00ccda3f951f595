//! The single source of truth of the dashboard.
//!
//! [`Store`] owns the raw transactions, the filter criteria, the derived
//! (filtered) state, the load state and the selection. Every setter performs
//! its whole update, including the recompute of the derived state, before
//! observers are called, so subscribers never see a half-applied change. Each
//! setter call produces exactly one notification.

use std::fmt;

use api_types::transaction::Transaction;
use chrono::NaiveDate;

use crate::{
    calendar::{Calendar, Clock, SystemClock},
    criteria::{DateFilter, FilterCriteria, TypeFilter},
    filters,
    stats::{TransactionStats, compute_stats},
    storage::KeyValueStore,
};

/// Storage key holding the JSON-serialized [`FilterCriteria`].
pub const FILTERS_STORAGE_KEY: &str = "transactions.filters";

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Transactions,
    /// `recomputed` is `false` while there are no raw transactions.
    Criteria { recomputed: bool },
    LoadState,
    Selection,
    /// Derived state refreshed without any input change (day rollover).
    Derived,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedState {
    pub transactions: Vec<Transaction>,
    pub total_amount: f64,
    pub stats: TransactionStats,
}

impl DerivedState {
    pub fn from_filtered(transactions: Vec<Transaction>) -> Self {
        let stats = compute_stats(&transactions);
        Self {
            total_amount: stats.total_amount,
            transactions,
            stats,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Read-only view of the store handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub transactions: &'a [Transaction],
    pub criteria: &'a FilterCriteria,
    pub derived: &'a DerivedState,
    pub load: &'a LoadState,
    pub selected: Option<&'a Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Change, &Snapshot<'_>)>;

pub struct Store<S> {
    storage: S,
    calendar: Calendar,
    clock: Box<dyn Clock>,
    transactions: Vec<Transaction>,
    criteria: FilterCriteria,
    derived: DerivedState,
    /// Local date the derived state was computed for.
    derived_day: Option<NaiveDate>,
    load: LoadState,
    selected: Option<Transaction>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> Store<S> {
    /// Return a builder for `Store`. The storage is the only required part.
    pub fn builder(storage: S) -> StoreBuilder<S> {
        StoreBuilder {
            storage,
            calendar: Calendar::default(),
            clock: None,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn selected(&self) -> Option<&Transaction> {
        self.selected.as_ref()
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            transactions: &self.transactions,
            criteria: &self.criteria,
            derived: &self.derived,
            load: &self.load,
            selected: self.selected.as_ref(),
        }
    }

    /// Registers an observer called after every mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Change, &Snapshot<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Replaces the raw transactions after a successful load.
    pub fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.recompute();
        self.load = LoadState::default();
        self.notify(Change::Transactions);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.load.loading = loading;
        self.notify(Change::LoadState);
    }

    /// Sets or clears the error. Always ends the loading phase.
    pub fn set_error(&mut self, error: Option<String>) {
        self.load.error = error;
        self.load.loading = false;
        self.notify(Change::LoadState);
    }

    pub fn set_date_filter(&mut self, filter: DateFilter) {
        self.update_criteria(|criteria| criteria.date_filter = filter);
    }

    pub fn set_type_filter(&mut self, types: Vec<TypeFilter>) {
        self.update_criteria(|criteria| criteria.type_filter = types);
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.update_criteria(|criteria| criteria.search_term = term);
    }

    pub fn reset_filters(&mut self) {
        self.update_criteria(|criteria| *criteria = FilterCriteria::default());
    }

    pub fn select_transaction(&mut self, transaction: Option<Transaction>) {
        self.selected = transaction;
        self.notify(Change::Selection);
    }

    pub fn clear_selection(&mut self) {
        self.select_transaction(None);
    }

    /// `true` when the local day moved on since the derived state was built.
    pub fn is_derived_stale(&self) -> bool {
        match self.derived_day {
            Some(day) => day != self.calendar.today(self.clock.now()),
            None => false,
        }
    }

    /// Recomputes against the current clock (e.g. after midnight).
    pub fn refresh_derived(&mut self) {
        self.recompute();
        self.notify(Change::Derived);
    }

    fn update_criteria<F>(&mut self, update: F)
    where
        F: FnOnce(&mut FilterCriteria),
    {
        update(&mut self.criteria);
        self.persist_criteria();
        let recomputed = self.recompute();
        self.notify(Change::Criteria { recomputed });
    }

    /// Rebuilds the derived state in one assignment. Skipped (left empty)
    /// when there are no raw transactions.
    fn recompute(&mut self) -> bool {
        if self.transactions.is_empty() {
            self.derived = DerivedState::default();
            self.derived_day = None;
            return false;
        }

        let now = self.clock.now();
        let filtered = filters::apply(&self.transactions, &self.criteria, &self.calendar, now);
        self.derived = DerivedState::from_filtered(filtered);
        self.derived_day = Some(self.calendar.today(now));
        tracing::debug!(
            raw = self.transactions.len(),
            filtered = self.derived.transactions.len(),
            "derived state recomputed"
        );
        true
    }

    fn persist_criteria(&mut self) {
        let payload = match serde_json::to_string(&self.criteria) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("failed to serialize filters: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.set(FILTERS_STORAGE_KEY, &payload) {
            tracing::warn!("failed to persist filters: {err}");
        }
    }

    fn notify(&mut self, change: Change) {
        tracing::debug!(?change, "store changed");
        let snapshot = Snapshot {
            transactions: &self.transactions,
            criteria: &self.criteria,
            derived: &self.derived,
            load: &self.load,
            selected: self.selected.as_ref(),
        };
        for (_, observer) in self.observers.iter_mut() {
            observer(&change, &snapshot);
        }
    }
}

impl<S> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("calendar", &self.calendar)
            .field("transactions", &self.transactions.len())
            .field("criteria", &self.criteria)
            .field("filtered", &self.derived.transactions.len())
            .field("load", &self.load)
            .field("selected", &self.selected.as_ref().map(|tx| tx.id.as_str()))
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

pub struct StoreBuilder<S> {
    storage: S,
    calendar: Calendar,
    clock: Option<Box<dyn Clock>>,
}

impl<S: KeyValueStore> StoreBuilder<S> {
    /// Zone used for day and month boundaries. Defaults to the host zone.
    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Defaults to the system clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Construct `Store`, restoring the persisted criteria.
    pub fn build(self) -> Store<S> {
        let criteria = restore_criteria(&self.storage);
        Store {
            storage: self.storage,
            calendar: self.calendar,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            transactions: Vec::new(),
            criteria,
            derived: DerivedState::default(),
            derived_day: None,
            load: LoadState::default(),
            selected: None,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }
}

/// Reads the saved criteria. Any failure yields the defaults.
fn restore_criteria<S: KeyValueStore>(storage: &S) -> FilterCriteria {
    let raw = match storage.get(FILTERS_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return FilterCriteria::default(),
        Err(err) => {
            tracing::warn!("failed to read saved filters: {err}");
            return FilterCriteria::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(criteria) => criteria,
        Err(err) => {
            tracing::warn!("ignoring malformed saved filters: {err}");
            FilterCriteria::default()
        }
    }
}
