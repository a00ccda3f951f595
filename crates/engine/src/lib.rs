//! Filtering and state core of the transactions dashboard.
//!
//! The crate is synchronous and free of I/O apart from the pluggable
//! [`KeyValueStore`] used to remember the filter selection.

pub use calendar::{Calendar, Clock, FixedClock, SystemClock};
pub use criteria::{DateFilter, FilterCriteria, TypeFilter, is_unrestricted, toggle_type};
pub use debounce::Debouncer;
pub use error::{CalendarError, CriteriaError, StorageError};
pub use money::Pesos;
pub use stats::{TransactionStats, compute_stats};
pub use storage::{KeyValueStore, MemoryStorage};
pub use store::{
    Change, DerivedState, FILTERS_STORAGE_KEY, LoadState, Snapshot, Store, StoreBuilder,
    SubscriptionId,
};

pub mod filters;

mod calendar;
mod criteria;
mod debounce;
mod error;
mod money;
mod stats;
mod storage;
mod store;
