//! Sync core business logic

pub mod dispatcher;
pub mod normalizer;
pub mod reconciler;

pub use dispatcher::{DEFAULT_BATCH_SIZE, DispatchSettings, Dispatcher, partition};
pub use normalizer::{CurrencySource, FieldMapping, normalize_remote_entry, parse_amount};
pub use reconciler::{reconcile, reconcile_keyed, reconcile_positional};
