pub mod extract;
pub mod notify;
pub mod poller;
pub mod source;
pub mod store;
pub mod task;

pub use extract::TaskExtractor;
pub use notify::{LogNotifier, Notifier};
pub use poller::{PollOutcome, PollReport, Poller, PollerOptions};
pub use source::{ListingSource, TaskFetcher};
pub use store::{JsonFileStore, SeenIdSet, SeenStore};
pub use task::{TaskRecord, UpdateKind, resolve_link};
