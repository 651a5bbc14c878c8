pub mod store;

pub use store::{AppState, StoredZone, ZoneSummary};
