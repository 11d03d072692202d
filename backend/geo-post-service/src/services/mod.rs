/// Business logic layer
pub mod search;

pub use search::{
    SearchCoordinator, SearchOutcome, SearchPath, SearchSettings, StoreHealth,
    DEFAULT_QUERY_TIMEOUT, DEFAULT_RADIUS_KM, DEFAULT_SCAN_BATCH_SIZE,
};
