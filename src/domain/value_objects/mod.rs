pub mod limits;
pub mod store_key;

pub use limits::{RAW_SAMPLE_TTL, REPORTED_WINDOW_SIZE, WINDOW_SIZE, Z_SCORE_THRESHOLD};
pub use store_key::StoreKey;
