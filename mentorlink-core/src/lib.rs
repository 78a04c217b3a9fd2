pub mod api;
pub mod collections;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod goals;
pub mod metrics;
pub mod models;
pub mod page;
pub mod source;
pub mod views;

pub use config::MentorlinkConfig;
pub use error::MentorlinkError;
pub use metrics::TimeRange;
pub use page::{guarded_load, PageState};
pub use source::{MemorySource, RecordSource, SessionQuery};
