pub mod config;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod proxy;

pub use config::Config;
pub use pipeline::{Pipeline, RunSummary};
