pub mod analysis;
pub mod api;
pub mod data_collector;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod universe;
pub mod utils;
