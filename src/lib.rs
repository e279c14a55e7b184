pub mod config;
pub mod pipeline;
pub mod sensor;
pub mod snapshot;
pub mod speech;
pub mod types;
