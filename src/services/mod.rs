pub mod metrics;
pub mod players;
pub mod stats;
