pub mod contract;
pub mod engine;
pub mod error;
pub mod execute;
pub mod msg;
pub mod query;
pub mod scheduler;
pub mod state;
