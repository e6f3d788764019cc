pub mod cache;
pub mod candidate_store;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod discovery;
pub mod history;
pub mod logging;
pub mod matching;
pub mod model;
pub mod query;
pub mod runtime;
pub mod search;
pub mod session;
pub mod unicode;
