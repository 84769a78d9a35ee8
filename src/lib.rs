pub mod backends;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod orientation;
pub mod paths;
pub mod service;
pub mod shortcuts;
pub mod store;
