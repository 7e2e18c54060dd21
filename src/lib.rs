pub mod config;
pub mod error;
pub mod http;
pub mod node;
pub mod registration;
pub mod shutdown;
pub mod store;
pub mod worker;
