pub mod conversations;
pub mod models;
pub mod service;
