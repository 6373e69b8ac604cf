pub mod board;
pub mod handlers;
pub mod matcher;
pub mod store;
