pub mod data;
pub mod handlers;
pub mod recommender;
