pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod predictor;
pub mod preprocess;
pub mod upload;
