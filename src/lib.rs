pub mod app;
pub mod assembly;
pub mod config;
pub mod discovery;
pub mod listing;
pub mod site;
pub mod tmdb;
pub mod view;
