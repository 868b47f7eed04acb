pub mod ai;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod resource;
pub mod scope;
