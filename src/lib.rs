pub mod cli;
pub mod client;
pub mod context;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod login;
pub mod resource;
pub mod shell;
pub mod storage;
pub mod workbench;
