pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod home;
pub mod profile;
pub mod runner;
pub mod session;
pub mod store;
