pub mod app;
pub mod billing_scheduler;
pub mod config;
pub mod onepipe_client;
pub mod setup;
