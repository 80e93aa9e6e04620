pub mod auth;
pub mod config;
pub mod feedback_client;
pub mod vapi_adapter;
