mod client;
mod events;

pub use interview_types as types;
pub use client::{connect, connect_with_config, Client, Config, ConfigBuilder, ServerRx};
pub use events::{parse_server_frame, ClientEvent};
