//! Discord transport: gateway events, responders and the command API

pub mod api;
pub mod handler;
pub mod responder;

pub use api::DiscordCommandApi;
pub use handler::Handler;
pub use responder::{CommandResponder, ComponentResponder};
