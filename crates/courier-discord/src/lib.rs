pub mod adapter;
pub mod context;
pub mod embed;
pub mod error;
pub mod handler;
pub mod replies;
pub mod send;

pub use adapter::DiscordAdapter;
pub use context::{Service, TextMessage};
pub use error::DiscordError;
pub use send::Outbound;
