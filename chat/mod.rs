pub mod hub;

pub use hub::{HubStats, LocationKey, RouteChatHub, Snapshot};
