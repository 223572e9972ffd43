//! Request chain for network service connection requests
pub mod error;
pub mod logging;
pub mod mapserver;
pub mod mechanisms;
pub mod server;
pub mod stage;

pub use error::ChainError;
pub use logging::LoggingStage;
pub use mapserver::MapServer;
pub use mechanisms::MechanismsServer;
pub use server::new_server;
pub use stage::{Chain, Next, Stage};
