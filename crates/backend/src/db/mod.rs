//! Database operations for the backend using tokio-postgres

mod error;
mod schema;
mod players;
mod sessions;
mod promotions;
mod adjustments;
mod stats;
mod display;

// Re-export everything
pub use error::*;
pub use schema::*;
pub use players::*;
pub use sessions::*;
pub use promotions::*;
pub use adjustments::*;
pub use stats::*;
pub use display::*;
