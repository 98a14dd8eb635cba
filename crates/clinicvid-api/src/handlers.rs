//! Request handlers.

pub mod bundles;
pub mod events;
pub mod health;

pub use bundles::*;
pub use events::*;
pub use health::*;
