#![forbid(unsafe_code)]

pub mod assessment;
pub mod classifier;
pub mod error;
pub mod gate;
pub mod interaction;
pub mod model;
pub mod progression;
pub mod query;
pub mod resolver;
pub mod time;

pub use classifier::classify;
pub use error::Error;
pub use time::Clock;
