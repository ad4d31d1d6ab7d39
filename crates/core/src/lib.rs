#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod model;
pub mod rank;
pub mod text;
pub mod time;

pub use error::Error;
pub use time::Clock;
