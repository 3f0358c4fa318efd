//! IRC message types and their wire format.

mod parse;
mod serialize;
pub mod tags;
mod types;

pub use self::types::{Message, Tag};
