#![doc = include_str!("../README.md")]

mod error;
mod generator;
mod id;
mod paginate;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::paginate::*;
pub use crate::time::*;
