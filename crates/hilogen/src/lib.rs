mod config;
mod error;
mod generator;
mod id_generator;
mod layout;
mod source;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id_generator::*;
pub use crate::layout::*;
pub use crate::source::*;
