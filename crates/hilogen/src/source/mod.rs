mod in_memory;
mod interface;
mod sleeper;

pub use in_memory::*;
pub use interface::*;
pub use sleeper::*;
