mod atomic;
mod basic;
mod hi;
mod interface;
mod lock;
mod mutex;
mod stamp;
mod stamped;

pub use atomic::*;
pub use basic::*;
pub use interface::*;
pub use lock::*;
pub use stamped::*;

/// How many optimistic attempts the two-phase strategies make before falling
/// back to the exclusive section.
pub const DEFAULT_MAX_OPTIMISTIC_ATTEMPTS: u32 = 4;
