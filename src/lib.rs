//! Shared-state primitives that stay correct when several threads touch them at once:
//! a counter that never loses an increment and a flag whose writes are always seen by pollers.

pub mod counter;
pub mod error;
pub mod flag;
pub mod scenario;
mod sync;


pub use counter::AtomicCounter;
pub use error::{Error, Result};
pub use flag::VisibleFlag;
