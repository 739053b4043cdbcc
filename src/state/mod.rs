//! State Module - Persistent application state
//!
//! - **Value** - Dynamic state values with reference-counted maps and lists
//! - **Path** - Namespace paths into nested maps
//! - **Store** - The single snapshot slot, replaced on every write
//!
//! Writes never mutate a snapshot in place. A render pass that cloned the
//! snapshot keeps reading a consistent tree for its whole duration.

mod path;
mod store;
mod value;

pub use path::*;
pub use store::*;
pub use value::*;
