//! Render Pipeline
//!
//! This module connects the action wirer, the scheduler and the reconciler
//! into a mounted application.
//!
//! # Pipeline Architecture
//!
//! ```text
//! action call → store merge → request_render → (host tick) → view(state) → patch → lifecycle drain
//! ```
//!
//! ## Data Flow
//!
//! 1. **Wired actions** - Merge action results into the store, arm a render
//! 2. **Scheduler** - Runs at most one pass per host tick
//! 3. **Render pass** - Reads one state snapshot, resolves the view, patches
//!    the previous tree, then drains lifecycle hooks

pub mod mount;

// Re-exports
pub use mount::{mount, App, MountOptions};
