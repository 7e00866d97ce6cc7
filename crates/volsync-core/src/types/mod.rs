//! Value types shared by the resolver, selector, runner and loop.

mod peer;
mod process;
mod strategy;
mod task;

pub use peer::*;
pub use process::*;
pub use strategy::*;
pub use task::*;
