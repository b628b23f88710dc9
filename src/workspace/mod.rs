//! Workspace Module
//!
//! Asset discovery and folder management for a library rooted at one
//! directory. The browser shell talks to [`AssetLibrary`]; the scanner and
//! folder helpers are exposed for hosts that only need one of the pieces.

mod folders;
mod library;
mod scanner;

pub use folders::*;
pub use library::*;
pub use scanner::*;
