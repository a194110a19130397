//! Parser module for Minilang.

mod core;
mod expressions;


pub use self::core::Parser;
