mod base;
mod interface;

pub use base::Parser;
