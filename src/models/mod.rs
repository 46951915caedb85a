pub mod common;
pub mod promotion;

pub use common::*;
pub use promotion::*;
