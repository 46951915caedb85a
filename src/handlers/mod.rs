pub mod promotion;

pub use promotion::promotion_config;
