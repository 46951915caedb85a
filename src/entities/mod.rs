pub mod partners;
pub mod prizes;
pub mod promotions;
pub mod winnings;

pub use partners as partner_entity;
pub use prizes as prize_entity;
pub use promotions as promotion_entity;
pub use winnings as winning_entity;
