pub mod load;
pub mod types;

pub use load::{load_listing, load_market};
pub use types::{ListingData, MarketSnapshot, ResponseTime, SubRatings};
