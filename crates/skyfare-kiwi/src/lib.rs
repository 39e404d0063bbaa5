pub mod client;
pub mod error;
pub mod normalize;
pub mod query;
pub mod types;

pub use client::KiwiClient;
pub use error::KiwiError;
pub use normalize::{normalize_offers, NormalizedLeg, NormalizedOffer};
pub use query::{kiwi_date, search_params};
