pub mod buyer;

pub use buyer::Buyer;
