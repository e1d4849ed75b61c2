pub mod fund_flow;
pub mod listing;

pub use fund_flow::{FundFlowIngestor, FUND_FLOW_CADENCE};
pub use listing::{ListingIngestor, LISTING_CADENCE};
