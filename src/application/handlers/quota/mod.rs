//! Free-generation quota handlers.

mod consume;
mod metered;

pub use consume::{ConsumeQuotaHandler, GetQuotaHandler, RefundQuotaHandler};
pub use metered::MeteredGeneration;
