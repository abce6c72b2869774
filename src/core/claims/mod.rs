pub mod claim_set;

pub use claim_set::{Claim, ClaimSet};
