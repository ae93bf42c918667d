pub mod idempotency;

pub use idempotency::{RewardSource, manual_grant_key, point_earn_key};
