pub mod attachment;
pub mod condensation;
pub mod prompts;
pub mod retry;
pub mod tier_router;

pub use condensation::{condense, CondensationPolicy, CondensedInput};
pub use retry::{with_backoff, RetryPolicy};
pub use tier_router::{run_tiered, Routed, TierPlan};
