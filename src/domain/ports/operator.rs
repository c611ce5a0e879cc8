use async_trait::async_trait;

use crate::domain::models::{Decision, PendingConfirmation};

/// The human reviewing writer directives.
///
/// `review` may take arbitrarily long; there is no timeout and no default
/// verdict.
#[async_trait]
pub trait Operator: Send + Sync {
    async fn review(&self, pending: &PendingConfirmation) -> Decision;
}
