use async_trait::async_trait;

use crate::domain::errors::BackendResult;
use crate::domain::models::{EntityKind, ResolutionContext, ResolutionMatch};

/// Port for the fuzzy name-resolution endpoints.
///
/// Implementations return the backend's best candidate as-is; the
/// confidence threshold is applied by the caller.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn lookup(
        &self,
        entity: EntityKind,
        name: &str,
        context: &ResolutionContext,
    ) -> BackendResult<Option<ResolutionMatch>>;
}
