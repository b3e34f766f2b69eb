use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for cache invalidation. Without a pattern the whole
/// course catalog is invalidated.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invalidate-cache-request.ts"
)]
pub struct InvalidateCacheRequest {
    pub pattern: Option<String>,
}

/// Result of a cache invalidation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invalidate-cache-response.ts"
)]
pub struct InvalidateCacheResponse {
    pub patterns: Vec<String>,
    pub removed: u64,
}
