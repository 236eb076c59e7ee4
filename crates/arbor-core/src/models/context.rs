//! Tenant context threaded into every directory call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The acting tenant and user, as resolved by the calling layer.
///
/// The directory treats `tenant_id` as ground truth: every store access
/// is scoped by it and every created node is stamped with it. Nothing in
/// a caller's payload can override it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
}

impl TenantContext {
    pub fn new(tenant_id: Uuid, actor_id: Uuid) -> Self {
        Self {
            tenant_id,
            actor_id,
        }
    }
}
