use axum::extract::Extension;
use serde_json::{json, Value};

use crate::auth::permissions;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

/// GET /api/auth/whoami - Current user and the capability set their role
/// resolves to
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "id": auth_user.user_id,
        "name": auth_user.name,
        "role": auth_user.role,
        "capabilities": permissions::capabilities_for(&auth_user.role),
    })))
}
