use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::permissions;
use crate::error::ApiError;

/// Capability gate for protected routes.
///
/// Runs after the JWT middleware; reads the caller's role from the injected
/// `AuthUser` and allows the request when the role carries at least one of
/// the required capability tags. Wire it per-route:
///
/// ```ignore
/// .route_layer(middleware::from_fn(|req, next| {
///     permission::require_any(&[permissions::LEAD_LABELS], req, next)
/// }))
/// ```
pub async fn require_any(
    required: &'static [&'static str],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<super::auth::AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required before permission check"))?;

    if !permissions::has_any(&auth_user.role, required) {
        tracing::warn!(
            "Permission denied: user '{}' with role '{}' lacks {:?}",
            auth_user.name,
            auth_user.role,
            required
        );
        return Err(ApiError::forbidden(
            "You do not have permission to perform this action",
        ));
    }

    Ok(next.run(request).await)
}
