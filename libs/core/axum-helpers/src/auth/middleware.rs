use super::{
    gate::{AllowedRoles, AuthError, authorize},
    jwt::{JwtAuth, JwtClaims, TokenError},
};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Require a valid bearer token and store its [`JwtClaims`] in the request
/// extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!("No bearer token in Authorization header");
        return Err(AuthError::Unauthenticated("No token provided".into()).into());
    };

    let claims = auth.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "JWT verification failed");
        let message = match e {
            TokenError::Expired => "Token expired",
            _ => "Invalid token",
        };
        AppError::from(AuthError::Unauthenticated(message.into()))
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Attach claims when a valid token is present; never rejects.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = bearer_token(request.headers()).and_then(|token| auth.verify(token).ok());
    if let Some(claims) = claims {
        request.extensions_mut().insert(claims);
    }

    next.run(request).await
}

/// Reject callers whose role is not in the router's [`AllowedRoles`].
///
/// Must run after [`jwt_auth_middleware`].
pub async fn require_roles(
    State(AllowedRoles(allowed)): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<JwtClaims>()
        .ok_or_else(|| AuthError::Unauthenticated("Authentication required".into()))?;

    authorize(claims, allowed).inspect_err(|_| {
        tracing::info!(
            user = %claims.sub,
            role = %claims.role,
            "Role not permitted for route"
        );
    })?;

    Ok(next.run(request).await)
}

/// Claims of the authenticated caller.
///
/// Extracting `CurrentUser` fails with 401 unless an auth middleware stored
/// claims; `Option<CurrentUser>` never fails.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub JwtClaims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AuthError::Unauthenticated("Authentication required".into()).into())
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<JwtClaims>().cloned().map(CurrentUser))
    }
}
