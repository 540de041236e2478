use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_helpers::{
    ADMIN_ONLY, ADMINISTRATIVE, AllowedRoles, CurrentUser, MessageResponse, UuidPath,
    ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware, optional_jwt_auth_middleware, require_roles,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{
    CreateUser, LoginRequest, LoginResponse, UpdateProfile, UpdateUser, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        add_user,
        login,
        view_profile,
        update_profile,
        list_users,
        edit_user,
        delete_user,
    ),
    components(
        schemas(
            UserResponse,
            CreateUser,
            UpdateUser,
            UpdateProfile,
            LoginRequest,
            LoginResponse,
            MessageResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "Accounts, login and profiles")
    )
)]
pub struct ApiDoc;

/// Create the users router.
///
/// `/add` and `/login` are public (`/add` reads an optional bearer token so
/// admins can create privileged accounts); everything else needs a token,
/// and `/viewuser` and `/delete/{id}` additionally check the caller's role.
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let jwt = service.jwt_auth().clone();
    let shared_service = Arc::new(service);

    let administrative = Router::new()
        .route("/viewuser", get(list_users))
        .route_layer(from_fn_with_state(AllowedRoles(ADMINISTRATIVE), require_roles));

    let admin_only = Router::new()
        .route("/delete/{id}", delete(delete_user))
        .route_layer(from_fn_with_state(AllowedRoles(ADMIN_ONLY), require_roles));

    let authenticated = Router::new()
        .route("/viewprofile", get(view_profile))
        .route("/profile", put(update_profile))
        .route("/edit/{id}", put(edit_user))
        .merge(administrative)
        .merge(admin_only)
        .route_layer(from_fn_with_state(jwt.clone(), jwt_auth_middleware));

    Router::new()
        .route("/add", post(add_user))
        .route_layer(from_fn_with_state(jwt, optional_jwt_auth_middleware))
        .route("/login", post(login))
        .merge(authenticated)
        .with_state(shared_service)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/add",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    caller: Option<CurrentUser>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service
        .add_user(input, caller.as_ref().map(|CurrentUser(claims)| claims))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange username and password for an access token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<LoginResponse>> {
    let response = service.login(input).await?;
    Ok(Json(response))
}

/// The caller's own account
#[utoipa::path(
    get,
    path = "/viewprofile",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn view_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentUser(claims): CurrentUser,
) -> UserResult<Json<UserResponse>> {
    let user = service.view_profile(&claims).await?;
    Ok(Json(user))
}

/// Update the caller's name, email or username
#[utoipa::path(
    put,
    path = "/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentUser(claims): CurrentUser,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_profile(&claims, input).await?;
    Ok(Json(user))
}

/// List every user, newest first
#[utoipa::path(
    get,
    path = "/viewuser",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentUser(claims): CurrentUser,
) -> UserResult<Json<Vec<UserResponse>>> {
    let users = service.list_users(&claims).await?;
    Ok(Json(users))
}

/// Partially update a user
#[utoipa::path(
    put,
    path = "/edit/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn edit_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentUser(claims): CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = service.edit_user(id, input, &claims).await?;
    Ok(Json(user))
}

/// Delete a user (admins cannot be deleted)
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<MessageResponse>> {
    service.delete_user(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
