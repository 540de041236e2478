use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ADMINISTRATIVE, AllowedRoles, JwtAuth, MessageResponse, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware, require_roles,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ContactResult;
use crate::models::{ContactMessage, CreateContact, ReplyContact};
use crate::repository::ContactRepository;
use crate::service::ContactService;

/// OpenAPI documentation for Contacts API
#[derive(OpenApi)]
#[openapi(
    paths(submit_contact, list_contacts, get_contact, reply_contact, delete_contact),
    components(
        schemas(ContactMessage, CreateContact, ReplyContact, MessageResponse),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Contacts", description = "Contact form messages and replies")
    )
)]
pub struct ApiDoc;

/// Create the contacts router. Submitting is public, the rest is staff-only.
pub fn router<R: ContactRepository + 'static>(service: ContactService<R>, jwt: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let staff = Router::new()
        .route("/", get(list_contacts))
        .route("/{id}", get(get_contact).delete(delete_contact))
        .route("/reply/{id}", post(reply_contact))
        .route_layer(from_fn_with_state(AllowedRoles(ADMINISTRATIVE), require_roles))
        .route_layer(from_fn_with_state(jwt, jwt_auth_middleware));

    Router::new()
        .route("/", post(submit_contact))
        .merge(staff)
        .with_state(shared_service)
}

/// Submit the contact form
#[utoipa::path(
    post,
    path = "",
    tag = "Contacts",
    request_body = CreateContact,
    responses(
        (status = 201, description = "Message stored", body = ContactMessage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateContact>,
) -> ContactResult<impl IntoResponse> {
    let message = service.submit(input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// List contact messages, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All contact messages", body = Vec<ContactMessage>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_contacts<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
) -> ContactResult<Json<Vec<ContactMessage>>> {
    let messages = service.list().await?;
    Ok(Json(messages))
}

/// Get a contact message by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    responses(
        (status = 200, description = "Contact message", body = ContactMessage),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    UuidPath(id): UuidPath,
) -> ContactResult<Json<ContactMessage>> {
    let message = service.get(id).await?;
    Ok(Json(message))
}

/// Reply to a contact message
#[utoipa::path(
    post,
    path = "/reply/{id}",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    request_body = ReplyContact,
    responses(
        (status = 200, description = "Reply stored", body = ContactMessage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reply_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<ReplyContact>,
) -> ContactResult<Json<ContactMessage>> {
    let message = service.reply(id, input).await?;
    Ok(Json(message))
}

/// Delete a contact message
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    responses(
        (status = 200, description = "Message deleted", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    UuidPath(id): UuidPath,
) -> ContactResult<Json<MessageResponse>> {
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Contact message deleted successfully")))
}
