use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use axum_helpers::{
    ADMINISTRATIVE, AllowedRoles, JwtAuth, MessageResponse, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware, require_roles,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::models::{
    CartItem, CreateOrder, Order, OrderFilter, OrderStatus, StatusUpdate, UpdateOrder,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

/// OpenAPI documentation for Orders API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_orders,
        create_order,
        get_order,
        update_order,
        set_status,
        delete_order,
    ),
    components(
        schemas(
            Order,
            CartItem,
            OrderStatus,
            CreateOrder,
            UpdateOrder,
            StatusUpdate,
            OrderFilter,
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
        (name = "Orders", description = "Order placement and lifecycle")
    )
)]
pub struct ApiDoc;

/// Who may list and fetch orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadAccess {
    /// Anyone, no token needed
    Public,
    /// Bearer token with an administrative role
    #[default]
    Administrative,
}

impl ReadAccess {
    pub fn from_public_flag(public: bool) -> Self {
        if public { Self::Public } else { Self::Administrative }
    }
}

/// Create the orders router.
///
/// Placing an order is public; changing or deleting one needs an
/// administrative caller. Reads follow `read_access`.
pub fn router<R: OrderRepository + 'static>(
    service: OrderService<R>,
    jwt: JwtAuth,
    read_access: ReadAccess,
) -> Router {
    let shared_service = Arc::new(service);

    let writes = Router::new()
        .route("/{id}", put(update_order).delete(delete_order))
        .route("/{id}/status", patch(set_status))
        .route_layer(from_fn_with_state(AllowedRoles(ADMINISTRATIVE), require_roles))
        .route_layer(from_fn_with_state(jwt.clone(), jwt_auth_middleware));

    let reads = Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order));
    let reads = match read_access {
        ReadAccess::Public => reads,
        ReadAccess::Administrative => reads
            .route_layer(from_fn_with_state(AllowedRoles(ADMINISTRATIVE), require_roles))
            .route_layer(from_fn_with_state(jwt, jwt_auth_middleware)),
    };

    Router::new()
        .route("/", post(create_order))
        .merge(reads)
        .merge(writes)
        .with_state(shared_service)
}

/// List orders, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Orders",
    params(OrderFilter),
    security((), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of orders", body = Vec<Order>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Query(filter): Query<OrderFilter>,
) -> OrderResult<Json<Vec<Order>>> {
    let orders = service.list_orders(filter).await?;
    Ok(Json(orders))
}

/// Place a new order
#[utoipa::path(
    post,
    path = "",
    tag = "Orders",
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order created with status pending", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> OrderResult<impl IntoResponse> {
    let order = service.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Orders",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<Order>> {
    let order = service.get_order(id).await?;
    Ok(Json(order))
}

/// Replace an order
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrder,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateOrder>,
) -> OrderResult<Json<Order>> {
    let order = service.update_order(id, input).await?;
    Ok(Json(order))
}

/// Change an order's status
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_status<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<StatusUpdate>,
) -> OrderResult<Json<Order>> {
    let order = service.apply_status_update(id, input).await?;
    Ok(Json(order))
}

/// Delete an order
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<MessageResponse>> {
    service.delete_order(id).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
