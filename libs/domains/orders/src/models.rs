use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Order status. Any status may follow any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartItem {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
}

/// Order entity - stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Customer name
    pub name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub address: String,
    pub cart_items: Vec<CartItem>,
    /// Not checked against the cart lines
    #[schema(value_type = String, example = "39.98")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    /// Bumped on every write
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for placing an order. New orders are always `pending`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrder {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 30))]
    pub phone1: String,
    #[validate(length(max = 30))]
    pub phone2: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, message = "An order needs at least one cart item"), nested)]
    pub cart_items: Vec<CartItem>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = String, example = "39.98")]
    pub total_amount: Decimal,
}

/// DTO for replacing an order.
///
/// When `version` is sent it must match the stored version.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateOrder {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 30))]
    pub phone1: String,
    #[validate(length(max = 30))]
    pub phone2: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, message = "An order needs at least one cart item"), nested)]
    pub cart_items: Vec<CartItem>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = String, example = "39.98")]
    pub total_amount: Decimal,
    /// Keeps the stored status when absent
    pub status: Option<OrderStatus>,
    pub version: Option<i64>,
}

/// Body of `PATCH /{id}/status`.
///
/// The status stays a string so an unknown value is a 400 rather than a
/// body-deserialization failure.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct StatusUpdate {
    #[validate(length(min = 1))]
    #[schema(example = "completed")]
    pub status: String,
}

/// Query filters for listing orders
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
}

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 500;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("Amount must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn optional_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Order {
    pub fn new(input: CreateOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            phone1: input.phone1.trim().to_string(),
            phone2: optional_trimmed(input.phone2),
            address: input.address.trim().to_string(),
            cart_items: input.cart_items,
            total_amount: input.total_amount,
            status: OrderStatus::Pending,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every caller-editable field. `id`, `version` and
    /// `created_at` are kept.
    pub fn replace_with(&mut self, input: UpdateOrder) {
        self.name = input.name.trim().to_string();
        self.phone1 = input.phone1.trim().to_string();
        self.phone2 = optional_trimmed(input.phone2);
        self.address = input.address.trim().to_string();
        self.cart_items = input.cart_items;
        self.total_amount = input.total_amount;
        if let Some(status) = input.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    /// Sum of `price * quantity` over the cart lines; `None` when it
    /// overflows `Decimal`.
    pub fn cart_total(&self) -> Option<Decimal> {
        self.cart_items.iter().try_fold(Decimal::ZERO, |total, item| {
            item.price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|line| total.checked_add(line))
        })
    }
}
