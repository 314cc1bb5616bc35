use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bcrypt::{hash, DEFAULT_COST};
use serde_json::json;
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::customer::{
    BlockStatusUpdate, Customer, CustomerWithOrders, NewCustomer, UpdateCustomer,
};
use crate::utils::api_response::ApiResponse;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const CUSTOMER_COLUMNS: &str = "id, phone_number, first_name, last_name, email, \
     customer_logo, joined_date, is_block, created_at, updated_at";

#[utoipa::path(
    post,
    path = "/customers",
    request_body = NewCustomer,
    responses(
        (status = 201, description = "Customer created successfully", body = Customer),
        (status = 400, description = "Missing credentials, short password or duplicate phone number")
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(db_pool): State<PgPool>,
    Json(payload): Json<NewCustomer>,
) -> Result<ApiResponse<Customer>, ApiResponse<()>> {
    if payload.phone_number.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Phone number and password are required.",
            None,
        ));
    }
    if payload.password.len() < 8 {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Password must be at least 8 characters",
            None,
        ));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| internal_error("Password hashing failed", e))?;

    let customer = sqlx::query_as::<_, Customer>(&format!(
        r#"
        INSERT INTO customers (phone_number, password, first_name, last_name, email)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(payload.phone_number.trim())
    .bind(&password_hash)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Phone number already exists", None)
        }
        _ => internal_error("Failed to create customer", e),
    })?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Customer created successfully", customer))
}

#[utoipa::path(
    get,
    path = "/customers",
    responses(
        (status = 200, description = "Customers retrieved successfully", body = Vec<Customer>),
        (status = 500, description = "Failed to retrieve customers")
    ),
    tag = "Customers"
)]
pub async fn get_customers(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Customer>>, ApiResponse<()>> {
    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve customers", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Customers retrieved successfully", customers))
}

/// Listing joined with each customer's lifetime order count
#[utoipa::path(
    get,
    path = "/customers/with-orders",
    responses(
        (status = 200, description = "Customers with order counts", body = Vec<CustomerWithOrders>),
        (status = 500, description = "Failed to retrieve customers")
    ),
    tag = "Customers"
)]
pub async fn get_customers_with_orders(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<CustomerWithOrders>>, ApiResponse<()>> {
    let customers = sqlx::query_as::<_, CustomerWithOrders>(
        r#"
        SELECT c.id, c.phone_number, c.first_name, c.last_name, c.email,
               c.customer_logo, c.joined_date, c.is_block,
               COUNT(o.id) AS total_orders
        FROM customers c
        LEFT JOIN orders o ON o.customer_id = c.id
        GROUP BY c.id
        ORDER BY c.created_at DESC
        "#,
    )
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve customers", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Customers retrieved successfully", customers))
}

#[utoipa::path(
    get,
    path = "/customers/{customer_id}",
    params(("customer_id" = i32, Path, description = "ID of the customer")),
    responses(
        (status = 200, description = "Customer retrieved successfully", body = Customer),
        (status = 404, description = "Customer not found")
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(db_pool): State<PgPool>,
    Path(customer_id): Path<i32>,
) -> Result<ApiResponse<Customer>, ApiResponse<()>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(customer_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve customer", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Customer not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Customer retrieved successfully", customer))
}

/// Partial profile update; a new phone number must not collide with
/// another customer
#[utoipa::path(
    patch,
    path = "/customers/{customer_id}",
    params(("customer_id" = i32, Path, description = "ID of the customer to update")),
    request_body = UpdateCustomer,
    responses(
        (status = 200, description = "Customer updated successfully", body = Customer),
        (status = 400, description = "No fields provided or phone number already exists"),
        (status = 404, description = "Customer not found")
    ),
    tag = "Customers"
)]
pub async fn update_customer(
    State(db_pool): State<PgPool>,
    Path(customer_id): Path<i32>,
    Json(payload): Json<UpdateCustomer>,
) -> Result<ApiResponse<Customer>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    if let Some(phone) = payload.phone_number.as_deref() {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE phone_number = $1 AND id <> $2)",
        )
        .bind(phone)
        .bind(customer_id)
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to check phone number", e))?;

        if taken {
            return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Phone number already exists", None));
        }
    }

    let mut query_builder = QueryBuilder::new("UPDATE customers SET ");
    let mut first = true;

    macro_rules! push_if_some {
        ($field:ident) => {
            if let Some(value) = &payload.$field {
                if !first { query_builder.push(", "); }
                query_builder.push(concat!(stringify!($field), " = ")).push_bind(value);
                first = false;
            }
        };
    }

    push_if_some!(first_name);
    push_if_some!(last_name);
    push_if_some!(email);
    push_if_some!(phone_number);
    push_if_some!(customer_logo);

    query_builder
        .push(", updated_at = NOW() WHERE id = ")
        .push_bind(customer_id)
        .push(&format!(" RETURNING {CUSTOMER_COLUMNS}"));

    let customer = query_builder
        .build_query_as::<Customer>()
        .fetch_optional(&db_pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Phone number already exists", None)
            }
            _ => internal_error("Failed to update customer", e),
        })?
        .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Customer not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Customer updated successfully", customer))
}

#[utoipa::path(
    patch,
    path = "/customers/{customer_id}/toggle-block",
    params(("customer_id" = i32, Path, description = "ID of the customer")),
    request_body = BlockStatusUpdate,
    responses(
        (status = 200, description = "Block status updated"),
        (status = 400, description = "Invalid is_block value"),
        (status = 404, description = "Customer not found")
    ),
    tag = "Customers"
)]
pub async fn toggle_block_status(
    State(db_pool): State<PgPool>,
    Path(customer_id): Path<i32>,
    Json(payload): Json<BlockStatusUpdate>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.is_block != "Block" && payload.is_block != "Unblock" {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "is_block must be 'Block' or 'Unblock'",
            None,
        ));
    }

    let result = sqlx::query("UPDATE customers SET is_block = $1, updated_at = NOW() WHERE id = $2")
        .bind(&payload.is_block)
        .bind(customer_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update block status", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Customer not found", None));
    }

    let message = if payload.is_block == "Block" {
        "Customer blocked successfully"
    } else {
        "Customer unblocked successfully"
    };
    Ok(ApiResponse::success(StatusCode::OK, message, ()))
}

#[utoipa::path(
    delete,
    path = "/customers/{customer_id}",
    params(("customer_id" = i32, Path, description = "ID of the customer to delete")),
    responses(
        (status = 200, description = "Customer deleted successfully"),
        (status = 404, description = "Customer not found")
    ),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(db_pool): State<PgPool>,
    Path(customer_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(customer_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete customer", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Customer not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Customer deleted successfully", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_customer,
        get_customers,
        get_customers_with_orders,
        get_customer,
        update_customer,
        toggle_block_status,
        delete_customer,
    ),
    components(
        schemas(Customer, CustomerWithOrders, NewCustomer, UpdateCustomer, BlockStatusUpdate)
    ),
    tags(
        (name = "Customers", description = "Customer registry endpoints")
    )
)]
pub struct CustomerDoc;
