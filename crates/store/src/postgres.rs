//! `PostgreSQL` store.
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow` row types)
//! so the crate builds without a live database. Row types convert into domain
//! types with `TryFrom`; anything that fails to parse is reported as
//! [`StoreError::DataCorruption`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use techmart_core::cart::{
    CartLine, MAX_LINE_QUANTITY, QuantityError, TransferStep, merged_quantity, plan_transfer,
    quantity_to_set,
};
use techmart_core::catalog::{NewProduct, Product, ProductFilter, ProductPatch};
use techmart_core::order::{
    Order, OrderDraft, OrderItem, OrderQuery, OrderUpdate, ShippingAddress,
};
use techmart_core::user::{NewUser, ProfileUpdate, User};
use techmart_core::{CartItemId, CartOwner, Email, OrderId, OrderStatus, ProductId, UserId};

use crate::{CartUpdate, Store, StoreError, StoreResult, UserCredentials};

/// Embedded migrations from `crates/store/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await?;
    tracing::info!("Connected to database");
    Ok(pool)
}

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

fn conflict_or(err: sqlx::Error, message: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict(message())
        }
        _ => StoreError::Database(err),
    }
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> StoreError {
    tracing::error!(what, error = %err, "Corrupt row");
    StoreError::DataCorruption(format!("invalid {what} in database: {err}"))
}

// =============================================================================
// Internal Row Types
// =============================================================================

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, brand, sku, image_url, \
     specifications, stock, rating, review_count, is_active, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    brand: String,
    sku: String,
    image_url: Option<String>,
    specifications: Json<Map<String, Value>>,
    stock: i32,
    rating: Decimal,
    review_count: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            brand: row.brand,
            sku: row.sku,
            image_url: row.image_url,
            specifications: row.specifications.0,
            stock: row.stock,
            rating: row.rating,
            review_count: row.review_count,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, email, name, phone, shipping_address, is_admin, created_at, password_hash";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    phone: Option<String>,
    shipping_address: Option<Json<ShippingAddress>>,
    is_admin: bool,
    created_at: DateTime<Utc>,
    password_hash: String,
}

impl TryFrom<UserRow> for UserCredentials {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| corrupt("email", e))?;
        Ok(Self {
            user: User {
                id: row.id,
                email,
                name: row.name,
                phone: row.phone,
                shipping_address: row.shipping_address.map(|a| a.0),
                is_admin: row.is_admin,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

fn into_user(row: UserRow) -> StoreResult<User> {
    UserCredentials::try_from(row).map(|c| c.user)
}

const CART_COLUMNS: &str = "id, owner_key, product_id, quantity, created_at";

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: CartItemId,
    owner_key: String,
    product_id: ProductId,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for CartLine {
    type Error = StoreError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let owner = CartOwner::parse_storage_key(&row.owner_key)
            .ok_or_else(|| corrupt("cart owner", &row.owner_key))?;
        Ok(Self {
            id: row.id,
            owner: Some(owner),
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, customer_name, customer_email, customer_phone, \
     shipping_address, items, total_amount, payment_method, status, refund_reason, \
     refund_amount, refunded_at, rating, delivered_at, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    customer_name: String,
    customer_email: String,
    customer_phone: Option<String>,
    shipping_address: Json<ShippingAddress>,
    items: Json<Vec<OrderItem>>,
    total_amount: Decimal,
    payment_method: String,
    status: String,
    refund_reason: Option<String>,
    refund_amount: Option<Decimal>,
    refunded_at: Option<DateTime<Utc>>,
    rating: Option<i16>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            customer_name: row.customer_name,
            customer_email: Email::parse(&row.customer_email)
                .map_err(|e| corrupt("customer email", e))?,
            customer_phone: row.customer_phone,
            shipping_address: row.shipping_address.0,
            items: row.items.0,
            total_amount: row.total_amount,
            payment_method: row
                .payment_method
                .parse()
                .map_err(|e| corrupt("payment method", e))?,
            status: row.status.parse().map_err(|e| corrupt("order status", e))?,
            refund_reason: row.refund_reason,
            refund_amount: row.refund_amount,
            refunded_at: row.refunded_at,
            rating: row.rating,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// [`Store`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn owner_lines(
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> StoreResult<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE owner_key = $1 \
             ORDER BY created_at, id FOR UPDATE"
        ))
        .bind(owner.storage_key())
        .fetch_all(&mut **tx)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active
               AND ($1::text IS NULL OR category = $1)
               AND ($2::text IS NULL OR brand = $2)
               AND ($3::numeric IS NULL OR price >= $3)
               AND ($4::numeric IS NULL OR price <= $4)
               AND ($5::numeric IS NULL OR rating >= $5)
               AND ($6::text IS NULL
                    OR strpos(lower(name), lower($6)) > 0
                    OR strpos(lower(description), lower($6)) > 0
                    OR strpos(lower(brand), lower($6)) > 0)
             ORDER BY created_at, id"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.brand.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.rating)
        .bind(filter.search.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn all_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn create_product(&self, input: NewProduct) -> StoreResult<Product> {
        let sku = input.sku.clone();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (id, name, description, price, category, brand, sku, image_url,
                                   specifications, stock, rating, review_count, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(ProductId::new_v4())
        .bind(input.name)
        .bind(input.description)
        .bind(input.price)
        .bind(input.category)
        .bind(input.brand)
        .bind(input.sku)
        .bind(input.image_url)
        .bind(Json(input.specifications))
        .bind(input.stock)
        .bind(input.rating)
        .bind(input.review_count)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("sku {sku} already exists")))?;
        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> StoreResult<Option<Product>> {
        let mut tx = self.pool.begin().await?;
        let Some(row) = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let mut product = Product::from(row);
        patch.apply(&mut product);

        let sku = product.sku.clone();
        sqlx::query(
            "UPDATE products
             SET name = $2, description = $3, price = $4, category = $5, brand = $6, sku = $7,
                 image_url = $8, specifications = $9, stock = $10, rating = $11,
                 review_count = $12, is_active = $13
             WHERE id = $1",
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(&product.sku)
        .bind(product.image_url.as_deref())
        .bind(Json(&product.specifications))
        .bind(product.stock)
        .bind(product.rating)
        .bind(product.review_count)
        .bind(product.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, || format!("sku {sku} already exists")))?;

        tx.commit().await?;
        Ok(Some(product))
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        // cart_items.product_id cascades.
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let email = input.email.clone();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, email, name, password_hash, is_admin)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::new_v4())
        .bind(input.email.as_str())
        .bind(input.name)
        .bind(input.password_hash)
        .bind(input.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("email {email} already registered")))?;
        into_user(row)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(into_user)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &Email) -> StoreResult<Option<UserCredentials>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(into_user).collect()
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> StoreResult<Option<User>> {
        // A NULL name keeps the old one; an empty phone clears it.
        sqlx::query_as::<_, UserRow>(&format!(
                "UPDATE users
                 SET name = COALESCE($2, name),
                     phone = CASE WHEN $3::text IS NULL THEN phone ELSE NULLIF($3, '') END
                 WHERE id = $1
                 RETURNING {USER_COLUMNS}"
            ))
            .bind(id)
            .bind(update.name)
            .bind(update.phone)
            .fetch_optional(&self.pool)
            .await?
            .map(into_user)
            .transpose()
    }

    async fn update_shipping_address(
        &self,
        id: UserId,
        address: ShippingAddress,
    ) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET shipping_address = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(address))
        .fetch_optional(&self.pool)
        .await?
        .map(into_user)
        .transpose()
    }

    async fn set_admin(&self, email: &Email, is_admin: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET is_admin = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(is_admin)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cart_lines(&self, owner: &CartOwner) -> StoreResult<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE owner_key = $1 ORDER BY created_at, id"
        ))
        .bind(owner.storage_key())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn add_to_cart(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: i32,
    ) -> StoreResult<CartLine> {
        let quantity =
            merged_quantity(0, quantity).map_err(|e| StoreError::Conflict(e.to_string()))?;
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "INSERT INTO cart_items (id, owner_key, product_id, quantity)
             SELECT $1, $2, id, $4 FROM products WHERE id = $3
             ON CONFLICT (owner_key, product_id)
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
             WHERE cart_items.quantity::bigint + EXCLUDED.quantity <= $5
             RETURNING {CART_COLUMNS}"
        ))
        .bind(CartItemId::new_v4())
        .bind(owner.storage_key())
        .bind(product_id)
        .bind(quantity)
        .bind(i64::from(MAX_LINE_QUANTITY))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => {
                // No row: either the product is unknown or the line is full
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                        .bind(product_id)
                        .fetch_one(&self.pool)
                        .await?;
                if exists {
                    Err(StoreError::Conflict(QuantityError::TooLarge.to_string()))
                } else {
                    Err(StoreError::NotFound)
                }
            }
        }
    }

    async fn set_cart_quantity(
        &self,
        owner: &CartOwner,
        line_id: CartItemId,
        quantity: i32,
    ) -> StoreResult<CartUpdate> {
        if quantity == 0 {
            let removed = self.remove_cart_line(owner, line_id).await?;
            return Ok(if removed {
                CartUpdate::Removed
            } else {
                CartUpdate::NotFound
            });
        }
        let quantity =
            quantity_to_set(quantity).map_err(|e| StoreError::Conflict(e.to_string()))?;
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "UPDATE cart_items SET quantity = $3
             WHERE id = $1 AND owner_key = $2
             RETURNING {CART_COLUMNS}"
        ))
        .bind(line_id)
        .bind(owner.storage_key())
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(CartUpdate::Updated(row.try_into()?)),
            None => Ok(CartUpdate::NotFound),
        }
    }

    async fn remove_cart_line(
        &self,
        owner: &CartOwner,
        line_id: CartItemId,
    ) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND owner_key = $2")
            .bind(line_id)
            .bind(owner.storage_key())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, owner: &CartOwner) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE owner_key = $1")
            .bind(owner.storage_key())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn transfer_cart(&self, from: &CartOwner, to: &CartOwner) -> StoreResult<usize> {
        if from == to {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let source = Self::owner_lines(&mut tx, from).await?;
        let target = Self::owner_lines(&mut tx, to).await?;
        let steps = plan_transfer(&source, &target);

        for step in &steps {
            match *step {
                TransferStep::Increase { line_id, quantity } => {
                    sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
                        .bind(line_id)
                        .bind(quantity)
                        .execute(&mut *tx)
                        .await?;
                }
                TransferStep::Insert {
                    product_id,
                    quantity,
                } => {
                    sqlx::query(
                        "INSERT INTO cart_items (id, owner_key, product_id, quantity)
                         VALUES ($1, $2, $3, $4)",
                    )
                    .bind(CartItemId::new_v4())
                    .bind(to.storage_key())
                    .bind(product_id)
                    .bind(quantity)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE owner_key = $1")
            .bind(from.storage_key())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(steps.len())
    }

    async fn place_order(&self, owner: &CartOwner, draft: OrderDraft) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;

        for item in &draft.items {
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - $2
                 WHERE id = $1 AND is_active AND stock >= $2",
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                let available: Option<i32> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1 AND is_active")
                        .bind(item.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                tracing::warn!(
                    product_id = %item.product_id,
                    requested = item.quantity,
                    "Stock ran out during checkout"
                );
                // Dropping `tx` rolls back the decrements made so far.
                return Err(StoreError::InsufficientStock {
                    product_id: item.product_id,
                    available: available.unwrap_or(0),
                    requested: item.quantity,
                });
            }
        }

        let order = draft.into_order(OrderId::new_v4(), Utc::now());
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, user_id, customer_name, customer_email, customer_phone,
                                 shipping_address, items, total_amount, payment_method, status,
                                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.customer_name)
        .bind(order.customer_email.as_str())
        .bind(order.customer_phone.as_deref())
        .bind(Json(&order.shipping_address))
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(order.payment_method.as_str())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_items WHERE owner_key = $1")
            .bind(owner.storage_key())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        row.try_into()
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn list_orders(&self, query: OrderQuery) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::uuid IS NULL OR user_id = $1)
               AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC"
        ))
        .bind(query.user_id)
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_order(&self, id: OrderId, update: OrderUpdate) -> StoreResult<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders
             SET status = COALESCE($2, status),
                 refund_amount = COALESCE($3, refund_amount),
                 refund_reason = COALESCE($4, refund_reason),
                 rating = COALESCE($5, rating),
                 delivered_at = COALESCE($6, delivered_at),
                 refunded_at = COALESCE($7, refunded_at),
                 updated_at = now()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.refund_amount)
        .bind(update.refund_reason)
        .bind(update.rating)
        .bind(update.delivered_at)
        .bind(update.refunded_at)
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn delete_order(&self, id: OrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_delivered(&self, placed_before: DateTime<Utc>) -> StoreResult<Vec<OrderId>> {
        Ok(sqlx::query_scalar(
            "UPDATE orders
             SET status = $1, delivered_at = now(), updated_at = now()
             WHERE status = $2 AND created_at < $3
             RETURNING id",
        )
        .bind(OrderStatus::Delivered.as_str())
        .bind(OrderStatus::Processing.as_str())
        .bind(placed_before)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
