//! In-memory store.
//!
//! Every table is a plain `Vec` scanned linearly; there are no indexes. One
//! `RwLock` guards all tables so multi-table operations (placing an order,
//! transferring a cart) are atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use techmart_core::cart::{
    CartLine, TransferStep, merged_quantity, plan_transfer, quantity_to_set,
};
use techmart_core::catalog::{NewProduct, Product, ProductFilter, ProductPatch};
use techmart_core::order::{Order, OrderDraft, OrderQuery, OrderUpdate, ShippingAddress};
use techmart_core::user::{NewUser, ProfileUpdate, User};
use techmart_core::{CartItemId, CartOwner, Email, OrderId, OrderStatus, ProductId, UserId};

use crate::{CartUpdate, Store, StoreError, StoreResult, UserCredentials};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    users: Vec<UserCredentials>,
    cart: Vec<CartLine>,
    orders: Vec<Order>,
}

impl Tables {
    fn owned_by<'a>(&'a self, owner: &'a CartOwner) -> impl Iterator<Item = &'a CartLine> {
        self.cart
            .iter()
            .filter(move |l| l.owner.as_ref() == Some(owner))
    }

    fn line_mut(&mut self, owner: &CartOwner, line_id: CartItemId) -> Option<&mut CartLine> {
        self.cart
            .iter_mut()
            .find(|l| l.id == line_id && l.owner.as_ref() == Some(owner))
    }

    fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users
            .iter_mut()
            .map(|c| &mut c.user)
            .find(|u| u.id == id)
    }
}

/// [`Store`] backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn all_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, input: NewProduct) -> StoreResult<Product> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.sku == input.sku) {
            return Err(StoreError::Conflict(format!("sku {} already exists", input.sku)));
        }
        let product = input.into_product(ProductId::new_v4(), Utc::now());
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> StoreResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        if let Some(sku) = patch.sku.as_deref().map(str::trim)
            && tables.products.iter().any(|p| p.sku == sku && p.id != id)
        {
            return Err(StoreError::Conflict(format!("sku {sku} already exists")));
        }
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply(product);
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        let deleted = tables.products.len() < before;
        if deleted {
            tables.cart.retain(|l| l.product_id != id);
        }
        Ok(deleted)
    }

    async fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|c| c.user.email == input.email) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                input.email
            )));
        }
        let user = User {
            id: UserId::new_v4(),
            email: input.email,
            name: input.name,
            phone: None,
            shipping_address: None,
            is_admin: input.is_admin,
            created_at: Utc::now(),
        };
        tables.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }

    async fn find_user_by_email(&self, email: &Email) -> StoreResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|c| &c.user.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().rev().map(|c| c.user.clone()).collect())
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(i64::try_from(tables.users.len()).unwrap_or(i64::MAX))
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.user_mut(id).map(|user| {
            update.apply(user);
            user.clone()
        }))
    }

    async fn update_shipping_address(
        &self,
        id: UserId,
        address: ShippingAddress,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.user_mut(id).map(|user| {
            user.shipping_address = Some(address);
            user.clone()
        }))
    }

    async fn set_admin(&self, email: &Email, is_admin: bool) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(credentials) = tables.users.iter_mut().find(|c| &c.user.email == email) else {
            return Ok(false);
        };
        credentials.user.is_admin = is_admin;
        Ok(true)
    }

    async fn cart_lines(&self, owner: &CartOwner) -> StoreResult<Vec<CartLine>> {
        let tables = self.tables.read().await;
        Ok(tables.owned_by(owner).cloned().collect())
    }

    async fn add_to_cart(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: i32,
    ) -> StoreResult<CartLine> {
        let mut tables = self.tables.write().await;
        if !tables.products.iter().any(|p| p.id == product_id) {
            return Err(StoreError::NotFound);
        }
        if let Some(line) = tables
            .cart
            .iter_mut()
            .find(|l| l.product_id == product_id && l.owner.as_ref() == Some(owner))
        {
            line.quantity = merged_quantity(line.quantity, quantity)
                .map_err(|e| StoreError::Conflict(e.to_string()))?;
            return Ok(line.clone());
        }
        let line = CartLine {
            id: CartItemId::new_v4(),
            owner: Some(owner.clone()),
            product_id,
            quantity: merged_quantity(0, quantity)
                .map_err(|e| StoreError::Conflict(e.to_string()))?,
            created_at: Utc::now(),
        };
        tables.cart.push(line.clone());
        Ok(line)
    }

    async fn set_cart_quantity(
        &self,
        owner: &CartOwner,
        line_id: CartItemId,
        quantity: i32,
    ) -> StoreResult<CartUpdate> {
        let mut tables = self.tables.write().await;
        let Some(line) = tables.line_mut(owner, line_id) else {
            return Ok(CartUpdate::NotFound);
        };
        if quantity == 0 {
            tables.cart.retain(|l| l.id != line_id);
            return Ok(CartUpdate::Removed);
        }
        line.quantity =
            quantity_to_set(quantity).map_err(|e| StoreError::Conflict(e.to_string()))?;
        Ok(CartUpdate::Updated(line.clone()))
    }

    async fn remove_cart_line(
        &self,
        owner: &CartOwner,
        line_id: CartItemId,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.cart.len();
        tables
            .cart
            .retain(|l| !(l.id == line_id && l.owner.as_ref() == Some(owner)));
        Ok(tables.cart.len() < before)
    }

    async fn clear_cart(&self, owner: &CartOwner) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.cart.len();
        tables.cart.retain(|l| l.owner.as_ref() != Some(owner));
        Ok(u64::try_from(before - tables.cart.len()).unwrap_or(u64::MAX))
    }

    async fn transfer_cart(&self, from: &CartOwner, to: &CartOwner) -> StoreResult<usize> {
        if from == to {
            return Ok(0);
        }
        let mut tables = self.tables.write().await;
        let source: Vec<CartLine> = tables.owned_by(from).cloned().collect();
        let target: Vec<CartLine> = tables.owned_by(to).cloned().collect();
        let steps = plan_transfer(&source, &target);

        for step in &steps {
            match *step {
                TransferStep::Increase { line_id, quantity } => {
                    if let Some(line) = tables.line_mut(to, line_id) {
                        line.quantity = quantity;
                    }
                }
                TransferStep::Insert {
                    product_id,
                    quantity,
                } => tables.cart.push(CartLine {
                    id: CartItemId::new_v4(),
                    owner: Some(to.clone()),
                    product_id,
                    quantity,
                    created_at: Utc::now(),
                }),
            }
        }
        tables.cart.retain(|l| l.owner.as_ref() != Some(from));
        Ok(steps.len())
    }

    async fn place_order(&self, owner: &CartOwner, draft: OrderDraft) -> StoreResult<Order> {
        let mut tables = self.tables.write().await;

        // Check every item before touching stock so a failure changes nothing.
        for item in &draft.items {
            let available = tables
                .products
                .iter()
                .find(|p| p.id == item.product_id && p.is_active)
                .map_or(0, |p| p.stock);
            if available < item.quantity {
                return Err(StoreError::InsufficientStock {
                    product_id: item.product_id,
                    available,
                    requested: item.quantity,
                });
            }
        }
        for item in &draft.items {
            if let Some(product) = tables
                .products
                .iter_mut()
                .find(|p| p.id == item.product_id)
            {
                product.stock -= item.quantity;
            }
        }

        let order = draft.into_order(OrderId::new_v4(), Utc::now());
        tables.orders.push(order.clone());
        tables.cart.retain(|l| l.owner.as_ref() != Some(owner));
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self, query: OrderQuery) -> StoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|o| query.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_order(&self, id: OrderId, update: OrderUpdate) -> StoreResult<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.iter_mut().find(|o| o.id == id).map(|order| {
            update.apply(order, Utc::now());
            order.clone()
        }))
    }

    async fn delete_order(&self, id: OrderId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.orders.len();
        tables.orders.retain(|o| o.id != id);
        Ok(tables.orders.len() < before)
    }

    async fn mark_delivered(&self, placed_before: DateTime<Utc>) -> StoreResult<Vec<OrderId>> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut moved = Vec::new();
        for order in tables
            .orders
            .iter_mut()
            .filter(|o| o.status == OrderStatus::Processing && o.created_at < placed_before)
        {
            order.status = OrderStatus::Delivered;
            order.delivered_at = Some(now);
            order.updated_at = now;
            moved.push(order.id);
        }
        Ok(moved)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
