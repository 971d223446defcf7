//! PostgreSQL Repository Implementations

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, OrderId, ServiceId};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgExecutor, PgPool};

use crate::domain::entity::{
    order::{NewOrder, Order},
    service::{NewServiceOffering, ServiceOffering},
};
use crate::domain::repository::{
    OrderMutation, OrderRepository, ServiceDeletion, ServiceRepository,
};
use crate::domain::value_object::{price::Price, service_name::ServiceName};
use crate::error::CatalogResult;

/// Order columns plus the aggregated service ids
macro_rules! order_select {
    ($tail:literal) => {
        concat!(
            "SELECT o.id, o.owner_id, o.created_at, \
             COALESCE(ARRAY_AGG(os.service_id ORDER BY os.service_id) \
             FILTER (WHERE os.service_id IS NOT NULL), ARRAY[]::BIGINT[]) AS service_ids \
             FROM orders o \
             LEFT JOIN order_services os ON os.order_id = o.id ",
            $tail
        )
    };
}

/// PostgreSQL-backed catalog repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_order<'e, E>(executor: E, id: OrderId) -> CatalogResult<Option<Order>>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, OrderRow>(order_select!("WHERE o.id = $1 GROUP BY o.id"))
            .bind(id.value())
            .fetch_optional(executor)
            .await?;

        Ok(row.map(OrderRow::into_order))
    }

    /// Row-lock the order for the rest of the transaction
    async fn lock_order(conn: &mut PgConnection, id: OrderId) -> CatalogResult<bool> {
        let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.value())
            .fetch_optional(conn)
            .await?;
        Ok(locked.is_some())
    }

    /// Keep the identity from being deleted until commit
    async fn share_identity(conn: &mut PgConnection, id: IdentityId) -> CatalogResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM identities WHERE id = $1 FOR KEY SHARE")
                .bind(id.value())
                .fetch_optional(conn)
                .await?;
        Ok(found.is_some())
    }

    /// Number of the given services that exist, each kept until commit
    async fn share_services(conn: &mut PgConnection, ids: &[i64]) -> CatalogResult<usize> {
        let found: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM services WHERE id = ANY($1) FOR KEY SHARE")
                .bind(ids)
                .fetch_all(conn)
                .await?;
        Ok(found.len())
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

// ============================================================================
// Service Repository Implementation
// ============================================================================

impl ServiceRepository for PgCatalogRepository {
    async fn insert_service(&self, service: &NewServiceOffering) -> CatalogResult<ServiceOffering> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO services (name, price)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(service.name.as_str())
        .bind(service.price.amount())
        .fetch_one(&self.pool)
        .await?;

        Ok(service.clone().into_service(ServiceId::from_i64(id)))
    }

    async fn find_service(&self, id: ServiceId) -> CatalogResult<Option<ServiceOffering>> {
        let row = sqlx::query_as::<_, ServiceRow>("SELECT id, name, price FROM services WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ServiceRow::into_service))
    }

    async fn find_services(&self, ids: &BTreeSet<ServiceId>) -> CatalogResult<Vec<ServiceOffering>> {
        let ids: Vec<i64> = ids.iter().map(ServiceId::value).collect();

        let rows = sqlx::query_as::<_, ServiceRow>(
            "SELECT id, name, price FROM services WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ServiceRow::into_service).collect())
    }

    async fn all_services(&self) -> CatalogResult<Vec<ServiceOffering>> {
        let rows = sqlx::query_as::<_, ServiceRow>("SELECT id, name, price FROM services ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ServiceRow::into_service).collect())
    }

    async fn update_service(
        &self,
        id: ServiceId,
        service: &NewServiceOffering,
    ) -> CatalogResult<Option<ServiceOffering>> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            UPDATE services
            SET name = $2, price = $3
            WHERE id = $1
            RETURNING id, name, price
            "#,
        )
        .bind(id.value())
        .bind(service.name.as_str())
        .bind(service.price.amount())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ServiceRow::into_service))
    }

    async fn delete_service(&self, id: ServiceId) -> CatalogResult<ServiceDeletion> {
        // order_services.service_id is ON DELETE RESTRICT
        let deleted = sqlx::query_as::<_, ServiceRow>(
            "DELETE FROM services WHERE id = $1 RETURNING id, name, price",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await;

        match deleted {
            Ok(Some(row)) => Ok(ServiceDeletion::Deleted(row.into_service())),
            Ok(None) => Ok(ServiceDeletion::NotFound),
            Err(e) if is_foreign_key_violation(&e) => Ok(ServiceDeletion::StillReferenced),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Order Repository Implementation
// ============================================================================

impl OrderRepository for PgCatalogRepository {
    async fn insert_order(&self, order: &NewOrder) -> CatalogResult<OrderMutation> {
        let mut tx = self.pool.begin().await?;

        if !Self::share_identity(&mut tx, order.owner_id).await? {
            return Ok(OrderMutation::IdentityMissing);
        }

        let service_ids: Vec<i64> = order.service_ids.iter().map(ServiceId::value).collect();
        if Self::share_services(&mut tx, &service_ids).await? != service_ids.len() {
            return Ok(OrderMutation::ServiceMissing);
        }

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO orders (owner_id)
            VALUES ($1)
            RETURNING id, created_at
            "#,
        )
        .bind(order.owner_id.value())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO order_services (order_id, service_id)
            SELECT $1, UNNEST($2::BIGINT[])
            "#,
        )
        .bind(id)
        .bind(&service_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(OrderMutation::Applied(
            order.clone().into_order(OrderId::from_i64(id), created_at),
        ))
    }

    async fn find_order(&self, id: OrderId) -> CatalogResult<Option<Order>> {
        Self::fetch_order(&self.pool, id).await
    }

    async fn all_orders(&self) -> CatalogResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(order_select!("GROUP BY o.id ORDER BY o.id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(OrderRow::into_order).collect())
    }

    async fn delete_order(&self, id: OrderId) -> CatalogResult<bool> {
        // links go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach_service(
        &self,
        order_id: OrderId,
        service_id: ServiceId,
    ) -> CatalogResult<OrderMutation> {
        let mut tx = self.pool.begin().await?;

        if !Self::lock_order(&mut tx, order_id).await? {
            return Ok(OrderMutation::OrderMissing);
        }
        if Self::share_services(&mut tx, &[service_id.value()]).await? == 0 {
            return Ok(OrderMutation::ServiceMissing);
        }

        sqlx::query(
            r#"
            INSERT INTO order_services (order_id, service_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(order_id.value())
        .bind(service_id.value())
        .execute(&mut *tx)
        .await?;

        let order = Self::fetch_order(&mut *tx, order_id).await?;
        tx.commit().await?;

        Ok(order.map_or(OrderMutation::OrderMissing, OrderMutation::Applied))
    }

    async fn detach_service(
        &self,
        order_id: OrderId,
        service_id: ServiceId,
    ) -> CatalogResult<OrderMutation> {
        let mut tx = self.pool.begin().await?;

        if !Self::lock_order(&mut tx, order_id).await? {
            return Ok(OrderMutation::OrderMissing);
        }

        sqlx::query("DELETE FROM order_services WHERE order_id = $1 AND service_id = $2")
            .bind(order_id.value())
            .bind(service_id.value())
            .execute(&mut *tx)
            .await?;

        let order = Self::fetch_order(&mut *tx, order_id).await?;
        tx.commit().await?;

        Ok(order.map_or(OrderMutation::OrderMissing, OrderMutation::Applied))
    }

    async fn change_owner(
        &self,
        order_id: OrderId,
        owner_id: IdentityId,
    ) -> CatalogResult<OrderMutation> {
        let mut tx = self.pool.begin().await?;

        if !Self::lock_order(&mut tx, order_id).await? {
            return Ok(OrderMutation::OrderMissing);
        }
        if !Self::share_identity(&mut tx, owner_id).await? {
            return Ok(OrderMutation::IdentityMissing);
        }

        sqlx::query("UPDATE orders SET owner_id = $2 WHERE id = $1")
            .bind(order_id.value())
            .bind(owner_id.value())
            .execute(&mut *tx)
            .await?;

        let order = Self::fetch_order(&mut *tx, order_id).await?;
        tx.commit().await?;

        Ok(order.map_or(OrderMutation::OrderMissing, OrderMutation::Applied))
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    price: Decimal,
}

impl ServiceRow {
    fn into_service(self) -> ServiceOffering {
        ServiceOffering {
            id: ServiceId::from_i64(self.id),
            name: ServiceName::from_db(self.name),
            price: Price::from_db(self.price),
        }
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    owner_id: i64,
    created_at: DateTime<Utc>,
    service_ids: Vec<i64>,
}

impl OrderRow {
    fn into_order(self) -> Order {
        Order {
            id: OrderId::from_i64(self.id),
            owner_id: IdentityId::from_i64(self.owner_id),
            created_at: self.created_at,
            service_ids: self
                .service_ids
                .into_iter()
                .map(ServiceId::from_i64)
                .collect(),
        }
    }
}
