//! PostgreSQL Repository Implementations

use std::collections::BTreeSet;

use kernel::id::{IdentityId, RoleId};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::domain::entity::{
    identity::{Identity, NewIdentity},
    role::Role,
};
use crate::domain::repository::{DeleteOutcome, IdentityRepository, RoleRepository};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, role_name::RoleName, secret::Secret,
};
use crate::error::{AuthError, AuthResult};

/// Identity columns plus the aggregated role names
macro_rules! identity_select {
    ($tail:literal) => {
        concat!(
            "SELECT i.id, i.email, i.secret, i.display_name, \
             COALESCE(ARRAY_AGG(r.name ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL), \
             ARRAY[]::TEXT[]) AS roles \
             FROM identities i \
             LEFT JOIN identity_roles ir ON ir.identity_id = i.id \
             LEFT JOIN roles r ON r.id = ir.role_id ",
            $tail
        )
    };
}

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_identity<'e, E>(executor: E, id: IdentityId) -> AuthResult<Option<Identity>>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, IdentityRow>(identity_select!(
            "WHERE i.id = $1 GROUP BY i.id"
        ))
        .bind(id.value())
        .fetch_optional(executor)
        .await?;

        row.map(IdentityRow::into_identity).transpose()
    }
}

fn unique_violation_as_conflict(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AuthError::Conflict;
        }
    }
    AuthError::Database(err)
}

fn role_from_code(code: &str) -> AuthResult<RoleName> {
    RoleName::from_code(code)
        .ok_or_else(|| AuthError::Internal(format!("unknown role in store: {code}")))
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for PgAuthRepository {
    async fn create(&self, identity: &NewIdentity) -> AuthResult<Identity> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO identities (email, secret, display_name)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(identity.email.as_str())
        .bind(identity.secret.expose())
        .bind(identity.display_name.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(unique_violation_as_conflict)?;

        let codes: Vec<String> = identity
            .roles
            .iter()
            .map(|role| role.code().to_string())
            .collect();

        let linked = sqlx::query(
            r#"
            INSERT INTO identity_roles (identity_id, role_id)
            SELECT $1, id FROM roles WHERE name = ANY($2)
            "#,
        )
        .bind(id)
        .bind(&codes)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if linked != codes.len() as u64 {
            // tx drops here and rolls back
            return Err(AuthError::Internal(format!(
                "roles {:?} are not all seeded",
                codes
            )));
        }

        tx.commit().await?;

        Ok(identity.clone().into_identity(IdentityId::from_i64(id)))
    }

    async fn find_by_id(&self, id: IdentityId) -> AuthResult<Option<Identity>> {
        Self::fetch_identity(&self.pool, id).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(identity_select!(
            "WHERE i.email = $1 GROUP BY i.id"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(IdentityRow::into_identity).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM identities WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_all(&self) -> AuthResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(identity_select!(
            "GROUP BY i.id ORDER BY i.display_name, i.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(IdentityRow::into_identity).collect()
    }

    async fn find_all_by_role(&self, role: RoleName) -> AuthResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(identity_select!(
            "WHERE i.id IN ( \
                SELECT m.identity_id FROM identity_roles m \
                JOIN roles mr ON mr.id = m.role_id \
                WHERE mr.name = $1 \
             ) \
             GROUP BY i.id ORDER BY i.display_name, i.id"
        ))
        .bind(role.code())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(IdentityRow::into_identity).collect()
    }

    async fn grant_role(&self, id: IdentityId, role: RoleName) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM identities WHERE id = $1 FOR UPDATE")
                .bind(id.value())
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let role_id: i64 = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(role.code())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AuthError::Internal(format!("role {role} is not seeded")))?;

        sqlx::query(
            r#"
            INSERT INTO identity_roles (identity_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id.value())
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_guarded(&self, id: IdentityId) -> AuthResult<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        // Every guarded delete queues on the ADMIN role row first
        let admin_role: Option<i64> =
            sqlx::query_scalar("SELECT id FROM roles WHERE name = $1 FOR UPDATE")
                .bind(RoleName::Admin.code())
                .fetch_optional(&mut *tx)
                .await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM identities WHERE id = $1 FOR UPDATE")
                .bind(id.value())
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let Some(identity) = Self::fetch_identity(&mut *tx, id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };

        if let (true, Some(admin_role)) = (identity.is_admin(), admin_role) {
            let admins: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM identity_roles WHERE role_id = $1")
                    .bind(admin_role)
                    .fetch_one(&mut *tx)
                    .await?;
            if admins <= 1 {
                return Ok(DeleteOutcome::LastAdmin);
            }
        }

        let deleted = sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await;

        match deleted {
            Ok(_) => {
                tx.commit().await?;
                Ok(DeleteOutcome::Deleted(identity))
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Ok(DeleteOutcome::StillReferenced)
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for PgAuthRepository {
    async fn count(&self) -> AuthResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn seed(&self, names: &[RoleName]) -> AuthResult<u64> {
        let codes: Vec<String> = names.iter().map(|name| name.code().to_string()).collect();

        let created = sqlx::query(
            r#"
            INSERT INTO roles (name)
            SELECT UNNEST($1::TEXT[])
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&codes)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(created)
    }

    async fn find_by_name(&self, name: RoleName) -> AuthResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name.code())
            .fetch_optional(&self.pool)
            .await?;

        row.map(RoleRow::into_role).transpose()
    }

    async fn list_roles(&self) -> AuthResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    async fn members_with_role(&self, name: RoleName) -> AuthResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM identity_roles ir
            JOIN roles r ON r.id = ir.role_id
            WHERE r.name = $1
            "#,
        )
        .bind(name.code())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(FromRow)]
struct IdentityRow {
    id: i64,
    email: String,
    secret: String,
    display_name: String,
    roles: Vec<String>,
}

impl IdentityRow {
    fn into_identity(self) -> AuthResult<Identity> {
        let roles = self
            .roles
            .iter()
            .map(|code| role_from_code(code))
            .collect::<AuthResult<BTreeSet<RoleName>>>()?;

        Ok(Identity {
            id: IdentityId::from_i64(self.id),
            email: Email::from_db(self.email),
            secret: Secret::from_db(self.secret),
            display_name: DisplayName::from_db(self.display_name),
            roles,
        })
    }
}

#[derive(FromRow)]
struct RoleRow {
    id: i64,
    name: String,
}

impl RoleRow {
    fn into_role(self) -> AuthResult<Role> {
        Ok(Role {
            id: RoleId::from_i64(self.id),
            name: role_from_code(&self.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_row_conversion() {
        let row = IdentityRow {
            id: 3,
            email: "ana@oficina.com".into(),
            secret: "pw".into(),
            display_name: "Ana".into(),
            roles: vec!["ADMIN".into(), "SALES".into()],
        };
        let identity = row.into_identity().unwrap();
        assert_eq!(identity.id, IdentityId::from_i64(3));
        assert!(identity.is_admin());
        assert!(identity.has_role(RoleName::Sales));
    }

    #[test]
    fn test_unknown_role_in_row() {
        let row = RoleRow {
            id: 1,
            name: "SUPERUSER".into(),
        };
        assert!(matches!(row.into_role(), Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_identity_select_shape() {
        let sql = identity_select!("WHERE i.id = $1 GROUP BY i.id");
        assert!(sql.contains("FROM identities i"));
        assert!(sql.ends_with("WHERE i.id = $1 GROUP BY i.id"));
    }

    // ------------------------------------------------------------------------
    // Against a live database: DATABASE_URL must point at a server where
    // test databases can be created. Run with `cargo test -- --ignored`.
    // ------------------------------------------------------------------------

    fn new_identity(email: &str, role: RoleName) -> NewIdentity {
        NewIdentity::new(
            Email::new(email).unwrap(),
            Secret::new("pw").unwrap(),
            DisplayName::new(email).unwrap(),
        )
        .with_role(role)
    }

    async fn seeded(pool: PgPool) -> PgAuthRepository {
        let repo = PgAuthRepository::new(pool);
        repo.seed(&RoleName::ALL).await.unwrap();
        repo
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore] // Requires PostgreSQL
    async fn test_pg_create_and_lookup(pool: PgPool) {
        let repo = seeded(pool).await;
        assert_eq!(repo.count().await.unwrap(), 4);
        assert_eq!(repo.seed(&RoleName::ALL).await.unwrap(), 0);

        let ana = repo
            .create(&new_identity("ana@oficina.com", RoleName::Admin))
            .await
            .unwrap();
        let found = repo
            .find_by_email(&Email::new("ana@oficina.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, ana.id);
        assert!(found.is_admin());
        assert!(
            repo.find_by_email(&Email::new("ANA@oficina.com").unwrap())
                .await
                .unwrap()
                .is_none()
        );

        let again = repo
            .create(&new_identity("ana@oficina.com", RoleName::Customer))
            .await;
        assert!(matches!(again, Err(AuthError::Conflict)));
        assert_eq!(repo.members_with_role(RoleName::Admin).await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore] // Requires PostgreSQL
    async fn test_pg_last_admin_is_kept(pool: PgPool) {
        let repo = seeded(pool).await;
        let ana = repo
            .create(&new_identity("ana@oficina.com", RoleName::Admin))
            .await
            .unwrap();

        assert!(matches!(
            repo.delete_guarded(ana.id).await.unwrap(),
            DeleteOutcome::LastAdmin
        ));
        assert!(repo.find_by_id(ana.id).await.unwrap().is_some());
        assert!(matches!(
            repo.delete_guarded(IdentityId::from_i64(9_999)).await.unwrap(),
            DeleteOutcome::NotFound
        ));
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore] // Requires PostgreSQL
    async fn test_pg_concurrent_deletes_of_two_admins(pool: PgPool) {
        let repo = seeded(pool).await;
        let first = repo
            .create(&new_identity("a@oficina.com", RoleName::Admin))
            .await
            .unwrap();
        let second = repo
            .create(&new_identity("b@oficina.com", RoleName::Admin))
            .await
            .unwrap();

        let handles: Vec<_> = [first.id, second.id]
            .into_iter()
            .map(|id| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.delete_guarded(id).await })
            })
            .collect();

        let mut deleted = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                DeleteOutcome::Deleted(_) => deleted += 1,
                DeleteOutcome::LastAdmin => refused += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert_eq!((deleted, refused), (1, 1));
        assert_eq!(repo.members_with_role(RoleName::Admin).await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore] // Requires PostgreSQL
    async fn test_pg_order_owner_is_kept(pool: PgPool) {
        let repo = seeded(pool.clone()).await;
        let carla = repo
            .create(&new_identity("carla@oficina.com", RoleName::Customer))
            .await
            .unwrap();
        sqlx::query("INSERT INTO orders (owner_id) VALUES ($1)")
            .bind(carla.id.value())
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(
            repo.delete_guarded(carla.id).await.unwrap(),
            DeleteOutcome::StillReferenced
        ));
        assert!(repo.find_by_id(carla.id).await.unwrap().is_some());

        sqlx::query("DELETE FROM orders WHERE owner_id = $1")
            .bind(carla.id.value())
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(
            repo.delete_guarded(carla.id).await.unwrap(),
            DeleteOutcome::Deleted(_)
        ));
    }
}
