//! Repository seam shared by the per-entity repositories

use crate::database::error::DatabaseError;
use async_trait::async_trait;
use sqlx::PgPool;

/// Common CRUD surface for entity repositories
#[async_trait]
pub trait Repository {
    type Entity;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Entity>, DatabaseError>;

    async fn find_all(&self) -> Result<Vec<Self::Entity>, DatabaseError>;

    async fn delete(&self, id: &str) -> Result<bool, DatabaseError>;
}

/// Repositories that expose their pool for multi-statement transactions
pub trait TransactionalRepository {
    fn pool(&self) -> &PgPool;
}
