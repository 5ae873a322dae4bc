//! Thin generic wrapper over a SeaORM entity.
//!
//! Domain Postgres repositories hold one `BaseRepository` per table and use it
//! for primary-key lookups and deletes; inserts, filtered queries and anything
//! run inside a transaction go through [`BaseRepository::db`] directly.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PrimaryKeyTrait};
use std::marker::PhantomData;

type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

pub struct BaseRepository<E: EntityTrait> {
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> Clone for BaseRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<E: EntityTrait> BaseRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn find_by_id<K>(&self, id: K) -> Result<Option<E::Model>, DbErr>
    where
        K: Into<PrimaryKeyOf<E>>,
    {
        E::find_by_id(id).one(&self.db).await
    }

    /// Delete by primary key, returning whether a row was removed
    pub async fn delete_by_id<K>(&self, id: K) -> Result<bool, DbErr>
    where
        K: Into<PrimaryKeyOf<E>>,
    {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
