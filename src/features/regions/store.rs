//! Persistence for provinces and administrative units.
//!
//! Every write is an upsert keyed by the source id, so re-running ingestion
//! overwrites rows in place and never produces duplicates.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::features::regions::models::{AdminUnit, Province, UpsertAdminUnit, UpsertProvince};

/// Postgres error code for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait RegionStore: Send + Sync {
    async fn upsert_province(&self, province: &UpsertProvince) -> Result<(), StoreError>;

    async fn upsert_unit(&self, unit: &UpsertAdminUnit) -> Result<(), StoreError>;

    /// All provinces ordered by id
    async fn list_provinces(&self) -> Result<Vec<Province>, StoreError>;

    /// Units of one province ordered by id
    async fn list_units_by_province(&self, province_id: i32)
        -> Result<Vec<AdminUnit>, StoreError>;

    /// Case-insensitive substring match on name or pre-merger description
    async fn search_units(&self, term: &str, limit: i64) -> Result<Vec<AdminUnit>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub struct PgRegionStore {
    pool: PgPool,
}

impl PgRegionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegionStore for PgRegionStore {
    async fn upsert_province(&self, province: &UpsertProvince) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO provinces (id, name, code, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id)
            DO UPDATE SET name = EXCLUDED.name, code = EXCLUDED.code, updated_at = NOW()
            "#,
        )
        .bind(province.id)
        .bind(&province.name)
        .bind(province.code)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert province {}: {:?}", province.id, e);
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn upsert_unit(&self, unit: &UpsertAdminUnit) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO admin_units
                (id, province_id, name, level, code, pre_merger_description,
                 latitude, longitude, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                province_id = EXCLUDED.province_id,
                name = EXCLUDED.name,
                level = EXCLUDED.level,
                code = EXCLUDED.code,
                pre_merger_description = EXCLUDED.pre_merger_description,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                updated_at = NOW()
            "#,
        )
        .bind(unit.id)
        .bind(unit.province_id)
        .bind(&unit.name)
        .bind(&unit.level)
        .bind(&unit.code)
        .bind(&unit.pre_merger_description)
        .bind(unit.latitude)
        .bind(unit.longitude)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let is_fk_violation = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
            if is_fk_violation {
                StoreError::Rejected(format!(
                    "unit {} references unknown province {}",
                    unit.id, unit.province_id
                ))
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn list_provinces(&self) -> Result<Vec<Province>, StoreError> {
        let provinces = sqlx::query_as::<_, Province>(
            r#"
            SELECT id, name, code, updated_at
            FROM provinces
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch provinces: {:?}", e);
            StoreError::Database(e)
        })?;

        Ok(provinces)
    }

    async fn list_units_by_province(
        &self,
        province_id: i32,
    ) -> Result<Vec<AdminUnit>, StoreError> {
        let units = sqlx::query_as::<_, AdminUnit>(
            r#"
            SELECT id, province_id, name, level, code, pre_merger_description,
                   latitude, longitude, updated_at
            FROM admin_units
            WHERE province_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(province_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to fetch units for province {}: {:?}",
                province_id,
                e
            );
            StoreError::Database(e)
        })?;

        Ok(units)
    }

    async fn search_units(&self, term: &str, limit: i64) -> Result<Vec<AdminUnit>, StoreError> {
        let units = sqlx::query_as::<_, AdminUnit>(
            r#"
            SELECT id, province_id, name, level, code, pre_merger_description,
                   latitude, longitude, updated_at
            FROM admin_units
            WHERE name ILIKE '%' || $1 || '%'
               OR pre_merger_description ILIKE '%' || $1 || '%'
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(term)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search units: {:?}", e);
            StoreError::Database(e)
        })?;

        Ok(units)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
