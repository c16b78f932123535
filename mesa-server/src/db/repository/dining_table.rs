//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active tables in a location
    pub async fn find_active_by_location(
        &self,
        location: &RecordId,
    ) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table WHERE location = $location AND is_active = true \
                 ORDER BY name",
            )
            .bind(("location", location.clone()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = self.base.parse_id(id)?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find table by name in location
    pub async fn find_by_name(
        &self,
        location: &RecordId,
        name: &str,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table WHERE location = $location AND name = $name LIMIT 1",
            )
            .bind(("location", location.clone()))
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    ///
    /// 校验容量区间非空 (min ≤ max) 与同店重名。
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        let min_capacity = data.min_capacity.unwrap_or(1);
        if min_capacity < 1 || data.max_capacity < min_capacity {
            return Err(RepoError::Validation(format!(
                "Invalid capacity range [{}, {}]",
                min_capacity, data.max_capacity
            )));
        }

        if self.find_by_name(&data.location, &data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists in this location",
                data.name
            )));
        }

        // 手动构建 CREATE 语句，保证 location 以 record id 而非字符串落库
        let mut result = self
            .base
            .db()
            .query(
                "CREATE dining_table CONTENT { \
                     name: $name, location: $location, \
                     min_capacity: $min_capacity, max_capacity: $max_capacity, \
                     combinable: $combinable, combination_group: $combination_group, \
                     is_active: true }",
            )
            .bind(("name", data.name))
            .bind(("location", data.location))
            .bind(("min_capacity", min_capacity))
            .bind(("max_capacity", data.max_capacity))
            .bind(("combinable", data.combinable))
            .bind(("combination_group", data.combination_group))
            .await?;
        let created: Vec<DiningTable> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a dining table
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        let thing = self.base.parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let min_capacity = data.min_capacity.unwrap_or(existing.min_capacity);
        let max_capacity = data.max_capacity.unwrap_or(existing.max_capacity);
        let combinable = data.combinable.unwrap_or(existing.combinable);
        let combination_group = data.combination_group.or(existing.combination_group);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        if min_capacity < 1 || max_capacity < min_capacity {
            return Err(RepoError::Validation(format!(
                "Invalid capacity range [{}, {}]",
                min_capacity, max_capacity
            )));
        }

        self.base
            .db()
            .query(
                "UPDATE $thing SET name = $name, min_capacity = $min_capacity, \
                 max_capacity = $max_capacity, combinable = $combinable, \
                 combination_group = $combination_group, is_active = $is_active",
            )
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("min_capacity", min_capacity))
            .bind(("max_capacity", max_capacity))
            .bind(("combinable", combinable))
            .bind(("combination_group", combination_group))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Soft-deactivate a dining table (历史预订仍引用它)
    pub async fn deactivate(&self, id: &str) -> RepoResult<bool> {
        let thing = self.base.parse_id(id)?;
        self.base
            .db()
            .query("UPDATE $thing SET is_active = false")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
