//! Location Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Location, LocationCreate, LocationUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "location";

#[derive(Clone)]
pub struct LocationRepository {
    base: BaseRepository,
}

impl LocationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active locations
    pub async fn find_all(&self) -> RepoResult<Vec<Location>> {
        let locations: Vec<Location> = self
            .base
            .db()
            .query("SELECT * FROM location WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(locations)
    }

    /// Find location by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Location>> {
        let thing = self.base.parse_id(id)?;
        let location: Option<Location> = self.base.db().select(thing).await?;
        Ok(location)
    }

    /// Find an active location by id — 预订链路入口使用
    ///
    /// 停用的门店与不存在等价 (不暴露存在性)。
    pub async fn find_active(&self, id: &str) -> RepoResult<Option<Location>> {
        Ok(self.find_by_id(id).await?.filter(|l| l.is_active))
    }

    /// Create a new location
    pub async fn create(&self, data: LocationCreate) -> RepoResult<Location> {
        let location = Location {
            id: None,
            name: data.name,
            timezone: data.timezone,
            policy: data.policy,
            is_active: true,
            is_public: data.is_public,
            created_at: Some(chrono::Utc::now().timestamp_millis()),
        };

        let created: Option<Location> = self.base.db().create(TABLE).content(location).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create location".to_string()))
    }

    /// Update a location
    pub async fn update(&self, id: &str, data: LocationUpdate) -> RepoResult<Location> {
        let thing = self.base.parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Location {} not found", id)))?;

        // 手动构建 UPDATE 语句，避免 id 字段被序列化为字符串
        let name = data.name.unwrap_or(existing.name);
        let timezone = data.timezone.unwrap_or(existing.timezone);
        let policy = data.policy.unwrap_or(existing.policy);
        let is_active = data.is_active.unwrap_or(existing.is_active);
        let is_public = data.is_public.unwrap_or(existing.is_public);

        self.base
            .db()
            .query(
                "UPDATE $thing SET name = $name, timezone = $timezone, policy = $policy, \
                 is_active = $is_active, is_public = $is_public",
            )
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("timezone", timezone))
            .bind(("policy", policy))
            .bind(("is_active", is_active))
            .bind(("is_public", is_public))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Location {} not found", id)))
    }

    /// Soft-deactivate a location (历史预订仍引用它，永不硬删除)
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
