//! Shift Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Shift, ShiftCreate, ShiftUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

/// 单日分钟数上限
const MINUTES_PER_DAY: i32 = 24 * 60;

#[derive(Clone)]
pub struct ShiftRepository {
    base: BaseRepository,
}

impl ShiftRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active shifts in a location
    pub async fn find_active_by_location(&self, location: &RecordId) -> RepoResult<Vec<Shift>> {
        let shifts: Vec<Shift> = self
            .base
            .db()
            .query(
                "SELECT * FROM shift WHERE location = $location AND is_active = true \
                 ORDER BY start_minutes",
            )
            .bind(("location", location.clone()))
            .await?
            .take(0)?;
        Ok(shifts)
    }

    /// Find shift by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Shift>> {
        let thing = self.base.parse_id(id)?;
        let shift: Option<Shift> = self.base.db().select(thing).await?;
        Ok(shift)
    }

    fn validate_window(days: &[u8], start_minutes: i32, end_minutes: i32) -> RepoResult<()> {
        if days.is_empty() || days.iter().any(|d| *d > 6) {
            return Err(RepoError::Validation(
                "Shift days must be non-empty values in 0..=6 (0 = Monday)".to_string(),
            ));
        }
        if start_minutes < 0
            || end_minutes > MINUTES_PER_DAY
            || start_minutes >= end_minutes
        {
            return Err(RepoError::Validation(format!(
                "Invalid shift window [{}, {}) — must satisfy 0 <= start < end <= {}",
                start_minutes, end_minutes, MINUTES_PER_DAY
            )));
        }
        Ok(())
    }

    /// Create a new shift
    pub async fn create(&self, data: ShiftCreate) -> RepoResult<Shift> {
        Self::validate_window(&data.days, data.start_minutes, data.end_minutes)?;
        if let Some(cap) = data.max_parallel
            && cap < 1
        {
            return Err(RepoError::Validation(
                "max_parallel must be at least 1".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                "CREATE shift CONTENT { \
                     location: $location, name: $name, days: $days, \
                     start_minutes: $start_minutes, end_minutes: $end_minutes, \
                     max_parallel: $max_parallel, is_active: true }",
            )
            .bind(("location", data.location))
            .bind(("name", data.name))
            .bind(("days", data.days))
            .bind(("start_minutes", data.start_minutes))
            .bind(("end_minutes", data.end_minutes))
            .bind(("max_parallel", data.max_parallel))
            .await?;
        let created: Vec<Shift> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create shift".to_string()))
    }

    /// Update a shift
    pub async fn update(&self, id: &str, data: ShiftUpdate) -> RepoResult<Shift> {
        let thing = self.base.parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Shift {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let days = data.days.unwrap_or(existing.days);
        let start_minutes = data.start_minutes.unwrap_or(existing.start_minutes);
        let end_minutes = data.end_minutes.unwrap_or(existing.end_minutes);
        let max_parallel = data.max_parallel.or(existing.max_parallel);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        Self::validate_window(&days, start_minutes, end_minutes)?;

        self.base
            .db()
            .query(
                "UPDATE $thing SET name = $name, days = $days, \
                 start_minutes = $start_minutes, end_minutes = $end_minutes, \
                 max_parallel = $max_parallel, is_active = $is_active",
            )
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("days", days))
            .bind(("start_minutes", start_minutes))
            .bind(("end_minutes", end_minutes))
            .bind(("max_parallel", max_parallel))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Shift {} not found", id)))
    }

    /// Deactivate a shift
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
