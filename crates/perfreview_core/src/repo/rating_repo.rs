//! Competency rating repository contracts and SQLite implementation.
//!
//! # Invariants
//! - At most one row per (employee, competency) pair (store UNIQUE).
//! - Stored values are always in `1..=10` (store CHECK + `RatingValue`).

use super::sqlite::{parse_uuid, SqliteReviewRepository, NOW_MS_SQL};
use super::{RepoError, RepoResult};
use crate::model::employee::EmployeeId;
use crate::model::evaluation::{CompetencyRating, RatingValue};
use crate::model::profile::CompetencyId;
use rusqlite::{params, Row};
use uuid::Uuid;

const RATING_SELECT_SQL: &str = "SELECT
    id,
    employee_id,
    competency_id,
    rating,
    updated_at
FROM competency_ratings";

/// Repository interface for competency ratings.
pub trait RatingRepository {
    /// Lists every rating of one employee.
    fn list_ratings(&self, employee_id: EmployeeId) -> RepoResult<Vec<CompetencyRating>>;
    /// Looks up the rating for one exact pair.
    fn find_rating(
        &self,
        employee_id: EmployeeId,
        competency_id: CompetencyId,
    ) -> RepoResult<Option<CompetencyRating>>;
    /// Updates the rating of an existing pair in place.
    fn update_rating(
        &self,
        employee_id: EmployeeId,
        competency_id: CompetencyId,
        rating: RatingValue,
    ) -> RepoResult<()>;
    /// Inserts a rating for a pair that has none yet.
    fn insert_rating(
        &self,
        employee_id: EmployeeId,
        competency_id: CompetencyId,
        rating: RatingValue,
    ) -> RepoResult<CompetencyRating>;
}

impl RatingRepository for SqliteReviewRepository<'_> {
    fn list_ratings(&self, employee_id: EmployeeId) -> RepoResult<Vec<CompetencyRating>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RATING_SELECT_SQL} WHERE employee_id = ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([employee_id.to_string()])?;
        let mut ratings = Vec::new();
        while let Some(row) = rows.next()? {
            ratings.push(parse_rating_row(row)?);
        }
        Ok(ratings)
    }

    fn find_rating(
        &self,
        employee_id: EmployeeId,
        competency_id: CompetencyId,
    ) -> RepoResult<Option<CompetencyRating>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RATING_SELECT_SQL} WHERE employee_id = ?1 AND competency_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![employee_id.to_string(), competency_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_rating_row(row)?));
        }
        Ok(None)
    }

    fn update_rating(
        &self,
        employee_id: EmployeeId,
        competency_id: CompetencyId,
        rating: RatingValue,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE competency_ratings
                 SET
                    rating = ?3,
                    updated_at = {NOW_MS_SQL}
                 WHERE employee_id = ?1
                   AND competency_id = ?2;"
            ),
            params![
                employee_id.to_string(),
                competency_id.to_string(),
                i64::from(rating),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "competency rating",
                id: competency_id,
            });
        }
        Ok(())
    }

    fn insert_rating(
        &self,
        employee_id: EmployeeId,
        competency_id: CompetencyId,
        rating: RatingValue,
    ) -> RepoResult<CompetencyRating> {
        self.conn.execute(
            "INSERT INTO competency_ratings (id, employee_id, competency_id, rating)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                Uuid::new_v4().to_string(),
                employee_id.to_string(),
                competency_id.to_string(),
                i64::from(rating),
            ],
        )?;
        self.find_rating(employee_id, competency_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "inserted rating for competency {competency_id} not readable"
            ))
        })
    }
}

fn parse_rating_row(row: &Row<'_>) -> RepoResult<CompetencyRating> {
    let id_text: String = row.get("id")?;
    let employee_text: String = row.get("employee_id")?;
    let competency_text: String = row.get("competency_id")?;
    let raw_rating: i64 = row.get("rating")?;
    let rating = RatingValue::new(raw_rating).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid rating `{raw_rating}` in competency_ratings.rating"
        ))
    })?;

    Ok(CompetencyRating {
        id: parse_uuid(&id_text, "competency_ratings.id")?,
        employee_id: parse_uuid(&employee_text, "competency_ratings.employee_id")?,
        competency_id: parse_uuid(&competency_text, "competency_ratings.competency_id")?,
        rating,
        updated_at: row.get("updated_at")?,
    })
}
