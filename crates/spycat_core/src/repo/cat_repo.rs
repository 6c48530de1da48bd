//! Cat repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `cats` table.
//! - Keep salary encoding (decimal text) inside the persistence boundary.
//!
//! # Invariants
//! - Deleting a cat never deletes a mission; the store detaches it via
//!   `ON DELETE SET NULL`.
//! - Read paths reject corrupt rows instead of masking them.

use crate::db::ensure_schema_ready;
use crate::model::cat::{Cat, CatId};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

const CAT_SELECT_SQL: &str = "SELECT
    id,
    name,
    years_of_experience,
    breed,
    salary
FROM cats";

/// Repository interface for cat persistence.
pub trait CatRepository {
    fn create_cat(&self, cat: &Cat) -> RepoResult<CatId>;
    fn get_cat(&self, id: CatId) -> RepoResult<Option<Cat>>;
    /// Lists cats in creation order.
    fn list_cats(&self) -> RepoResult<Vec<Cat>>;
    /// Replaces every mutable column of an existing cat.
    fn update_cat(&self, cat: &Cat) -> RepoResult<()>;
    fn update_salary(&self, id: CatId, salary: Decimal) -> RepoResult<()>;
    fn delete_cat(&self, id: CatId) -> RepoResult<()>;
}

/// SQLite-backed cat repository.
pub struct SqliteCatRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CatRepository for SqliteCatRepository<'_> {
    fn create_cat(&self, cat: &Cat) -> RepoResult<CatId> {
        self.conn.execute(
            "INSERT INTO cats (id, name, years_of_experience, breed, salary)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                cat.id.to_string(),
                cat.name.as_str(),
                cat.years_of_experience,
                cat.breed.as_str(),
                cat.salary.to_string(),
            ],
        )?;
        Ok(cat.id)
    }

    fn get_cat(&self, id: CatId) -> RepoResult<Option<Cat>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_cat_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_cats(&self) -> RepoResult<Vec<Cat>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut cats = Vec::new();
        while let Some(row) = rows.next()? {
            cats.push(parse_cat_row(row)?);
        }
        Ok(cats)
    }

    fn update_cat(&self, cat: &Cat) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cats
             SET
                name = ?2,
                years_of_experience = ?3,
                breed = ?4,
                salary = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                cat.id.to_string(),
                cat.name.as_str(),
                cat.years_of_experience,
                cat.breed.as_str(),
                cat.salary.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::CatNotFound(cat.id));
        }
        Ok(())
    }

    fn update_salary(&self, id: CatId, salary: Decimal) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cats
             SET
                salary = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), salary.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::CatNotFound(id));
        }
        Ok(())
    }

    fn delete_cat(&self, id: CatId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM cats WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::CatNotFound(id));
        }
        Ok(())
    }
}

fn parse_cat_row(row: &Row<'_>) -> RepoResult<Cat> {
    let id_text: String = row.get("id")?;
    let salary_text: String = row.get("salary")?;
    let salary = Decimal::from_str(&salary_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid salary value `{salary_text}` in cats.salary"))
    })?;

    Ok(Cat {
        id: parse_uuid(&id_text, "cats.id")?,
        name: row.get("name")?,
        years_of_experience: row.get("years_of_experience")?,
        breed: row.get("breed")?,
        salary,
    })
}
