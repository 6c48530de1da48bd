//! Mission aggregate repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist missions together with their owned targets.
//! - Apply composite mission updates in a single transaction.
//! - Keep `missions.is_completed` in step with target rows.
//!
//! # Invariants
//! - Every write that touches targets recomputes mission completion before
//!   commit, so readers never see a stale flag.
//! - Inside a composite update the order is: cat link, target updates,
//!   target creates, prune, completion recompute.
//! - Deleting a mission cascades to its targets via the foreign key.

use crate::db::ensure_schema_ready;
use crate::model::cat::CatId;
use crate::model::mission::{Mission, MissionId, Target, TargetId};
use crate::repo::{bool_to_int, is_unique_violation, parse_bool, parse_uuid, RepoError, RepoResult};
use crate::rules::derive_mission_completion;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const TARGET_SELECT_SQL: &str = "SELECT
    id,
    mission_id,
    name,
    country,
    notes,
    is_completed
FROM targets";

/// Write model for one composite mission update.
///
/// Built by the service after every rule passed; the repository applies it
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionUpdatePlan {
    pub mission: MissionId,
    /// `Some(link)` replaces the cat link; `None` leaves it alone.
    pub cat: Option<Option<CatId>>,
    /// Existing targets with changes already applied.
    pub updated: Vec<Target>,
    pub created: Vec<Target>,
    /// Targets owned by the mission that the update no longer lists.
    pub pruned: Vec<TargetId>,
}

/// Repository interface for mission/target persistence.
pub trait MissionRepository {
    /// Inserts the mission row and all of its targets.
    fn create_mission(&mut self, mission: &Mission) -> RepoResult<MissionId>;
    fn get_mission(&self, id: MissionId) -> RepoResult<Option<Mission>>;
    /// Lists missions in creation order, each with its targets.
    fn list_missions(&self) -> RepoResult<Vec<Mission>>;
    fn get_target(&self, id: TargetId) -> RepoResult<Option<Target>>;
    fn cat_exists(&self, cat: CatId) -> RepoResult<bool>;
    /// The mission currently linked to `cat`, if any.
    fn mission_for_cat(&self, cat: CatId) -> RepoResult<Option<MissionId>>;
    fn set_mission_cat(&mut self, mission: MissionId, cat: Option<CatId>) -> RepoResult<()>;
    fn apply_update(&mut self, plan: &MissionUpdatePlan) -> RepoResult<()>;
    /// Persists one target and recomputes its mission's completion.
    fn update_target(&mut self, target: &Target) -> RepoResult<()>;
    fn delete_mission(&mut self, id: MissionId) -> RepoResult<()>;
}

/// SQLite-backed mission repository.
pub struct SqliteMissionRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMissionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn begin(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl MissionRepository for SqliteMissionRepository<'_> {
    fn create_mission(&mut self, mission: &Mission) -> RepoResult<MissionId> {
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO missions (id, cat_id) VALUES (?1, ?2);",
            params![mission.id.to_string(), mission.cat.map(|cat| cat.to_string())],
        )
        .map_err(|err| map_cat_link_error(err, mission.cat))?;

        for target in &mission.targets {
            insert_target(&tx, target)?;
        }
        propagate_completion(&tx, mission.id)?;
        tx.commit()?;

        Ok(mission.id)
    }

    fn get_mission(&self, id: MissionId) -> RepoResult<Option<Mission>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, cat_id, is_completed FROM missions WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some(columns) => Ok(Some(build_mission(self.conn, columns)?)),
            None => Ok(None),
        }
    }

    fn list_missions(&self) -> RepoResult<Vec<Mission>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, cat_id, is_completed FROM missions ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut missions = Vec::new();
        while let Some(row) = rows.next()? {
            let columns = (row.get(0)?, row.get(1)?, row.get(2)?);
            missions.push(build_mission(self.conn, columns)?);
        }
        Ok(missions)
    }

    fn get_target(&self, id: TargetId) -> RepoResult<Option<Target>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TARGET_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_target_row(row)?)),
            None => Ok(None),
        }
    }

    fn cat_exists(&self, cat: CatId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cats WHERE id = ?1);",
            [cat.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn mission_for_cat(&self, cat: CatId) -> RepoResult<Option<MissionId>> {
        let mission: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM missions WHERE cat_id = ?1;",
                [cat.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        mission
            .map(|id| parse_uuid(&id, "missions.id"))
            .transpose()
    }

    fn set_mission_cat(&mut self, mission: MissionId, cat: Option<CatId>) -> RepoResult<()> {
        let tx = self.begin()?;
        link_cat(&tx, mission, cat)?;
        tx.commit()?;
        Ok(())
    }

    fn apply_update(&mut self, plan: &MissionUpdatePlan) -> RepoResult<()> {
        let tx = self.begin()?;
        if !mission_exists(&tx, plan.mission)? {
            return Err(RepoError::MissionNotFound(plan.mission));
        }

        if let Some(cat) = plan.cat {
            link_cat(&tx, plan.mission, cat)?;
        }
        for target in &plan.updated {
            write_target(&tx, target)?;
        }
        for target in &plan.created {
            insert_target(&tx, target)?;
        }
        for id in &plan.pruned {
            tx.execute(
                "DELETE FROM targets WHERE id = ?1 AND mission_id = ?2;",
                params![id.to_string(), plan.mission.to_string()],
            )?;
        }
        propagate_completion(&tx, plan.mission)?;
        tx.commit()?;

        Ok(())
    }

    fn update_target(&mut self, target: &Target) -> RepoResult<()> {
        let tx = self.begin()?;
        write_target(&tx, target)?;
        propagate_completion(&tx, target.mission)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_mission(&mut self, id: MissionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM missions WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::MissionNotFound(id));
        }
        Ok(())
    }
}

/// Recomputes `missions.is_completed` from the mission's current targets.
///
/// Idempotent: identical target states always produce the same flag.
fn propagate_completion(tx: &Transaction<'_>, mission: MissionId) -> RepoResult<bool> {
    let mut stmt = tx.prepare("SELECT is_completed FROM targets WHERE mission_id = ?1;")?;
    let mut rows = stmt.query([mission.to_string()])?;
    let mut states = Vec::new();
    while let Some(row) = rows.next()? {
        states.push(parse_bool(row.get(0)?, "targets.is_completed")?);
    }

    let is_completed = derive_mission_completion(states);
    tx.execute(
        "UPDATE missions
         SET
            is_completed = ?2,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1
           AND is_completed <> ?2;",
        params![mission.to_string(), bool_to_int(is_completed)],
    )?;
    debug!(
        "event=mission_completion module=repo status=ok mission_id={mission} is_completed={is_completed}"
    );
    Ok(is_completed)
}

fn link_cat(tx: &Transaction<'_>, mission: MissionId, cat: Option<CatId>) -> RepoResult<()> {
    let changed = tx
        .execute(
            "UPDATE missions
             SET
                cat_id = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![mission.to_string(), cat.map(|cat| cat.to_string())],
        )
        .map_err(|err| map_cat_link_error(err, cat))?;
    if changed == 0 {
        return Err(RepoError::MissionNotFound(mission));
    }
    Ok(())
}

fn insert_target(tx: &Transaction<'_>, target: &Target) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO targets (id, mission_id, name, country, notes, is_completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            target.id.to_string(),
            target.mission.to_string(),
            target.name.as_str(),
            target.country.as_str(),
            target.notes.as_str(),
            bool_to_int(target.is_completed),
        ],
    )
    .map_err(|err| map_target_name_error(err, target))?;
    Ok(())
}

fn write_target(tx: &Transaction<'_>, target: &Target) -> RepoResult<()> {
    let changed = tx
        .execute(
            "UPDATE targets
             SET
                name = ?3,
                country = ?4,
                notes = ?5,
                is_completed = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND mission_id = ?2;",
            params![
                target.id.to_string(),
                target.mission.to_string(),
                target.name.as_str(),
                target.country.as_str(),
                target.notes.as_str(),
                bool_to_int(target.is_completed),
            ],
        )
        .map_err(|err| map_target_name_error(err, target))?;
    if changed == 0 {
        return Err(RepoError::TargetNotFound(target.id));
    }
    Ok(())
}

fn mission_exists(tx: &Transaction<'_>, mission: MissionId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM missions WHERE id = ?1);",
        [mission.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn build_mission(
    conn: &Connection,
    (id_text, cat_text, is_completed): (String, Option<String>, i64),
) -> RepoResult<Mission> {
    let id = parse_uuid(&id_text, "missions.id")?;
    let cat = cat_text
        .map(|value| parse_uuid(&value, "missions.cat_id"))
        .transpose()?;

    Ok(Mission {
        id,
        cat,
        is_completed: parse_bool(is_completed, "missions.is_completed")?,
        targets: load_targets(conn, id)?,
    })
}

fn load_targets(conn: &Connection, mission: MissionId) -> RepoResult<Vec<Target>> {
    let mut stmt = conn.prepare(&format!(
        "{TARGET_SELECT_SQL} WHERE mission_id = ?1 ORDER BY rowid ASC;"
    ))?;
    let mut rows = stmt.query([mission.to_string()])?;
    let mut targets = Vec::new();
    while let Some(row) = rows.next()? {
        targets.push(parse_target_row(row)?);
    }
    Ok(targets)
}

fn parse_target_row(row: &Row<'_>) -> RepoResult<Target> {
    let id_text: String = row.get("id")?;
    let mission_text: String = row.get("mission_id")?;
    Ok(Target {
        id: parse_uuid(&id_text, "targets.id")?,
        mission: parse_uuid(&mission_text, "targets.mission_id")?,
        name: row.get("name")?,
        country: row.get("country")?,
        notes: row.get("notes")?,
        is_completed: parse_bool(row.get("is_completed")?, "targets.is_completed")?,
    })
}

fn map_target_name_error(err: rusqlite::Error, target: &Target) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateTargetName {
            mission: target.mission,
            name: target.name.clone(),
        }
    } else {
        err.into()
    }
}

fn map_cat_link_error(err: rusqlite::Error, cat: Option<CatId>) -> RepoError {
    match cat {
        Some(cat) if is_unique_violation(&err) => RepoError::CatAlreadyAssigned(cat),
        _ => err.into(),
    }
}
