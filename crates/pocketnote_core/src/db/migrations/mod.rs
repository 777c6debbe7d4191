//! Notes schema history.
//!
//! | version | name            | change                                           |
//! |---------|-----------------|--------------------------------------------------|
//! | 1       | `notes_init`    | `notes` table keyed by `uuid`, epoch-ms stamps   |
//! | 2       | `note_revision` | `revision` commit counter that drives list order |
//!
//! Steps run in one transaction and the reached version is mirrored to
//! `PRAGMA user_version`. A file written by a newer build is refused rather
//! than partially understood.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const NOTES_SCHEMA: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "notes_init",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "note_revision",
        sql: include_str!("0002_note_revision.sql"),
    },
];

/// Newest notes schema version this build can read and write.
pub fn latest_version() -> u32 {
    NOTES_SCHEMA.last().map_or(0, |step| step.version)
}

/// Brings the notes schema on `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let to = latest_version();

    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }
    if from == to {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in NOTES_SCHEMA.iter().skip_while(|step| step.version <= from) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={to}");
    Ok(())
}
