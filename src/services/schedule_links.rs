//! Reconciles the schedules owned by a room, student or teacher.
//!
//! Ownership lives only in the foreign key on `schedules`, so every operation
//! loads the currently linked ids, resolves the requested ids against the
//! store, and rewrites the foreign key of the set difference.

use std::collections::BTreeSet;

use sqlx::SqliteConnection;
use tracing::debug;

use crate::db::schedules::{self, ScheduleOwner};
use crate::db::{self, Table};
use crate::error::AppError;

async fn ensure_owner(conn: &mut SqliteConnection, owner: ScheduleOwner, owner_id: &str) -> Result<(), AppError> {
    if db::exists(conn, owner.table(), owner_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

async fn resolve(conn: &mut SqliteConnection, requested: &[String]) -> Result<BTreeSet<String>, AppError> {
    let ids = db::existing_ids(conn, Table::Schedules, requested).await?;
    Ok(ids.into_iter().collect())
}

/// Links the resolvable schedules not linked yet. Fails when none resolve.
pub async fn connect(
    conn: &mut SqliteConnection,
    owner: ScheduleOwner,
    owner_id: &str,
    requested: &[String],
) -> Result<(), AppError> {
    ensure_owner(conn, owner, owner_id).await?;
    let resolved = resolve(conn, requested).await?;
    if resolved.is_empty() {
        return Err(AppError::NotFound);
    }
    let linked = schedules::linked_schedule_ids(conn, owner, owner_id).await?;
    let added = schedules::set_owner(conn, owner, resolved.difference(&linked), Some(owner_id)).await?;
    debug!("{:?} {}: connected {} schedule(s)", owner, owner_id, added);
    Ok(())
}

/// Unlinks the requested schedules that are currently linked; others are
/// ignored.
pub async fn disconnect(
    conn: &mut SqliteConnection,
    owner: ScheduleOwner,
    owner_id: &str,
    requested: &[String],
) -> Result<(), AppError> {
    ensure_owner(conn, owner, owner_id).await?;
    let resolved = resolve(conn, requested).await?;
    let linked = schedules::linked_schedule_ids(conn, owner, owner_id).await?;
    let removed = schedules::set_owner(conn, owner, resolved.intersection(&linked), None).await?;
    debug!("{:?} {}: disconnected {} schedule(s)", owner, owner_id, removed);
    Ok(())
}

/// Makes the linked set exactly the resolvable subset of `requested`.
///
/// With `require_any`, an empty resolved set is a `NotFound` instead of
/// unlinking everything.
pub async fn replace(
    conn: &mut SqliteConnection,
    owner: ScheduleOwner,
    owner_id: &str,
    requested: &[String],
    require_any: bool,
) -> Result<(), AppError> {
    ensure_owner(conn, owner, owner_id).await?;
    let resolved = resolve(conn, requested).await?;
    if require_any && resolved.is_empty() {
        return Err(AppError::NotFound);
    }
    let linked = schedules::linked_schedule_ids(conn, owner, owner_id).await?;
    let removed = schedules::set_owner(conn, owner, linked.difference(&resolved), None).await?;
    let added = schedules::set_owner(conn, owner, resolved.difference(&linked), Some(owner_id)).await?;
    debug!(
        "{:?} {}: replaced schedules (+{} -{})",
        owner, owner_id, added, removed
    );
    Ok(())
}
