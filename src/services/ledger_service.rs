//! Ledger Engine - borrow/return/backfill commands over the append-only log
//!
//! Every command either completes or fails synchronously; a failed unit of
//! work leaves stock and ledger untouched. Stock adjustment and entry append
//! for an item happen inside one critical section keyed by item name.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use dashmap::DashMap;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::LedgerError;
use crate::models::ledger_entry::{self, Entity as LedgerEntry};
use crate::services::stock_service;

/// Sentinel borrower id for backdated statistics-only entries.
pub const STAT_STUDENT_ID: &str = "STAT_ONLY";
/// Faculty placeholder used alongside the sentinel.
pub const STAT_FACULTY: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    Borrow,
    Return,
    Stat,
}

impl TxAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxAction::Borrow => "borrow",
            TxAction::Return => "return",
            TxAction::Stat => "stat",
        }
    }

    pub fn parse(s: &str) -> Option<TxAction> {
        match s {
            "borrow" => Some(TxAction::Borrow),
            "return" => Some(TxAction::Return),
            "stat" => Some(TxAction::Stat),
            _ => None,
        }
    }
}

/// How a multi-line borrow submission commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorrowAtomicity {
    /// The whole batch commits in one transaction; any line failure rolls
    /// back every line.
    #[default]
    AllOrNothing,
    /// Legacy compatibility: each line commits independently; a failure
    /// leaves earlier lines applied.
    PerLine,
}

/// Per-item-name lock table. Commands take the locks for every item they
/// touch, in sorted order, before opening the database transaction, so two
/// concurrent borrows can never both read stale stock.
#[derive(Default)]
pub struct ItemLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ItemLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        lock.lock_owned().await
    }

    /// Acquire locks for all names in sorted, deduplicated order.
    async fn acquire_all(&self, names: &[String]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted: Vec<&String> = names.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for name in sorted {
            guards.push(self.acquire(name).await);
        }
        guards
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowLine {
    pub equipment: String,
    pub qty: i32,
}

#[derive(Debug, Clone)]
pub struct BorrowRequest {
    pub student_id: String,
    pub faculty: String,
    pub items: Vec<BorrowLine>,
    /// When set, the submission is a statistics-only backfill for this date.
    pub backdate: Option<String>,
}

/// Record a borrow submission. Returns the created entries.
pub async fn borrow(
    db: &DatabaseConnection,
    locks: &ItemLocks,
    req: BorrowRequest,
    atomicity: BorrowAtomicity,
) -> Result<Vec<ledger_entry::Model>, LedgerError> {
    if req.items.is_empty() {
        return Err(LedgerError::Validation(
            "at least one line item is required".to_string(),
        ));
    }
    for line in &req.items {
        if line.qty <= 0 {
            return Err(LedgerError::Validation(format!(
                "qty must be positive for '{}'",
                line.equipment
            )));
        }
    }

    // Backdated submissions bypass stock and are booked against the sentinel
    let (student_id, faculty, is_backdate, effective_date) = match &req.backdate {
        Some(date) => (
            STAT_STUDENT_ID.to_owned(),
            STAT_FACULTY.to_owned(),
            true,
            validate_date(date)?,
        ),
        None => {
            if req.student_id.trim().is_empty() {
                return Err(LedgerError::Validation("student_id is required".to_string()));
            }
            if req.faculty.trim().is_empty() {
                return Err(LedgerError::Validation("faculty is required".to_string()));
            }
            (
                req.student_id.clone(),
                req.faculty.clone(),
                false,
                Local::now().format("%Y-%m-%d").to_string(),
            )
        }
    };

    let names: Vec<String> = req.items.iter().map(|l| l.equipment.clone()).collect();
    let _guards = locks.acquire_all(&names).await;

    match atomicity {
        BorrowAtomicity::AllOrNothing => {
            let txn = db.begin().await?;
            let mut created = Vec::with_capacity(req.items.len());
            for line in &req.items {
                created.push(
                    commit_borrow_line(&txn, &student_id, &faculty, line, is_backdate, &effective_date)
                        .await?,
                );
            }
            txn.commit().await?;
            Ok(created)
        }
        BorrowAtomicity::PerLine => {
            let mut created = Vec::with_capacity(req.items.len());
            for line in &req.items {
                let txn = db.begin().await?;
                let entry =
                    commit_borrow_line(&txn, &student_id, &faculty, line, is_backdate, &effective_date)
                        .await?;
                txn.commit().await?;
                tracing::warn!(
                    equipment = %line.equipment,
                    "per-line borrow commit (legacy mode)"
                );
                created.push(entry);
            }
            Ok(created)
        }
    }
}

async fn commit_borrow_line<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    faculty: &str,
    line: &BorrowLine,
    is_backdate: bool,
    effective_date: &str,
) -> Result<ledger_entry::Model, LedgerError> {
    if is_backdate {
        // Statistics-only: the item must still exist, but stock is untouched
        stock_service::find_by_name(conn, &line.equipment).await?;
    } else {
        stock_service::adjust(conn, &line.equipment, -line.qty).await?;
    }

    append_entry(
        conn,
        student_id,
        faculty,
        &line.equipment,
        line.qty,
        TxAction::Borrow,
        is_backdate,
        effective_date,
    )
    .await
}

/// Record a return for a (student, equipment) pair. A zero qty is treated as
/// "nothing to return" and succeeds without appending anything.
pub async fn return_item(
    db: &DatabaseConnection,
    locks: &ItemLocks,
    student_id: &str,
    faculty: &str,
    equipment: &str,
    qty: i32,
) -> Result<Option<ledger_entry::Model>, LedgerError> {
    if qty < 0 {
        return Err(LedgerError::Validation("qty must not be negative".to_string()));
    }
    if qty == 0 {
        return Ok(None);
    }
    if student_id.trim().is_empty() {
        return Err(LedgerError::Validation("student_id is required".to_string()));
    }

    let _guard = locks.acquire(equipment).await;

    let txn = db.begin().await?;

    stock_service::find_by_name(&txn, equipment).await?;

    let balance = outstanding_balance(&txn, student_id, equipment).await?;
    if qty > balance {
        return Err(LedgerError::OverReturn(format!(
            "{}: requested {} but only {} outstanding for {}",
            equipment, qty, balance, student_id
        )));
    }

    stock_service::adjust(&txn, equipment, qty).await?;

    let entry = append_entry(
        &txn,
        student_id,
        faculty,
        equipment,
        qty,
        TxAction::Return,
        false,
        &Local::now().format("%Y-%m-%d").to_string(),
    )
    .await?;

    txn.commit().await?;
    Ok(Some(entry))
}

/// Append a statistics-only entry for historical backfill. Never touches
/// stock and is never tied to a live student balance.
pub async fn record_stat(
    db: &DatabaseConnection,
    equipment: &str,
    qty: i32,
    effective_date: &str,
) -> Result<ledger_entry::Model, LedgerError> {
    if qty <= 0 {
        return Err(LedgerError::Validation("qty must be positive".to_string()));
    }
    let date = validate_date(effective_date)?;

    stock_service::find_by_name(db, equipment).await?;

    append_entry(
        db,
        STAT_STUDENT_ID,
        STAT_FACULTY,
        equipment,
        qty,
        TxAction::Stat,
        true,
        &date,
    )
    .await
}

/// Net unreturned quantity for a (student, equipment) pair, recomputed from
/// the log. Stat and backdated entries never count.
pub async fn outstanding_balance<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    equipment: &str,
) -> Result<i32, LedgerError> {
    let entries = LedgerEntry::find()
        .filter(ledger_entry::Column::StudentId.eq(student_id))
        .filter(ledger_entry::Column::Equipment.eq(equipment))
        .filter(ledger_entry::Column::IsBackdate.eq(false))
        .filter(
            ledger_entry::Column::Action
                .is_in([TxAction::Borrow.as_str(), TxAction::Return.as_str()]),
        )
        .all(conn)
        .await?;

    let mut balance = 0;
    for entry in entries {
        if entry.action == TxAction::Borrow.as_str() {
            balance += entry.qty;
        } else {
            balance -= entry.qty;
        }
    }
    Ok(balance)
}

/// Total outstanding units across all students for one item.
pub async fn equipment_outstanding_total<C: ConnectionTrait>(
    conn: &C,
    equipment: &str,
) -> Result<i32, LedgerError> {
    let entries = LedgerEntry::find()
        .filter(ledger_entry::Column::Equipment.eq(equipment))
        .filter(ledger_entry::Column::IsBackdate.eq(false))
        .filter(
            ledger_entry::Column::Action
                .is_in([TxAction::Borrow.as_str(), TxAction::Return.as_str()]),
        )
        .all(conn)
        .await?;

    let mut total = 0;
    for entry in entries {
        if entry.action == TxAction::Borrow.as_str() {
            total += entry.qty;
        } else {
            total -= entry.qty;
        }
    }
    Ok(total)
}

#[allow(clippy::too_many_arguments)]
async fn append_entry<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    faculty: &str,
    equipment: &str,
    qty: i32,
    action: TxAction,
    is_backdate: bool,
    effective_date: &str,
) -> Result<ledger_entry::Model, LedgerError> {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let entry = ledger_entry::ActiveModel {
        student_id: Set(student_id.to_owned()),
        faculty: Set(faculty.to_owned()),
        equipment: Set(equipment.to_owned()),
        qty: Set(qty),
        action: Set(action.as_str().to_owned()),
        is_backdate: Set(is_backdate),
        effective_date: Set(effective_date.to_owned()),
        created_at: Set(now),
        ..Default::default()
    };

    let saved = entry.insert(conn).await?;
    Ok(saved)
}

fn validate_date(s: &str) -> Result<String, LedgerError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| LedgerError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", s)))
}
