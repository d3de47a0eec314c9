//! Query Views - read-only projections over the ledger log
//!
//! Balances are recomputed from the entry log on every call rather than
//! cached, so the views cannot drift from the ledger. Empty inputs yield
//! empty collections, never errors.

use std::collections::{BTreeMap, HashMap};

use sea_orm::*;
use serde::Serialize;

use crate::domain::LedgerError;
use crate::models::ledger_entry::{self, Entity as LedgerEntry};
use crate::services::ledger_service::TxAction;

/// Display labels the front-end shows next to history rows.
pub const STATUS_BORROWED: &str = "กำลังยืม";
pub const STATUS_RETURNED: &str = "คืนแล้ว";

#[derive(Debug, Clone, Serialize)]
pub struct PendingItem {
    pub equipment: String,
    pub remaining: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingReturn {
    pub id: String,
    pub faculty: String,
    pub items: Vec<PendingItem>,
}

/// All (student, equipment) pairs with a positive outstanding balance,
/// grouped by student. Students and their items come back sorted.
pub async fn pending_returns(db: &DatabaseConnection) -> Result<Vec<PendingReturn>, LedgerError> {
    let entries = LedgerEntry::find()
        .filter(ledger_entry::Column::IsBackdate.eq(false))
        .filter(
            ledger_entry::Column::Action
                .is_in([TxAction::Borrow.as_str(), TxAction::Return.as_str()]),
        )
        .order_by_asc(ledger_entry::Column::Id)
        .all(db)
        .await?;

    let mut balances: BTreeMap<(String, String), i32> = BTreeMap::new();
    let mut faculties: HashMap<String, String> = HashMap::new();

    for entry in entries {
        let delta = if entry.action == TxAction::Borrow.as_str() {
            entry.qty
        } else {
            -entry.qty
        };
        *balances
            .entry((entry.student_id.clone(), entry.equipment.clone()))
            .or_insert(0) += delta;
        faculties.insert(entry.student_id, entry.faculty);
    }

    let mut grouped: BTreeMap<String, Vec<PendingItem>> = BTreeMap::new();
    for ((student, equipment), remaining) in balances {
        if remaining <= 0 {
            continue;
        }
        grouped
            .entry(student)
            .or_default()
            .push(PendingItem { equipment, remaining });
    }

    let result = grouped
        .into_iter()
        .map(|(id, items)| PendingReturn {
            faculty: faculties.get(&id).cloned().unwrap_or_default(),
            id,
            items,
        })
        .collect();

    Ok(result)
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i32,
    pub student_id: String,
    pub faculty: String,
    pub equipment: String,
    pub qty: i32,
    pub action: String,
    pub effective_date: String,
    pub created_at: String,
    /// Display status for the front-end.
    pub status: String,
}

/// Every entry whose effective date equals the given date, oldest first.
pub async fn history_for_date(
    db: &DatabaseConnection,
    date: &str,
) -> Result<Vec<HistoryEntry>, LedgerError> {
    let entries = LedgerEntry::find()
        .filter(ledger_entry::Column::EffectiveDate.eq(date))
        .order_by_asc(ledger_entry::Column::CreatedAt)
        .order_by_asc(ledger_entry::Column::Id)
        .all(db)
        .await?;

    let result = entries
        .into_iter()
        .map(|entry| {
            // Returns get the returned label; borrow and stat rows both
            // render among the borrow rows
            let status = if entry.action == TxAction::Return.as_str() {
                STATUS_RETURNED
            } else {
                STATUS_BORROWED
            };

            HistoryEntry {
                id: entry.id,
                student_id: entry.student_id,
                faculty: entry.faculty,
                equipment: entry.equipment,
                qty: entry.qty,
                action: entry.action,
                effective_date: entry.effective_date,
                created_at: entry.created_at,
                status: status.to_owned(),
            }
        })
        .collect();

    Ok(result)
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageRow {
    pub equipment: String,
    pub qty: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub rows: Vec<UsageRow>,
    pub total: i64,
}

/// Aggregate qty by equipment over `from ..= to`, optionally filtered by
/// action, sorted descending by total.
pub async fn usage_stats(
    db: &DatabaseConnection,
    from: &str,
    to: &str,
    action: Option<TxAction>,
) -> Result<UsageStats, LedgerError> {
    let mut query = LedgerEntry::find()
        .filter(ledger_entry::Column::EffectiveDate.between(from, to));

    if let Some(action) = action {
        query = query.filter(ledger_entry::Column::Action.eq(action.as_str()));
    }

    let entries = query.all(db).await?;

    let mut totals: HashMap<String, i64> = HashMap::new();
    for entry in entries {
        *totals.entry(entry.equipment).or_insert(0) += entry.qty as i64;
    }

    let mut rows: Vec<UsageRow> = totals
        .into_iter()
        .map(|(equipment, qty)| UsageRow { equipment, qty })
        .collect();
    rows.sort_by(|a, b| b.qty.cmp(&a.qty).then_with(|| a.equipment.cmp(&b.equipment)));

    let total = rows.iter().map(|r| r.qty).sum();

    Ok(UsageStats { rows, total })
}
