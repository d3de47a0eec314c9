use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row of the append-only equipment ledger. Entries are never updated or
/// deleted; undoing a loan means appending an offsetting `return` entry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Borrower id, or the `STAT_ONLY` sentinel for backdated entries.
    pub student_id: String,
    pub faculty: String,
    /// Item name this entry is booked against.
    pub equipment: String,
    pub qty: i32,
    /// Valid values:
    /// - `borrow`: stock left the shelf (unless backdated)
    /// - `return`: stock came back
    /// - `stat`: statistics-only backfill, no stock effect
    pub action: String,
    pub is_backdate: bool,
    /// Date the entry counts towards (YYYY-MM-DD). Equals the commit date
    /// unless the entry was backdated.
    pub effective_date: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
