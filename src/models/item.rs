use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique catalog name; ledger entries reference items by this name.
    pub name: String,
    /// Units currently on the shelf. Invariant: 0 <= stock <= total.
    pub stock: i32,
    /// Total capacity owned by the facility.
    pub total: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Payload for staff catalog management.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemDto {
    pub name: String,
    pub total: i32,
    pub stock: Option<i32>,
}
