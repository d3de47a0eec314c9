//! Stock Store - per-item available/total counts
//!
//! Stock is mutated only through `adjust`; the Ledger Engine calls it inside
//! its per-item critical section. Staff catalog management (create/update/
//! delete) also lives here since it drives the same records.

use chrono::Local;
use sea_orm::*;

use crate::domain::LedgerError;
use crate::models::item::{self, Entity as Item, ItemDto};
use crate::models::ledger_entry::{self, Entity as LedgerEntry};

/// List all items, ordered by name.
pub async fn list_items(db: &DatabaseConnection) -> Result<Vec<item::Model>, LedgerError> {
    let items = Item::find()
        .order_by_asc(item::Column::Name)
        .all(db)
        .await?;
    Ok(items)
}

pub async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<item::Model, LedgerError> {
    Item::find()
        .filter(item::Column::Name.eq(name))
        .one(conn)
        .await?
        .ok_or(LedgerError::NotFound)
}

/// Apply a stock delta to an item. Fails without touching the record if the
/// result would fall below zero or exceed the item's total capacity.
pub async fn adjust<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    delta: i32,
) -> Result<item::Model, LedgerError> {
    let item = find_by_name(conn, name).await?;

    let new_stock = item.stock + delta;
    if new_stock < 0 {
        return Err(LedgerError::InsufficientStock(format!(
            "{}: requested {} but only {} available",
            name, -delta, item.stock
        )));
    }
    if new_stock > item.total {
        return Err(LedgerError::CapacityExceeded(format!(
            "{}: stock {} would exceed total {}",
            name, new_stock, item.total
        )));
    }

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut active: item::ActiveModel = item.into();
    active.stock = Set(new_stock);
    active.updated_at = Set(now);
    let updated = active.update(conn).await?;

    Ok(updated)
}

/// Create a catalog item. Stock defaults to the total capacity.
pub async fn create_item(
    db: &DatabaseConnection,
    dto: ItemDto,
) -> Result<item::Model, LedgerError> {
    let name = dto.name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation("name is required".to_string()));
    }
    if dto.total < 0 {
        return Err(LedgerError::Validation("total must not be negative".to_string()));
    }
    let stock = dto.stock.unwrap_or(dto.total);
    if stock < 0 || stock > dto.total {
        return Err(LedgerError::Validation(format!(
            "stock must be between 0 and {}",
            dto.total
        )));
    }

    if Item::find()
        .filter(item::Column::Name.eq(name))
        .one(db)
        .await?
        .is_some()
    {
        return Err(LedgerError::Validation(format!(
            "item '{}' already exists",
            name
        )));
    }

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let new_item = item::ActiveModel {
        name: Set(name.to_owned()),
        stock: Set(stock),
        total: Set(dto.total),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_item.insert(db).await?;
    Ok(saved)
}

/// Update a catalog item. Renaming is refused once ledger entries reference
/// the item, since entries are keyed by name.
pub async fn update_item(
    db: &DatabaseConnection,
    id: i32,
    name: Option<String>,
    stock: Option<i32>,
    total: Option<i32>,
) -> Result<item::Model, LedgerError> {
    let item = Item::find_by_id(id)
        .one(db)
        .await?
        .ok_or(LedgerError::NotFound)?;

    let new_name = name.unwrap_or_else(|| item.name.clone());
    let new_stock = stock.unwrap_or(item.stock);
    let new_total = total.unwrap_or(item.total);

    if new_name.trim().is_empty() {
        return Err(LedgerError::Validation("name is required".to_string()));
    }
    if new_stock < 0 || new_total < 0 || new_stock > new_total {
        return Err(LedgerError::Validation(format!(
            "stock must be between 0 and {}",
            new_total
        )));
    }

    if new_name != item.name {
        let referenced = LedgerEntry::find()
            .filter(ledger_entry::Column::Equipment.eq(&item.name))
            .count(db)
            .await?;
        if referenced > 0 {
            return Err(LedgerError::Validation(format!(
                "cannot rename '{}': ledger entries reference it",
                item.name
            )));
        }
    }

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut active: item::ActiveModel = item.into();
    active.name = Set(new_name);
    active.stock = Set(new_stock);
    active.total = Set(new_total);
    active.updated_at = Set(now);
    let updated = active.update(db).await?;

    Ok(updated)
}

/// Delete a catalog item. Refused while any outstanding balance still
/// references it; the ledger history itself is never deleted.
pub async fn delete_item(db: &DatabaseConnection, id: i32) -> Result<(), LedgerError> {
    let item = Item::find_by_id(id)
        .one(db)
        .await?
        .ok_or(LedgerError::NotFound)?;

    let outstanding =
        crate::services::ledger_service::equipment_outstanding_total(db, &item.name).await?;
    if outstanding > 0 {
        return Err(LedgerError::Validation(format!(
            "cannot delete '{}': {} unit(s) still outstanding",
            item.name, outstanding
        )));
    }

    Item::delete_by_id(id).exec(db).await?;
    Ok(())
}
