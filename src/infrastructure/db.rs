use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create items table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            stock INTEGER NOT NULL DEFAULT 0,
            total INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create ledger_entries table (append-only)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            faculty TEXT NOT NULL,
            equipment TEXT NOT NULL,
            qty INTEGER NOT NULL,
            action TEXT NOT NULL, -- 'borrow', 'return', 'stat'
            is_backdate INTEGER NOT NULL DEFAULT 0,
            effective_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Indexes for the balance and history queries
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_student ON ledger_entries(student_id)"
            .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_equipment ON ledger_entries(equipment)"
            .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_effective_date ON ledger_entries(effective_date)"
            .to_owned(),
    ))
    .await?;

    // Migration 002: Add is_backdate to ledger_entries.
    // SQLite doesn't support IF NOT EXISTS in ALTER TABLE, so we ignore errors
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE ledger_entries ADD COLUMN is_backdate INTEGER NOT NULL DEFAULT 0"
                .to_owned(),
        ))
        .await;

    // Migration 003: Add total capacity to items (older databases tracked stock only)
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE items ADD COLUMN total INTEGER NOT NULL DEFAULT 0".to_owned(),
        ))
        .await;

    // Backfill: items predating the capacity column get total = stock
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "UPDATE items SET total = stock WHERE total < stock".to_owned(),
        ))
        .await;

    Ok(())
}
