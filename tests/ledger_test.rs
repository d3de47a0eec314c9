use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use stockroom::db;
use stockroom::domain::LedgerError;
use stockroom::models::item::ItemDto;
use stockroom::models::ledger_entry;
use stockroom::services::ledger_service::{
    self, BorrowAtomicity, BorrowLine, BorrowRequest, ItemLocks, STAT_FACULTY, STAT_STUDENT_ID,
};
use stockroom::services::stock_service;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Helper to create a test item with explicit stock and capacity
async fn create_test_item(db: &DatabaseConnection, name: &str, stock: i32, total: i32) {
    stock_service::create_item(
        db,
        ItemDto {
            name: name.to_string(),
            total,
            stock: Some(stock),
        },
    )
    .await
    .expect("Failed to create item");
}

async fn stock_of(db: &DatabaseConnection, name: &str) -> i32 {
    stock_service::find_by_name(db, name)
        .await
        .expect("item should exist")
        .stock
}

async fn entry_count(db: &DatabaseConnection) -> u64 {
    ledger_entry::Entity::find()
        .count(db)
        .await
        .expect("count should succeed")
}

fn request(student: &str, lines: &[(&str, i32)]) -> BorrowRequest {
    BorrowRequest {
        student_id: student.to_string(),
        faculty: "Engineering".to_string(),
        items: lines
            .iter()
            .map(|(equipment, qty)| BorrowLine {
                equipment: equipment.to_string(),
                qty: *qty,
            })
            .collect(),
        backdate: None,
    }
}

#[tokio::test]
async fn borrow_reduces_stock_and_appends_entry() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    let records = ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 3)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect("borrow should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, "S1");
    assert_eq!(records[0].action, "borrow");
    assert!(!records[0].is_backdate);
    assert_eq!(stock_of(&db, "Football").await, 7);
    assert_eq!(entry_count(&db).await, 1);
}

#[tokio::test]
async fn borrow_insufficient_stock_fails_and_stock_unchanged() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Badminton Racket", 0, 4).await;

    let err = ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Badminton Racket", 1)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect_err("borrow should fail");

    assert!(matches!(err, LedgerError::InsufficientStock(_)));
    assert_eq!(stock_of(&db, "Badminton Racket").await, 0);
    assert_eq!(entry_count(&db).await, 0);
}

#[tokio::test]
async fn borrow_unknown_item_fails_with_not_found() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();

    let err = ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Unicycle", 1)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect_err("borrow should fail");

    assert!(matches!(err, LedgerError::NotFound));
}

#[tokio::test]
async fn borrow_requires_student_and_faculty() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    let mut req = request("", &[("Football", 1)]);
    let err = ledger_service::borrow(&db, &locks, req.clone(), BorrowAtomicity::AllOrNothing)
        .await
        .expect_err("empty student should fail");
    assert!(matches!(err, LedgerError::Validation(_)));

    req.student_id = "S1".to_string();
    req.faculty = "  ".to_string();
    let err = ledger_service::borrow(&db, &locks, req, BorrowAtomicity::AllOrNothing)
        .await
        .expect_err("empty faculty should fail");
    assert!(matches!(err, LedgerError::Validation(_)));

    assert_eq!(stock_of(&db, "Football").await, 10);
}

#[tokio::test]
async fn borrow_rejects_non_positive_qty() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    let err = ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 0)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect_err("zero qty should fail");

    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(entry_count(&db).await, 0);
}

#[tokio::test]
async fn backdated_borrow_never_touches_stock() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 2, 10).await;

    // qty far above current stock; a backdated entry must still be accepted
    let mut req = request("S1", &[("Football", 50)]);
    req.backdate = Some("2024-01-15".to_string());

    let records = ledger_service::borrow(&db, &locks, req, BorrowAtomicity::AllOrNothing)
        .await
        .expect("backdated borrow should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, STAT_STUDENT_ID);
    assert_eq!(records[0].faculty, STAT_FACULTY);
    assert!(records[0].is_backdate);
    assert_eq!(records[0].effective_date, "2024-01-15");
    assert_eq!(stock_of(&db, "Football").await, 2);
}

#[tokio::test]
async fn backdated_borrow_rejects_invalid_date() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    let mut req = request("S1", &[("Football", 1)]);
    req.backdate = Some("15/01/2024".to_string());

    let err = ledger_service::borrow(&db, &locks, req, BorrowAtomicity::AllOrNothing)
        .await
        .expect_err("bad date should fail");
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn return_restores_stock_and_settles_balance() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 5)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect("borrow should succeed");
    assert_eq!(stock_of(&db, "Football").await, 5);

    let record = ledger_service::return_item(&db, &locks, "S1", "Engineering", "Football", 5)
        .await
        .expect("return should succeed");
    assert!(record.is_some());

    assert_eq!(stock_of(&db, "Football").await, 10);
    let balance = ledger_service::outstanding_balance(&db, "S1", "Football")
        .await
        .expect("balance should compute");
    assert_eq!(balance, 0);
}

#[tokio::test]
async fn partial_return_keeps_outstanding_balance() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 5)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect("borrow should succeed");

    ledger_service::return_item(&db, &locks, "S1", "Engineering", "Football", 2)
        .await
        .expect("return should succeed");

    assert_eq!(stock_of(&db, "Football").await, 7);
    let balance = ledger_service::outstanding_balance(&db, "S1", "Football")
        .await
        .expect("balance should compute");
    assert_eq!(balance, 3);
}

#[tokio::test]
async fn over_return_rejected_and_stock_unchanged() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 2)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect("borrow should succeed");

    let err = ledger_service::return_item(&db, &locks, "S1", "Engineering", "Football", 3)
        .await
        .expect_err("over-return should fail");

    assert!(matches!(err, LedgerError::OverReturn(_)));
    assert_eq!(stock_of(&db, "Football").await, 8);
    // Only the borrow entry exists
    assert_eq!(entry_count(&db).await, 1);
}

#[tokio::test]
async fn return_zero_qty_is_a_noop_success() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;

    let record = ledger_service::return_item(&db, &locks, "S1", "Engineering", "Football", 0)
        .await
        .expect("zero-qty return should succeed");

    assert!(record.is_none());
    assert_eq!(entry_count(&db).await, 0);
}

#[tokio::test]
async fn record_stat_leaves_stock_untouched() {
    let db = setup_test_db().await;
    create_test_item(&db, "Basketball", 8, 8).await;

    let record = ledger_service::record_stat(&db, "Basketball", 5, "2024-01-01")
        .await
        .expect("stat entry should succeed");

    assert_eq!(record.action, "stat");
    assert_eq!(record.student_id, STAT_STUDENT_ID);
    assert_eq!(record.effective_date, "2024-01-01");
    assert_eq!(stock_of(&db, "Basketball").await, 8);
}

#[tokio::test]
async fn record_stat_unknown_item_fails_with_not_found() {
    let db = setup_test_db().await;

    let err = ledger_service::record_stat(&db, "Unicycle", 5, "2024-01-01")
        .await
        .expect_err("stat for unknown item should fail");
    assert!(matches!(err, LedgerError::NotFound));
}

#[tokio::test]
async fn stat_entries_never_count_towards_balances() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Basketball", 8, 8).await;

    ledger_service::record_stat(&db, "Basketball", 5, "2024-01-01")
        .await
        .expect("stat entry should succeed");

    let balance = ledger_service::outstanding_balance(&db, STAT_STUDENT_ID, "Basketball")
        .await
        .expect("balance should compute");
    assert_eq!(balance, 0);

    let err = ledger_service::return_item(&db, &locks, STAT_STUDENT_ID, "-", "Basketball", 1)
        .await
        .expect_err("nothing outstanding to return");
    assert!(matches!(err, LedgerError::OverReturn(_)));
}

#[tokio::test]
async fn all_or_nothing_batch_rolls_back_on_failure() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;
    create_test_item(&db, "Basketball", 1, 8).await;

    let err = ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 2), ("Basketball", 5)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect_err("batch should fail on the second line");

    assert!(matches!(err, LedgerError::InsufficientStock(_)));
    // First line rolled back with the rest
    assert_eq!(stock_of(&db, "Football").await, 10);
    assert_eq!(stock_of(&db, "Basketball").await, 1);
    assert_eq!(entry_count(&db).await, 0);
}

#[tokio::test]
async fn legacy_per_line_mode_keeps_earlier_lines() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;
    create_test_item(&db, "Basketball", 1, 8).await;

    let err = ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 2), ("Basketball", 5)]),
        BorrowAtomicity::PerLine,
    )
    .await
    .expect_err("batch should fail on the second line");

    assert!(matches!(err, LedgerError::InsufficientStock(_)));
    // First line already committed; that is the documented legacy behavior
    assert_eq!(stock_of(&db, "Football").await, 8);
    assert_eq!(stock_of(&db, "Basketball").await, 1);
    assert_eq!(entry_count(&db).await, 1);
}

#[tokio::test]
async fn stock_adjust_rejects_exceeding_capacity() {
    let db = setup_test_db().await;
    create_test_item(&db, "Football", 10, 10).await;

    let err = stock_service::adjust(&db, "Football", 1)
        .await
        .expect_err("adjust above total should fail");

    assert!(matches!(err, LedgerError::CapacityExceeded(_)));
    assert_eq!(stock_of(&db, "Football").await, 10);
}

#[tokio::test]
async fn delete_item_refused_while_units_outstanding() {
    let db = setup_test_db().await;
    let locks = ItemLocks::new();
    create_test_item(&db, "Football", 10, 10).await;
    let item = stock_service::find_by_name(&db, "Football")
        .await
        .expect("item should exist");

    ledger_service::borrow(
        &db,
        &locks,
        request("S1", &[("Football", 3)]),
        BorrowAtomicity::AllOrNothing,
    )
    .await
    .expect("borrow should succeed");

    let err = stock_service::delete_item(&db, item.id)
        .await
        .expect_err("delete should be refused");
    assert!(matches!(err, LedgerError::Validation(_)));

    ledger_service::return_item(&db, &locks, "S1", "Engineering", "Football", 3)
        .await
        .expect("return should succeed");

    stock_service::delete_item(&db, item.id)
        .await
        .expect("delete should succeed once settled");
}
