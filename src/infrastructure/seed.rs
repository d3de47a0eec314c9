use crate::models::item;
use sea_orm::*;

/// Seed a demo equipment catalog. Existing items are left untouched.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let catalog = vec![
        ("Football", 10),
        ("Basketball", 8),
        ("Volleyball", 6),
        ("Badminton Racket", 12),
        ("Table Tennis Paddle", 10),
    ];

    for (name, total) in catalog {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let item = item::ActiveModel {
            name: Set(name.to_owned()),
            stock: Set(total),
            total: Set(total),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let res = item::Entity::insert(item)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(item::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;

        match res {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
