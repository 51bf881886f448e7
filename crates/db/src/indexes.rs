use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index(bson::doc! { "team_ids": 1 }),
        ],
    )
    .await?;

    // Teams
    create_indexes(
        db,
        "teams",
        vec![
            index_unique(bson::doc! { "join_code": 1 }),
            index(bson::doc! { "members.user_id": 1 }),
        ],
    )
    .await?;

    // Tasks
    create_indexes(
        db,
        "tasks",
        vec![
            index(bson::doc! { "team_id": 1, "status": 1 }),
            index(bson::doc! { "team_id": 1, "assigned_to": 1 }),
            index(bson::doc! { "team_id": 1, "created_at": -1 }),
        ],
    )
    .await?;

    // Categories
    create_indexes(
        db,
        "categories",
        vec![index_unique(bson::doc! { "team_id": 1, "name": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
