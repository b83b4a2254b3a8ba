use crate::{links, Result};
use log::info;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Database, IndexModel,
};

async fn mongo_ensure_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<(Document, bool)>,
) -> Result<()> {
    #[allow(unused_must_use)]
    {
        // ignore error: the collection might already exist
        db.create_collection(collection, None).await;
    }

    db.collection::<Document>(collection)
        .create_indexes(
            indexes.into_iter().map(|(spec, unique)| {
                IndexModel::builder()
                    .keys(spec)
                    .options(IndexOptions::builder().unique(unique).build())
                    .build()
            }),
            None,
        )
        .await?;

    Ok(())
}

pub async fn mongo(db: &Database) -> Result<()> {
    info!("Building MongoDB indexes...");
    mongo_ensure_indexes(
        db,
        links::COLLECTION_NAME,
        vec![(doc! { "post_id": 1 }, true), (doc! { "user_id": 1 }, false)],
    )
    .await?;

    Ok(())
}
