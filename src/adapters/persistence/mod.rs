pub mod payment;
pub mod subscription;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub struct PostgresPersistence {
    pub pool: PgPool,
}

pub async fn postgres_persistence(database_url: &str) -> anyhow::Result<PostgresPersistence> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(PostgresPersistence { pool })
}
