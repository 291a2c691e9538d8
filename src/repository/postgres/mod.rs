//! PostgreSQL storage backend

mod equipment;
mod requests;
mod teams;
mod users;

use sqlx::{Pool, Postgres};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
