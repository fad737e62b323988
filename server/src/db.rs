use diesel::mysql::MysqlConnection;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};

use crate::data::DataError;

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<MysqlConnection>>;

/// Build the pool without opening connections up front, so the server can
/// start while the database is still coming up. Checkout failures surface
/// per request.
pub fn create_pool(database_url: &str, pool_size: u32) -> Result<DbPool, DataError> {
    let manager = ConnectionManager::<MysqlConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(pool_size)
        .min_idle(Some(0))
        .build(manager)
        .map_err(|e| DataError::Connection(e.to_string()))
}
