use async_trait::async_trait;

use super::error::RemoteError;
use super::sqlite::SqliteConnection;

/// table level helpers shared by the sqlite backed daos
#[async_trait]
pub trait Dao {
    fn connection(&self) -> &SqliteConnection;

    fn table_name(&self) -> &'static str;

    /// check if the table exists
    async fn check_table(&self) -> Result<bool, RemoteError> {
        let conn = self.connection().open().await?;
        let table_name = self.table_name();

        let result = conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
                let mut rows = stmt.query([table_name])?;
                let exists = rows.next()?.is_some();
                Ok(exists)
            })
            .await?;
        Ok(result)
    }

    /// create the table
    async fn create_table(&self) -> Result<(), RemoteError>;

    /// drop the table
    async fn drop_table(&self) -> Result<(), RemoteError> {
        let conn = self.connection().open().await?;
        let sql = format!("DROP TABLE IF EXISTS {}", self.table_name());
        conn.call(move |conn| conn.execute(sql.as_str(), ())).await?;
        Ok(())
    }

    async fn ensure_table_exist(&self) -> Result<(), RemoteError> {
        if !self.check_table().await? {
            self.create_table().await?;
        }
        Ok(())
    }
}
