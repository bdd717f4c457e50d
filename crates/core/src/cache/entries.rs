//! Entry CRUD for a single named cache in SQLite.

use crate::cache::Cache;
use crate::{Error, RequestKey, Response};
use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::rusqlite;
use tokio_rusqlite::{Connection, params};

/// One named cache inside a [`CacheDb`](super::CacheDb).
#[derive(Clone, Debug)]
pub struct SqliteCache {
    conn: Connection,
    name: String,
}

impl SqliteCache {
    pub(crate) fn new(conn: Connection, name: &str) -> Self {
        Self { conn, name: name.to_string() }
    }
}

#[async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        let name = self.name.clone();
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT final_url, status, headers_json, body
                     FROM entries WHERE cache_name = ?1 AND method = ?2 AND url = ?3",
                )?;

                let row = stmt.query_row(params![name, key.method, key.url], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                });

                match row {
                    Ok((url, status, headers_json, body)) => {
                        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::CorruptEntry(format!("{key}: {e}")))?;
                        Ok(Some(Response { url, status, headers, body: Bytes::from(body) }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, key: &RequestKey, response: &Response) -> Result<(), Error> {
        let name = self.name.clone();
        let key = key.clone();
        let response = response.clone();
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (cache_name, method, url, final_url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(cache_name, method, url) DO UPDATE SET
                        final_url = excluded.final_url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        name,
                        key.method,
                        key.url,
                        response.url,
                        response.status,
                        headers_json,
                        response.body.as_ref(),
                        stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, key: &RequestKey) -> Result<bool, Error> {
        let name = self.name.clone();
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE cache_name = ?1 AND method = ?2 AND url = ?3",
                    params![name, key.method, key.url],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<RequestKey>, Error> {
        let name = self.name.clone();
        self.conn
            .call(move |conn| -> Result<Vec<RequestKey>, Error> {
                let mut stmt = conn.prepare("SELECT method, url FROM entries WHERE cache_name = ?1")?;
                let keys = stmt
                    .query_map(params![name], |row| Ok(RequestKey { method: row.get(0)?, url: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}
