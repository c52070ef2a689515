//! Entry CRUD operations within a named store.

use super::connection::CacheDb;
use crate::{Error, Request, Response};
use tokio_rusqlite::{params, rusqlite};

/// Column values for one stored response, owned so they can cross into the
/// database thread.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: i64,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn encode(request: &Request, response: &Response) -> Result<Self, Error> {
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
        Ok(Self {
            key_hash: request.key(),
            method: request.method().to_string(),
            url: request.url().to_string(),
            status: i64::from(response.status),
            headers_json,
            body: response.body.to_vec(),
        })
    }
}

fn decode_response(status: i64, headers_json: &str, body: Vec<u8>) -> Result<Response, Error> {
    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?;
    let headers: Vec<(String, String)> =
        serde_json::from_str(headers_json).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
    Ok(Response { status, headers, body: body.into() })
}

fn upsert(conn: &rusqlite::Connection, store: &str, row: &EntryRow, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
        params![store, now],
    )?;
    conn.execute(
        "INSERT INTO entries (store, key_hash, method, url, status, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(store, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![store, &row.key_hash, &row.method, &row.url, row.status, &row.headers_json, &row.body, now],
    )?;
    Ok(())
}

impl CacheDb {
    /// Look up the stored response for `request` in `store`.
    ///
    /// A missing store and a missing key are both `Ok(None)`.
    pub async fn get_entry(&self, store: &str, request: &Request) -> Result<Option<Response>, Error> {
        let store = store.to_string();
        let key_hash = request.key();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(i64, String, Vec<u8>)>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body FROM entries WHERE store = ?1 AND key_hash = ?2",
                    params![store, key_hash],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                );

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(|(status, headers_json, body)| decode_response(status, &headers_json, body))
            .transpose()
    }

    /// Insert or overwrite the entry for `request`, creating `store` if needed.
    pub async fn put_entry(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let store = store.to_string();
        let row = EntryRow::encode(request, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                upsert(conn, &store, &row, &now)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or overwrite the entry only while `store` exists. Returns whether it was written.
    ///
    /// Unlike [`CacheDb::put_entry`] this never creates the store, so a late
    /// write cannot bring back a store that was deleted in the meantime.
    pub async fn replace_entry(&self, store: &str, request: &Request, response: &Response) -> Result<bool, Error> {
        let store = store.to_string();
        let row = EntryRow::encode(request, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "INSERT INTO entries (store, key_hash, method, url, status, headers_json, body, stored_at)
                     SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8
                     WHERE EXISTS (SELECT 1 FROM stores WHERE name = ?1)
                     ON CONFLICT(store, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![&store, &row.key_hash, &row.method, &row.url, row.status, &row.headers_json, &row.body, &now],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Write every pair in one transaction: either all land or none do.
    pub async fn put_entries(&self, store: &str, pairs: &[(Request, Response)]) -> Result<(), Error> {
        let store = store.to_string();
        let rows = pairs
            .iter()
            .map(|(request, response)| EntryRow::encode(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![&store, &now],
                )?;
                for row in &rows {
                    upsert(&tx, &store, row, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for `request`. Returns whether one existed.
    pub async fn delete_entry(&self, store: &str, request: &Request) -> Result<bool, Error> {
        let store = store.to_string();
        let key_hash = request.key();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count =
                    conn.execute("DELETE FROM entries WHERE store = ?1 AND key_hash = ?2", params![store, key_hash])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Requests with an entry in `store`, ordered by URL.
    pub async fn entry_keys(&self, store: &str) -> Result<Vec<Request>, Error> {
        let store = store.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT method, url FROM entries WHERE store = ?1 ORDER BY url, method")?;
                let rows = stmt
                    .query_map(params![store], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter()
            .map(|(method, url)| {
                Request::parse(&method, &url, None).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))
            })
            .collect()
    }
}
