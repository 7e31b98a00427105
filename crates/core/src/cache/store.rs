//! Named cache stores and their entries.
//!
//! A store is one cache generation. Entries map a request key (method +
//! canonical URL) to a stored response and only ever hold successful
//! responses to read requests.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use crate::message::{Request, Response};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Identifies the current cache generation and the store that backs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub generation_id: String,
    pub store_name: String,
}

impl CacheConfig {
    /// Store name derived as `{prefix}-{generation_id}`.
    pub fn new(prefix: &str, generation_id: impl Into<String>) -> Self {
        let generation_id = generation_id.into();
        let store_name = format!("{prefix}-{generation_id}");
        Self { generation_id, store_name }
    }
}

/// A cached request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheEntry {
    pub store_name: String,
    pub key_hash: String,
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl CacheEntry {
    pub fn response(&self) -> Response {
        Response { status: self.status_code, headers: self.headers.clone(), body: self.body.clone() }
    }
}

/// Key under which `request` is stored.
pub fn request_key(request: &Request) -> String {
    compute_cache_key(request.method.as_str(), request.url.as_str())
}

/// Handle to one named store.
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    name: String,
}

impl CacheDb {
    /// Open (creating if needed) the store called `name`.
    pub async fn open_store(&self, name: &str) -> Result<CacheStore, Error> {
        let store_name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_stores (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![store_name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(CacheStore { db: self.clone(), name: name.to_string() })
    }

    /// Handle to `name` without creating it. Writes fail until the store is opened.
    pub fn store(&self, name: &str) -> CacheStore {
        CacheStore { db: self.clone(), name: name.to_string() }
    }

    /// Names of every existing store, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether a store called `name` exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and, by cascade, all of its entries.
    ///
    /// Returns false if no such store existed.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored response for `request`.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        Ok(self.get_entry(&request_key(request)).await?.map(|e| e.response()))
    }

    /// Fetch the raw entry for a key.
    pub async fn get_entry(&self, key_hash: &str) -> Result<Option<CacheEntry>, Error> {
        let store_name = self.name.clone();
        let key_hash = key_hash.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT store_name, key_hash, method, url, status_code, headers_json, body, stored_at
                     FROM cache_entries WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store_name, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, u16>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, Vec<u8>>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                });

                match result {
                    Ok((store_name, key_hash, method, url, status_code, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
                        Ok(Some(CacheEntry {
                            store_name,
                            key_hash,
                            method,
                            url,
                            status_code,
                            headers,
                            body,
                            stored_at,
                        }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store `response` under `request`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// `Error::NotCacheable` if the request is not a read or the response is not 2xx.
    pub async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        if !request.method.is_read() {
            return Err(Error::NotCacheable(format!("{} is not a read request", request.describe())));
        }
        if !response.is_success() {
            return Err(Error::NotCacheable(format!("{} returned status {}", request.describe(), response.status)));
        }

        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to encode headers: {e}")))?;
        let store_name = self.name.clone();
        let key_hash = request_key(request);
        let method = request.method.to_string();
        let url = request.url.to_string();
        let status = response.status;
        let body = response.body.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (
                        store_name, key_hash, method, url, status_code, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(store_name, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status_code = excluded.status_code,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![store_name, key_hash, method, url, status, headers_json, body, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove every entry whose URL contains `pattern` as a literal,
    /// case-sensitive substring.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_matching(&self, pattern: &str) -> Result<u64, Error> {
        let store_name = self.name.clone();
        let pattern = pattern.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE store_name = ?1 AND instr(url, ?2) > 0",
                    params![store_name, pattern],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// `METHOD url` of every entry, in URL order.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let store_name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url FROM cache_entries WHERE store_name = ?1 ORDER BY url ASC, method ASC",
                )?;
                let keys = stmt
                    .query_map(params![store_name], |row| {
                        Ok(format!("{} {}", row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}
