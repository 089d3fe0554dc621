//! Per-query cursors and order links.
//!
//! Both tables are partitioned by query; nothing here touches shared item rows.

use super::connection::CacheDb;
use super::items::{ITEM_COLUMNS, item_from_row};
use crate::Error;
use crate::model::{OrderLink, QueryCursor};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Delete a query's cursors and order links on an open connection or transaction.
pub(crate) fn clear_query_rows(conn: &rusqlite::Connection, query: &str) -> Result<(), Error> {
    conn.execute("DELETE FROM query_cursors WHERE query = ?1", params![query])?;
    conn.execute("DELETE FROM order_links WHERE query = ?1", params![query])?;
    Ok(())
}

impl CacheDb {
    /// Get the cursor for `item_id` under `query`.
    pub async fn get_query_cursor(&self, query: &str, item_id: &str) -> Result<Option<QueryCursor>, Error> {
        let query = query.to_string();
        let item_id = item_id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<QueryCursor>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT query, item_id, prev_key, next_key FROM query_cursors
                    WHERE query = ?1 AND item_id = ?2",
                )?;

                let result = stmt.query_row(params![query, item_id], |row| {
                    Ok(QueryCursor {
                        query: row.get(0)?,
                        item_id: row.get(1)?,
                        prev_key: row.get(2)?,
                        next_key: row.get(3)?,
                    })
                });

                match result {
                    Ok(cursor) => Ok(Some(cursor)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Items linked to `query`, ascending by order index.
    pub async fn list_query_items(&self, query: &str) -> Result<Vec<crate::Item>, Error> {
        let query = query.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<crate::Item>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ITEM_COLUMNS} FROM items
                    INNER JOIN order_links ON items.id = order_links.item_id
                    WHERE order_links.query = ?1
                    ORDER BY order_links.order_index ASC, order_links.rowid ASC"
                ))?;
                let items = stmt
                    .query_map(params![query], item_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await
            .map_err(Error::from)
    }

    /// Order links of `query`, ascending by order index.
    pub async fn list_order_links(&self, query: &str) -> Result<Vec<OrderLink>, Error> {
        let query = query.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<OrderLink>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT query, item_id, order_index FROM order_links
                    WHERE query = ?1 ORDER BY order_index ASC, rowid ASC",
                )?;
                let links = stmt
                    .query_map(params![query], |row| {
                        Ok(OrderLink { query: row.get(0)?, item_id: row.get(1)?, order_index: row.get(2)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(links)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of items linked to `query`.
    pub async fn count_query_items(&self, query: &str) -> Result<u64, Error> {
        let query = query.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM order_links WHERE query = ?1", params![query], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the cursors and order links of `query`.
    ///
    /// Returns the number of order links removed.
    pub async fn clear_query(&self, query: &str) -> Result<u64, Error> {
        let query = query.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM order_links WHERE query = ?1", params![query], |row| {
                        row.get(0)
                    })?;
                clear_query_rows(&tx, &query)?;
                tx.commit()?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
