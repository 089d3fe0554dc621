//! Item reads, upserts, and maintenance.

use super::connection::CacheDb;
use crate::Error;
use crate::model::{Attribution, ImageUrls, Item};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Row, types::Type};

pub(crate) const ITEM_COLUMNS: &str = "items.id, items.width, items.height, items.color, items.blur_hash,
    items.description, items.alt_description, items.url_raw, items.url_full, items.url_regular,
    items.url_small, items.url_thumb, items.user_name, items.user_username, items.user_bio,
    items.user_profile_image, items.tags_json";

/// Decode a row selected with [`ITEM_COLUMNS`].
pub(crate) fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let tags_json: String = row.get(16)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(16, Type::Text, Box::new(e)))?;

    Ok(Item {
        id: row.get(0)?,
        width: row.get(1)?,
        height: row.get(2)?,
        color: row.get(3)?,
        blur_hash: row.get(4)?,
        description: row.get(5)?,
        alt_description: row.get(6)?,
        urls: ImageUrls {
            raw: row.get(7)?,
            full: row.get(8)?,
            regular: row.get(9)?,
            small: row.get(10)?,
            thumb: row.get(11)?,
        },
        user: Attribution {
            name: row.get(12)?,
            username: row.get(13)?,
            bio: row.get(14)?,
            profile_image: row.get(15)?,
        },
        tags,
    })
}

/// Upsert one item on an open connection or transaction.
pub(crate) fn upsert_item(conn: &rusqlite::Connection, item: &Item, fetched_at: &str) -> Result<(), Error> {
    let tags_json = serde_json::to_string(&item.tags).map_err(|e| Error::CorruptRow(e.to_string()))?;
    conn.execute(
        "INSERT INTO items (
            id, width, height, color, blur_hash, description, alt_description,
            url_raw, url_full, url_regular, url_small, url_thumb,
            user_name, user_username, user_bio, user_profile_image, tags_json, fetched_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        ON CONFLICT(id) DO UPDATE SET
            width = excluded.width,
            height = excluded.height,
            color = excluded.color,
            blur_hash = excluded.blur_hash,
            description = excluded.description,
            alt_description = excluded.alt_description,
            url_raw = excluded.url_raw,
            url_full = excluded.url_full,
            url_regular = excluded.url_regular,
            url_small = excluded.url_small,
            url_thumb = excluded.url_thumb,
            user_name = excluded.user_name,
            user_username = excluded.user_username,
            user_bio = excluded.user_bio,
            user_profile_image = excluded.user_profile_image,
            tags_json = excluded.tags_json,
            fetched_at = excluded.fetched_at",
        params![
            &item.id,
            item.width,
            item.height,
            &item.color,
            &item.blur_hash,
            &item.description,
            &item.alt_description,
            &item.urls.raw,
            &item.urls.full,
            &item.urls.regular,
            &item.urls.small,
            &item.urls.thumb,
            &item.user.name,
            &item.user.username,
            &item.user.bio,
            &item.user.profile_image,
            tags_json,
            fetched_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Get an item by id.
    ///
    /// Returns None if the id isn't cached.
    pub async fn get_item(&self, id: &str) -> Result<Option<Item>, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Item>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"))?;

                match stmt.query_row(params![id], item_from_row) {
                    Ok(item) => Ok(Some(item)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a single item outside of any page write.
    pub async fn upsert_item(&self, item: &Item) -> Result<(), Error> {
        let item = item.clone();
        let fetched_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> { upsert_item(conn, &item, &fetched_at) })
            .await
            .map_err(Error::from)
    }

    /// Every cached item, ordered by id.
    pub async fn all_items(&self) -> Result<Vec<Item>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Item>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY items.id"))?;
                let items = stmt
                    .query_map([], item_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete items that no query links to.
    ///
    /// Returns the number of deleted items.
    pub async fn purge_orphan_items(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM items WHERE NOT EXISTS (
                        SELECT 1 FROM order_links WHERE order_links.item_id = items.id
                    )",
                    [],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every item, cursor, and order link.
    ///
    /// Returns the number of deleted items.
    pub async fn clear_all(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM query_cursors", [])?;
                tx.execute("DELETE FROM order_links", [])?;
                let count = tx.execute("DELETE FROM items", [])?;
                tx.commit()?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
