//! The atomic page write and the `EntityStore` implementation for `CacheDb`.

use super::connection::CacheDb;
use super::items::upsert_item;
use super::query_state::clear_query_rows;
use crate::Error;
use crate::model::{Item, QueryCursor};
use crate::store::{EntityStore, PageWrite};
use tokio_rusqlite::params;

impl CacheDb {
    /// Apply a page write inside one SQLite transaction.
    ///
    /// Items are upserted before cursors and links so the link foreign key
    /// always resolves. Any failure drops the transaction, which rolls back
    /// every statement including the optional clear.
    pub async fn apply_page_write(&self, write: PageWrite) -> Result<(), Error> {
        if write.is_noop() {
            return Ok(());
        }

        let fetched_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;

                if write.clear_existing {
                    clear_query_rows(&tx, &write.query)?;
                }

                for item in &write.items {
                    upsert_item(&tx, item, &fetched_at)?;
                }

                for cursor in &write.cursors {
                    tx.execute(
                        "INSERT INTO query_cursors (query, item_id, prev_key, next_key)
                        VALUES (?1, ?2, ?3, ?4)
                        ON CONFLICT(query, item_id) DO UPDATE SET
                            prev_key = excluded.prev_key,
                            next_key = excluded.next_key",
                        params![&cursor.query, &cursor.item_id, cursor.prev_key, cursor.next_key],
                    )?;
                }

                for link in &write.links {
                    tx.execute(
                        "INSERT INTO order_links (query, item_id, order_index)
                        VALUES (?1, ?2, ?3)
                        ON CONFLICT(query, item_id) DO UPDATE SET
                            order_index = excluded.order_index",
                        params![&link.query, &link.item_id, link.order_index],
                    )?;
                }

                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait::async_trait]
impl EntityStore for CacheDb {
    async fn get_item(&self, id: &str) -> Result<Option<Item>, Error> {
        CacheDb::get_item(self, id).await
    }

    async fn get_cursor(&self, query: &str, item_id: &str) -> Result<Option<QueryCursor>, Error> {
        self.get_query_cursor(query, item_id).await
    }

    async fn query_items(&self, query: &str) -> Result<Vec<Item>, Error> {
        self.list_query_items(query).await
    }

    async fn clear_query(&self, query: &str) -> Result<(), Error> {
        CacheDb::clear_query(self, query).await.map(|_| ())
    }

    async fn apply(&self, write: PageWrite) -> Result<(), Error> {
        self.apply_page_write(write).await
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::{item, page_write};
    use crate::model::OrderLink;
    use crate::{CacheDb, EntityStore, PageWrite};

    async fn ids(db: &CacheDb, query: &str) -> Vec<String> {
        db.list_query_items(query)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect()
    }

    #[tokio::test]
    async fn test_apply_writes_all_three_tables() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.apply(page_write("cats", 2, 10, &["3", "4"], false)).await.unwrap();

        assert_eq!(ids(&db, "cats").await, vec!["3", "4"]);

        let cursor = db.get_query_cursor("cats", "4").await.unwrap().unwrap();
        assert_eq!(cursor.prev_key, Some(1));
        assert_eq!(cursor.next_key, Some(3));

        let links = db.list_order_links("cats").await.unwrap();
        assert_eq!(links.iter().map(|l| l.order_index).collect::<Vec<_>>(), vec![10, 11]);
    }

    #[tokio::test]
    async fn test_clear_existing_replaces_query_rows() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.apply(page_write("cats", 1, 10, &["1", "2"], false)).await.unwrap();
        db.apply(page_write("cats", 2, 10, &["3"], false)).await.unwrap();

        db.apply(page_write("cats", 1, 10, &["5"], true)).await.unwrap();

        assert_eq!(ids(&db, "cats").await, vec!["5"]);
        assert!(db.get_query_cursor("cats", "3").await.unwrap().is_none());
        assert!(db.get_item("3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_prior_state_untouched() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.apply(page_write("cats", 1, 10, &["1", "2"], false)).await.unwrap();
        let links_before = db.list_order_links("cats").await.unwrap();

        // The dangling link violates the item foreign key after the clear and
        // the item upsert already ran inside the transaction.
        let mut write = page_write("cats", 1, 10, &["9"], true);
        write.links.push(OrderLink { query: "cats".into(), item_id: "missing".into(), order_index: 1 });

        let result = db.apply(write).await;
        assert!(result.is_err());

        assert_eq!(db.list_order_links("cats").await.unwrap(), links_before);
        assert!(db.get_query_cursor("cats", "1").await.unwrap().is_some());
        assert!(db.get_item("9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_write() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let write = PageWrite { query: "cats".into(), ..Default::default() };
        assert!(write.is_noop());
        db.apply(write).await.unwrap();
        assert!(db.all_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shared_item_has_one_row_and_independent_links() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.apply(page_write("cats", 1, 10, &["1"], false)).await.unwrap();
        db.apply(page_write("pets", 1, 10, &["7", "1"], false)).await.unwrap();

        assert_eq!(db.all_items().await.unwrap(), vec![item("1"), item("7")]);
        assert_eq!(db.list_order_links("cats").await.unwrap()[0].order_index, 0);
        assert_eq!(db.list_order_links("pets").await.unwrap()[1].order_index, 1);

        EntityStore::clear_query(&db, "cats").await.unwrap();
        assert!(db.get_item("1").await.unwrap().is_some());
        assert_eq!(ids(&db, "pets").await, vec!["7", "1"]);
    }
}
