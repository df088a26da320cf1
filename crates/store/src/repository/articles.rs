//! Article CRUD operations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use domain::{Article, ArticleRepository, DomainError};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Article>,
    last_id: i64,
}

/// Articles keyed by id; ids are assigned sequentially from 1.
///
/// The fetch cursor is the id of the last article returned, in decimal.
#[derive(Debug, Default)]
pub struct InMemoryArticleRepository {
    table: RwLock<Table>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-filled with `articles`, assigning ids in order.
    pub fn seeded(articles: impl IntoIterator<Item = Article>) -> Self {
        let mut table = Table::default();
        for mut article in articles {
            table.last_id += 1;
            article.id = table.last_id;
            table.rows.insert(article.id, article);
        }
        Self {
            table: RwLock::new(table),
        }
    }
}

fn parse_cursor(cursor: &str) -> Result<i64, DomainError> {
    if cursor.is_empty() {
        return Ok(0);
    }
    cursor
        .parse()
        .map_err(|_| DomainError::BadParamInput(format!("invalid cursor '{cursor}'")))
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn fetch(&self, cursor: &str, num: usize) -> Result<(Vec<Article>, String), DomainError> {
        let after = parse_cursor(cursor)?;
        let table = self.table.read().await;

        let page: Vec<Article> = table
            .rows
            .range(after + 1..)
            .take(num)
            .map(|(_, a)| a.clone())
            .collect();

        let next_cursor = page.last().map(|a| a.id.to_string()).unwrap_or_default();
        debug!(after, returned = page.len(), "fetched article page");
        Ok((page, next_cursor))
    }

    async fn get_by_id(&self, id: i64) -> Result<Article, DomainError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    async fn get_by_title(&self, title: &str) -> Result<Article, DomainError> {
        self.table
            .read()
            .await
            .rows
            .values()
            .find(|a| a.title == title)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    async fn update(&self, article: &Article) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&article.id).ok_or(DomainError::NotFound)?;
        *row = article.clone();
        Ok(())
    }

    async fn store(&self, article: &Article) -> Result<i64, DomainError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = table.last_id;

        let mut row = article.clone();
        row.id = id;
        table.rows.insert(id, row);
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }
}
