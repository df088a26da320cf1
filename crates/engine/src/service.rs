//! Article use case.
//!
//! Wraps an [`ArticleRepository`] and an author [`LookupProvider`]. List
//! reads go through the enrichment core; single reads resolve their author
//! directly and fail if that lookup fails. Every call is bounded by
//! [`ServiceConfig::request_timeout`].

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{info, instrument};

use domain::{Article, ArticleRepository, Author, AuthorId, DomainError, LookupProvider};

use crate::config::ServiceConfig;
use crate::enricher::Enricher;
use crate::ServiceError;

pub struct ArticleService<A: ?Sized, U: ?Sized> {
    articles: Arc<A>,
    enricher: Enricher<U>,
    config: ServiceConfig,
}

impl<A, U> ArticleService<A, U>
where
    A: ArticleRepository + ?Sized,
    U: LookupProvider<AuthorId, Author> + ?Sized + 'static,
{
    pub fn new(articles: Arc<A>, authors: Arc<U>, config: ServiceConfig) -> Self {
        let enricher = Enricher::new(authors, config.enrich.clone());
        Self {
            articles,
            enricher,
            config,
        }
    }

    /// Fetch a page of articles with their authors filled in.
    ///
    /// `num == 0` falls back to the configured page size. Authors that fail,
    /// time out, or are still pending when the request budget runs out are
    /// left as id-only stubs.
    #[instrument(skip(self))]
    pub async fn fetch(&self, cursor: &str, num: usize) -> Result<(Vec<Article>, String), ServiceError> {
        let num = if num == 0 {
            self.config.default_page_size
        } else {
            num
        };

        let budget_ends = Instant::now() + self.config.request_timeout;
        let (page, next_cursor) = self
            .within(async { Ok(self.articles.fetch(cursor, num).await?) })
            .await?;

        // Lookups still outstanding when the budget runs out are left
        // unresolved; the page itself is always returned.
        let enriched = self.enricher.enrich_before(page, budget_ends).await?;
        Ok((enriched.into_records(), next_cursor))
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Article, ServiceError> {
        self.within(async {
            let mut article = self.articles.get_by_id(id).await?;
            self.attach_author(&mut article).await?;
            Ok(article)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_title(&self, title: &str) -> Result<Article, ServiceError> {
        self.within(async {
            let mut article = self.articles.get_by_title(title).await?;
            self.attach_author(&mut article).await?;
            Ok(article)
        })
        .await
    }

    /// Persist changes to an existing article, stamping `updated_at`.
    #[instrument(skip(self, article), fields(id = article.id))]
    pub async fn update(&self, article: &mut Article) -> Result<(), ServiceError> {
        self.within(async {
            article.updated_at = Utc::now();
            self.articles.update(article).await?;
            Ok(())
        })
        .await
    }

    /// Store a new article; titles must be unique.
    ///
    /// On success `article.id` holds the assigned id.
    #[instrument(skip(self, article), fields(title = %article.title))]
    pub async fn store(&self, article: &mut Article) -> Result<(), ServiceError> {
        self.within(async {
            match self.articles.get_by_title(&article.title).await {
                Ok(_) => return Err(DomainError::AlreadyExists.into()),
                Err(DomainError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }

            let now = Utc::now();
            article.created_at = now;
            article.updated_at = now;
            article.id = self.articles.store(article).await?;

            info!(id = article.id, "article stored");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.within(async {
            self.articles.get_by_id(id).await?;
            self.articles.delete(id).await?;
            Ok(())
        })
        .await
    }

    async fn attach_author(&self, article: &mut Article) -> Result<(), DomainError> {
        article.author = self.enricher.provider().get_by_id(&article.author.id).await?;
        Ok(())
    }

    async fn within<T, F>(&self, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        let budget = self.config.request_timeout;
        tokio::time::timeout(budget, fut)
            .await
            .map_err(|_| ServiceError::Timeout(budget))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use domain::mock::MockLookup;
    use store::repository::articles::InMemoryArticleRepository;

    fn authors() -> MockLookup<AuthorId, Author> {
        MockLookup::new()
            .returning(1, Author::named(1, "Iron Man"))
            .returning(2, Author::named(2, "Black Widow"))
    }

    fn service(
        articles: Vec<Article>,
        authors: MockLookup<AuthorId, Author>,
    ) -> (
        ArticleService<InMemoryArticleRepository, MockLookup<AuthorId, Author>>,
        Arc<MockLookup<AuthorId, Author>>,
    ) {
        let authors = Arc::new(authors);
        let repo = Arc::new(InMemoryArticleRepository::seeded(articles));
        let svc = ArticleService::new(repo, Arc::clone(&authors), ServiceConfig::default());
        (svc, authors)
    }

    fn catalogue() -> Vec<Article> {
        vec![
            Article::new("first", "a", 1),
            Article::new("second", "b", 2),
            Article::new("third", "c", 1),
        ]
    }

    #[tokio::test]
    async fn fetch_enriches_the_page_with_one_lookup_per_author() {
        let (svc, authors) = service(catalogue(), self::authors());

        let (page, next_cursor) = svc.fetch("", 0).await.expect("fetch");

        assert_eq!(page.len(), 3);
        assert_eq!(page[0].author.name, "Iron Man");
        assert_eq!(page[1].author.name, "Black Widow");
        assert_eq!(page[2].author.name, "Iron Man");
        assert_eq!(next_cursor, "3");
        assert_eq!(authors.call_count(), 2);
    }

    #[tokio::test]
    async fn fetch_tolerates_author_failures() {
        let authors = MockLookup::new()
            .returning(1, Author::named(1, "Iron Man"))
            .failing(2, DomainError::Internal("db down".into()));
        let (svc, _) = service(catalogue(), authors);

        let (page, _) = svc.fetch("", 10).await.expect("fetch degrades, not fails");
        assert_eq!(page[0].author.name, "Iron Man");
        assert!(page[1].author.is_unresolved());
        assert_eq!(page[1].author.id, 2);
    }

    #[tokio::test]
    async fn fetch_pages_through_the_cursor() {
        let (svc, _) = service(catalogue(), authors());

        let (first, cursor) = svc.fetch("", 2).await.expect("first page");
        let (second, _) = svc.fetch(&cursor, 2).await.expect("second page");

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "third");
    }

    #[tokio::test]
    async fn get_by_id_fails_when_the_author_lookup_fails() {
        let authors = MockLookup::new().failing(1, DomainError::Internal("db down".into()));
        let (svc, _) = service(catalogue(), authors);

        let err = svc.get_by_id(1).await.expect_err("author failure surfaces");
        assert!(matches!(err, ServiceError::Domain(DomainError::Internal(_))));
    }

    #[tokio::test]
    async fn get_by_title_attaches_the_author() {
        let (svc, _) = service(catalogue(), authors());
        let article = svc.get_by_title("second").await.expect("found");
        assert_eq!(article.author.name, "Black Widow");
    }

    #[tokio::test]
    async fn store_rejects_duplicate_titles() {
        let (svc, _) = service(catalogue(), authors());

        let mut dup = Article::new("first", "again", 2);
        let err = svc.store(&mut dup).await.expect_err("duplicate");
        assert!(matches!(err, ServiceError::Domain(DomainError::AlreadyExists)));

        let mut fresh = Article::new("fourth", "d", 2);
        svc.store(&mut fresh).await.expect("stored");
        assert_eq!(fresh.id, 4);
        assert_eq!(svc.get_by_id(4).await.expect("readable").title, "fourth");
    }

    #[tokio::test]
    async fn update_stamps_updated_at() {
        let (svc, _) = service(catalogue(), authors());
        let mut article = svc.get_by_id(1).await.expect("found");
        let before = article.updated_at;
        article.content = "edited".into();

        svc.update(&mut article).await.expect("updated");

        assert!(article.updated_at >= before);
        assert_eq!(svc.get_by_id(1).await.expect("found").content, "edited");
    }

    #[tokio::test]
    async fn delete_missing_article_is_not_found() {
        let (svc, _) = service(catalogue(), authors());

        svc.delete(2).await.expect("deleted");
        let err = svc.delete(2).await.expect_err("already gone");
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_authors_degrade_the_page_instead_of_timing_it_out() {
        let authors = MockLookup::new()
            .delayed(1, Duration::from_millis(900), Author::named(1, "Iron Man"))
            .delayed(2, Duration::from_millis(1_800), Author::named(2, "Black Widow"))
            .delayed(3, Duration::from_millis(2_700), Author::named(3, "Hulk"));
        let articles = vec![
            Article::new("first", "a", 1),
            Article::new("second", "b", 2),
            Article::new("third", "c", 3),
        ];
        let (svc, _) = service(articles, authors);

        let started = tokio::time::Instant::now();
        let (page, next_cursor) = svc.fetch("", 0).await.expect("page survives slow authors");

        assert!(started.elapsed() <= Duration::from_secs(2));
        assert_eq!(page.len(), 3);
        assert_eq!(next_cursor, "3");
        assert_eq!(page[0].author.name, "Iron Man");
        assert_eq!(page[1].author.name, "Black Widow");
        assert!(page[2].author.is_unresolved());
        assert_eq!(page[2].author.id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_single_lookup_hits_the_request_timeout() {
        let authors = MockLookup::new().delayed(1, Duration::from_secs(10), Author::named(1, "late"));
        let (svc, _) = service(catalogue(), authors);

        let err = svc.get_by_id(1).await.expect_err("times out");
        assert!(matches!(err, ServiceError::Timeout(_)));
    }
}
