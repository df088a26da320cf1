//! Demo catalogue used by the CLI.

use domain::{Article, Author};

/// Authors with ids 1..=4.
pub fn demo_authors() -> Vec<Author> {
    ["Ursula K. Le Guin", "Octavia E. Butler", "Ted Chiang", "N. K. Jemisin"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| Author::named(id, name))
        .collect()
}

/// Articles that reference the demo authors, several of them more than once.
/// Author id 5 has no row, so its articles never resolve.
pub fn demo_articles() -> Vec<Article> {
    [
        ("The Ones Who Walk Away", 1),
        ("Bloodchild", 2),
        ("Story of Your Life", 3),
        ("The Dispossessed", 1),
        ("Exhalation", 3),
        ("The City We Became", 4),
        ("Kindred", 2),
        ("Unsigned Manuscript", 5),
        ("The Lathe of Heaven", 1),
        ("The Lifecycle of Software Objects", 3),
    ]
    .into_iter()
    .map(|(title, author_id)| Article::new(title, format!("{title} (excerpt)"), author_id))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_article_title_is_unique() {
        let articles = demo_articles();
        let titles: HashSet<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles.len(), articles.len());
    }

    #[test]
    fn one_referenced_author_is_absent() {
        let known: HashSet<i64> = demo_authors().iter().map(|a| a.id).collect();
        let orphans = demo_articles()
            .into_iter()
            .filter(|a| !known.contains(&a.author.id))
            .count();
        assert_eq!(orphans, 1);
    }
}
