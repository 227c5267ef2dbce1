use blogroll_core::{Article, ArticleStore, FieldBag};
use serde_json::json;

fn row(id: i64, published_on: &str) -> FieldBag {
    json!({ "article_id": id, "title": format!("post {id}"), "publishedOn": published_on })
        .as_object()
        .cloned()
        .unwrap()
}

fn published(store: &ArticleStore) -> Vec<&str> {
    store
        .iter()
        .map(|article| article.published_on.as_deref().unwrap_or(""))
        .collect()
}

#[test]
fn batch_is_loaded_newest_first() {
    let mut store = ArticleStore::new();
    let loaded = store
        .load_rows(vec![
            row(1, "2020-01-01"),
            row(2, "2020-03-01"),
            row(3, "2020-02-01"),
        ]);

    assert_eq!(loaded, 3);
    assert_eq!(
        published(&store),
        vec!["2020-03-01", "2020-02-01", "2020-01-01"]
    );
}

#[test]
fn later_batches_are_appended_without_resorting() {
    let mut store = ArticleStore::new();
    store.load_rows(vec![row(1, "2019-05-01")]);
    store.load_rows(vec![row(2, "2018-01-01"), row(3, "2021-01-01")]);

    assert_eq!(
        published(&store),
        vec!["2019-05-01", "2021-01-01", "2018-01-01"]
    );
}

#[test]
fn mixed_timestamp_formats_compare_as_instants() {
    let mut store = ArticleStore::new();
    store.load_all(vec![
        Article {
            published_on: Some("2020-01-01".to_string()),
            ..Article::default()
        },
        Article {
            published_on: Some("2020-01-01T12:00:00Z".to_string()),
            ..Article::default()
        },
    ]);

    assert_eq!(published(&store), vec!["2020-01-01T12:00:00Z", "2020-01-01"]);
}

#[test]
fn find_and_clear() {
    let mut store = ArticleStore::new();
    store.load_rows(vec![row(4, "2020-01-01"), row(5, "2020-01-02")]);

    assert_eq!(store.find(4).unwrap().title.as_deref(), Some("post 4"));
    assert!(store.find(99).is_none());

    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}
