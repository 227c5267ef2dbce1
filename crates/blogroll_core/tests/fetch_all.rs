use blogroll_core::{
    Article, ArticleService, ArticleServiceError, ArticleStore, FileSeed, HttpArticleRepository,
    HttpSeed,
};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seed_file(records: Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{records}").unwrap();
    file
}

fn service(
    server: &MockServer,
    seed: &NamedTempFile,
) -> ArticleService<HttpArticleRepository, FileSeed> {
    ArticleService::new(
        HttpArticleRepository::new(reqwest::Client::new(), server.uri()),
        FileSeed::new(seed.path()),
    )
}

async fn mount_empty_list(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(times)
        .with_priority(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn populated_remote_loads_without_seeding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "article_id": 1, "publishedOn": "2020-01-01", "body": "a" },
            { "article_id": 2, "publishedOn": "2020-03-01", "body": "b" },
            { "article_id": 3, "publishedOn": "2020-02-01", "body": "c" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let seed = seed_file(json!([]));
    let mut store = ArticleStore::new();
    let report = service(&server, &seed).fetch_all(&mut store).await.unwrap();

    assert_eq!((report.loaded, report.seeded, report.attempts), (3, 0, 1));
    let ids: Vec<_> = store.iter().filter_map(|a| a.article_id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[tokio::test]
async fn mistyped_rows_do_not_drop_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "article_id": 1, "publishedOn": "2020-01-01", "title": "one" },
            { "article_id": "2", "publishedOn": "2020-02-01", "title": 2 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let seed = seed_file(json!([]));
    let mut store = ArticleStore::new();
    let report = service(&server, &seed).fetch_all(&mut store).await.unwrap();

    assert_eq!(report.loaded, 2);
    let ids: Vec<_> = store.iter().filter_map(|a| a.article_id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(store.find(2).unwrap().extra.get("title"), Some(&json!(2)));
}

#[tokio::test]
async fn empty_remote_is_seeded_then_refetched_once() {
    let server = MockServer::start().await;
    mount_empty_list(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "article_id": 10, "title": "one", "publishedOn": "2015-01-28", "body": "x" },
            { "article_id": 11, "title": "two", "publishedOn": "2015-02-10", "body": "y" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(201).set_body_string("insert complete"))
        .expect(2)
        .mount(&server)
        .await;

    let seed = seed_file(json!([
        { "title": "one", "publishedOn": "2015-01-28", "body": "x", "author": "A" },
        { "title": "two", "publishedOn": "2015-02-10", "body": "y", "author": "B" }
    ]));
    let mut store = ArticleStore::new();
    let report = service(&server, &seed).fetch_all(&mut store).await.unwrap();

    assert_eq!((report.loaded, report.seeded, report.attempts), (2, 2, 2));
    let titles: Vec<_> = store.iter().filter_map(|a| a.title.as_deref()).collect();
    assert_eq!(titles, vec!["two", "one"]);
}

#[tokio::test]
async fn seed_inserts_carry_only_editable_fields() {
    let server = MockServer::start().await;
    mount_empty_list(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "article_id": 1 }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let seed = seed_file(json!([
        { "article_id": 99, "author_id": 5, "author": "A", "body": "**x**", "extraKey": true }
    ]));
    service(&server, &seed)
        .fetch_all(&mut ArticleStore::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|request| request.method.as_str() == "POST")
        .unwrap();
    let payload: Value = post.body_json().unwrap();
    let mut keys: Vec<_> = payload.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["author", "authorUrl", "body", "category", "publishedOn", "title"]
    );
    assert_eq!(payload["author"], "A");
    assert_eq!(payload["body"], "**x**");
}

#[tokio::test]
async fn remote_still_empty_after_seeding_is_terminal() {
    let server = MockServer::start().await;
    mount_empty_list(&server, 10).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let seed = seed_file(json!([{ "title": "only" }]));
    let mut store = ArticleStore::new();
    let err = service(&server, &seed)
        .with_max_fetch_attempts(3)
        .fetch_all(&mut store)
        .await
        .unwrap_err();

    assert!(matches!(err, ArticleServiceError::RemoteStillEmpty { attempts: 3 }));
    assert!(store.is_empty());
    let lists = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.method.as_str() == "GET")
        .count();
    assert_eq!(lists, 3);
}

#[tokio::test]
async fn seed_load_failure_is_returned_not_swallowed() {
    let server = MockServer::start().await;
    mount_empty_list(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/data/hackerIpsum.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = ArticleService::new(
        HttpArticleRepository::new(reqwest::Client::new(), server.uri()),
        HttpSeed::new(
            reqwest::Client::new(),
            format!("{}/data/hackerIpsum.json", server.uri()),
        ),
    );
    let err = service
        .fetch_all(&mut ArticleStore::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ArticleServiceError::Seed(_)));
}

#[tokio::test]
async fn failed_seed_insert_fails_the_fetch() {
    let server = MockServer::start().await;
    mount_empty_list(&server, 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let seed = seed_file(json!([{ "title": "a" }, { "title": "b" }]));
    let err = service(&server, &seed)
        .fetch_all(&mut ArticleStore::new())
        .await
        .unwrap_err();

    match err {
        ArticleServiceError::SeedInsert { failed, total, .. } => {
            assert_eq!((failed, total), (2, 2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn update_and_delete_without_id_issue_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let seed = seed_file(json!([]));
    let service = service(&server, &seed);
    let article = Article {
        title: Some("no id".to_string()),
        ..Article::default()
    };

    let err = service.delete_article(&article).await.unwrap_err();
    assert!(matches!(err, ArticleServiceError::MissingId("delete")));
    let err = service.update_article(&article).await.unwrap_err();
    assert!(matches!(err, ArticleServiceError::MissingId("update")));
}

#[tokio::test]
async fn update_puts_only_editable_fields_to_the_record() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/articles/42"))
        .and(body_json(json!({
            "author": "A",
            "authorUrl": "https://a.example",
            "body": "edited",
            "category": null,
            "publishedOn": "2020-01-01",
            "title": "T"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("update complete"))
        .expect(1)
        .mount(&server)
        .await;

    let seed = seed_file(json!([]));
    let article = Article::from_fields(
        json!({
            "article_id": 42,
            "author_id": 7,
            "author": "A",
            "authorUrl": "https://a.example",
            "body": "edited",
            "publishedOn": "2020-01-01",
            "title": "T",
            "readingTime": 3
        })
        .as_object()
        .cloned()
        .unwrap(),
    );
    let ack = service(&server, &seed)
        .update_article(&article)
        .await
        .unwrap();
    assert_eq!(ack, json!("update complete"));
}

#[tokio::test]
async fn delete_keeps_article_in_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "article_id": 5 }])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/articles/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let seed = seed_file(json!([]));
    let service = service(&server, &seed);
    let mut store = ArticleStore::new();
    service.fetch_all(&mut store).await.unwrap();

    let article = store.find(5).cloned().unwrap();
    service.delete_article(&article).await.unwrap();
    assert!(store.find(5).is_some());
}

#[tokio::test]
async fn truncate_deletes_the_collection() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Delete complete"))
        .expect(1)
        .mount(&server)
        .await;

    let seed = seed_file(json!([]));
    let ack = service(&server, &seed).truncate_table().await.unwrap();
    assert_eq!(ack, json!("Delete complete"));
}
