//! End-to-end scrape tests against mock HTTP servers

use std::sync::Arc;
use webscraper::config::ScrapingConfig;
use webscraper::scrape::Fetcher;
use webscraper::storage::open_repository;
use webscraper::{
    ExtractError, FetchError, Pipeline, ResultRepository, ScrapeError, SqliteRepository,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIMPLE_PAGE: &str = r#"<html lang="en"><head><title>Hi</title><meta name="description" content="d"></head><body>hello world</body></html>"#;

/// Creates a scraping configuration suited to a local mock server
fn test_config() -> ScrapingConfig {
    ScrapingConfig {
        user_agent: "TestBot/1.0".to_string(),
        timeout: 5,
        max_links: 100,
        max_images: 50,
        max_body_bytes: 1024 * 1024,
    }
}

fn test_pipeline(config: &ScrapingConfig) -> Pipeline<SqliteRepository> {
    let repo = Arc::new(SqliteRepository::open_in_memory().expect("Failed to open store"));
    Pipeline::new(config, repo).expect("Failed to build pipeline")
}

async fn mount_html(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status).set_body_raw(body, "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scrape_simple_page() {
    let server = MockServer::start().await;
    mount_html(&server, "/", 200, SIMPLE_PAGE.to_string()).await;

    let pipeline = test_pipeline(&test_config());
    let url = format!("{}/", server.uri());
    let record = pipeline.scrape(&url).await.expect("Scrape failed");

    assert_eq!(record.url, url);
    assert_eq!(record.status_code, 200);
    assert_eq!(record.title.as_deref(), Some("Hi"));
    assert_eq!(record.description.as_deref(), Some("d"));
    assert_eq!(record.language.as_deref(), Some("en"));
    assert_eq!(record.word_count, 2);
    assert!(record.links.is_empty());
    assert!(record.images.is_empty());
    assert!(record.content_type.starts_with("text/html"));
    assert_eq!(record.headers.get("content-type"), Some(&record.content_type));

    let stored = pipeline
        .repository()
        .get_by_id(record.id)
        .unwrap()
        .expect("Record not persisted");
    assert_eq!(stored, record);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(wiremock::matchers::header("user-agent", "TestBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>ok</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = test_pipeline(&test_config());
    let record = pipeline
        .scrape(&format!("{}/ua", server.uri()))
        .await
        .expect("Scrape failed");

    assert_eq!(record.title.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_links_and_images_resolved_and_capped() {
    let server = MockServer::start().await;
    let anchors: String = (0..500)
        .map(|i| format!("<a href=\"/p{}\">link {}</a>\n", i, i))
        .collect();
    let body = format!(
        r#"<html><body>{}<img src="a.png"><img src="/b.png"><img src="https://cdn.example.net/c.png"></body></html>"#,
        anchors
    );
    mount_html(&server, "/many", 200, body).await;

    let config = ScrapingConfig {
        max_links: 50,
        max_images: 2,
        ..test_config()
    };
    let pipeline = test_pipeline(&config);
    let record = pipeline
        .scrape(&format!("{}/many", server.uri()))
        .await
        .expect("Scrape failed");

    assert_eq!(record.links.len(), 50);
    for (i, link) in record.links.iter().enumerate() {
        assert_eq!(link, &format!("{}/p{}", server.uri(), i));
    }
    assert_eq!(
        record.images,
        vec![
            format!("{}/a.png", server.uri()),
            format!("{}/b.png", server.uri()),
        ]
    );
    assert_eq!(record.word_count, 1000);
}

#[tokio::test]
async fn test_error_status_is_stored() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/missing",
        404,
        "<html><head><title>Not Found</title></head><body>gone</body></html>".to_string(),
    )
    .await;

    let pipeline = test_pipeline(&test_config());
    let record = pipeline
        .scrape(&format!("{}/missing", server.uri()))
        .await
        .expect("Non-2xx responses should still be stored");

    assert_eq!(record.status_code, 404);
    assert_eq!(record.title.as_deref(), Some("Not Found"));
    assert_eq!(pipeline.repository().list_by_status(404).unwrap().len(), 1);
}

#[tokio::test]
async fn test_timeout_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SIMPLE_PAGE)
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ScrapingConfig {
        timeout: 1,
        ..test_config()
    };
    let pipeline = test_pipeline(&config);
    let result = pipeline.scrape(&format!("{}/slow", server.uri())).await;

    assert!(
        matches!(result, Err(ScrapeError::Fetch(FetchError::Timeout { .. }))),
        "unexpected result: {:?}",
        result
    );
    assert_eq!(pipeline.repository().count().unwrap(), 0);
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let server = MockServer::start().await;
    let body = format!("<html><body>{}</body></html>", "word ".repeat(1000));
    mount_html(&server, "/big", 200, body).await;

    let config = ScrapingConfig {
        max_body_bytes: 1024,
        ..test_config()
    };
    let pipeline = test_pipeline(&config);
    let result = pipeline.scrape(&format!("{}/big", server.uri())).await;

    assert!(matches!(
        result,
        Err(ScrapeError::Fetch(FetchError::TooLarge { limit: 1024, .. }))
    ));
    assert_eq!(pipeline.repository().count().unwrap(), 0);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1 of the loopback interface
    let pipeline = test_pipeline(&test_config());
    let result = pipeline.scrape("http://127.0.0.1:1/").await;

    assert!(matches!(
        result,
        Err(ScrapeError::Fetch(FetchError::Network { .. }))
    ));
    assert_eq!(pipeline.repository().count().unwrap(), 0);
}

#[tokio::test]
async fn test_binary_body_is_unparseable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00],
                "image/png",
            ),
        )
        .mount(&server)
        .await;

    let pipeline = test_pipeline(&test_config());
    let result = pipeline.scrape(&format!("{}/logo.png", server.uri())).await;

    assert!(matches!(
        result,
        Err(ScrapeError::Extract(ExtractError::Unparseable { .. }))
    ));
    assert_eq!(pipeline.repository().count().unwrap(), 0);
}

#[tokio::test]
async fn test_redirect_target_is_base_for_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new/", server.uri())),
        )
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/new/",
        200,
        r#"<html><body><a href="page">next</a></body></html>"#.to_string(),
    )
    .await;

    let pipeline = test_pipeline(&test_config());
    let requested = format!("{}/old", server.uri());
    let record = pipeline.scrape(&requested).await.expect("Scrape failed");

    assert_eq!(record.url, requested);
    assert_eq!(record.status_code, 200);
    assert_eq!(record.links, vec![format!("{}/new/page", server.uri())]);
}

#[tokio::test]
async fn test_invalid_url_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = test_pipeline(&test_config());
    let result = pipeline
        .scrape(&server.uri().replacen("http", "ftp", 1))
        .await;

    assert!(matches!(result, Err(ScrapeError::Validation(_))));
    assert_eq!(pipeline.repository().count().unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_scrapes_get_distinct_ids() {
    let server = MockServer::start().await;
    mount_html(&server, "/", 200, SIMPLE_PAGE.to_string()).await;

    let pipeline = Arc::new(test_pipeline(&test_config()));
    let url = format!("{}/", server.uri());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pipeline = Arc::clone(&pipeline);
        let url = url.clone();
        handles.push(tokio::spawn(async move { pipeline.scrape(&url).await }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let record = handle.await.unwrap().expect("Scrape failed");
        ids.push(record.id);
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 8);
    assert_eq!(pipeline.repository().count().unwrap(), 8);
    assert_eq!(pipeline.repository().list_by_url(&url).unwrap().len(), 8);
}

#[tokio::test]
async fn test_results_survive_reopen() {
    let server = MockServer::start().await;
    mount_html(&server, "/", 200, SIMPLE_PAGE.to_string()).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("data").join("results.db");

    let id = {
        let repo = Arc::new(open_repository(&db_path).expect("Failed to open store"));
        let pipeline = Pipeline::new(&test_config(), repo).expect("Failed to build pipeline");
        pipeline
            .scrape(&format!("{}/", server.uri()))
            .await
            .expect("Scrape failed")
            .id
    };

    let repo = open_repository(&db_path).expect("Failed to reopen store");
    let record = repo.get_by_id(id).unwrap().expect("Record lost on reopen");
    assert_eq!(record.title.as_deref(), Some("Hi"));
    assert_eq!(record.word_count, 2);
}

/// Serves one response whose body length is only known at connection close
async fn serve_unsized_body(body_len: usize) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        let (mut socket, _) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(_) => return,
        };

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let head = "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\nconnection: close\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        // The client hangs up once the limit is crossed
        for _ in 0..body_len / 1024 {
            if socket.write_all(&[b'a'; 1024]).await.is_err() {
                return;
            }
        }
        let _ = socket.shutdown().await;
    });

    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_streamed_body_over_limit_is_rejected() {
    let url = serve_unsized_body(100 * 1024).await;

    let config = ScrapingConfig {
        max_body_bytes: 4096,
        ..test_config()
    };
    let fetcher = Fetcher::new(&config).expect("Failed to build fetcher");
    let result = fetcher.fetch(&url).await;

    assert!(
        matches!(result, Err(FetchError::TooLarge { limit: 4096, .. })),
        "unexpected result: {:?}",
        result.map(|page| page.body.len())
    );
}

#[tokio::test]
async fn test_streamed_body_under_limit_is_read() {
    let url = serve_unsized_body(8 * 1024).await;

    let fetcher = Fetcher::new(&test_config()).expect("Failed to build fetcher");
    let page = fetcher.fetch(&url).await.expect("Fetch failed");

    assert_eq!(page.status_code, 200);
    assert_eq!(page.body.len(), 8 * 1024);
    assert!(!page.headers.contains_key("content-length"));
}
