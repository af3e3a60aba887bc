//! Result store tests against file-backed databases

use std::collections::BTreeMap;
use webscraper::storage::open_repository;
use webscraper::{NewResult, ResultRepository, StorageError};

fn result_for(url: &str, status_code: u16) -> NewResult {
    NewResult {
        url: url.to_string(),
        title: Some(format!("Title of {}", url)),
        links: vec![format!("{}/a", url), format!("{}/b", url)],
        status_code,
        content_type: "text/html".to_string(),
        word_count: 10,
        load_time_ms: 5,
        ..NewResult::default()
    }
}

#[test]
fn test_round_trip_through_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = open_repository(&temp_dir.path().join("results.db")).unwrap();

    let mut headers = BTreeMap::new();
    headers.insert("server".to_string(), "test".to_string());
    let input = NewResult {
        headers,
        images: vec!["https://example.com/x.png".to_string()],
        ..result_for("https://example.com", 200)
    };

    let saved = repo.save(&input).unwrap();
    let loaded = repo.get_by_id(saved.id).unwrap().unwrap();

    assert_eq!(loaded, saved);
    assert_eq!(loaded.links, input.links);
    assert_eq!(loaded.images, input.images);
    assert_eq!(loaded.headers, input.headers);
}

#[test]
fn test_list_order_and_delete() {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = open_repository(&temp_dir.path().join("results.db")).unwrap();

    let first = repo.save(&result_for("https://a.example", 200)).unwrap();
    let second = repo.save(&result_for("https://b.example", 500)).unwrap();
    let third = repo.save(&result_for("https://a.example", 200)).unwrap();

    let ids: Vec<i64> = repo.list().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    repo.delete_by_id(second.id).unwrap();
    assert!(repo.get_by_id(second.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_by_id(second.id),
        Err(StorageError::NotFound(id)) if id == second.id
    ));

    let ids: Vec<i64> = repo.list().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![third.id, first.id]);
    assert_eq!(repo.list_by_url("https://a.example").unwrap().len(), 2);
    assert!(repo.list_by_status(500).unwrap().is_empty());
}

#[test]
fn test_unknown_id() {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = open_repository(&temp_dir.path().join("results.db")).unwrap();

    assert!(repo.get_by_id(42).unwrap().is_none());
    assert!(matches!(repo.delete_by_id(42), Err(StorageError::NotFound(42))));
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn test_status_breakdown() {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = open_repository(&temp_dir.path().join("results.db")).unwrap();

    for status in [200, 301, 200, 404] {
        repo.save(&result_for("https://example.com", status)).unwrap();
    }

    let breakdown = repo.status_breakdown().unwrap();
    assert_eq!(repo.count().unwrap(), 4);
    assert_eq!(breakdown.get(&200), Some(&2));
    assert_eq!(breakdown.get(&301), Some(&1));
    assert_eq!(breakdown.get(&404), Some(&1));
    assert_eq!(breakdown.len(), 3);
}

#[test]
fn test_close_then_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("results.db");

    let repo = open_repository(&db_path).unwrap();
    let saved = repo.save(&result_for("https://example.com", 200)).unwrap();
    repo.close().unwrap();

    let repo = open_repository(&db_path).unwrap();
    assert_eq!(repo.get_by_id(saved.id).unwrap(), Some(saved));
}
