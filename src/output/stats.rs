//! Statistics over stored scrape results
//!
//! This module provides functionality for summarizing the result store and
//! displaying the summary.

use crate::storage::{ResultRepository, StorageResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of the result store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultStatistics {
    /// Total number of stored results
    pub total_results: u64,

    /// Count of results per HTTP status code
    pub by_status: BTreeMap<u16, u64>,
}

impl ResultStatistics {
    /// Number of results with a 2xx status
    pub fn successful(&self) -> u64 {
        self.by_status
            .range(200..300)
            .map(|(_, count)| count)
            .sum()
    }

    /// Percentage of results with a 2xx status, 0 for an empty store
    pub fn success_rate(&self) -> f64 {
        if self.total_results == 0 {
            return 0.0;
        }
        (self.successful() as f64 / self.total_results as f64) * 100.0
    }
}

/// Loads statistics from the repository
///
/// # Arguments
///
/// * `repository` - The result store to query
///
/// # Returns
///
/// * `Ok(ResultStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query the store
pub fn load_statistics<R: ResultRepository + ?Sized>(
    repository: &R,
) -> StorageResult<ResultStatistics> {
    Ok(ResultStatistics {
        total_results: repository.count()?,
        by_status: repository.status_breakdown()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ResultStatistics) {
    println!("=== Scrape Statistics ===\n");
    println!("Total results: {}", stats.total_results);
    println!();

    if !stats.by_status.is_empty() {
        println!("Results by Status:");
        // Most frequent first, ties by status code
        let mut status_counts: Vec<_> = stats.by_status.iter().collect();
        status_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (status, count) in status_counts {
            let percentage = (*count as f64 / stats.total_results as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", status, count, percentage);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} results with a 2xx status)",
        stats.success_rate(),
        stats.successful(),
        stats.total_results
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewResult;
    use crate::storage::SqliteRepository;

    #[test]
    fn test_empty_store() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let stats = load_statistics(&repo).unwrap();

        assert_eq!(stats, ResultStatistics::default());
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_load_statistics() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        for status_code in [200, 200, 204, 404] {
            repo.save(&NewResult {
                url: "https://example.com/".to_string(),
                status_code,
                ..NewResult::default()
            })
            .unwrap();
        }

        let stats = load_statistics(&repo).unwrap();
        assert_eq!(stats.total_results, 4);
        assert_eq!(stats.by_status.get(&200), Some(&2));
        assert_eq!(stats.by_status.get(&404), Some(&1));
        assert_eq!(stats.successful(), 3);
        assert_eq!(stats.success_rate(), 75.0);
    }

    #[test]
    fn test_through_trait_object() {
        let repo: Box<dyn ResultRepository> = Box::new(SqliteRepository::open_in_memory().unwrap());
        let stats = load_statistics(repo.as_ref()).unwrap();
        assert_eq!(stats.total_results, 0);
    }
}
