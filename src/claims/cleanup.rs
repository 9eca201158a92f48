use crate::claims::batch::ProgressEvent;
use crate::error::{ClaimError, Result};
use crate::ledger::client::{LedgerClient, PageFilter, WriteOp, DELETE_CLAIMS_TARGET};
use crate::ledger::codec;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanerState {
    Idle,
    FetchingPage,
    Submitting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSummary {
    pub cleaned_count: usize,
    pub pages: usize,
    pub has_next_page: bool,
}

/// Cursor-driven cleanup of stale claim records: fetch a bounded page,
/// delete exactly that page with one write, repeat. Pages and writes are
/// strictly sequential; they all mutate the same registry object.
///
/// The loop terminates because each committed delete strictly shrinks the
/// remaining record set, and a failure is safely resumable later: the
/// remaining on-chain records, not local state, determine the next page.
pub struct PaginatedCleaner<L: LedgerClient> {
    ledger: L,
    registry_id: String,
    page_size: usize,
    state: CleanerState,
    cleaned_count: usize,
}

impl<L: LedgerClient> PaginatedCleaner<L> {
    pub fn new(ledger: L, registry_id: String, page_size: usize) -> Self {
        Self { ledger, registry_id, page_size, state: CleanerState::Idle, cleaned_count: 0 }
    }

    pub fn state(&self) -> CleanerState {
        self.state
    }

    /// Records deleted so far; monotonically non-decreasing, survives a
    /// failed run for the error report.
    pub fn cleaned_count(&self) -> usize {
        self.cleaned_count
    }

    pub async fn run(
        &mut self,
        mut on_progress: impl FnMut(ProgressEvent),
    ) -> Result<CleanupSummary> {
        // pre-flight, before any page is fetched
        if self.page_size == 0 {
            return Err(ClaimError::Config("page size must be positive".to_string()));
        }
        info!("cleaning stale claim records in pages of {}", self.page_size);

        let mut cursor: Option<String> = None;
        let mut pages = 0;
        loop {
            self.state = CleanerState::FetchingPage;
            let filter = PageFilter::StaleClaims { registry_id: self.registry_id.clone() };
            let page = match self.ledger.query_page(filter, cursor.take(), self.page_size).await {
                Ok(page) => page,
                Err(cause) => return Err(self.fail(cause)),
            };

            if page.addresses.is_empty() {
                break;
            }

            self.state = CleanerState::Submitting;
            let payload = match codec::encode_address_list(&self.registry_id, &page.addresses) {
                Ok(payload) => payload,
                Err(cause) => return Err(self.fail(cause)),
            };
            let op = WriteOp { target: DELETE_CLAIMS_TARGET.to_string(), payload };
            match self.ledger.execute_write(op).await {
                Ok(receipt) if receipt.success => {
                    self.cleaned_count += page.addresses.len();
                    pages += 1;
                    info!(
                        "page {} deleted ({} records, {} total): {}",
                        pages,
                        page.addresses.len(),
                        self.cleaned_count,
                        receipt.digest
                    );
                    on_progress(ProgressEvent::Page { number: pages, cleaned: self.cleaned_count });
                }
                Ok(receipt) => return Err(self.fail(ClaimError::WriteRejected(receipt.digest))),
                Err(cause) => return Err(self.fail(cause)),
            }

            if !page.has_next_page {
                break;
            }
            cursor = page.next_cursor;
        }

        self.state = CleanerState::Done;
        Ok(CleanupSummary { cleaned_count: self.cleaned_count, pages, has_next_page: false })
    }

    fn fail(&mut self, cause: ClaimError) -> ClaimError {
        self.state = CleanerState::Failed;
        warn!("cleanup failed after {} deleted records: {}", self.cleaned_count, cause);
        ClaimError::CleanupPageFailed {
            cleaned_count: self.cleaned_count,
            source: Box::new(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::client::{MockLedgerClient, Receipt, RecordPage};
    use crate::ledger::InMemoryLedger;
    use chrono::Utc;
    use mockall::Sequence;

    const REGISTRY: &str = "0xregistry";

    #[tokio::test]
    async fn test_pages_of_2500_records() {
        let ledger = InMemoryLedger::new();
        ledger.seed_stale((0..2_500).map(|i| format!("0x{:040x}", i))).await;

        let mut cleaner = PaginatedCleaner::new(&ledger, REGISTRY.to_string(), 1_000);
        let mut events = Vec::new();
        let summary = cleaner.run(|e| events.push(e)).await.unwrap();

        assert_eq!(summary.cleaned_count, 2_500);
        assert_eq!(summary.pages, 3);
        assert!(!summary.has_next_page);
        assert_eq!(cleaner.state(), CleanerState::Done);
        assert_eq!(ledger.stale_count().await, 0);
        // page sizes 1000, 1000, 500
        assert_eq!(
            events,
            vec![
                ProgressEvent::Page { number: 1, cleaned: 1_000 },
                ProgressEvent::Page { number: 2, cleaned: 2_000 },
                ProgressEvent::Page { number: 3, cleaned: 2_500 },
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        // no expectations: a fetch or delete would panic the mock
        let mut cleaner = PaginatedCleaner::new(MockLedgerClient::new(), REGISTRY.to_string(), 0);
        let err = cleaner.run(|_| {}).await.unwrap_err();
        assert!(matches!(err, ClaimError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_registry_is_done_without_writes() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_query_page().times(1).returning(|_, _, _| {
            Ok(RecordPage { addresses: vec![], next_cursor: None, has_next_page: false })
        });
        // no execute_write expectation: a delete would panic the mock

        let mut cleaner = PaginatedCleaner::new(ledger, REGISTRY.to_string(), 1_000);
        let summary = cleaner.run(|_| {}).await.unwrap();
        assert_eq!(summary.cleaned_count, 0);
        assert_eq!(summary.pages, 0);
    }

    #[tokio::test]
    async fn test_failed_page_carries_cleaned_count() {
        let mut ledger = MockLedgerClient::new();
        let mut seq = Sequence::new();
        fn page(n: usize) -> RecordPage {
            RecordPage {
                addresses: (0..n).map(|i| format!("0x{:040x}", i)).collect(),
                next_cursor: Some("tok".to_string()),
                has_next_page: true,
            }
        }

        ledger
            .expect_query_page()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(page(1_000)));
        ledger.expect_execute_write().times(1).in_sequence(&mut seq).returning(|_| {
            Ok(Receipt { digest: "d0".to_string(), success: true, timestamp: Utc::now() })
        });
        ledger
            .expect_query_page()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(page(1_000)));
        ledger
            .expect_execute_write()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ClaimError::Ledger("finality timeout".to_string())));

        let mut cleaner = PaginatedCleaner::new(ledger, REGISTRY.to_string(), 1_000);
        let err = cleaner.run(|_| {}).await.unwrap_err();

        match err {
            ClaimError::CleanupPageFailed { cleaned_count, .. } => assert_eq!(cleaned_count, 1_000),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(cleaner.state(), CleanerState::Failed);
        assert_eq!(cleaner.cleaned_count(), 1_000);
    }

    #[tokio::test]
    async fn test_rejected_delete_fails_run() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_query_page().times(1).returning(|_, _, _| {
            Ok(RecordPage {
                addresses: vec!["0xaa".to_string()],
                next_cursor: None,
                has_next_page: false,
            })
        });
        ledger.expect_execute_write().times(1).returning(|_| {
            Ok(Receipt { digest: "d0".to_string(), success: false, timestamp: Utc::now() })
        });

        let mut cleaner = PaginatedCleaner::new(ledger, REGISTRY.to_string(), 10);
        let err = cleaner.run(|_| {}).await.unwrap_err();
        assert!(matches!(err, ClaimError::CleanupPageFailed { cleaned_count: 0, .. }));
    }
}
