// tests/upload_batch_test.rs — Integration test: batch manager with mock collaborators

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use sheetlink::infra::errors::SheetlinkError;
use sheetlink::provider::{DestinationIssuer, StorageSink};
use sheetlink::upload::{
    AddOutcome, BatchState, BatchStatus, SelectedFile, UploadBatch, MAX_BATCH_FILES,
};

/// Issues fake destinations, failing for the configured file names.
struct MockIssuer {
    fail_for: Vec<String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockIssuer {
    fn new(fail_for: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            fail_for: fail_for.iter().map(|s| s.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DestinationIssuer for MockIssuer {
    async fn issue(&self, file_name: &str, file_type: &str) -> Result<String, SheetlinkError> {
        self.requests
            .lock()
            .unwrap()
            .push((file_name.to_string(), file_type.to_string()));
        if self.fail_for.iter().any(|f| f == file_name) {
            return Err(SheetlinkError::Destination {
                file: file_name.to_string(),
                message: "HTTP 500: issuer down".into(),
            });
        }
        Ok(format!("https://storage.test/sheets/{file_name}?sig=abc"))
    }
}

/// Accepts PUTs, failing for destinations containing the configured names.
struct MockSink {
    fail_for: Vec<String>,
    puts: Mutex<Vec<(String, String, usize)>>,
}

impl MockSink {
    fn new(fail_for: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            fail_for: fail_for.iter().map(|s| s.to_string()).collect(),
            puts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl StorageSink for MockSink {
    async fn put(
        &self,
        destination: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SheetlinkError> {
        self.puts.lock().unwrap().push((
            destination.to_string(),
            content_type.to_string(),
            bytes.len(),
        ));
        if self.fail_for.iter().any(|f| destination.contains(f.as_str())) {
            return Err(SheetlinkError::Transfer {
                file: destination.to_string(),
                message: "HTTP 403: signature expired".into(),
            });
        }
        Ok(())
    }
}

fn batch_with(issuer: Arc<MockIssuer>, sink: Arc<MockSink>) -> UploadBatch {
    UploadBatch::new(issuer, sink)
}

fn file(name: &str) -> SelectedFile {
    SelectedFile::new(name, vec![0u8; 16])
}

fn names(batch: &UploadBatch) -> Vec<&str> {
    batch.items().iter().map(|f| f.name.as_str()).collect()
}

// ─── Selection / filtering ──────────────────────────────────────

#[test]
fn add_keeps_only_allowed_extensions() {
    let mut batch = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));

    let outcome = batch.add_files(vec![file("resume.pdf"), file("notes.txt"), file("plan.xlsx")]);
    assert_eq!(outcome, AddOutcome::Added { total: 2 });
    assert_eq!(names(&batch), vec!["resume.pdf", "plan.xlsx"]);
    assert_eq!(batch.status_message(), "2 files selected");
    assert_eq!(batch.state(), BatchState::Selected);
}

#[test]
fn add_with_no_valid_files_leaves_batch_unchanged() {
    let mut batch = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));
    batch.add_files(vec![file("resume.pdf")]);

    let outcome = batch.add_files(vec![file("notes.txt"), file("photo.png")]);
    assert_eq!(outcome, AddOutcome::RejectedAll);
    assert_eq!(names(&batch), vec!["resume.pdf"]);
    assert!(batch.status_message().contains("PDF or Excel"));
}

#[test]
fn add_on_empty_with_no_valid_files_stays_empty() {
    let mut batch = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));
    let outcome = batch.add_files(vec![file("notes.txt")]);
    assert_eq!(outcome, AddOutcome::RejectedAll);
    assert_eq!(batch.state(), BatchState::Empty);
}

#[test]
fn add_truncates_beyond_cap_in_input_order() {
    let mut batch = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));

    let candidates: Vec<SelectedFile> =
        (0..13).map(|i| file(&format!("sheet{i:02}.pdf"))).collect();
    let outcome = batch.add_files(candidates);

    assert_eq!(
        outcome,
        AddOutcome::Truncated {
            total: MAX_BATCH_FILES,
            dropped: 3
        }
    );
    assert_eq!(batch.items().len(), MAX_BATCH_FILES);
    assert_eq!(batch.items()[0].name, "sheet00.pdf");
    assert_eq!(batch.items()[9].name, "sheet09.pdf");
    assert!(batch.status_message().contains("At most 10"));
}

#[test]
fn add_accumulates_across_gestures_up_to_cap() {
    let mut batch = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));

    let first: Vec<SelectedFile> = (0..6).map(|i| file(&format!("a{i}.pdf"))).collect();
    assert_eq!(batch.add_files(first), AddOutcome::Added { total: 6 });

    let second: Vec<SelectedFile> = (0..6).map(|i| file(&format!("b{i}.xlsx"))).collect();
    let outcome = batch.add_files(second);
    assert_eq!(
        outcome,
        AddOutcome::Truncated {
            total: MAX_BATCH_FILES,
            dropped: 2
        }
    );

    // First gesture fully retained, second truncated in input order
    assert_eq!(batch.items()[0].name, "a0.pdf");
    assert_eq!(batch.items()[5].name, "a5.pdf");
    assert_eq!(batch.items()[6].name, "b0.xlsx");
    assert_eq!(batch.items()[9].name, "b3.xlsx");
}

#[test]
fn clear_resets_to_empty() {
    let mut batch = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));
    batch.add_files(vec![file("resume.pdf")]);
    batch.clear();
    assert_eq!(batch.state(), BatchState::Empty);
    assert_eq!(batch.status(), BatchStatus::Idle);
}

// ─── Upload protocol ────────────────────────────────────────────

#[tokio::test]
async fn upload_on_empty_batch_is_a_validation_error() {
    let mut batch = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));
    let err = batch.upload().await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn full_success_clears_batch() {
    let issuer = MockIssuer::new(&[]);
    let sink = MockSink::new(&[]);
    let mut batch = batch_with(issuer.clone(), sink.clone());
    batch.add_files(vec![file("resume.pdf"), file("plan.xlsx"), file("old.xls")]);

    let uploaded = batch.upload().await.unwrap();
    assert_eq!(uploaded, 3);
    assert_eq!(batch.state(), BatchState::Empty);
    assert_eq!(batch.status(), BatchStatus::Succeeded);
    assert!(batch.status_message().contains('3'));

    // Every file went through both steps with its own MIME type
    let requests = issuer.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.contains(&("resume.pdf".into(), "application/pdf".into())));
    let puts = sink.puts.lock().unwrap();
    assert_eq!(puts.len(), 3);
    assert!(puts
        .iter()
        .any(|(dest, ct, len)| dest.contains("plan.xlsx")
            && ct.contains("spreadsheetml")
            && *len == 16));
}

#[tokio::test]
async fn destination_failure_retains_original_batch() {
    let issuer = MockIssuer::new(&["resume.pdf"]);
    let sink = MockSink::new(&[]);
    let mut batch = batch_with(issuer.clone(), sink.clone());
    batch.add_files(vec![file("resume.pdf"), file("plan.xlsx")]);

    let err = batch.upload().await.unwrap_err();

    // The batch is unchanged from before the call, ready for a re-attempt
    assert_eq!(names(&batch), vec!["resume.pdf", "plan.xlsx"]);
    assert_eq!(batch.state(), BatchState::Selected);
    assert_eq!(batch.status(), BatchStatus::Failed);

    // The message names the failing file
    assert!(batch.status_message().contains("resume.pdf"));
    assert_eq!(err.file_name(), Some("resume.pdf"));

    // All-settle: the sibling still completed its transfer
    let puts = sink.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert!(puts[0].0.contains("plan.xlsx"));
}

#[tokio::test]
async fn sink_failure_is_reported_under_the_file_name() {
    let issuer = MockIssuer::new(&[]);
    let sink = MockSink::new(&["plan.xlsx"]);
    let mut batch = batch_with(issuer.clone(), sink.clone());
    batch.add_files(vec![file("resume.pdf"), file("plan.xlsx")]);

    let err = batch.upload().await.unwrap_err();
    assert_eq!(err.file_name(), Some("plan.xlsx"));
    assert!(batch.status_message().contains("plan.xlsx"));
    assert_eq!(names(&batch), vec!["resume.pdf", "plan.xlsx"]);
}

#[tokio::test]
async fn multiple_failures_report_one_representative_plus_count() {
    let issuer = MockIssuer::new(&["a.pdf", "b.pdf"]);
    let sink = MockSink::new(&[]);
    let mut batch = batch_with(issuer.clone(), sink.clone());
    batch.add_files(vec![file("a.pdf"), file("b.pdf"), file("c.pdf")]);

    batch.upload().await.unwrap_err();
    assert!(batch.status_message().contains("a.pdf"));
    assert!(batch.status_message().contains("1 more"));
}

#[tokio::test]
async fn failed_batch_can_be_retried_to_success() {
    // First attempt fails for one file; a second attempt with a healthy
    // issuer drains the same retained batch.
    let issuer = MockIssuer::new(&["resume.pdf"]);
    let sink = MockSink::new(&[]);
    let mut batch = batch_with(issuer, sink.clone());
    batch.add_files(vec![file("resume.pdf"), file("plan.xlsx")]);
    batch.upload().await.unwrap_err();
    assert_eq!(batch.items().len(), 2);

    let mut retry = batch_with(MockIssuer::new(&[]), MockSink::new(&[]));
    retry.add_files(batch.items().to_vec());
    let uploaded = retry.upload().await.unwrap();
    assert_eq!(uploaded, 2);
    assert_eq!(retry.state(), BatchState::Empty);
}
