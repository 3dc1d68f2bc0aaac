//! End-to-end aggregation tests against MemoryJobSource.

use ci_stats_core::fakes::MemoryJobSource;
use ci_stats_core::{
    ComponentCatalog, ComponentStatus, FailurePolicy, PipelineAggregator, PipelineTotals,
    FAILED_JOBS_PAGE_SIZE,
};
use std::sync::Arc;

const FRONTEND_CORE_LOG: &str = "\
$ python manage.py test --parallel
Creating test database for alias 'default'...
......E..F....
Ran 14 tests in 3.118s
... FAILED: skipped=0 errors=2 failures=1 ...
Destroying test database for alias 'default'...
ERROR: Job failed: exit code 1
";

fn identifiers(report: &ci_stats_core::PipelineReport) -> Vec<String> {
    report
        .components
        .iter()
        .map(|e| e.identifier.clone())
        .collect()
}

/// Test: a single failed frontend job is reported in place with its counts
#[tokio::test]
async fn test_failed_frontend_core_job() {
    let source = Arc::new(MemoryJobSource::new().with_failed_job(
        99,
        "test:frontend:core",
        FRONTEND_CORE_LOG,
    ));

    let report = PipelineAggregator::new(source.clone())
        .aggregate("5120")
        .await
        .expect("aggregation failed");

    assert_eq!(
        report.status_of("test:frontend:common"),
        Some(&ComponentStatus::Success)
    );
    let core = report.status_of("test:frontend:core").unwrap();
    assert_eq!(
        core,
        &ComponentStatus::Failed {
            errors: 2,
            failures: 1
        }
    );
    assert_eq!(core.to_string(), "FAILED:   errors=2    failures=1    ");
    assert_eq!(
        report.totals,
        PipelineTotals {
            errors: 2,
            failures: 1
        }
    );
    assert_eq!(source.fetched_logs(), vec![99]);

    // Catalog order is untouched.
    let expected: Vec<String> = ComponentCatalog::build()
        .identifiers()
        .map(str::to_string)
        .collect();
    assert_eq!(identifiers(&report), expected);
}

/// Test: a log without a summary line becomes the sentinel and counts zero
#[tokio::test]
async fn test_unparseable_log_yields_sentinel() {
    let source = Arc::new(
        MemoryJobSource::new()
            .with_failed_job(11, "test:taapi:common", "Killed\nERROR: Job failed\n")
            .with_failed_job(
                12,
                "test:taapi:core",
                "FAILED (skipped=1, errors=0, failures=4)",
            ),
    );

    let report = PipelineAggregator::new(source)
        .aggregate("5121")
        .await
        .unwrap();

    assert_eq!(
        report.status_of("test:taapi:common"),
        Some(&ComponentStatus::Unknown {
            text: "ERROR!!!".to_string()
        })
    );
    assert_eq!(
        report.totals,
        PipelineTotals {
            errors: 0,
            failures: 4
        }
    );
    assert!(report.render_text().contains("test:taapi:common              ERROR!!!\n"));
}

/// Test: only the first page of failed jobs is considered
#[tokio::test]
async fn test_pagination_boundary_drops_51st_job() {
    let mut source = MemoryJobSource::new();
    for i in 0..=FAILED_JOBS_PAGE_SIZE as u64 {
        source = source.with_failed_job(
            1000 + i,
            &format!("test:shard: [{i}]"),
            "FAILED (skipped=0, errors=1, failures=0)",
        );
    }
    let source = Arc::new(source);

    let report = PipelineAggregator::new(source.clone())
        .aggregate("5122")
        .await
        .unwrap();

    assert_eq!(source.requested_page_sizes(), vec![50]);
    assert!(report.truncated);
    assert!(report.status_of("test:shard: [49]").is_some());
    assert!(report.status_of("test:shard: [50]").is_none());
    assert_eq!(report.totals.errors, 50);
    assert_eq!(source.fetched_logs().len(), 50);
}

/// Test: job names outside the catalog are appended in listing order
#[tokio::test]
async fn test_unknown_jobs_appended_in_listing_order() {
    let source = Arc::new(
        MemoryJobSource::new()
            .with_failed_job(3, "test:zeta:core", "FAILED (skipped=0, errors=1)")
            .with_failed_job(1, "test:acapi:core", "FAILED (skipped=0, failures=1)")
            .with_failed_job(2, "test:alpha:core", "OK (skipped=0)")
            .with_failed_job(4, "lint:python", "irrelevant"),
    );

    let report = PipelineAggregator::new(source)
        .aggregate("5123")
        .await
        .unwrap();

    let ids = identifiers(&report);
    let catalog_len = ComponentCatalog::build().len();
    assert_eq!(ids.len(), catalog_len + 2);
    assert_eq!(ids[1], "test:acapi:core");
    assert_eq!(ids[catalog_len], "test:zeta:core");
    assert_eq!(ids[catalog_len + 1], "test:alpha:core");
    assert!(!ids.contains(&"lint:python".to_string()));
}

/// Test: fail-fast aborts on the first unreachable log
#[tokio::test]
async fn test_fail_fast_on_log_error() {
    let source = Arc::new(
        MemoryJobSource::new()
            .with_unreachable_log(21, "test:worker:common")
            .with_failed_job(22, "test:worker:core", FRONTEND_CORE_LOG),
    );

    let err = PipelineAggregator::new(source.clone())
        .aggregate("5124")
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("test:worker:common"));
    assert_eq!(source.fetched_logs(), vec![21]);
}

/// Test: keep-going records the unreachable job and finishes the report
#[tokio::test]
async fn test_keep_going_marks_job_unavailable() {
    let source = Arc::new(
        MemoryJobSource::new()
            .with_unreachable_log(21, "test:worker:common")
            .with_failed_job(22, "test:worker:core", FRONTEND_CORE_LOG),
    );

    let report = PipelineAggregator::new(source)
        .with_policy(FailurePolicy::KeepGoing)
        .aggregate("5125")
        .await
        .unwrap();

    assert_eq!(
        report.status_of("test:worker:common"),
        Some(&ComponentStatus::Unavailable {
            reason: "connection refused".to_string()
        })
    );
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("21"));
    assert_eq!(
        report.totals,
        PipelineTotals {
            errors: 2,
            failures: 1
        }
    );
}

/// Test: a listing failure is fatal regardless of policy
#[tokio::test]
async fn test_listing_error_is_fatal() {
    let source = Arc::new(MemoryJobSource::new().with_listing_error("HTTP 401 Unauthorized"));

    let err = PipelineAggregator::new(source)
        .with_policy(FailurePolicy::KeepGoing)
        .aggregate("5126")
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("5126"));
    assert!(err.to_string().contains("401"));
}
