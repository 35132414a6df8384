use super::*;

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

fn job(status: &str, output: Option<&str>) -> Prediction {
    serde_json::from_value(serde_json::json!({
        "id": "job-1",
        "status": status,
        "output": output.map(|url| vec![url]),
    }))
    .expect("prediction")
}

fn quick_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_attempts,
        timeout: Duration::from_secs(5),
        ..PollPolicy::default()
    }
}

/// Fetcher that replays `states` in order and counts calls.
fn scripted(
    states: Vec<Prediction>,
) -> (
    impl FnMut(PredictionId) -> std::future::Ready<Result<Prediction, ClientError>>,
    Arc<Mutex<u32>>,
) {
    let queue = Arc::new(Mutex::new(VecDeque::from(states)));
    let calls = Arc::new(Mutex::new(0u32));
    let counter = calls.clone();
    let fetch = move |id: PredictionId| {
        *counter.lock().expect("lock") += 1;
        assert_eq!(id.0, "job-1");
        let next = queue
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| job("processing", None));
        std::future::ready(Ok(next))
    };
    (fetch, calls)
}

#[tokio::test]
async fn terminal_initial_state_skips_polling() {
    let (fetch, calls) = scripted(Vec::new());
    let done = wait_for_completion(
        job("succeeded", Some("https://out/1.png")),
        &quick_policy(3),
        fetch,
    )
    .await
    .expect("done");
    assert_eq!(done.status, PredictionStatus::Succeeded);
    assert_eq!(*calls.lock().expect("lock"), 0);
}

#[tokio::test]
async fn polls_until_job_succeeds() {
    let (fetch, calls) = scripted(vec![
        job("processing", None),
        job("processing", None),
        job("succeeded", Some("https://out/final.png")),
    ]);
    let done = wait_for_completion(job("starting", None), &quick_policy(10), fetch)
        .await
        .expect("done");
    assert_eq!(result_url(&done).expect("url"), "https://out/final.png");
    assert_eq!(*calls.lock().expect("lock"), 3);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let (fetch, calls) = scripted(Vec::new());
    let err = wait_for_completion(job("starting", None), &quick_policy(4), fetch)
        .await
        .expect_err("never finishes");
    match err {
        ClientError::Timeout {
            attempts, status, ..
        } => {
            assert_eq!(attempts, 4);
            assert_eq!(status, PredictionStatus::Processing);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(*calls.lock().expect("lock"), 4);
}

#[tokio::test]
async fn overall_timeout_stops_before_sleeping_past_it() {
    let policy = PollPolicy {
        interval: Duration::from_secs(10),
        max_attempts: 100,
        timeout: Duration::from_secs(1),
        ..PollPolicy::default()
    };
    let (fetch, calls) = scripted(Vec::new());
    let started = Instant::now();
    let err = wait_for_completion(job("starting", None), &policy, fetch)
        .await
        .expect_err("timeout");
    assert!(matches!(err, ClientError::Timeout { attempts: 0, .. }));
    assert_eq!(*calls.lock().expect("lock"), 0);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn fetch_errors_abort_the_wait() {
    let fetch = |id: PredictionId| {
        std::future::ready(Err::<Prediction, _>(ClientError::Status {
            id,
            status: 502,
            message: Some("provider unreachable".into()),
        }))
    };
    let err = wait_for_completion(job("starting", None), &quick_policy(5), fetch)
        .await
        .expect_err("fetch fails");
    assert!(matches!(err, ClientError::Status { status: 502, .. }));
}

#[test]
fn failed_job_reports_provider_error() {
    let mut failed = job("failed", None);
    failed.error = Some("NSFW content detected".into());
    let err = result_url(&failed).expect_err("failed job");
    match err {
        ClientError::JobFailed { status, message, .. } => {
            assert_eq!(status, PredictionStatus::Failed);
            assert_eq!(message, "NSFW content detected");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn succeeded_job_without_output_is_an_error() {
    let err = result_url(&job("succeeded", None)).expect_err("no output");
    assert!(matches!(err, ClientError::MissingOutput { .. }));
}
