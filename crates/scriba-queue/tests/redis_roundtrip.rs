//! Broker and result-store integration tests.

use std::path::PathBuf;

use scriba_models::{OutputFormat, StageResult, TaskOutcome, TranscriptResult};
use scriba_queue::{first_envelope, next_envelope, JobStatus, StagePlan, TranscribeParams};

fn transcribe_params() -> TranscribeParams {
    TranscribeParams {
        input_path: PathBuf::from("/tmp/scriba-test/uid_talk"),
        output_path: PathBuf::from("/tmp/scriba-test/uid_talk.srt"),
        language: String::new(),
        format: OutputFormat::Srt,
        model: "base".to_string(),
    }
}

/// Test broker connection and basic operations.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_broker_connection() {
    dotenvy::dotenv().ok();

    let queue = scriba_queue::TaskQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let len = queue.len().await.expect("Failed to get queue length");
    println!("Queue length: {}", len);
}

/// Test envelope enqueue and consume cycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_enqueue_consume_ack() {
    dotenvy::dotenv().ok();

    let queue = scriba_queue::TaskQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let envelope = first_envelope(transcribe_params(), Vec::new());
    let task_id = envelope.task_id.clone();

    let message_id = queue.enqueue(&envelope).await.expect("Failed to enqueue");
    println!("Enqueued task {} with message ID {}", task_id, message_id);

    let tasks = queue
        .consume("test-consumer", 1000, 1)
        .await
        .expect("Failed to consume");

    assert_eq!(tasks.len(), 1);
    let (msg_id, consumed) = &tasks[0];
    assert_eq!(consumed.task_id, task_id);

    queue.ack(msg_id).await.expect("Failed to ack");
}

/// Test that a chained job stays pending until its last stage records a
/// job-visible outcome.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_chain_stays_pending_until_last_stage() {
    dotenvy::dotenv().ok();

    let results = scriba_queue::ResultStore::from_env().expect("Failed to create result store");

    let first = first_envelope(transcribe_params(), vec![StagePlan::RenderVideo]);
    let job_id = first.job_id.clone();

    // Stage 1 succeeds: task record only, no job record yet.
    let transcript = StageResult::Transcript(TranscriptResult {
        input_path: PathBuf::from("/tmp/scriba-test/uid_talk"),
        output_path: PathBuf::from("/tmp/scriba-test/uid_talk.srt"),
    });
    results
        .record_task(&first.task_id, &TaskOutcome::completed(transcript.clone()))
        .await
        .expect("record task");

    let status = results.job_status(&job_id).await.expect("status");
    assert!(matches!(status, JobStatus::Pending));

    // Stage 2 is the final stage: its outcome lands under the job key.
    let second = next_envelope(&first, &transcript)
        .expect("handoff")
        .expect("next stage");
    assert!(second.is_final());

    let video = StageResult::Video(scriba_models::VideoResult {
        output_path: PathBuf::from("/tmp/scriba-test/uid_talk.mp4"),
    });
    let outcome = TaskOutcome::completed(video);
    results
        .record_task(&second.task_id, &outcome)
        .await
        .expect("record task");
    results
        .record_job(&job_id, &outcome)
        .await
        .expect("record job");

    match results.job_status(&job_id).await.expect("status") {
        JobStatus::Completed { file_type, .. } => {
            assert_eq!(file_type, scriba_models::ArtifactKind::Video)
        }
        other => panic!("unexpected status: {other:?}"),
    }
}
