//! Lifecycle, gate, and report services over task documents.

use std::sync::Arc;

use super::helpers::{TempProject, project};
use devflow::task::{
    adapters::file::FileTaskStore,
    domain::{TaskKey, TaskStatus},
    ports::TaskStore,
    services::{
        DownstreamAction, ReportAggregator, ReportFilter, TaskGate, TaskLifecycleService,
        TransitionTaskRequest,
    },
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;

fn lifecycle(project: &TempProject) -> TaskLifecycleService<FileTaskStore, DefaultClock> {
    TaskLifecycleService::new(Arc::new(project.store.clone()), Arc::new(DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitions_persist_across_store_instances(project: TempProject) -> eyre::Result<()> {
    let service = lifecycle(&project);
    service
        .transition(TransitionTaskRequest::new("PAY-1", "PENDING_REVIEW", "alice"))
        .await?;
    service
        .transition(TransitionTaskRequest::new("PAY-1", "APPROVED", "bob"))
        .await?;

    let reopened = FileTaskStore::new(project.tasks_path());
    let record = reopened
        .load(&TaskKey::new("PAY-1")?)
        .await?
        .into_record();
    ensure!(record.status == TaskStatus::Approved, "status not persisted");
    ensure!(record.reviews.len() == 2, "history not persisted");
    ensure!(record.version == 2, "version not persisted");
    ensure!(record.stats_consistent(), "stats drifted");

    let gate = TaskGate::new(Arc::new(reopened));
    let current = gate
        .authorize("PAY-1", DownstreamAction::TicketPublication)
        .await?;
    ensure!(current == TaskStatus::Approved, "gate should report current status");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transition_preserves_body_and_foreign_metadata(project: TempProject) -> eyre::Result<()> {
    project.write_document(
        "PAY-2.md",
        "---\ntaskKey: PAY-2\nowner: alice\njiraEpic: PAY-12\n---\n\n## Notes\n\nKeep me.\n",
    );

    lifecycle(&project)
        .transition(TransitionTaskRequest::new("PAY-2", "PENDING_REVIEW", "alice"))
        .await?;

    let contents = project.read_document("PAY-2.md");
    ensure!(contents.contains("status: PENDING_REVIEW"), "status missing: {contents}");
    ensure!(contents.contains("jiraEpic: PAY-12"), "foreign key dropped: {contents}");
    ensure!(contents.ends_with("## Notes\n\nKeep me.\n"), "body changed: {contents}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_transition_leaves_document_untouched(project: TempProject) -> eyre::Result<()> {
    let service = lifecycle(&project);
    service
        .transition(TransitionTaskRequest::new("PAY-3", "PENDING_REVIEW", "alice"))
        .await?;
    let before = project.read_document("PAY-3.md");

    let result = service
        .transition(TransitionTaskRequest::new("PAY-3", "CHANGES_REQUESTED", "bob"))
        .await;
    ensure!(result.is_err(), "missing justification must be refused");
    ensure!(project.read_document("PAY-3.md") == before, "document changed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn report_skips_unreadable_documents(project: TempProject) -> eyre::Result<()> {
    let service = lifecycle(&project);
    service
        .transition(TransitionTaskRequest::new("PAY-4", "PENDING_REVIEW", "alice"))
        .await?;
    project.write_document("PAY-5.md", "---\nstatus: NOT_A_STATUS\n---\n");

    let report = ReportAggregator::new(Arc::new(project.store.clone()))
        .with_activity_limit(project.config.recent_activity_limit)
        .generate(&ReportFilter::new())
        .await?;
    ensure!(report.total_tasks == 1, "only the valid task is reported");
    ensure!(report.summary.skipped_records == 1, "unreadable document skipped");
    ensure!(report.summary.total_records == 2, "both documents were scanned");
    Ok(())
}
