//! Document persistence tests for the file-backed task store.

use super::helpers::{TempProject, project};
use devflow::task::{
    domain::{TaskKey, TaskRecord, TaskStatus},
    ports::{ScanEntry, TaskStore, TaskStoreError},
};
use eyre::ensure;
use rstest::rstest;

fn key(value: &str) -> TaskKey {
    TaskKey::new(value).expect("test task key should be valid")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_directory_reads_as_empty(project: TempProject) -> eyre::Result<()> {
    let entry = project.store.load(&key("T1")).await?;
    ensure!(!entry.is_present(), "nothing has been written yet");
    ensure!(project.store.scan().await?.is_empty(), "scan should be empty");
    ensure!(!project.tasks_path().exists(), "reads must not create directories");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn save_writes_a_front_matter_document(project: TempProject) -> eyre::Result<()> {
    let mut record = TaskRecord::draft(key("T1"));
    record.title = Some("Payments API".to_owned());

    let stored = project.store.save(&record, 0).await?;
    ensure!(stored.version == 1, "first save stamps version 1");

    let contents = project.read_document("T1.md");
    ensure!(contents.starts_with("---\n"), "document must open with front matter");
    ensure!(contents.contains("taskKey: T1"), "key missing: {contents}");
    ensure!(contents.contains("version: 1"), "version missing: {contents}");
    ensure!(contents.contains("# T1: Payments API"), "default body missing: {contents}");
    ensure!(
        project.file_names() == vec!["T1.md".to_owned()],
        "temporary files must not remain: {:?}",
        project.file_names()
    );

    let loaded = project.store.load(&key("T1")).await?.into_record();
    ensure!(loaded == stored, "loaded record differs from stored record");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_save_is_a_version_conflict(project: TempProject) -> eyre::Result<()> {
    let record = TaskRecord::draft(key("T1"));
    project.store.save(&record, 0).await?;
    let before = project.read_document("T1.md");

    let result = project.store.save(&record, 0).await;
    ensure!(
        matches!(
            result,
            Err(TaskStoreError::VersionConflict {
                expected: 0,
                found: 1,
                ..
            })
        ),
        "expected a version conflict, got {result:?}"
    );
    ensure!(project.read_document("T1.md") == before, "document must be retained");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unparseable_document_is_malformed(project: TempProject) -> eyre::Result<()> {
    project.write_document("T1.md", "---\nstatus: [unclosed\n---\n");
    let result = project.store.load(&key("T1")).await;
    ensure!(
        matches!(result, Err(TaskStoreError::Malformed { .. })),
        "expected malformed error, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn document_without_status_is_a_draft(project: TempProject) -> eyre::Result<()> {
    project.write_document("T1.md", "---\nowner: alice\n---\n\nHand-written notes\n");
    let record = project.store.load(&key("T1")).await?.into_record();
    ensure!(record.status == TaskStatus::Draft, "missing status is DRAFT");
    ensure!(record.owner.as_deref() == Some("alice"), "owner lost");
    ensure!(record.body == "Hand-written notes\n", "body lost");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scan_reports_parsed_and_malformed_documents(project: TempProject) -> eyre::Result<()> {
    project.store.save(&TaskRecord::draft(key("B")), 0).await?;
    project.store.save(&TaskRecord::draft(key("A")), 0).await?;
    project.write_document("C.md", "---\ntaskKey: D\n---\n");
    project.write_document("notes.txt", "not a task");
    project.write_document("E.md.tmp", "---\ntaskKey: E\n---\n");

    let entries = project.store.scan().await?;
    let summary: Vec<String> = entries
        .iter()
        .map(|entry| match entry {
            ScanEntry::Parsed(record) => format!("parsed:{}", record.task_key),
            ScanEntry::Malformed { source, .. } => format!("malformed:{source}"),
        })
        .collect();
    ensure!(
        summary == vec!["parsed:A", "parsed:B", "malformed:C.md"],
        "unexpected scan result {summary:?}"
    );
    Ok(())
}
