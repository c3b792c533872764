use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use serde_json::{Value, json};

use clickup_report::api::{ListSummary, Task, TaskPage, TaskSource};
use clickup_report::config::ReportsConfig;
use clickup_report::pipeline::{FetchOutcome, FetchPass, run_summary};
use clickup_report::report::{Assignees, read_completed};
use clickup_report::resolver::ExclusionSet;
use clickup_report::summary::GroupBy;
use clickup_report::{ReportError, Result};

const CLOSED_AT: &str = "1700000000000";

/// In-memory folder that answers like the ClickUp API.
#[derive(Default)]
struct FakeClickUp {
    lists: Vec<ListSummary>,
    pages: HashMap<String, Vec<Value>>,
    tasks: HashMap<String, Value>,
    requests: RefCell<Vec<String>>,
}

impl FakeClickUp {
    fn list(mut self, id: &str, pages: Vec<Value>) -> Self {
        self.lists.push(ListSummary {
            id: id.into(),
            name: format!("List {id}"),
        });
        self.pages.insert(id.into(), pages);
        self
    }

    fn task(mut self, body: Value) -> Self {
        let id = body["id"].as_str().unwrap().to_string();
        self.tasks.insert(id, body);
        self
    }

    fn not_found(path: String) -> ReportError {
        ReportError::Status {
            url: path,
            status: reqwest::StatusCode::NOT_FOUND,
            body: "{\"err\":\"Task not found\"}".into(),
        }
    }
}

impl TaskSource for FakeClickUp {
    fn lists(&self, folder_id: &str) -> Result<Vec<ListSummary>> {
        self.requests.borrow_mut().push(format!("folder/{folder_id}/list"));
        Ok(self.lists.clone())
    }

    fn tasks_page(&self, list_id: &str, page: u32) -> Result<TaskPage> {
        let path = format!("list/{list_id}/task?page={page}");
        self.requests.borrow_mut().push(path.clone());
        let body = self
            .pages
            .get(list_id)
            .and_then(|pages| pages.get(page as usize))
            .cloned()
            .ok_or_else(|| Self::not_found(path))?;
        Ok(serde_json::from_value(body).unwrap())
    }

    fn task(&self, task_id: &str, include_subtasks: bool) -> Result<Task> {
        let path = format!("task/{task_id}?include_subtasks={include_subtasks}");
        self.requests.borrow_mut().push(path.clone());
        let body = self.tasks.get(task_id).cloned().ok_or_else(|| Self::not_found(path))?;
        Ok(serde_json::from_value(body).unwrap())
    }
}

fn closed(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": { "status": "complete", "type": "closed" },
        "date_closed": CLOSED_AT
    })
}

fn open(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": { "status": "in progress", "type": "open" },
        "date_closed": null
    })
}

fn page(tasks: Vec<Value>) -> Value {
    json!({ "tasks": tasks, "last_page": true })
}

fn detail(id: &str, subtasks: usize, linked: &[&str], deps: &[&str]) -> Value {
    let subtasks: Vec<Value> = (0..subtasks)
        .map(|i| json!({ "id": format!("{id}-s{i}") }))
        .collect();
    let linked: Vec<Value> = linked
        .iter()
        .map(|t| json!({ "task_id": t, "link_id": id }))
        .collect();
    let deps: Vec<Value> = deps
        .iter()
        .map(|t| json!({ "task_id": t, "depends_on": id, "type": 1 }))
        .collect();
    json!({
        "id": id,
        "name": format!("detail {id}"),
        "status": { "type": "closed" },
        "subtasks": subtasks,
        "linked_tasks": linked,
        "dependencies": deps
    })
}

fn related(id: &str, name: &str, assignees: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": { "type": "open" },
        "assignees": assignees.iter().map(|a| json!({ "id": 1, "username": a })).collect::<Vec<_>>()
    })
}

#[test]
fn empty_folder_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default();

    let outcome = FetchPass::new(&source, "folder-1").run(&output).unwrap();

    assert_eq!(outcome, FetchOutcome::NoLists);
    assert!(!output.exists());
    assert_eq!(*source.requests.borrow(), vec!["folder/folder-1/list".to_string()]);
}

#[test]
fn lists_without_closed_tasks_write_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![open("t1", "Draft")])])
        .list("b", vec![page(vec![])]);

    let outcome = FetchPass::new(&source, "f").run(&output).unwrap();

    assert_eq!(
        outcome,
        FetchOutcome::Written {
            path: output.clone(),
            records: 0
        }
    );
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Task Name,Subtask Count,Closed Date,Assignees\n"
    );
    let requests = source.requests.borrow();
    assert!(requests.contains(&"list/a/task?page=0".to_string()));
    assert!(requests.contains(&"list/b/task?page=0".to_string()));
}

#[test]
fn linked_task_supplies_name_and_assignees() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![closed("t1", "Parent")])])
        .task(detail("t1", 3, &["r1"], &[]))
        .task(related("r1", "Bob's task", &["Bob"]));

    FetchPass::new(&source, "f").run(&output).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Task Name,Subtask Count,Closed Date,Assignees\nBob's task,3,14-11-2023,['Bob']\n"
    );
}

#[test]
fn excluded_assignees_leave_an_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![closed("t1", "Parent")])])
        .task(detail("t1", 0, &["r1"], &[]))
        .task(related("r1", "Shared", &["Malik Alamsyah"]));

    FetchPass::new(&source, "f").run(&output).unwrap();

    let records = read_completed(&output).unwrap();
    assert_eq!(records[0].task_name, "Shared");
    assert_eq!(records[0].assignees, Assignees::Known(Vec::new()));
}

#[test]
fn task_without_relationships_falls_back_to_own_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let mut untimed = closed("t1", "Solo work");
    untimed["date_closed"] = Value::Null;
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![untimed])])
        .task(detail("t1", 1, &[], &[]));

    FetchPass::new(&source, "f").run(&output).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Task Name,Subtask Count,Closed Date,Assignees\nSolo work,1,-,No Linked Tasks\n"
    );
}

#[test]
fn dependencies_used_only_without_links() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![closed("t1", "One"), closed("t2", "Two")])])
        .task(detail("t1", 0, &["r1"], &["d1"]))
        .task(detail("t2", 0, &[], &["d2"]))
        .task(related("r1", "Linked", &["Ann"]))
        .task(related("d1", "Never read", &["Zed"]))
        .task(related("d2", "Dependency", &["Dan"]));

    FetchPass::new(&source, "f").run(&output).unwrap();

    let records = read_completed(&output).unwrap();
    assert_eq!(records[0].task_name, "Linked");
    assert_eq!(records[1].task_name, "Dependency");
    assert_eq!(records[1].assignees, Assignees::Known(vec!["Dan".into()]));
    assert!(!source
        .requests
        .borrow()
        .iter()
        .any(|r| r.starts_with("task/d1")));
}

#[test]
fn unreachable_related_task_is_recorded_empty() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![closed("t1", "Parent")])])
        .task(detail("t1", 2, &["gone"], &[]));

    FetchPass::new(&source, "f").run(&output).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Task Name,Subtask Count,Closed Date,Assignees\n,2,14-11-2023,[]\n"
    );
}

#[test]
fn follows_pages_until_the_last_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list(
            "a",
            vec![
                json!({ "tasks": [closed("t1", "First")], "last_page": false }),
                json!({ "tasks": [closed("t2", "Second")], "last_page": true }),
            ],
        )
        .task(detail("t1", 0, &[], &[]))
        .task(detail("t2", 0, &[], &[]));

    let outcome = FetchPass::new(&source, "f").run(&output).unwrap();

    assert!(matches!(outcome, FetchOutcome::Written { records: 2, .. }));
    let names: Vec<String> = read_completed(&output)
        .unwrap()
        .into_iter()
        .map(|r| r.task_name)
        .collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn failed_primary_fetch_aborts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![closed("t1", "Fine"), closed("t2", "Broken")])])
        .task(detail("t1", 0, &[], &[]));

    let err = FetchPass::new(&source, "f").run(&output).unwrap_err();

    assert!(err.is_status());
    assert!(!output.exists());
}

#[test]
fn injected_exclusions_reach_the_resolver() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed_tasks.csv");
    let source = FakeClickUp::default()
        .list("a", vec![page(vec![closed("t1", "Parent")])])
        .task(detail("t1", 0, &["r1"], &[]))
        .task(related("r1", "Pair", &["Arifin", "Eve"]));

    FetchPass::new(&source, "f")
        .with_exclusions(ExclusionSet::new(["Eve"]))
        .run(&output)
        .unwrap();

    let records = read_completed(&output).unwrap();
    assert_eq!(records[0].assignees, Assignees::Known(vec!["Arifin".into()]));
}

#[test]
fn fetch_then_summarize() {
    let dir = tempfile::tempdir().unwrap();
    let completed = dir.path().join("completed_tasks.csv");
    let summary = dir.path().join("tasks_summary.csv");
    let source = FakeClickUp::default()
        .list(
            "a",
            vec![page(vec![
                closed("t1", "One"),
                closed("t2", "Two"),
                closed("t3", "Three"),
                closed("t4", "Four"),
            ])],
        )
        .task(detail("t1", 2, &["r1"], &[]))
        .task(detail("t2", 2, &["r2"], &[]))
        .task(detail("t3", 5, &["r3"], &[]))
        .task(detail("t4", 1, &[], &[]))
        .task(related("r1", "A1", &["Alice"]))
        .task(related("r2", "A2", &["Alice", "Bob"]))
        .task(related("r3", "A3", &["Alice"]));

    FetchPass::new(&source, "f").run(&completed).unwrap();
    let rows = run_summary(&completed, &summary, GroupBy::SubtaskCount).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        fs::read_to_string(&summary).unwrap(),
        "name,subtask_count,total_task\nAlice,2,2\nAlice,5,1\nBob,2,1\n"
    );
}

#[test]
fn summary_by_iteration_uses_month_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let completed = dir.path().join("completed_tasks.csv");
    let summary = dir.path().join("tasks_summary.csv");
    fs::write(
        &completed,
        "Task Name,Subtask Count,Closed Date,Assignees\n\
         A,2,14-11-2023,['Alice']\n\
         B,5,30-11-2023,['Alice']\n\
         C,1,01-12-2023,['Alice']\n\
         D,0,-,No Linked Tasks\n",
    )
    .unwrap();

    run_summary(&completed, &summary, GroupBy::Iteration).unwrap();

    assert_eq!(
        fs::read_to_string(&summary).unwrap(),
        "name,iteration,total_task\nAlice,11-2023,2\nAlice,12-2023,1\n"
    );
}

#[test]
fn configured_reports_drive_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let completed = dir.path().join("in.csv");
    let summary = dir.path().join("out.csv");
    let config = dir.path().join("config.yaml");
    fs::write(
        &completed,
        "Task Name,Subtask Count,Closed Date,Assignees\n\
         A,2,14-11-2023,['Alice']\n",
    )
    .unwrap();
    fs::write(
        &config,
        format!(
            "reports:\n  completed: {:?}\n  summary: {:?}\n  group_by: iteration\n",
            completed.display().to_string(),
            summary.display().to_string(),
        ),
    )
    .unwrap();

    let reports = ReportsConfig::load(&config)
        .unwrap()
        .with_overrides(None, None, None);
    run_summary(&reports.completed, &reports.summary, reports.group_by).unwrap();

    assert_eq!(
        fs::read_to_string(&summary).unwrap(),
        "name,iteration,total_task\nAlice,11-2023,1\n"
    );
    assert!(!dir.path().join("tasks_summary.csv").exists());
}

#[test]
fn malformed_report_aborts_summary_only() {
    let dir = tempfile::tempdir().unwrap();
    let completed = dir.path().join("completed_tasks.csv");
    let summary = dir.path().join("tasks_summary.csv");
    fs::write(
        &completed,
        "Task Name,Subtask Count,Closed Date,Assignees\nA,2,14-11-2023,Alice\n",
    )
    .unwrap();

    let err = run_summary(&completed, &summary, GroupBy::SubtaskCount).unwrap_err();

    assert!(matches!(err, ReportError::MalformedAssignees { row: 2, .. }));
    assert!(!summary.exists());
}
