use std::fs;

use autojudge::config::Config;
use autojudge::{ConfigError, DiscoveryError, discover_tasks, latest_assignment_dir};

use super::Assignment;

#[test]
fn course_layout_resolves_latest_assignment() {
    let base = tempfile::tempdir().unwrap();
    for dir in ["assignment1", "assignment2", "challenge5", "notes"] {
        fs::create_dir(base.path().join(dir)).unwrap();
    }
    let latest = base.path().join("assignment2");
    fs::create_dir(latest.join("1_hello")).unwrap();
    fs::create_dir(latest.join("2_sum")).unwrap();

    let root = latest_assignment_dir(base.path()).unwrap();
    assert_eq!(root, latest);

    let discovery = discover_tasks(&root, &Config::default(), &root.join("build")).unwrap();
    let folders: Vec<&str> = discovery.tasks.iter().map(|t| t.folder.as_str()).collect();
    assert_eq!(folders, vec!["1_hello", "2_sum"]);
    assert!(discovery.rejected.is_empty());
}

#[test]
fn files_named_like_tasks_are_ignored() {
    let mut assignment = Assignment::new();
    assignment.add_task("1_sum", "true");
    fs::write(assignment.root().join("2_notes"), "not a folder").unwrap();

    let discovery = assignment.discover();
    assert_eq!(discovery.tasks.len(), 1);
    assert!(discovery.rejected.is_empty());
}

#[test]
fn unconfigured_folder_is_reported_not_dropped() {
    let mut assignment = Assignment::new();
    assignment.add_task("1_sum", "true");
    fs::create_dir(assignment.root().join("7_extra")).unwrap();

    let discovery = assignment.discover();

    assert_eq!(discovery.tasks.len(), 1);
    assert_eq!(discovery.rejected.len(), 1);
    assert_eq!(discovery.rejected[0].folder, "7_extra");
    assert!(matches!(
        discovery.rejected[0].error,
        ConfigError::TaskNotFound(_)
    ));
}

#[test]
fn per_task_test_data_names() {
    let mut assignment = Assignment::new();
    assignment.add_task("1_sum", "true");
    {
        let meta = assignment.config.tasks.get_mut("1_sum").unwrap();
        meta.inputs = Some(vec!["small.txt".into(), "large.txt".into()]);
        meta.outputs = Some(vec!["small.ans".into(), "large.ans".into()]);
    }
    let data = assignment.root().join("data").join("1_sum");
    fs::create_dir_all(&data).unwrap();
    for name in ["small.txt", "large.txt"] {
        fs::write(data.join(name), "").unwrap();
    }

    let task = assignment.task("1_sum");
    assert_eq!(task.test_cases, 2);
    let case = task.test_case(2).unwrap();
    assert_eq!(case.input, data.join("large.txt"));
    assert_eq!(case.expected, data.join("large.ans"));
}

#[test]
fn empty_base_has_no_assignment() {
    let base = tempfile::tempdir().unwrap();
    assert!(matches!(
        latest_assignment_dir(base.path()),
        Err(DiscoveryError::NoAssignment(_))
    ));
}
