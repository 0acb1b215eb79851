//! Task and event persistence

mod common;

use questlog::domain::{DayKey, NewTask, TaskPatch};
use questlog::tasks::TaskStore;

#[test]
fn test_add_then_remove_restores_collection() {
    let store = common::memory_store();
    let mut tasks = TaskStore::open(store.clone()).unwrap();
    tasks.add_task(NewTask::new("Existing")).unwrap();
    let before = tasks.tasks().to_vec();

    let id = tasks.add_task(NewTask::new("Temporary")).unwrap();
    assert_eq!(tasks.tasks().len(), 2);
    assert!(tasks.remove_task(&id).unwrap());
    assert_eq!(tasks.tasks(), before.as_slice());

    let reloaded = TaskStore::open(store).unwrap();
    assert_eq!(reloaded.tasks(), before.as_slice());
}

#[test]
fn test_update_changes_only_patched_fields() {
    let store = common::memory_store();
    let mut tasks = TaskStore::open(store).unwrap();
    let id = tasks
        .add_task(
            NewTask::new("Write report")
                .with_description("quarterly")
                .with_due_date("2026-10-20"),
        )
        .unwrap();

    assert!(tasks.update_task(TaskPatch::new(&id).title("Write summary")).unwrap());

    let task = tasks.task(&id).unwrap();
    assert_eq!(task.title, "Write summary");
    assert_eq!(task.description.as_deref(), Some("quarterly"));
    assert_eq!(task.due_date.as_deref(), Some("2026-10-20"));
    assert!(!task.completed);

    assert!(!tasks.update_task(TaskPatch::new("missing").title("x")).unwrap());
}

#[test]
fn test_completion_is_rewarded_once() {
    let store = common::memory_store();
    let rewards = common::rewards(&store);
    let mut tasks = TaskStore::open(store).unwrap();
    let id = tasks.add_task(NewTask::new("Stretch")).unwrap();

    assert!(!rewards.complete_task(&mut tasks, &id).unwrap().is_empty());
    assert!(rewards.complete_task(&mut tasks, &id).unwrap().is_empty());
    assert_eq!(rewards.progress().unwrap().tasks_completed, 1);
    assert_eq!(rewards.gems().balance().unwrap(), 1);
}

#[test]
fn test_tasks_and_events_persist_in_sqlite() {
    let (dir, store) = common::sqlite_store();
    let day = DayKey::parse("2026-10-15").unwrap();
    let id = {
        let mut tasks = TaskStore::open(store.clone()).unwrap();
        tasks.add_event(day.clone(), "Dentist").unwrap();
        tasks.add_event(day.clone(), "Gym").unwrap();
        tasks.add_task(NewTask::new("Call mom")).unwrap()
    };
    drop(store);

    let mut tasks = TaskStore::open(common::reopen(&dir)).unwrap();
    assert_eq!(tasks.task(&id).unwrap().title, "Call mom");
    assert_eq!(tasks.events_on(&day), ["Dentist", "Gym"]);

    assert!(tasks.remove_event(&day, 0).unwrap());
    assert!(tasks.remove_event(&day, 0).unwrap());
    assert!(tasks.events().is_empty());
    assert!(!tasks.remove_event(&day, 0).unwrap());
}
