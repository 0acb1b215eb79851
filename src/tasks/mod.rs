//! Task and calendar event store
//!
//! Tasks and per-day events are cached in memory and written back in full to
//! the [`Store`] after every mutation. An attached [`MirrorSync`] receives the
//! task collection after each task mutation.

mod sync;

pub use sync::{
    AnonymousSession, MirrorSync, RemoteTaskMirror, SessionProvider, UserIdentity,
    DEFAULT_RESTORE_DELAY,
};

use chrono::NaiveDate;

use crate::domain::{DayKey, EventsByDay, NewTask, Task, TaskId, TaskPatch};
use crate::store::{Result, StorageKey, Store};

/// Local task and event collections
pub struct TaskStore {
    store: Store,
    tasks: Vec<Task>,
    events: EventsByDay,
    mirror: Option<MirrorSync>,
}

impl TaskStore {
    /// Load tasks and events; malformed state starts empty
    pub fn open(store: Store) -> Result<Self> {
        let tasks = store.load(StorageKey::Tasks)?;
        let events = store.load(StorageKey::Events)?;
        Ok(Self {
            store,
            tasks,
            events,
            mirror: None,
        })
    }

    /// Mirror task changes made from now on
    pub fn attach_mirror(&mut self, mirror: MirrorSync) {
        self.mirror = Some(mirror);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks whose due date falls on `day`
    pub fn tasks_due_on(&self, day: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.due_day() == Some(day))
            .collect()
    }

    pub fn events(&self) -> &EventsByDay {
        &self.events
    }

    /// Event titles for `day` in insertion order
    pub fn events_on(&self, day: &DayKey) -> &[String] {
        self.events.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    // ========================================
    // TASKS
    // ========================================

    /// Append a new task stamped with a fresh id and the current time
    pub fn add_task(&mut self, new_task: NewTask) -> Result<TaskId> {
        let task = new_task.into_task();
        let id = task.id.clone();
        tracing::debug!("Adding task {} '{}'", id, task.title);
        self.tasks.push(task);
        self.persist(true)?;
        Ok(id)
    }

    /// Remove a task; `false` if no task has that id
    pub fn remove_task(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.persist(true)?;
        Ok(true)
    }

    /// Merge the set fields of `patch` onto the matching task
    pub fn update_task(&mut self, patch: TaskPatch) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == patch.id) else {
            tracing::debug!("No task {} to update", patch.id);
            return Ok(false);
        };
        patch.apply(task);
        self.persist(true)?;
        Ok(true)
    }

    /// Mark a task completed; `false` if unknown or already completed
    pub fn complete_task(&mut self, id: &str) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if task.completed {
            return Ok(false);
        }
        task.completed = true;
        self.persist(true)?;
        Ok(true)
    }

    // ========================================
    // EVENTS
    // ========================================

    /// Append an event title to a day
    pub fn add_event(&mut self, day: DayKey, title: impl Into<String>) -> Result<()> {
        self.events.entry(day).or_default().push(title.into());
        self.persist(false)
    }

    /// Remove the event at `index` on `day`; `false` if either is absent
    pub fn remove_event(&mut self, day: &DayKey, index: usize) -> Result<bool> {
        let Some(titles) = self.events.get_mut(day) else {
            return Ok(false);
        };
        if index >= titles.len() {
            return Ok(false);
        }
        titles.remove(index);
        if titles.is_empty() {
            self.events.remove(day);
        }
        self.persist(false)?;
        Ok(true)
    }

    fn persist(&self, tasks_changed: bool) -> Result<()> {
        self.store.save(StorageKey::Tasks, &self.tasks)?;
        self.store.save(StorageKey::Events, &self.events)?;
        if tasks_changed {
            if let Some(mirror) = &self.mirror {
                mirror.on_tasks_changed(&self.tasks);
            }
        }
        Ok(())
    }
}
