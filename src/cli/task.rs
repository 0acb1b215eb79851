//! Task and event commands

use anyhow::{bail, Result};

use questlog::domain::{DayKey, NewTask, TaskPatch};
use questlog::tasks::TaskStore;

use super::{print_reward_events, AppContext};
use crate::commands::{EventCommands, TaskCommands};

pub fn task_command(ctx: &AppContext, command: TaskCommands) -> Result<()> {
    let mut tasks = TaskStore::open(ctx.store.clone())?;

    match command {
        TaskCommands::List { json, open } => {
            let listed: Vec<_> = tasks
                .tasks()
                .iter()
                .filter(|t| !open || !t.completed)
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
                return Ok(());
            }
            if listed.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }

            println!("Tasks ({}):\n", listed.len());
            for task in listed {
                let mark = if task.completed { "x" } else { " " };
                print!("  [{}] {}  {}", mark, short_id(&task.id), task.title);
                if let Some(due) = &task.due_date {
                    print!("  (due {})", due);
                }
                println!();
                if let Some(desc) = &task.description {
                    println!("        {}", desc);
                }
            }
        }
        TaskCommands::Add {
            title,
            due,
            description,
        } => {
            if title.trim().is_empty() {
                bail!("Task title is required");
            }
            let mut new_task = NewTask::new(title);
            if let Some(due) = due {
                new_task = new_task.with_due_date(due);
            }
            if let Some(description) = description {
                new_task = new_task.with_description(description);
            }
            let id = tasks.add_task(new_task)?;
            println!("Added task {}", short_id(&id));
        }
        TaskCommands::Edit {
            id,
            title,
            description,
            due,
        } => {
            let id = resolve_task_id(&tasks, &id)?;
            let patch = TaskPatch {
                id,
                title,
                description,
                due_date: due,
                completed: None,
            };
            tasks.update_task(patch)?;
            println!("Task updated.");
        }
        TaskCommands::Done { id } => {
            let id = resolve_task_id(&tasks, &id)?;
            let events = ctx.rewards.complete_task(&mut tasks, &id)?;
            if events.is_empty() {
                println!("Task already completed.");
            } else {
                println!("✅ Task completed!");
                print_reward_events(&events);
            }
        }
        TaskCommands::Remove { id } => {
            let id = resolve_task_id(&tasks, &id)?;
            tasks.remove_task(&id)?;
            println!("Task removed.");
        }
    }

    Ok(())
}

pub fn event_command(ctx: &AppContext, command: EventCommands) -> Result<()> {
    let mut tasks = TaskStore::open(ctx.store.clone())?;

    match command {
        EventCommands::List { date } => {
            if let Some(date) = date {
                let day = parse_day(&date)?;
                let titles = tasks.events_on(&day);
                if titles.is_empty() {
                    println!("No events on {}.", day);
                }
                for (i, title) in titles.iter().enumerate() {
                    println!("  {}. {}", i, title);
                }
                return Ok(());
            }

            if tasks.events().is_empty() {
                println!("No events found.");
            }
            for (day, titles) in tasks.events() {
                println!("{}", day);
                for (i, title) in titles.iter().enumerate() {
                    println!("  {}. {}", i, title);
                }
            }
        }
        EventCommands::Add { date, title } => {
            let day = parse_day(&date)?;
            tasks.add_event(day.clone(), title)?;
            println!("Added event on {}.", day);
        }
        EventCommands::Remove { date, index } => {
            let day = parse_day(&date)?;
            if tasks.remove_event(&day, index)? {
                println!("Event removed.");
            } else {
                println!("No event #{} on {}.", index, day);
            }
        }
    }

    Ok(())
}

fn parse_day(input: &str) -> Result<DayKey> {
    if input.eq_ignore_ascii_case("today") {
        return Ok(DayKey::today());
    }
    match DayKey::parse(input) {
        Some(day) => Ok(day),
        None => bail!("Invalid date '{}', expected YYYY-MM-DD", input),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Accept a full id or a unique prefix
fn resolve_task_id(tasks: &TaskStore, input: &str) -> Result<String> {
    if tasks.task(input).is_some() {
        return Ok(input.to_string());
    }

    let matches: Vec<&str> = tasks
        .tasks()
        .iter()
        .filter(|t| t.id.starts_with(input))
        .map(|t| t.id.as_str())
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("Task not found: {}", input),
        _ => bail!("Ambiguous task id '{}' ({} matches)", input, matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questlog::store::Store;

    #[test]
    fn test_resolve_task_id_by_prefix() {
        let mut tasks = TaskStore::open(Store::in_memory()).unwrap();
        let id = tasks.add_task(NewTask::new("a")).unwrap();

        assert_eq!(resolve_task_id(&tasks, &id).unwrap(), id);
        assert_eq!(resolve_task_id(&tasks, &id[..6]).unwrap(), id);
        assert!(resolve_task_id(&tasks, "zzzz").is_err());
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2026-02-03").unwrap().as_str(), "2026-02-03");
        assert!(parse_day("tomorrow").is_err());
    }
}
