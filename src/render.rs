//! Plain-text presentation of the dashboard.
//!
//! Everything here is derived from [`TaskView`] and session state; no
//! rendering function has side effects.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::api::Task;
use crate::filters::{FilterField, FilterSet};
use crate::loader::TaskView;

/// Display-ready fields of a task card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub assignee: String,
    pub due: String,
    pub status: String,
    pub tags: Vec<String>,
}

impl From<&Task> for TaskCard {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("No description provided")
                .to_string(),
            priority: task
                .priority
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "Low".to_string()),
            assignee: task
                .assignee_user_id
                .as_deref()
                .filter(|a| !a.is_empty())
                .unwrap_or("Unassigned")
                .to_string(),
            due: format_due(task.due_date.as_ref()),
            status: task.status.to_string(),
            tags: task.tag_list().into_iter().map(str::to_string).collect(),
        }
    }
}

pub fn format_due(due: Option<&DateTime<Utc>>) -> String {
    match due {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "No due date".to_string(),
    }
}

pub fn render_card(card: &TaskCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}  ({})", card.priority, card.title, card.status);
    let _ = writeln!(out, "    {}", card.description);
    let _ = write!(out, "    {}  |  Due: {}", card.assignee, card.due);
    if !card.tags.is_empty() {
        let _ = write!(out, "  |  #{}", card.tags.join(" #"));
    }
    out
}

pub fn render_filters(filters: &FilterSet) -> String {
    if filters.is_empty() {
        return "Filters: none".to_string();
    }
    let active: Vec<String> = FilterField::ALL
        .iter()
        .filter(|f| !filters.get(**f).is_empty())
        .map(|f| format!("{}={}", f, filters.get(*f)))
        .collect();
    format!("Filters: {}", active.join(", "))
}

/// Render the task board for the given sign-in state.
pub fn render_board(signed_in: bool, view: &TaskView) -> String {
    if !signed_in {
        return "Sign in to view tasks\n\
                Connect your workspace to pull the latest tasks from Tako Tasks."
            .to_string();
    }

    let mut sections = Vec::new();

    if let Some(error) = &view.error {
        sections.push(format!("! {}", error));
    }
    if view.loading {
        sections.push("Loading tasks...".to_string());
    }

    if view.tasks.is_empty() {
        if !view.loading {
            sections.push(
                "No tasks match your filters\n\
                 Try adjusting the filters or creating a new task to get started."
                    .to_string(),
            );
        }
    } else {
        sections.extend(view.tasks.iter().map(|t| render_card(&TaskCard::from(t))));
    }

    sections.join("\n\n")
}
