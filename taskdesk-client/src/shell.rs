/// Role-aware menu and table rendering
///
/// The server enforces every rule; the menu only hides what the role could
/// never do.

use std::fmt;
use taskdesk_shared::models::{Role, TaskDto, UserDto};

/// An action offered by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListTasks,
    ShowTask,
    CreateTask,
    UpdateTask,
    UpdateTaskStatus,
    DeleteTask,
    ListUsers,
    ShowUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl Action {
    /// The `taskdesk` invocation performing this action
    pub fn command(&self) -> &'static str {
        match self {
            Action::ListTasks => "tasks list",
            Action::ShowTask => "tasks show <id>",
            Action::CreateTask => "tasks create --title <title> --assignee <user-id>",
            Action::UpdateTask => "tasks update <id> [--title ..] [--description ..] [--status ..] [--assignee ..]",
            Action::UpdateTaskStatus => "tasks update <id> --status <status>",
            Action::DeleteTask => "tasks delete <id>",
            Action::ListUsers => "users list",
            Action::ShowUser => "users show <id>",
            Action::CreateUser => "users create --username <name> --email <email> --password <pw> [--role ..]",
            Action::UpdateUser => "users update <id> [--username ..] [--email ..] [--role ..]",
            Action::DeleteUser => "users delete <id>",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::ListTasks => "List tasks",
            Action::ShowTask => "Show a task",
            Action::CreateTask => "Create a task",
            Action::UpdateTask => "Update a task",
            Action::UpdateTaskStatus => "Set the status of one of your tasks",
            Action::DeleteTask => "Delete a task",
            Action::ListUsers => "List users",
            Action::ShowUser => "Show a user",
            Action::CreateUser => "Create a user",
            Action::UpdateUser => "Update a user",
            Action::DeleteUser => "Delete a user",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} taskdesk {}", self.description(), self.command())
    }
}

/// Actions the shell offers to a role
pub fn available_actions(role: Role) -> Vec<Action> {
    match role {
        Role::Admin => vec![
            Action::ListTasks,
            Action::ShowTask,
            Action::CreateTask,
            Action::UpdateTask,
            Action::DeleteTask,
            Action::ListUsers,
            Action::ShowUser,
            Action::CreateUser,
            Action::UpdateUser,
            Action::DeleteUser,
        ],
        Role::User => vec![Action::ListTasks, Action::ShowTask, Action::UpdateTaskStatus],
    }
}

/// Renders rows as a fixed-width table with a header rule
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }

    out.join("\n")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

/// Renders tasks as a text table
pub fn render_tasks(tasks: &[TaskDto]) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.status.to_string(),
                truncate(&t.title, 40),
                t.assigned_username.clone(),
                t.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();

    render_table(&["ID", "STATUS", "TITLE", "ASSIGNEE", "CREATED"], &rows)
}

/// Renders users as a text table
pub fn render_users(users: &[UserDto]) -> String {
    if users.is_empty() {
        return "No users.".to_string();
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.username.clone(),
                u.email.clone(),
                u.role.to_string(),
                u.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();

    render_table(&["ID", "USERNAME", "EMAIL", "ROLE", "CREATED"], &rows)
}

/// Renders one task with its description
pub fn render_task_detail(task: &TaskDto) -> String {
    let updated = task
        .updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "ID:          {}\nTitle:       {}\nStatus:      {}\nAssignee:    {} ({})\nCreated:     {}\nUpdated:     {}\nDescription: {}",
        task.id,
        task.title,
        task.status,
        task.assigned_username,
        task.assigned_user_id,
        task.created_at.format("%Y-%m-%d %H:%M"),
        updated,
        task.description.as_deref().unwrap_or("-"),
    )
}
