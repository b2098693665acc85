//! `taskdesk`: command-line shell for the TaskDesk API
//!
//! ```bash
//! export TASKDESK_TOKEN=$(taskdesk login admin --password 'Admin123!')
//! taskdesk tasks list
//! taskdesk tasks update <id> --status completed
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use taskdesk_client::client::{
    ApiClient, CreateTaskBody, CreateUserBody, UpdateTaskBody, UpdateUserBody,
};
use taskdesk_client::shell;
use taskdesk_shared::models::{Role, TaskStatus};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Command-line shell for the TaskDesk API
#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(about = "Manage TaskDesk tasks and users", long_about = None)]
#[command(version)]
struct Cli {
    /// API base URL
    #[arg(long, env = "TASKDESK_SERVER", default_value = "http://localhost:8080", global = true)]
    server: String,

    /// Bearer token from `taskdesk login`
    #[arg(long, env = "TASKDESK_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print a token
    ///
    /// Export it as TASKDESK_TOKEN for the other commands.
    Login {
        username: String,

        /// Password (prompted from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Show the logged-in user
    Whoami,

    /// Task commands
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// User commands (Admin)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// List the actions available to the logged-in user
    Actions,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List visible tasks
    List,

    /// Show one task
    Show { id: Uuid },

    /// Create a task (Admin)
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// pending, in-progress or completed
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Assignee user ID
        #[arg(long)]
        assignee: Uuid,
    },

    /// Update a task (Users may change the status only)
    Update {
        id: Uuid,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<TaskStatus>,

        #[arg(long)]
        assignee: Option<Uuid>,
    },

    /// Delete a task (Admin)
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List,

    /// Show one user
    Show { id: Uuid },

    /// Create a user
    Create {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// admin or user
        #[arg(long)]
        role: Option<Role>,
    },

    /// Update a user
    Update {
        id: Uuid,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<Role>,
    },

    /// Delete a user
    Delete { id: Uuid },
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

async fn run(cli: Cli) -> Result<()> {
    let mut client = ApiClient::new(cli.server);
    if let Some(token) = cli.token {
        client.set_token(token);
    }

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let login = client.login(&username, &password).await?;
            eprintln!("Logged in as {} ({})", login.user.username, login.user.role);
            println!("{}", login.token);
        }
        Commands::Whoami => {
            let me = client.me().await?;
            println!("{} <{}> {} {}", me.username, me.email, me.role, me.id);
        }
        Commands::Actions => {
            let me = client.me().await?;
            println!("Logged in as {} ({})", me.username, me.role);
            for action in shell::available_actions(me.role) {
                println!("  {}", action);
            }
        }
        Commands::Tasks { command } => match command {
            TaskCommands::List => {
                println!("{}", shell::render_tasks(&client.list_tasks().await?));
            }
            TaskCommands::Show { id } => {
                println!("{}", shell::render_task_detail(&client.get_task(id).await?));
            }
            TaskCommands::Create {
                title,
                description,
                status,
                assignee,
            } => {
                let task = client
                    .create_task(&CreateTaskBody {
                        title,
                        description,
                        status,
                        assigned_user_id: assignee,
                    })
                    .await?;
                println!("Created task {}", task.id);
            }
            TaskCommands::Update {
                id,
                title,
                description,
                status,
                assignee,
            } => {
                let task = client
                    .update_task(
                        id,
                        &UpdateTaskBody {
                            title,
                            description,
                            status,
                            assigned_user_id: assignee,
                        },
                    )
                    .await?;
                println!("{}", shell::render_task_detail(&task));
            }
            TaskCommands::Delete { id } => {
                client.delete_task(id).await?;
                println!("Deleted task {}", id);
            }
        },
        Commands::Users { command } => match command {
            UserCommands::List => {
                println!("{}", shell::render_users(&client.list_users().await?));
            }
            UserCommands::Show { id } => {
                println!("{}", shell::render_users(&[client.get_user(id).await?]));
            }
            UserCommands::Create {
                username,
                email,
                password,
                role,
            } => {
                let user = client
                    .create_user(&CreateUserBody {
                        username,
                        email,
                        password,
                        role,
                    })
                    .await?;
                println!("Created user {} ({})", user.username, user.id);
            }
            UserCommands::Update {
                id,
                username,
                email,
                role,
            } => {
                let user = client
                    .update_user(
                        id,
                        &UpdateUserBody {
                            username,
                            email,
                            role,
                        },
                    )
                    .await?;
                println!("{}", shell::render_users(&[user]));
            }
            UserCommands::Delete { id } => {
                client.delete_user(id).await?;
                println!("Deleted user {}", id);
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
