//! services/app/src/bin/taskdeck.rs

use app_lib::{
    adapters::{HttpClient, SqliteStorage},
    config::Config,
    error::AppError,
    session::SessionStore,
    views::{
        AuthGate, DashboardView, GateDecision, LoginView, Navigation, RegisterView,
        TaskCreateView, TaskDetailView, TaskForm, TaskListView,
    },
};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use taskdeck_core::domain::{Task, TaskPriority, TaskStatus};
use taskdeck_core::listing::{SortKey, StatusFilter};
use taskdeck_core::ports::TaskService;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskdeck", version, about = "Manage your tasks from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in; the password is read from stdin.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account and sign in with it.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    Logout,
    /// Show the signed-in user, checked against the server.
    Whoami,
    Dashboard,
    List {
        /// `all`, `todo`, `in-progress`, `done` or `archived`.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// `newest`, `oldest`, `priority` or `due-date`.
        #[arg(long, default_value = "newest")]
        sort: SortKey,
        #[arg(long, default_value = "")]
        search: String,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// `YYYY-MM-DD` or an ISO 8601 timestamp.
        #[arg(long)]
        due: Option<String>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Mark done, or back to todo if already done.
    Toggle {
        id: Uuid,
    },
    /// Move along todo -> in-progress -> done -> todo.
    Cycle {
        id: Uuid,
    },
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    info!("Configuration loaded.");

    // --- 2. Restore the Session ---
    let storage = Arc::new(SqliteStorage::open(&config.session_db_url).await?);
    let session = SessionStore::load(storage).await;

    // --- 3. Initialize the HTTP Client ---
    let client = Arc::new(HttpClient::new(&config, session.clone())?);
    let tasks: Arc<dyn TaskService> = client.clone();

    // --- 4. Run the Command ---
    match cli.command {
        Command::Login { email } => {
            let mut view = LoginView::new(session.clone());
            view.email = email;
            view.password = prompt("Password: ")?;
            if view.submit(client.as_ref()).await.is_some() {
                println!("Logged in as {}", view.email.trim());
            } else {
                print_errors(&view.errors.errors);
            }
        }
        Command::Register {
            email,
            first_name,
            last_name,
        } => {
            let mut view = RegisterView::new(session.clone());
            view.email = email;
            view.first_name = first_name.unwrap_or_default();
            view.last_name = last_name.unwrap_or_default();
            view.password = prompt("Password (8-72 characters): ")?;
            if view.submit(client.as_ref()).await.is_some() {
                println!("Account created for {}", view.email.trim());
            } else {
                print_errors(&view.errors.errors);
            }
        }
        Command::Logout => {
            session.logout(client.as_ref()).await;
            println!("Logged out");
        }
        command => {
            if !signed_in(&session).await {
                return Ok(());
            }
            run_protected(command, &session, &client, tasks).await?;
        }
    }
    Ok(())
}

async fn signed_in(session: &Arc<SessionStore>) -> bool {
    match AuthGate::new(session.clone()).check().await {
        GateDecision::Render => true,
        GateDecision::Placeholder => {
            println!("Loading...");
            false
        }
        GateDecision::Redirect(to) => {
            println!("Not logged in ({}). Run `taskdeck login --email <email>`.", to.route());
            false
        }
    }
}

async fn run_protected(
    command: Command,
    session: &Arc<SessionStore>,
    client: &Arc<HttpClient>,
    tasks: Arc<dyn TaskService>,
) -> Result<(), AppError> {
    match command {
        Command::Whoami => match session.verify(client.as_ref()).await {
            Ok(user) => println!("{} ({})", user.email, user.role.as_str()),
            Err(e) => println!("Session is no longer valid: {}", e),
        },
        Command::Dashboard => {
            let mut view = DashboardView::new(tasks, session.clone());
            view.refresh().await;
            println!("{}", view.greeting().await);
            match view.error() {
                Some(message) => println!("{}", message),
                None => {
                    let stats = view.stats();
                    println!("Total:     {}", stats.total);
                    println!("Completed: {}", stats.completed);
                    println!("Pending:   {}", stats.pending);
                }
            }
        }
        Command::List {
            status,
            sort,
            search,
        } => {
            let mut view = TaskListView::new(tasks);
            view.load().await;
            if let Some(message) = view.error() {
                println!("{}", message);
                return Ok(());
            }
            view.set_filter(status);
            view.set_sort(sort);
            view.set_search(search);
            println!(
                "{} of {} tasks, sorted by {}",
                view.visible().len(),
                view.all().len(),
                view.controls().sort.as_str()
            );
            for task in view.visible() {
                print_row(task, view.is_overdue(task));
            }
            if let Some(hint) = view.empty_hint() {
                println!("No tasks found. {}", hint);
            }
        }
        Command::Show { id } => {
            let mut view = TaskDetailView::new(tasks, id);
            show_or_report(&mut view).await;
            if let Some(task) = view.task() {
                print_detail(task);
            }
        }
        Command::Create {
            title,
            description,
            status,
            priority,
            due,
        } => {
            let mut view = TaskCreateView::new(tasks);
            view.form = TaskForm {
                title,
                description: description.unwrap_or_default(),
                status: status.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
                due_date: due.unwrap_or_default(),
                ..TaskForm::default()
            };
            match view.submit().await {
                Some(to) => println!("Task created. See {}", to.route()),
                None => print_errors(&view.form.errors.errors),
            }
        }
        Command::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let mut view = TaskDetailView::new(tasks, id);
            if !show_or_report(&mut view).await {
                return Ok(());
            }
            view.begin_edit();
            if let Some(form) = view.form_mut() {
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(description) = description {
                    form.description = description;
                }
                if let Some(status) = status {
                    form.status = status;
                }
                if let Some(priority) = priority {
                    form.priority = priority;
                }
                if let Some(due) = due {
                    form.due_date = due;
                }
            }
            if view.save().await {
                if let Some(task) = view.task() {
                    print_detail(task);
                }
            } else if let Some(form) = view.form() {
                print_errors(&form.errors.errors);
            }
        }
        Command::Toggle { id } => {
            let mut view = TaskListView::new(tasks);
            view.load().await;
            if let Some(message) = view.error() {
                println!("{}", message);
                return Ok(());
            }
            if view.all().iter().all(|t| t.id != id) {
                println!("Task not found");
                return Ok(());
            }
            view.toggle_status(id).await;
            if let Some(note) = view.notification() {
                println!("{}", note.message);
            }
        }
        Command::Cycle { id } => {
            let mut view = TaskDetailView::new(tasks, id);
            if !show_or_report(&mut view).await {
                return Ok(());
            }
            view.cycle_status().await;
            match (view.error(), view.task()) {
                (Some(message), _) => println!("{}", message),
                (None, Some(task)) => println!("Task is now {}", task.status),
                (None, None) => {}
            }
        }
        Command::Delete { id, yes } => {
            let mut view = TaskDetailView::new(tasks, id);
            if !show_or_report(&mut view).await {
                return Ok(());
            }
            view.request_delete().await;
            let title = view.task().map(|t| t.title.clone()).unwrap_or_default();
            let confirmed =
                yes || prompt(&format!("Delete '{}'? [y/N] ", title))?.eq_ignore_ascii_case("y");
            if !confirmed {
                view.cancel_delete();
                println!("Cancelled");
                return Ok(());
            }
            match view.request_delete().await {
                Some(to) => println!("Task deleted. Back to {}", to.route()),
                None => println!("{}", view.error().unwrap_or_default()),
            }
        }
        Command::Login { .. } | Command::Register { .. } | Command::Logout => {
            return Err(AppError::Usage("command does not need a session".to_string()));
        }
    }
    Ok(())
}

/// Loads the task and prints any failure. Returns whether the task is available.
async fn show_or_report(view: &mut TaskDetailView) -> bool {
    let next = view.load().await;
    if let Some(message) = view.error() {
        match next {
            Some(to) => println!("{}. Back to {}", message, to.route()),
            None => println!("{}", message),
        }
    }
    view.task().is_some()
}

fn print_row(task: &Task, overdue: bool) {
    let check = if task.is_done() { "[x]" } else { "[ ]" };
    let due = task
        .due_date
        .map(|d| format!(" due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    let flag = if overdue && !task.is_done() { " OVERDUE" } else { "" };
    println!(
        "{} {}  {} [{}/{}]{}{}",
        check, task.id, task.title, task.status, task.priority, due, flag
    );
}

fn print_detail(task: &Task) {
    println!("{}", task.title);
    println!("  id:       {}", task.id);
    println!("  status:   {}", task.status);
    println!("  priority: {}", task.priority);
    if let Some(due) = task.due_date {
        println!("  due:      {}", due.format("%Y-%m-%d %H:%M"));
    }
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {}", description);
    }
    println!("  created:  {}", task.created_at.format("%Y-%m-%d %H:%M"));
    println!("  updated:  {}", task.updated_at.format("%Y-%m-%d %H:%M"));
    println!("  see {}", Navigation::TaskDetail(task.id).route());
}

fn print_errors(errors: &[taskdeck_core::validation::FieldError]) {
    for error in errors {
        println!("{}: {}", error.field, error.message);
    }
}

fn prompt(label: &str) -> Result<String, AppError> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
