//! clearmind: terminal frontend for the ClearMind productivity backend
//!
//! Each page of the web app is a subcommand. Protected pages go through the
//! same route guard the web shell uses; without a stored token they point the
//! user back to `clearmind login`.
//!
//! # Subcommands
//! - `login` / `register` / `logout`
//! - `dashboard`                       greeting, stats and today's focus
//! - `items list|add|edit|toggle|delete`  the life database
//! - `chat [message]`                  AI assistant; interactive without a message
//! - `profile show|update`, `onboard`
//! - `sidebar collapse|expand|status`

mod render;

use std::io::Write as _;

use anyhow::Context;
use chrono::{NaiveDateTime, Timelike};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use clearmind_core::auth::{self, AUTH_FAILURE};
use clearmind_core::editor::DraftField;
use clearmind_core::models::{timestamp, Category, ItemQuery, Status, Subcategory};
use clearmind_core::profile::{self, OnboardingAnswers, ProfileEdit};
use clearmind_core::views::{self, ViewFilter};
use clearmind_core::{
    guard, ClearMindClient, ClearMindConfig, ClearMindError, FileStateStore, ItemBoard,
    ItemEditor, ItemStore, Navigation, Route, SendOutcome, Session, Transcript, ViewScope,
    GENERIC_FAILURE,
};

const DEFAULT_CONFIG: &str = "clearmind.toml";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "clearmind",
    version,
    about = "ClearMind: capture, organise and focus from the terminal"
)]
struct Cli {
    /// Config file (TOML); missing files fall back to defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(long, env = "CLEARMIND_EMAIL")]
        email: String,
        #[arg(long, env = "CLEARMIND_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account, then continue with `clearmind onboard`
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Greeting, stats and the four highest-priority open items
    Dashboard,

    /// The life database
    Items {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Talk to the AI assistant. Without a message, starts an interactive session
    Chat { message: Option<String> },

    /// Show or edit the signed-in user's profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Answer the three onboarding questions
    Onboard {
        /// What do you do?
        #[arg(long)]
        occupation: String,
        /// What are your main goals right now?
        #[arg(long)]
        goals: String,
        /// How would you describe yourself?
        #[arg(long)]
        personality: String,
    },

    /// Sidebar layout preference
    Sidebar {
        #[command(subcommand)]
        command: SidebarCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ItemCommands {
    /// List items, filtered like the database view
    List {
        /// task, idea or thought (default: all)
        #[arg(long)]
        tab: Option<Category>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        subcategory: Option<Subcategory>,
        /// Case-insensitive match on title or description
        #[arg(short, long, default_value = "")]
        search: String,
        /// Output the filtered items as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Create an item
    Add {
        title: String,
        #[arg(long, default_value = "task")]
        category: Category,
        #[command(flatten)]
        fields: ItemFields,
    },

    /// Edit an existing item; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        /// Remove the subcategory
        #[arg(long, conflicts_with = "subcategory")]
        clear_subcategory: bool,
        /// Remove the deadline
        #[arg(long, conflicts_with = "deadline")]
        clear_deadline: bool,
        #[arg(long)]
        status: Option<Status>,
        #[command(flatten)]
        fields: ItemFields,
    },

    /// Flip an item between done and pending
    Toggle { id: i64 },

    /// Delete an item
    Delete { id: i64 },
}

#[derive(Debug, clap::Args)]
struct ItemFields {
    #[arg(long)]
    subcategory: Option<Subcategory>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    life_area: Option<String>,
    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM
    #[arg(long, value_parser = parse_deadline)]
    deadline: Option<NaiveDateTime>,
    /// 1 to 10
    #[arg(long)]
    priority: Option<u8>,
}

#[derive(Debug, Subcommand)]
enum ProfileCommands {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        occupation: Option<String>,
        /// Replaces the whole list; repeat for several areas
        #[arg(long = "life-area")]
        life_areas: Option<Vec<String>>,
    },
}

#[derive(Debug, Subcommand)]
enum SidebarCommands {
    Collapse,
    Expand,
    Status,
}

fn parse_deadline(raw: &str) -> Result<NaiveDateTime, String> {
    timestamp::parse(raw).ok_or_else(|| format!("not a date: {raw}"))
}

impl Commands {
    /// Page this command stands in for. `None` for commands outside the router.
    fn route(&self) -> Option<Route> {
        match self {
            Commands::Login { .. } | Commands::Register { .. } => Some(Route::Landing),
            Commands::Logout | Commands::Sidebar { .. } => None,
            Commands::Dashboard => Some(Route::Dashboard),
            Commands::Items { .. } => Some(Route::Database),
            Commands::Chat { .. } => Some(Route::Chat),
            Commands::Profile { .. } => Some(Route::Profile),
            Commands::Onboard { .. } => Some(Route::Onboarding),
        }
    }

    fn failure_fallback(&self) -> &'static str {
        match self {
            Commands::Login { .. } | Commands::Register { .. } => AUTH_FAILURE,
            _ => GENERIC_FAILURE,
        }
    }
}

// ============================================================================
// Page handlers
// ============================================================================

struct App {
    session: Session,
    client: ClearMindClient,
    scope: ViewScope,
}

impl App {
    async fn login(&self, email: &str, password: &str) -> clearmind_core::Result<()> {
        let signed_in = self
            .scope
            .run(auth::login(&self.client, &self.session, email, password))
            .await??;
        let name = signed_in
            .response
            .user
            .as_ref()
            .map(|u| u.display_name().to_string())
            .unwrap_or_else(|| email.to_string());
        println!("Signed in as {name}. Next: clearmind {}", page_command(signed_in.next));
        Ok(())
    }

    async fn register(&self, form: clearmind_core::RegisterForm) -> clearmind_core::Result<()> {
        let signed_in = self
            .scope
            .run(auth::register(&self.client, &self.session, &form))
            .await??;
        println!(
            "Account created. Next: clearmind {} --occupation .. --goals .. --personality ..",
            page_command(signed_in.next)
        );
        Ok(())
    }

    async fn dashboard(&self) -> clearmind_core::Result<()> {
        let query = ItemQuery::default();
        let (user, board) = self
            .scope
            .run(async {
                futures::try_join!(self.client.me(), ItemBoard::load(&self.client, &query))
            })
            .await??;
        let hour = chrono::Local::now().hour();
        println!("{}", render::dashboard(views::greeting(hour), &user, &board.dashboard()));
        Ok(())
    }

    async fn items(&self, command: ItemCommands) -> clearmind_core::Result<()> {
        match command {
            ItemCommands::List {
                tab,
                status,
                subcategory,
                search,
                json,
            } => {
                let board = self
                    .scope
                    .run_latest(ItemBoard::load(&self.client, &ItemQuery::default()))
                    .await??;
                let mut filter = ViewFilter::default();
                filter.select_tab(tab);
                filter.status = status;
                filter.subcategory = subcategory;
                filter.query = search;
                let shown = board.filtered(&filter);
                if json {
                    println!("{}", render::items_json(&shown)?);
                } else {
                    println!("{}", render::item_list(&shown));
                }
            }
            ItemCommands::Add {
                title,
                category,
                fields,
            } => {
                let mut editor = ItemEditor::new();
                editor.open(None);
                editor.change_category(category)?;
                editor.set_field(DraftField::Title(title))?;
                apply_fields(&mut editor, fields)?;
                let mut board = ItemBoard::new(Vec::new());
                let item = self.scope.run(editor.commit(&self.client, &mut board)).await??;
                println!("Created\n{}", render::item_detail(&item));
            }
            ItemCommands::Edit {
                id,
                title,
                category,
                clear_subcategory,
                clear_deadline,
                status,
                fields,
            } => {
                let existing = self.scope.run(self.client.get(id)).await??;
                let mut board = ItemBoard::new(vec![existing]);
                let mut editor = ItemEditor::new();
                editor.open(board.get(id));
                if let Some(category) = category {
                    editor.change_category(category)?;
                }
                if let Some(title) = title {
                    editor.set_field(DraftField::Title(title))?;
                }
                if clear_subcategory {
                    editor.set_field(DraftField::Subcategory(None))?;
                }
                if clear_deadline {
                    editor.set_field(DraftField::Deadline(None))?;
                }
                if let Some(status) = status {
                    editor.set_field(DraftField::Status(status))?;
                }
                apply_fields(&mut editor, fields)?;
                let item = self.scope.run(editor.commit(&self.client, &mut board)).await??;
                println!("Saved\n{}", render::item_detail(&item));
            }
            ItemCommands::Toggle { id } => {
                let mut board = ItemBoard::new(Vec::new());
                let item = self
                    .scope
                    .run(board.toggle_complete(&self.client, id))
                    .await??
                    .clone();
                println!("{}", render::item_line(&item));
            }
            ItemCommands::Delete { id } => {
                let mut board = ItemBoard::new(Vec::new());
                self.scope.run(board.delete(&self.client, id)).await??;
                println!("Deleted #{id}");
            }
        }
        Ok(())
    }

    async fn chat(&self, message: Option<String>) -> clearmind_core::Result<()> {
        let mut transcript = Transcript::new();
        if let Some(first) = transcript.last() {
            println!("{}", render::chat_message(first));
        }

        if let Some(message) = message {
            self.send(&mut transcript, &message).await?;
            return Ok(());
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("you> ");
            std::io::stdout().flush()?;
            let Some(line) = self.scope.run(lines.next_line()).await?? else {
                break;
            };
            if matches!(line.trim(), "exit" | "quit") {
                break;
            }
            self.send(&mut transcript, &line).await?;
        }
        tracing::debug!(extracted = transcript.extracted_count(), "Chat session ended");
        Ok(())
    }

    async fn send(&self, transcript: &mut Transcript, text: &str) -> clearmind_core::Result<()> {
        match self.scope.run(transcript.send(&self.client, text)).await? {
            SendOutcome::Ignored => {}
            SendOutcome::Busy => println!("Still waiting on the previous reply."),
            SendOutcome::Replied | SendOutcome::Failed => {
                if let Some(reply) = transcript.last() {
                    println!("{}", render::chat_message(reply));
                }
            }
        }
        Ok(())
    }

    async fn profile(&self, command: ProfileCommands) -> clearmind_core::Result<()> {
        let user = match command {
            ProfileCommands::Show => self.scope.run(self.client.me()).await??,
            ProfileCommands::Update {
                name,
                occupation,
                life_areas,
            } => {
                let edit = ProfileEdit {
                    name,
                    occupation,
                    life_areas,
                };
                if edit.is_empty() {
                    println!("Nothing to update.");
                    return Ok(());
                }
                self.scope
                    .run(profile::update_profile(&self.client, edit))
                    .await??
            }
        };
        println!("{}", render::user(&user));
        Ok(())
    }

    async fn onboard(&self, answers: OnboardingAnswers) -> clearmind_core::Result<()> {
        let user = self
            .scope
            .run(profile::complete_onboarding(&self.client, answers))
            .await??;
        println!(
            "Thanks, {}. Next: clearmind {}",
            user.display_name(),
            page_command(Route::Dashboard)
        );
        Ok(())
    }

    fn sidebar(&self, command: SidebarCommands) -> clearmind_core::Result<()> {
        match command {
            SidebarCommands::Collapse => self.session.set_sidebar_collapsed(true)?,
            SidebarCommands::Expand => self.session.set_sidebar_collapsed(false)?,
            SidebarCommands::Status => {}
        }
        println!("{}", render::sidebar(self.session.sidebar_collapsed()));
        Ok(())
    }
}

fn apply_fields(editor: &mut ItemEditor, fields: ItemFields) -> clearmind_core::Result<()> {
    if let Some(sub) = fields.subcategory {
        editor.set_field(DraftField::Subcategory(Some(sub)))?;
    }
    if let Some(description) = fields.description {
        editor.set_field(DraftField::Description(description))?;
    }
    if let Some(area) = fields.life_area {
        editor.set_field(DraftField::LifeArea(area))?;
    }
    if let Some(deadline) = fields.deadline {
        editor.set_field(DraftField::Deadline(Some(deadline)))?;
    }
    if let Some(priority) = fields.priority {
        editor.set_field(DraftField::Priority(priority))?;
    }
    Ok(())
}

/// Subcommand that opens `route`.
fn page_command(route: Route) -> &'static str {
    match route {
        Route::Landing => "login",
        Route::Onboarding => "onboard",
        Route::Dashboard => "dashboard",
        Route::Chat => "chat",
        Route::Database => "items list",
        Route::Settings => "sidebar status",
        Route::Profile => "profile show",
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match ClearMindConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    // Logs go to stderr so `--json` output stays clean. RUST_LOG wins over the config level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let state_path = config.storage.resolved_state_path();
    let session = Session::open(FileStateStore::new(&state_path))
        .with_context(|| format!("Failed to open session state at {}", state_path.display()))?;
    let client = ClearMindClient::new(&config.api, session.clone())
        .context("Failed to create HTTP client")?;

    if let Some(route) = cli.command.route() {
        if let Navigation::Redirect { from, .. } = guard(route, &session) {
            eprintln!("clearmind: {from} needs a session. Run `clearmind login` first.");
            std::process::exit(1);
        }
    }

    let scope = ViewScope::new();
    let cancel = scope.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, closing view");
            cancel.cancel();
        }
    });

    let app = App {
        session,
        client,
        scope,
    };
    let fallback = cli.command.failure_fallback();

    let result = match cli.command {
        Commands::Login { email, password } => app.login(&email, &password).await,
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            app.register(clearmind_core::RegisterForm {
                name,
                email,
                password,
                confirm_password,
            })
            .await
        }
        Commands::Logout => auth::logout(&app.session).map(|_| println!("Signed out.")),
        Commands::Dashboard => app.dashboard().await,
        Commands::Items { command } => app.items(command).await,
        Commands::Chat { message } => app.chat(message).await,
        Commands::Profile { command } => app.profile(command).await,
        Commands::Onboard {
            occupation,
            goals,
            personality,
        } => {
            app.onboard(OnboardingAnswers {
                occupation,
                goals,
                personality,
            })
            .await
        }
        Commands::Sidebar { command } => app.sidebar(command),
    };

    match result {
        Ok(()) => Ok(()),
        Err(ClearMindError::Cancelled) => {
            eprintln!("Cancelled.");
            std::process::exit(130);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("clearmind: {}", e.user_message(fallback));
            if e.is_unauthorized() && fallback != AUTH_FAILURE {
                eprintln!("Your session may have expired. Run `clearmind login` again.");
            }
            std::process::exit(1);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // ========================================================================
    // TEST 1: clap definition is internally consistent
    // ========================================================================
    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    // ========================================================================
    // TEST 2: item filters parse through the model's FromStr
    // ========================================================================
    #[test]
    fn test_items_list_parses_filters() {
        let cli = Cli::parse_from([
            "clearmind", "items", "list", "--tab", "idea", "--status", "in-progress", "-s", "blog",
        ]);
        match cli.command {
            Commands::Items {
                command:
                    ItemCommands::List {
                        tab, status, search, json, ..
                    },
            } => {
                assert_eq!(tab, Some(Category::Idea));
                assert_eq!(status, Some(Status::InProgress));
                assert_eq!(search, "blog");
                assert!(!json);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // ========================================================================
    // TEST 3: unknown enum values are rejected by the parser
    // ========================================================================
    #[test]
    fn test_bad_category_rejected() {
        assert!(Cli::try_parse_from(["clearmind", "items", "list", "--tab", "chore"]).is_err());
    }

    // ========================================================================
    // TEST 4: deadlines accept dates and date-times
    // ========================================================================
    #[test]
    fn test_parse_deadline() {
        let d = parse_deadline("2025-03-01").unwrap();
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2025-03-01 00:00");
        assert!(parse_deadline("2025-03-01T17:30").is_ok());
        assert!(parse_deadline("next tuesday").is_err());
    }

    // ========================================================================
    // TEST 5: every page command maps to the route it stands in for
    // ========================================================================
    #[test]
    fn test_command_routes() {
        let dashboard = Cli::parse_from(["clearmind", "dashboard"]);
        assert_eq!(dashboard.command.route(), Some(Route::Dashboard));
        assert!(dashboard.command.route().unwrap().is_protected());

        let login = Cli::parse_from(["clearmind", "login", "--email", "a@b.co", "--password", "x"]);
        assert_eq!(login.command.route(), Some(Route::Landing));
        assert_eq!(login.command.failure_fallback(), AUTH_FAILURE);

        let sidebar = Cli::parse_from(["clearmind", "sidebar", "collapse"]);
        assert_eq!(sidebar.command.route(), None);
    }

    // ========================================================================
    // TEST 6: edit cannot both set and clear the subcategory
    // ========================================================================
    #[test]
    fn test_edit_clear_conflicts_with_subcategory() {
        let res = Cli::try_parse_from([
            "clearmind", "items", "edit", "3", "--subcategory", "goal", "--clear-subcategory",
        ]);
        assert!(res.is_err());
    }

    // ========================================================================
    // TEST 7: edit can clear the deadline, but not while setting one
    // ========================================================================
    #[test]
    fn test_edit_clear_deadline_flag() {
        let cli = Cli::parse_from(["clearmind", "items", "edit", "3", "--clear-deadline"]);
        match cli.command {
            Commands::Items {
                command:
                    ItemCommands::Edit {
                        clear_deadline, fields, ..
                    },
            } => {
                assert!(clear_deadline);
                assert!(fields.deadline.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        let res = Cli::try_parse_from([
            "clearmind", "items", "edit", "3", "--deadline", "2025-03-01", "--clear-deadline",
        ]);
        assert!(res.is_err());
    }

    // ========================================================================
    // TEST 8: new items cannot be created with a status
    // ========================================================================
    #[test]
    fn test_add_has_no_status_flag() {
        assert!(Cli::try_parse_from(["clearmind", "items", "add", "Pay rent", "--status", "done"]).is_err());
        assert!(Cli::try_parse_from(["clearmind", "items", "edit", "1", "--status", "done"]).is_ok());
    }

    // ========================================================================
    // TEST 9: page commands point at real subcommands
    // ========================================================================
    #[test]
    fn test_page_commands_parse() {
        for route in Route::ALL {
            let mut argv = vec!["clearmind"];
            argv.extend(page_command(route).split(' '));
            if route == Route::Landing {
                argv.extend(["--email", "a@b.co", "--password", "x"]);
            }
            if route == Route::Onboarding {
                argv.extend(["--occupation", "o", "--goals", "g", "--personality", "p"]);
            }
            assert!(Cli::try_parse_from(&argv).is_ok(), "{argv:?}");
        }
    }
}
