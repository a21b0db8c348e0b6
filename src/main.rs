use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use scicure::commands::{
    ListOptions, LookupKind, WriteOptions, cmd_config_get, cmd_config_set, cmd_config_show,
    cmd_create, cmd_delete, cmd_list, cmd_login, cmd_logout, cmd_lookup, cmd_mark_read, cmd_show,
    cmd_ui, cmd_update, cmd_whoami,
};
use scicure::entity::EntityKind;
use scicure::ui_store::{Theme, UiAction};

#[derive(Parser)]
#[command(name = "scicure")]
#[command(about = "Administer journals, articles, editors, manuscripts, indexing and enquiries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email
        email: String,

        /// Password (prompted on stdin if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the current session identity
    Whoami {
        #[arg(long)]
        json: bool,
    },

    /// List records of an entity
    #[command(visible_alias = "ls")]
    List {
        /// journals, articles, editors, manuscripts, indexing or contacts
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Records per page (default from config)
        #[arg(long)]
        page_size: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Show every field of one record
    Show {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Record id
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Create a record
    Create {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Field value as key=value (repeatable)
        #[arg(short, long = "field", action = clap::ArgAction::Append)]
        fields: Vec<String>,

        /// File attachment as field=path (repeatable)
        #[arg(long = "file", action = clap::ArgAction::Append)]
        files: Vec<String>,
    },

    /// Update a record
    Update {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Record id
        id: String,

        /// Field value as key=value (repeatable)
        #[arg(short, long = "field", action = clap::ArgAction::Append)]
        fields: Vec<String>,

        /// File attachment as field=path (repeatable)
        #[arg(long = "file", action = clap::ArgAction::Append)]
        files: Vec<String>,
    },

    /// Delete a record
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Record id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Mark a contact enquiry as read
    MarkRead {
        /// Enquiry id
        id: String,
    },

    /// Look up issues and articles by journal or issue
    Lookup {
        #[command(subcommand)]
        action: LookupAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Change sidebar and theme settings
    Ui {
        #[command(subcommand)]
        action: UiCommand,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum LookupAction {
    /// All issues of a journal
    Archive {
        journal_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Latest issue of a journal
    LatestIssue {
        journal_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Articles in an issue
    IssueArticles {
        issue_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Articles in a journal
    JournalArticles {
        journal_id: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (api_url, page_size, login_path, request_timeout_secs, ui.theme, ...)
        key: String,
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
}

#[derive(Subcommand)]
enum UiCommand {
    /// Show or hide the sidebar
    Sidebar {
        /// on, off or toggle
        #[arg(value_parser = ["on", "off", "toggle"])]
        state: String,
    },
    /// Toggle the compact sidebar
    Fold,
    /// Set the color theme (light, dark, plain)
    Theme {
        #[arg(value_parser = parse_theme)]
        theme: Theme,
    },
}

fn parse_entity(s: &str) -> Result<EntityKind, String> {
    s.parse().map_err(|e: scicure::AdminError| e.to_string())
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    s.parse().map_err(|e: scicure::AdminError| e.to_string())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login { email, password } => cmd_login(&email, password),
        Commands::Logout => cmd_logout(),
        Commands::Whoami { json } => cmd_whoami(json),
        Commands::List {
            entity,
            search,
            page,
            page_size,
            json,
        } => cmd_list(
            entity,
            ListOptions {
                search,
                page,
                page_size,
                json,
            },
        ),
        Commands::Show { entity, id, json } => cmd_show(entity, &id, json),
        Commands::Create {
            entity,
            fields,
            files,
        } => cmd_create(entity, WriteOptions { fields, files }),
        Commands::Update {
            entity,
            id,
            fields,
            files,
        } => cmd_update(entity, &id, WriteOptions { fields, files }),
        Commands::Delete { entity, id, yes } => cmd_delete(entity, &id, yes),
        Commands::MarkRead { id } => cmd_mark_read(&id),
        Commands::Lookup { action } => match action {
            LookupAction::Archive { journal_id, json } => {
                cmd_lookup(LookupKind::IssueArchive, &journal_id, json)
            }
            LookupAction::LatestIssue { journal_id, json } => {
                cmd_lookup(LookupKind::LatestIssue, &journal_id, json)
            }
            LookupAction::IssueArticles { issue_id, json } => {
                cmd_lookup(LookupKind::IssueArticles, &issue_id, json)
            }
            LookupAction::JournalArticles { journal_id, json } => {
                cmd_lookup(LookupKind::JournalArticles, &journal_id, json)
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(json),
            ConfigAction::Get { key, json } => cmd_config_get(&key, json),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value),
        },
        Commands::Ui { action } => {
            let action = match action {
                UiCommand::Sidebar { state } => match state.as_str() {
                    "on" => UiAction::SetSidebar(true),
                    "off" => UiAction::SetSidebar(false),
                    _ => UiAction::ToggleSidebar,
                },
                UiCommand::Fold => UiAction::ToggleUnfoldable,
                UiCommand::Theme { theme } => UiAction::SetTheme(theme),
            };
            cmd_ui(action)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "scicure", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
