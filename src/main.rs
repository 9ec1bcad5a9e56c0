//! Binary entry point for rolegate.
//!
//! Administers the role/permission database and answers permission checks
//! from the command line.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rolegate::config::RolegateConfig;
use rolegate::observability::{self, LoggingConfig};
use rolegate::security::{DefaultPermissionMatrix, PermissionCatalog, PermissionEngine};
use rolegate::{
    Action, ActorResolver, Authorizer, BaseRole, Error, PermissionId, PermissionKey,
    PermissionSnapshot, Role, RoleCreate, RoleId, RoleService, RoleUpdate, SqliteAuthzStore, User,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Rolegate - role and permission administration.
#[derive(Parser)]
#[command(name = "rolegate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "ROLEGATE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Database file (overrides configuration).
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List the permission catalog and the base-role defaults.
    Catalog {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Check whether a user may perform an action on a resource.
    ///
    /// Exits 0 when allowed and 1 when denied.
    Check {
        /// User identifier.
        user: String,
        /// Action, for example `DELETE` or `manage-roles`.
        action: String,
        /// Resource, for example `media`.
        resource: String,
    },

    /// Manage custom roles.
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },

    /// Manage users.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Print a user's permission snapshot as JSON.
    Snapshot {
        /// User identifier.
        user: String,
    },

    /// Show configuration.
    Config {
        /// Print the effective configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Role subcommands.
#[derive(Subcommand)]
enum RoleAction {
    /// List roles.
    List {
        /// Include inactive roles.
        #[arg(long)]
        all: bool,
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one role with its permissions.
    Show {
        /// Role id or name.
        role: String,
    },
    /// Create a custom role.
    Create {
        /// Unique role name.
        name: String,
        /// Secondary display name.
        #[arg(long)]
        display_name: Option<String>,
        /// Description.
        #[arg(long)]
        description: Option<String>,
        /// Granted permission as `ACTION:resource` (repeatable).
        #[arg(short, long = "permission")]
        permissions: Vec<String>,
    },
    /// Update a custom role's metadata.
    Update {
        /// Role id or name.
        role: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New display name.
        #[arg(long)]
        display_name: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// Activate or deactivate.
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a custom role.
    Delete {
        /// Role id or name.
        role: String,
    },
    /// Replace a custom role's permissions.
    Grant {
        /// Role id or name.
        role: String,
        /// Full new permission set as `ACTION:resource`.
        permissions: Vec<String>,
    },
}

/// User subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create or replace a user.
    Upsert {
        /// User identifier.
        id: String,
        /// Base role: admin, editor or viewer.
        base_role: String,
        /// Custom role id or name.
        #[arg(long)]
        role: Option<String>,
        /// Store the user as inactive.
        #[arg(long)]
        inactive: bool,
    },
    /// Assign a custom role, or clear it when no role is given.
    Assign {
        /// User identifier.
        id: String,
        /// Role id or name.
        role: Option<String>,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.database.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: RolegateConfig) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Catalog { json } => cmd_catalog(json),
        Commands::Config { show } => cmd_config(&config, show),
        Commands::Check {
            user,
            action,
            resource,
        } => cmd_check(&open_store(&config)?, &user, &action, &resource),
        Commands::Snapshot { user } => cmd_snapshot(&open_store(&config)?, &user),
        Commands::Role { action } => cmd_role(&RoleService::new(open_store(&config)?), action),
        Commands::User { action } => cmd_user(&RoleService::new(open_store(&config)?), action),
    }
    .map_err(Into::into)
}

/// Loads configuration: explicit file or default location, then env, then flags.
fn load_config(
    path: Option<&std::path::Path>,
    database: Option<PathBuf>,
) -> CliResult<RolegateConfig> {
    let config = match path {
        Some(path) => RolegateConfig::load_from_file(path)?,
        None => RolegateConfig::load_default(),
    };
    let config = config.with_env_overrides();
    Ok(match database {
        Some(database) => config.with_database_path(database),
        None => config,
    })
}

fn open_store(config: &RolegateConfig) -> rolegate::Result<Arc<SqliteAuthzStore>> {
    let store = SqliteAuthzStore::new(&config.database_path)?;
    if config.seed_on_open {
        store.seed(&DefaultPermissionMatrix::standard())?;
    }
    Ok(Arc::new(store))
}

/// Catalog command.
fn cmd_catalog(json: bool) -> rolegate::Result<ExitCode> {
    let matrix = DefaultPermissionMatrix::standard();

    if json {
        let catalog: Vec<_> = PermissionCatalog::entries()
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "action": entry.action,
                    "resource": entry.resource,
                    "description": entry.description,
                    "roles": matrix.roles_with_permission(entry.action, entry.resource),
                })
            })
            .collect();
        let body = serde_json::json!({ "catalog": catalog, "defaults": matrix.summary() });
        println!("{}", to_json(&body)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<36} {:<16} DESCRIPTION", "PERMISSION", "DEFAULT ROLES");
    for entry in PermissionCatalog::entries() {
        let roles: Vec<&str> = matrix
            .roles_with_permission(entry.action, entry.resource)
            .iter()
            .map(BaseRole::as_str)
            .collect();
        let roles = if roles.is_empty() {
            "-".to_string()
        } else {
            roles.join(",")
        };
        println!(
            "{:<36} {:<16} {}",
            entry.key().to_string(),
            roles,
            entry.description
        );
    }
    println!();
    println!("ADMIN is granted every permission, including unknown resources.");
    Ok(ExitCode::SUCCESS)
}

/// Check command.
fn cmd_check(
    store: &Arc<SqliteAuthzStore>,
    user: &str,
    action: &str,
    resource: &str,
) -> rolegate::Result<ExitCode> {
    let action: Action = action.parse()?;
    let authorizer = Authorizer::new(ActorResolver::new(store.clone()), PermissionEngine::new());

    let verdict = authorizer.evaluate(user, action, resource)?;
    println!("{} {action}:{resource} -> {}", user, verdict.label());
    Ok(if verdict.is_allowed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Snapshot command.
fn cmd_snapshot(store: &Arc<SqliteAuthzStore>, user: &str) -> rolegate::Result<ExitCode> {
    let resolver = ActorResolver::new(store.clone());
    let actor = resolver
        .resolve(Some(user))?
        .ok_or_else(|| Error::not_found("user", user))?;
    let snapshot = PermissionSnapshot::capture(&actor, &PermissionEngine::new());
    println!("{}", to_json(&snapshot)?);
    Ok(ExitCode::SUCCESS)
}

/// Role command.
fn cmd_role(service: &RoleService, action: RoleAction) -> rolegate::Result<ExitCode> {
    match action {
        RoleAction::List { all, json } => {
            let roles = service.list_roles(all)?;
            if json {
                println!("{}", to_json(&roles)?);
            } else {
                for role in &roles {
                    print_role_line(role);
                }
            }
        },
        RoleAction::Show { role } => {
            let role = find_role(service, &role)?;
            println!("{}", to_json(&role)?);
        },
        RoleAction::Create {
            name,
            display_name,
            description,
            permissions,
        } => {
            let request = RoleCreate {
                name,
                display_name,
                description,
                permission_ids: permission_ids(service, &permissions)?,
            };
            let role = service.create_role(request)?;
            print_role_line(&role);
        },
        RoleAction::Update {
            role,
            name,
            display_name,
            description,
            active,
        } => {
            let role = find_role(service, &role)?;
            let update = RoleUpdate {
                name,
                display_name,
                description,
                is_active: active,
            };
            print_role_line(&service.update_role(&role.id, update)?);
        },
        RoleAction::Delete { role } => {
            let role = find_role(service, &role)?;
            let deleted = service.delete_role(&role.id)?;
            println!("Deleted role {} ({})", deleted.name, deleted.id);
        },
        RoleAction::Grant { role, permissions } => {
            let role = find_role(service, &role)?;
            let ids = permission_ids(service, &permissions)?;
            print_role_line(&service.set_role_permissions(&role.id, &ids)?);
        },
    }
    Ok(ExitCode::SUCCESS)
}

/// User command.
fn cmd_user(service: &RoleService, action: UserAction) -> rolegate::Result<ExitCode> {
    match action {
        UserAction::Upsert {
            id,
            base_role,
            role,
            inactive,
        } => {
            let mut user = User::new(id, base_role.parse::<BaseRole>()?);
            let custom_role = role.map(|r| find_role(service, &r)).transpose()?;
            user.custom_role_id = custom_role.map(|r| r.id);
            user.is_active = !inactive;
            service.upsert_user(&user)?;
            println!("Saved user {} ({})", user.id, user.base_role);
        },
        UserAction::Assign { id, role } => {
            let role = role.map(|r| find_role(service, &r)).transpose()?;
            service.assign_custom_role(&id, role.as_ref().map(|r| &r.id))?;
            match role {
                Some(role) => println!("Assigned {} to {id}", role.name),
                None => println!("Cleared custom role of {id}"),
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}

/// Config command.
fn cmd_config(config: &RolegateConfig, show: bool) -> rolegate::Result<ExitCode> {
    if show {
        print!("{}", config.to_toml()?);
    } else {
        println!("Use --show to display configuration");
    }
    Ok(ExitCode::SUCCESS)
}

/// Looks a role up by id, then by name.
fn find_role(service: &RoleService, role: &str) -> rolegate::Result<Role> {
    if let Some(found) = service.get_role(&RoleId::new(role))? {
        return Ok(found);
    }
    service
        .find_role_by_name(role)?
        .ok_or_else(|| Error::not_found("role", role))
}

/// Maps `ACTION:resource` arguments to stored permission ids.
fn permission_ids(service: &RoleService, args: &[String]) -> rolegate::Result<Vec<PermissionId>> {
    let stored = service.list_permissions()?;
    args.iter()
        .map(|arg| {
            let key = parse_permission_key(arg)?;
            stored
                .iter()
                .find(|p| p.key() == key)
                .map(|p| p.id)
                .ok_or_else(|| {
                    Error::Validation(format!("'{key}' is not in the permission catalog"))
                })
        })
        .collect()
}

fn parse_permission_key(arg: &str) -> rolegate::Result<PermissionKey> {
    let (action, resource) = arg
        .split_once(':')
        .ok_or_else(|| Error::Validation(format!("expected ACTION:resource, got '{arg}'")))?;
    Ok(PermissionKey::new(action.parse()?, resource.trim()))
}

fn print_role_line(role: &Role) {
    println!(
        "{:<38} {:<24} {:>3} permissions{}{}",
        role.id,
        role.name,
        role.permissions.len(),
        if role.is_system { " [system]" } else { "" },
        if role.is_active { "" } else { " [inactive]" },
    );
}

fn to_json<T: serde::Serialize>(value: &T) -> rolegate::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::operation("render_json", e))
}
