//! User CLI commands

use clap::Subcommand;

use crate::audit::{Auditor, FieldValue};
use crate::display::user::{format_user_details, format_user_list};
use crate::error::AuditorResult;
use crate::services::{NewUser, UserService, UserUpdate};
use crate::storage::Storage;

use super::{assignments_to_snapshot, parse_assignment};

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    Create {
        /// Display name
        name: String,
        /// Email address
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// List all users
    List,
    /// Show user details
    Show {
        /// User email or ID
        user: String,
    },
    /// Update a user
    Update {
        /// User email or ID
        user: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// New phone number (empty string clears it)
        #[arg(long)]
        phone: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Delete a user
    Delete {
        /// User email or ID
        user: String,
    },
    /// Update every user matching the conditions
    BulkUpdate {
        /// Match condition, FIELD=VALUE (repeatable)
        #[arg(short = 'w', long = "where", value_parser = parse_assignment, required = true)]
        conditions: Vec<(String, FieldValue)>,
        /// Change to apply, FIELD=VALUE (repeatable)
        #[arg(short = 's', long = "set", value_parser = parse_assignment, required = true)]
        changes: Vec<(String, FieldValue)>,
    },
    /// Delete every user matching the conditions
    BulkDelete {
        /// Match condition, FIELD=VALUE (repeatable)
        #[arg(short = 'w', long = "where", value_parser = parse_assignment, required = true)]
        conditions: Vec<(String, FieldValue)>,
    },
    /// Create a set of demo users in one bulk operation
    Seed,
}

fn demo_users() -> Vec<NewUser> {
    vec![
        NewUser::new("John Doe", "john@example.com", "secret123").phone("555-1234"),
        NewUser::new("Jane Smith", "jane@example.com", "secret456").phone("555-5678"),
        NewUser::new("Bob Johnson", "bob@example.com", "secret789"),
        NewUser::new("Carol Wilson", "carol@example.com", "secret000").phone("555-9012"),
    ]
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    auditor: &Auditor,
    cmd: UserCommands,
) -> AuditorResult<()> {
    let service = UserService::new(storage, auditor);

    match cmd {
        UserCommands::Create {
            name,
            email,
            password,
            phone,
        } => {
            let mut input = NewUser::new(name, email, password);
            input.phone = phone;
            let user = service.create(input)?;

            println!("Created user: {}", user.name);
            println!("  Email: {}", user.email);
            println!("  ID: {}", user.id);
        }

        UserCommands::List => {
            print!("{}", format_user_list(&service.list()?));
        }

        UserCommands::Show { user } => {
            let found = service.require(&user)?;
            print!("{}", format_user_details(&found));
        }

        UserCommands::Update {
            user,
            name,
            email,
            phone,
            password,
            status,
        } => {
            let found = service.require(&user)?;
            let changes = UserUpdate {
                name,
                email,
                phone,
                password,
                status,
            };

            if changes.is_empty() {
                println!("No changes specified. Use --name, --email, --phone, --password or --status.");
                return Ok(());
            }

            let updated = service.update(found.id, changes)?;
            println!("Updated user: {}", updated.name);
        }

        UserCommands::Delete { user } => {
            let found = service.require(&user)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted user: {} <{}>", deleted.name, deleted.email);
        }

        UserCommands::BulkUpdate {
            conditions,
            changes,
        } => {
            let updated = service.bulk_update(
                &assignments_to_snapshot(conditions),
                &assignments_to_snapshot(changes),
            )?;
            println!("Updated {} user(s)", updated.len());
        }

        UserCommands::BulkDelete { conditions } => {
            let deleted = service.bulk_delete(&assignments_to_snapshot(conditions))?;
            println!("Deleted {} user(s)", deleted.len());
        }

        UserCommands::Seed => {
            let created = service.create_many(demo_users())?;
            println!("Created {} demo user(s)", created.len());
        }
    }

    Ok(())
}
