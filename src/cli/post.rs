//! Post CLI commands

use clap::Subcommand;

use crate::audit::Auditor;
use crate::display::audit::format_audit_list;
use crate::display::post::{format_creator, format_post_details, format_post_list};
use crate::error::AuditorResult;
use crate::services::{NewPost, PostService, PostUpdate};
use crate::storage::Storage;

/// Post subcommands
#[derive(Subcommand)]
pub enum PostCommands {
    /// Create a new post
    Create {
        title: String,
        #[arg(short, long)]
        content: Option<String>,
        /// Publish immediately
        #[arg(long)]
        published: bool,
    },
    /// List all posts
    List,
    /// Show post details
    Show {
        /// Post title or ID
        post: String,
        /// Include the post's audit history
        #[arg(long)]
        history: bool,
    },
    /// Update a post
    Update {
        /// Post title or ID
        post: String,
        #[arg(short, long)]
        title: Option<String>,
        /// New content (empty string clears it)
        #[arg(short, long)]
        content: Option<String>,
        #[arg(long)]
        published: Option<bool>,
    },
    /// Delete a post
    Delete {
        /// Post title or ID
        post: String,
    },
    /// Show who created a post
    Creator {
        /// Post title or ID
        post: String,
    },
}

/// Handle a post command
pub async fn handle_post_command(
    storage: &Storage,
    auditor: &Auditor,
    cmd: PostCommands,
) -> AuditorResult<()> {
    let service = PostService::new(storage, auditor);

    match cmd {
        PostCommands::Create {
            title,
            content,
            published,
        } => {
            let mut input = NewPost::new(title).published(published);
            input.content = content;
            let post = service.create(input)?;

            println!("Created post: {}", post.title);
            println!("  ID: {}", post.id);
        }

        PostCommands::List => {
            print!("{}", format_post_list(&service.list()?));
        }

        PostCommands::Show { post, history } => {
            let found = service.require(&post)?;
            print!("{}", format_post_details(&found));

            if history {
                println!();
                println!("History:");
                print!("{}", format_audit_list(&service.history(&found).await?));
            }
        }

        PostCommands::Update {
            post,
            title,
            content,
            published,
        } => {
            let found = service.require(&post)?;
            if title.is_none() && content.is_none() && published.is_none() {
                println!("No changes specified. Use --title, --content or --published.");
                return Ok(());
            }

            let updated = service.update(
                found.id,
                PostUpdate {
                    title,
                    content,
                    published,
                },
            )?;
            println!("Updated post: {}", updated.title);
        }

        PostCommands::Delete { post } => {
            let found = service.require(&post)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted post: {}", deleted.title);
        }

        PostCommands::Creator { post } => {
            let found = service.find_with_creator(&post).await?;
            println!("Post:    {}", found.post.title);
            println!(
                "Creator: {}",
                format_creator(found.actor.as_ref(), found.creator.as_ref())
            );
        }
    }

    Ok(())
}
