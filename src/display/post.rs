//! Post display formatting

use crate::audit::{Creator, Snapshot};
use crate::models::Post;

use super::column_width;

pub fn format_post_list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "No posts found.".to_string();
    }

    let title_width = column_width(posts.iter().map(|p| p.title.as_str()), 5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<title_width$}  {}\n",
        "ID", "Title", "Published",
    ));
    output.push_str(&format!("{:-<12}  {:-<title_width$}  {:-<9}\n", "", "", ""));

    for post in posts {
        output.push_str(&format!(
            "{:<12}  {:<title_width$}  {}\n",
            post.id.to_string(),
            post.title,
            if post.published { "Yes" } else { "No" },
        ));
    }

    output
}

pub fn format_post_details(post: &Post) -> String {
    let mut output = String::new();

    output.push_str(&format!("Post: {}\n", post.title));
    output.push_str(&format!("  ID:        {}\n", post.id));
    output.push_str(&format!(
        "  Published: {}\n",
        if post.published { "Yes" } else { "No" }
    ));
    if let Some(content) = &post.content {
        output.push('\n');
        output.push_str(&format!("  {}\n", content));
    }
    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        post.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        post.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Describe a creator for display; `None` means no creation audit exists
///
/// A resolved creator record is appended as `{field=value, ...}`.
pub fn format_creator(actor: Option<&Creator>, creator: Option<&Snapshot>) -> String {
    let who = match actor {
        None => return "unknown (no creation audit)".to_string(),
        Some(Creator {
            actor_id: Some(id),
            actor_type: Some(kind),
        }) => format!("{} ({})", id, kind),
        Some(Creator {
            actor_id: Some(id), ..
        }) => id.clone(),
        Some(_) => "anonymous".to_string(),
    };

    match creator {
        Some(record) if !record.is_empty() => {
            let fields: Vec<String> = record
                .iter()
                .map(|(field, value)| format!("{}={}", field, value))
                .collect();
            format!("{} {{{}}}", who, fields.join(", "))
        }
        _ => who,
    }
}
