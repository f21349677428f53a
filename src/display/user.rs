//! User display formatting

use crate::models::User;

use super::column_width;

/// Format a list of users as a table
pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let name_width = column_width(users.iter().map(|u| u.name.as_str()), 4);
    let email_width = column_width(users.iter().map(|u| u.email.as_str()), 5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<name_width$}  {:<email_width$}  {:<14}  {}\n",
        "ID", "Name", "Email", "Phone", "Status",
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<name_width$}  {:-<email_width$}  {:-<14}  {:-<8}\n",
        "", "", "", "", "",
    ));

    for user in users {
        output.push_str(&format!(
            "{:<12}  {:<name_width$}  {:<email_width$}  {:<14}  {}\n",
            user.id.to_string(),
            user.name,
            user.email,
            user.phone.as_deref().unwrap_or(""),
            user.status,
        ));
    }

    output.push_str(&format!("\n{} user(s)\n", users.len()));
    output
}

/// Format a single user's details (the password is never shown)
pub fn format_user_details(user: &User) -> String {
    let mut output = String::new();

    output.push_str(&format!("User: {}\n", user.name));
    output.push_str(&format!("  ID:       {}\n", user.id));
    output.push_str(&format!("  Email:    {}\n", user.email));
    output.push_str(&format!(
        "  Phone:    {}\n",
        user.phone.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!("  Status:   {}\n", user.status));
    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        user.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        user.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_user_list() {
        let users = vec![
            User::new("John Doe", "john@example.com", "secret123").with_phone("555-1234"),
            User::new("Carol Wilson", "carol@example.com", "secret456"),
        ];

        let output = format_user_list(&users);
        assert!(output.contains("John Doe"));
        assert!(output.contains("carol@example.com"));
        assert!(output.contains("555-1234"));
        assert!(output.contains("2 user(s)"));
        assert!(!output.contains("secret"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_user_list(&[]), "No users found.");
    }

    #[test]
    fn test_details_hide_password() {
        let user = User::new("John Doe", "john@example.com", "secret123");
        let output = format_user_details(&user);
        assert!(output.contains("john@example.com"));
        assert!(!output.contains("secret123"));
    }
}
