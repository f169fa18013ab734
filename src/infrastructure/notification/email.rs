//! Account email templates

use serde::Serialize;

use crate::domain::action_token::AccountAction;

/// Body posted to the email delivery endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub email: String,
    pub subject: String,
    pub content: String,
    pub url: String,
}

impl EmailMessage {
    /// Build the message for an action link pointing at `url`
    pub fn for_action(action: AccountAction, recipient: &str, url: String) -> Self {
        let (subject, content) = match action {
            AccountAction::Confirmation => (
                "Confirm Utopia Account.",
                "Please click the following link to confirm your account.",
            ),
            AccountAction::PasswordReset => (
                "Utopia Password Reset",
                "Please use this link to change your password (Link will expire soon).",
            ),
            AccountAction::Deletion => (
                "Confirm Your Account Deletion",
                "Please click the following link to confirm your account deletion.<br>\
                 If you've changed your mind, you can safely ignore this email.",
            ),
        };

        Self {
            email: recipient.to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
            url,
        }
    }
}

/// `base/token` with exactly one slash between the parts
pub fn action_link(base_url: &str, token: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_link_joins_once() {
        assert_eq!(
            action_link("https://utopia.test/confirm", "abc"),
            "https://utopia.test/confirm/abc"
        );
        assert_eq!(
            action_link("https://utopia.test/confirm/", "abc"),
            "https://utopia.test/confirm/abc"
        );
    }

    #[test]
    fn test_subject_per_action() {
        let msg = EmailMessage::for_action(
            AccountAction::Deletion,
            "a@test.com",
            "https://x/1".to_string(),
        );
        assert_eq!(msg.subject, "Confirm Your Account Deletion");
        assert_eq!(msg.email, "a@test.com");

        let msg = EmailMessage::for_action(
            AccountAction::Confirmation,
            "a@test.com",
            "https://x/1".to_string(),
        );
        assert_eq!(msg.subject, "Confirm Utopia Account.");
    }

    #[test]
    fn test_serialized_field_names() {
        let msg = EmailMessage::for_action(
            AccountAction::PasswordReset,
            "a@test.com",
            "https://x/1".to_string(),
        );
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["email"], "a@test.com");
        assert_eq!(json["url"], "https://x/1");
        assert!(json["subject"].is_string());
        assert!(json["content"].is_string());
    }
}
