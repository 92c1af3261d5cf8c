use super::SubmissionPayload;

/// Outbound email derived from a stored submission. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub from: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

impl NotificationRequest {
    pub fn for_submission(payload: &SubmissionPayload, from: &str, recipients: &[String]) -> Self {
        let (subject, html_body) = match payload {
            SubmissionPayload::Words { words } => (
                "Words Saved Successfully!",
                format!(
                    "<p>You have successfully saved your {} words:</p><p>{}</p>",
                    words.len(),
                    words.join(" ")
                ),
            ),
            SubmissionPayload::Contact { email, message } => (
                "New Request Received!",
                format!(
                    "<p><strong>Email:</strong> {}</p><p><strong>Message:</strong> {}</p>",
                    email, message
                ),
            ),
        };

        // Recipients form a set; keep first-seen order.
        let mut unique: Vec<String> = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if !unique.contains(recipient) {
                unique.push(recipient.clone());
            }
        }

        Self {
            from: from.to_string(),
            recipients: unique,
            subject: subject.to_string(),
            html_body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_notification_lists_words_in_order() {
        let payload = SubmissionPayload::Words {
            words: vec!["one".into(), "two".into(), "three".into()],
        };
        let request =
            NotificationRequest::for_submission(&payload, "onboarding@resend.dev", &["ops@example.com".into()]);

        assert_eq!(request.subject, "Words Saved Successfully!");
        assert_eq!(
            request.html_body,
            "<p>You have successfully saved your 3 words:</p><p>one two three</p>"
        );
        assert_eq!(request.recipients, vec!["ops@example.com".to_string()]);
    }

    #[test]
    fn contact_notification_interpolates_both_fields() {
        let payload = SubmissionPayload::Contact {
            email: "x@y.com".into(),
            message: "hi".into(),
        };
        let request = NotificationRequest::for_submission(
            &payload,
            "onboarding@resend.dev",
            &["a@example.com".into(), "b@example.com".into(), "a@example.com".into()],
        );

        assert_eq!(request.subject, "New Request Received!");
        assert!(request.html_body.contains("<strong>Email:</strong> x@y.com"));
        assert!(request.html_body.contains("<strong>Message:</strong> hi"));
        assert_eq!(
            request.recipients,
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }
}
