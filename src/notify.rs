//! Mail pass-through for user accounts. Delivery belongs to whoever
//! implements [`Mailer`].

use crate::error::Result;
use crate::types::User;

#[derive(Debug, Clone, Default)]
pub struct MailOptions {
    /// Swallow delivery failures instead of returning them.
    pub fail_silently: bool,
    pub html_message: Option<String>,
}

pub trait Mailer: Send + Sync {
    fn send_mail(
        &self,
        subject: &str,
        message: &str,
        from: Option<&str>,
        recipients: &[&str],
        options: &MailOptions,
    ) -> Result<()>;
}

impl User {
    /// Sends a message to this user's email address.
    pub fn email_user(
        &self,
        mailer: &dyn Mailer,
        subject: &str,
        message: &str,
        from: Option<&str>,
        options: &MailOptions,
    ) -> Result<()> {
        match mailer.send_mail(subject, message, from, &[self.email.as_str()], options) {
            Err(e) if options.fail_silently => {
                tracing::warn!(user = %self.name, "Failed to send mail: {e}");
                Ok(())
            }
            result => result,
        }
    }
}

/// Writes mail to the log instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_mail(
        &self,
        subject: &str,
        _message: &str,
        from: Option<&str>,
        recipients: &[&str],
        _options: &MailOptions,
    ) -> Result<()> {
        tracing::info!(
            from = from.unwrap_or("-"),
            to = %recipients.join(", "),
            subject,
            "Mail not delivered: no transport configured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    impl Mailer for RecordingMailer {
        fn send_mail(
            &self,
            subject: &str,
            _message: &str,
            _from: Option<&str>,
            recipients: &[&str],
            _options: &MailOptions,
        ) -> Result<()> {
            if self.fail {
                return Err(Error::Config("no smtp host".to_string()));
            }
            self.sent.lock().unwrap().push((
                subject.to_string(),
                recipients.iter().map(|r| r.to_string()).collect(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_email_user_sends_to_user_address() {
        let mailer = RecordingMailer::default();
        let user = User::new("alice", "alice@Example.com");

        user.email_user(&mailer, "Hello", "Body", None, &MailOptions::default())
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[("Hello".to_string(), vec!["alice@example.com".to_string()])]
        );
    }

    #[test]
    fn test_fail_silently_swallows_errors() {
        let mailer = RecordingMailer {
            fail: true,
            ..Default::default()
        };
        let user = User::new("alice", "alice@example.com");

        assert!(
            user.email_user(&mailer, "Hi", "Body", None, &MailOptions::default())
                .is_err()
        );

        let options = MailOptions {
            fail_silently: true,
            ..Default::default()
        };
        assert!(user.email_user(&mailer, "Hi", "Body", None, &options).is_ok());
    }

    #[test]
    fn test_log_mailer_accepts_mail() {
        let user = User::new("alice", "alice@example.com");
        let options = MailOptions {
            html_message: Some("<p>Body</p>".to_string()),
            ..Default::default()
        };
        assert!(
            user.email_user(&LogMailer, "Hi", "Body", Some("noreply@example.com"), &options)
                .is_ok()
        );
    }
}
