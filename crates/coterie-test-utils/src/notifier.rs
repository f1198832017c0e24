use std::sync::Mutex;

use async_trait::async_trait;

use coterie_core::CoterieResult;
use coterie_server::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// "activation" or "application-notification".
    pub kind: String,
    pub to: String,
    /// The activation token, or the applicant name for notifications.
    pub detail: String,
}

/// In-memory Notifier that records every dispatch instead of talking SMTP.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentEmail>>,
    /// When set, every send fails; exercises the best-effort paths.
    pub fail_sends: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: true,
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<SentEmail> {
        self.sent().into_iter().filter(|e| e.to == to).collect()
    }

    fn record(&self, kind: &str, to: &str, detail: &str) -> CoterieResult<()> {
        if self.fail_sends {
            return Err(coterie_core::CoterieError::InternalError(
                "simulated SMTP failure".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(SentEmail {
            kind: kind.to_string(),
            to: to.to_string(),
            detail: detail.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_activation_email(&self, to: &str, token: &str) -> CoterieResult<()> {
        self.record("activation", to, token)
    }

    async fn send_application_notification(
        &self,
        to: &str,
        applicant_name: &str,
    ) -> CoterieResult<()> {
        self.record("application-notification", to, applicant_name)
    }
}
