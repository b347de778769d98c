//! Operational reporting to an external webhook.
//!
//! Mirrors what an operations channel wants to see: who started a session
//! and which documents went out. Reporting is best-effort only; failures
//! are logged and never reach the user-facing request path.

use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ReportEvent<'a> {
    event: &'a str,
    user: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}

#[derive(Clone)]
pub struct Reporter {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl Reporter {
    pub fn new(webhook_url: Option<String>) -> Self {
        if webhook_url.is_none() {
            log::warn!("REPORT_WEBHOOK_URL not configured; operational reports are disabled");
        }
        let client = reqwest::Client::builder()
            .user_agent("docbot-server/0.4")
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook_url,
        }
    }

    pub async fn session_started(&self, user: &str) {
        self.send(ReportEvent {
            event: "session_started",
            user,
            timestamp: Utc::now().to_rfc3339(),
            template: None,
            outcome: None,
            filename: None,
        })
        .await;
    }

    pub async fn document_requested(&self, user: &str, template: &str) {
        self.send(ReportEvent {
            event: "document_requested",
            user,
            timestamp: Utc::now().to_rfc3339(),
            template: Some(template),
            outcome: None,
            filename: None,
        })
        .await;
    }

    pub async fn document_delivered(
        &self,
        user: &str,
        template: &str,
        outcome: &str,
        filename: Option<&str>,
    ) {
        self.send(ReportEvent {
            event: "document_delivered",
            user,
            timestamp: Utc::now().to_rfc3339(),
            template: Some(template),
            outcome: Some(outcome),
            filename,
        })
        .await;
    }

    async fn send(&self, event: ReportEvent<'_>) {
        let Some(url) = &self.webhook_url else {
            return;
        };
        match self.client.post(url).json(&event).send().await {
            Ok(response) if !response.status().is_success() => {
                log::warn!(
                    "report webhook returned {} for '{}'",
                    response.status(),
                    event.event
                );
            }
            Ok(_) => {}
            Err(e) => log::warn!("failed to send '{}' report: {e}", event.event),
        }
    }
}
