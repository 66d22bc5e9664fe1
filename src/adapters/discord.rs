use crate::domain::model::DeploySummary;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_SUCCESS_COLOR: u32 = 0x2ECC71;
pub const DEFAULT_FAILURE_COLOR: u32 = 0xE74C3C;

/// Posts one embed per deployment to a Discord webhook.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    enabled: bool,
    url: String,
    username: Option<String>,
    success_color: u32,
    failure_color: u32,
}

impl DiscordWebhook {
    pub fn new(enabled: bool, url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            enabled,
            url: url.into(),
            username: None,
            success_color: DEFAULT_SUCCESS_COLOR,
            failure_color: DEFAULT_FAILURE_COLOR,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_colors(mut self, success: u32, failure: u32) -> Self {
        self.success_color = success;
        self.failure_color = failure;
        self
    }

    pub fn is_active(&self) -> bool {
        self.enabled && !self.url.trim().is_empty()
    }

    pub fn payload(&self, summary: &DeploySummary) -> serde_json::Value {
        let (title, color) = if summary.succeeded {
            (format!("Deployed {}", summary.service), self.success_color)
        } else {
            (
                format!("Deployment of {} failed", summary.service),
                self.failure_color,
            )
        };

        let mut fields = Vec::new();
        if let Some(step) = summary.failed_step {
            fields.push(json!({ "name": "Failed step", "value": step.to_string(), "inline": true }));
        }
        if let Some(state) = &summary.final_state {
            fields.push(json!({ "name": "Service state", "value": state.to_string(), "inline": true }));
        }

        let mut embed = json!({
            "title": title,
            "description": summary.message,
            // Discord rejects colours wider than 24 bits
            "color": color & 0x00FF_FFFF,
            "timestamp": summary.finished_at.to_rfc3339(),
        });
        if !fields.is_empty() {
            embed["fields"] = serde_json::Value::Array(fields);
        }

        let mut payload = json!({ "embeds": [embed] });
        if let Some(username) = self.username.as_ref().filter(|u| !u.trim().is_empty()) {
            payload["username"] = json!(username);
        }
        payload
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, summary: &DeploySummary) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }

        self.client
            .post(&self.url)
            .json(&self.payload(summary))
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!("📨 Deployment notification sent");
        Ok(())
    }
}

/// Accepts `#RRGGBB`, `0xRRGGBB`, `RRGGBB` or a plain decimal.
pub fn parse_discord_color(s: &str) -> Option<u32> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    if t.chars().all(|c| c.is_ascii_digit()) {
        return t.parse::<u32>().ok();
    }

    let t = t.strip_prefix('#').unwrap_or(t);
    let t = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);

    u32::from_str_radix(t, 16).ok()
}
