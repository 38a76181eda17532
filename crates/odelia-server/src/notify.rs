//! Notifications
//!
//! A "yes" or a finished date plan is announced by POSTing
//! `{to, subject, html}` to a mail webhook. Delivery failures are logged
//! and reported as `false`; they never fail the request that caused them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use odelia_engine::{iso_timestamp, Clock, DateSelectionSubmission};

use crate::config::NotifyConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// "She said yes". Returns whether the notification was delivered.
    async fn decision(&self, dodge_count: u32) -> bool;

    async fn date_selection(&self, selection: &DateSelectionSubmission) -> bool;
}

/// Webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub fn yes_subject(dodge_count: u32) -> String {
    if dodge_count > 0 {
        format!("She said YES! (after {dodge_count} NO attempts)")
    } else {
        "She said YES!".to_string()
    }
}

pub fn date_selection_subject(selection: &DateSelectionSubmission) -> String {
    format!(
        "Odelia planned a date! Top picks: {} + {}",
        selection.top_restaurant(),
        selection.top_activity()
    )
}

pub fn yes_notification(to: &str, dodge_count: u32, at: DateTime<Utc>) -> Notification {
    let dodges = match dodge_count {
        0 => String::new(),
        1 => "<p>(After clicking NO 1 time)</p>".to_string(),
        n => format!("<p>(After clicking NO {n} times)</p>"),
    };
    Notification {
        to: to.to_string(),
        subject: yes_subject(dodge_count),
        html: format!(
            "<div style=\"font-family: Arial, sans-serif; text-align: center;\">\
             <h1>She said YES!</h1>\
             <p>Odelia clicked YES to be your Valentine!</p>\
             {dodges}\
             <p>{}</p>\
             </div>",
            iso_timestamp(at)
        ),
    }
}

pub fn date_selection_notification(
    to: &str,
    selection: &DateSelectionSubmission,
    at: DateTime<Utc>,
) -> Notification {
    let ranked = |items: &[String]| -> String {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("<p><strong>{}</strong> {}</p>", rank_label(i), escape(item)))
            .collect()
    };
    let meals = selection
        .meals
        .as_ref()
        .map(|m| {
            format!(
                "<hr /><p>Stay at Home Meals</p>\
                 <p>Breakfast: <strong>{}</strong></p>\
                 <p>Lunch: <strong>{}</strong></p>\
                 <p>Dinner: <strong>{}</strong></p>",
                escape(&m.breakfast),
                escape(&m.lunch),
                escape(&m.dinner)
            )
        })
        .unwrap_or_default();
    Notification {
        to: to.to_string(),
        subject: date_selection_subject(selection),
        html: format!(
            "<div style=\"font-family: Arial, sans-serif; text-align: center;\">\
             <h1>Odelia planned a date!</h1>\
             <p>Restaurant Ranking</p><div>{}</div>\
             <p>Activity Ranking</p><div>{}</div>\
             {meals}\
             <p>{}</p>\
             </div>",
            ranked(&selection.restaurants),
            ranked(&selection.activities),
            iso_timestamp(at)
        ),
    }
}

/// `0 -> "1st"`, `1 -> "2nd"`, ...
fn rank_label(index: usize) -> String {
    let n = index + 1;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Sends notifications through an HTTP mail webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    to: String,
    clock: Arc<dyn Clock>,
}

impl WebhookNotifier {
    pub fn new(
        url: impl Into<String>,
        to: impl Into<String>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.into(),
            to: to.into(),
            clock,
        })
    }

    async fn send(&self, notification: Notification) -> bool {
        let result = self
            .client
            .post(&self.url)
            .json(&notification)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());
        match result {
            Ok(_) => {
                info!(subject = %notification.subject, "Notification sent");
                true
            }
            Err(e) => {
                warn!(subject = %notification.subject, error = %e, "Failed to send notification");
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn decision(&self, dodge_count: u32) -> bool {
        self.send(yes_notification(&self.to, dodge_count, self.clock.now()))
            .await
    }

    async fn date_selection(&self, selection: &DateSelectionSubmission) -> bool {
        self.send(date_selection_notification(&self.to, selection, self.clock.now()))
            .await
    }
}

/// Used when no webhook is configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn decision(&self, _: u32) -> bool {
        info!("Notifications not configured, skipping");
        false
    }

    async fn date_selection(&self, _: &DateSelectionSubmission) -> bool {
        info!("Notifications not configured, skipping");
        false
    }
}

/// Pick the notifier for `config`.
pub fn from_config(config: &NotifyConfig, clock: Arc<dyn Clock>) -> Arc<dyn Notifier> {
    match (&config.webhook_url, &config.to) {
        (Some(url), Some(to)) if config.is_configured() => {
            match WebhookNotifier::new(url, to, Duration::from_secs(config.timeout_secs), clock) {
                Ok(notifier) => return Arc::new(notifier),
                Err(e) => warn!(error = %e, "Could not build webhook client, notifications disabled"),
            }
        }
        _ => info!("Notifications not configured"),
    }
    Arc::new(DisabledNotifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odelia_engine::{FixedClock, Meals};

    fn selection(meals: Option<Meals>) -> DateSelectionSubmission {
        DateSelectionSubmission {
            restaurants: vec!["sushi".into(), "italian".into(), "thai".into()],
            activities: vec!["picnic".into(), "movie".into(), "museum".into()],
            meals,
        }
    }

    #[test]
    fn yes_subject_mentions_dodges() {
        assert_eq!(yes_subject(0), "She said YES!");
        assert_eq!(yes_subject(4), "She said YES! (after 4 NO attempts)");
    }

    #[test]
    fn yes_body_pluralizes_clicks() {
        let at = DateTime::from_timestamp_millis(0).unwrap();
        assert!(yes_notification("a@b", 1, at).html.contains("NO 1 time)"));
        assert!(yes_notification("a@b", 3, at).html.contains("NO 3 times)"));
        assert!(!yes_notification("a@b", 0, at).html.contains("After clicking"));
    }

    #[test]
    fn date_subject_names_top_picks() {
        assert_eq!(
            date_selection_subject(&selection(None)),
            "Odelia planned a date! Top picks: sushi + picnic"
        );
    }

    #[test]
    fn date_body_ranks_and_escapes() {
        let at = DateTime::from_timestamp_millis(0).unwrap();
        let meals = Meals {
            breakfast: "pancakes & <jam>".into(),
            lunch: String::new(),
            dinner: "ramen".into(),
        };
        let n = date_selection_notification("me@example.com", &selection(Some(meals)), at);
        assert_eq!(n.to, "me@example.com");
        assert!(n.html.contains("<strong>1st</strong> sushi"));
        assert!(n.html.contains("<strong>3rd</strong> museum"));
        assert!(n.html.contains("pancakes &amp; &lt;jam&gt;"));
        assert!(n.html.contains("Stay at Home Meals"));
    }

    #[test]
    fn rank_labels() {
        let labels: Vec<_> = (0..5).map(rank_label).collect();
        assert_eq!(labels, ["1st", "2nd", "3rd", "4th", "5th"]);
        assert_eq!(rank_label(10), "11th");
        assert_eq!(rank_label(20), "21st");
    }

    #[tokio::test]
    async fn disabled_notifier_reports_not_sent() {
        assert!(!DisabledNotifier.decision(2).await);
        assert!(!DisabledNotifier.date_selection(&selection(None)).await);
    }

    #[tokio::test]
    async fn unreachable_webhook_reports_not_sent() {
        let notifier = WebhookNotifier::new(
            "http://127.0.0.1:9/send",
            "me@example.com",
            Duration::from_millis(500),
            Arc::new(FixedClock::from_millis(0)),
        )
        .unwrap();
        assert!(!notifier.decision(0).await);
    }
}
