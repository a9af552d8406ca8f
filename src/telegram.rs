use crate::scanner::{ArbitrageScanner, NotificationSink};
use crate::shared_types::ScanResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::env;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use url::Url;

const LONG_POLL_SECS: u64 = 30;

#[derive(Deserialize, Debug)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

#[derive(Deserialize, Debug)]
pub struct ChatMessage {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Deserialize, Debug)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize, Debug)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

/// Thin Bot API client. Scan reports go to the configured chat; command
/// replies go back to whichever chat issued the command.
pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let token = env::var("TELEGRAM_TOKEN").map_err(|_| "TELEGRAM_TOKEN not set")?;
        let chat_id = env::var("CHAT_ID").map_err(|_| "CHAT_ID not set")?;
        Ok(Self {
            http: reqwest::Client::new(),
            token,
            chat_id,
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "https://api.telegram.org/bot{}/{}",
            self.token, method
        ))
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let url = self.endpoint("sendMessage")?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("sendMessage returned {}", response.status()).into());
        }
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: i64,
    ) -> Result<Vec<Update>, Box<dyn std::error::Error + Send + Sync>> {
        let url = self.endpoint("getUpdates")?;
        let response: UpdatesResponse = self
            .http
            .get(url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", LONG_POLL_SECS.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err("getUpdates returned ok=false".into());
        }
        Ok(response.result)
    }
}

#[async_trait]
impl NotificationSink for TelegramClient {
    async fn publish_results(&self, results: &[ScanResult]) {
        let text = format_results(results);
        if let Err(e) = self.send_message(&self.chat_id, &text).await {
            warn!("result delivery failed: {}", e);
        }
    }

    async fn publish_no_opportunities(&self) {
        let text = "❌ No profitable routes this pass.";
        if let Err(e) = self.send_message(&self.chat_id, text).await {
            warn!("no-opportunity notice failed: {}", e);
        }
    }
}

/// HTML report for one pass, ranked best-first.
pub fn format_results(results: &[ScanResult]) -> String {
    let mut text = String::from("<b>📈 Top profitable routes:</b>\n\n");
    for (rank, result) in results.iter().enumerate() {
        text.push_str(&format!(
            "🟢 {}. {}\n   💰 Profit: {} {} | 📈 Spread: {}% | 💧 Liquidity: {} {}\n\n",
            rank + 1,
            result.route,
            result.profit.round_dp(2),
            result.route.stable(),
            result.profit_percent.round_dp(2),
            result.liquidity.round_dp(0),
            result.route.stable(),
        ));
    }
    text
}

/// Long-polls the Bot API and drives the scanner: `/start` and `/stop` are
/// the whole command surface; each reply is the scanner's status string.
pub async fn run_command_loop(client: &TelegramClient, scanner: &ArbitrageScanner) {
    let mut offset = 0i64;
    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {}", e);
                sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let message = match update.message {
                Some(message) => message,
                None => continue,
            };
            let text = match message.text.as_deref() {
                Some(text) => text.trim(),
                None => continue,
            };

            let status = match text {
                "/start" => scanner.start(),
                "/stop" => scanner.stop(),
                _ => continue,
            };
            info!("command {} -> {}", text, status);
            if let Err(e) = client
                .send_message(&message.chat.id.to_string(), status)
                .await
            {
                warn!("status reply failed: {}", e);
            }
        }
    }
}
