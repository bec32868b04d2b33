use std::time::Duration;

use anyhow::anyhow;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_URL: &str = "https://api.telegram.org";

pub struct Telegram {
  client: Client,
  base: Url,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
  pub text: String,
}

/// Custom keyboard replacing the system keyboard of the chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
  pub keyboard: Vec<Vec<KeyboardButton>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resize_keyboard: Option<bool>,
}

impl ReplyKeyboardMarkup {
  /// Lays the buttons out row by row, `row_width` buttons per row.
  pub fn from_labels(labels: &[&str], row_width: usize) -> Self {
    let keyboard = labels
      .chunks(row_width.max(1))
      .map(|row| {
        row
          .iter()
          .map(|label| KeyboardButton {
            text: label.to_string(),
          })
          .collect()
      })
      .collect();

    Self {
      keyboard,
      resize_keyboard: None,
    }
  }

  pub fn resized(mut self) -> Self {
    self.resize_keyboard = Some(true);
    self
  }
}

#[derive(Debug, Serialize)]
struct SendMessageData<'a> {
  chat_id: i64,
  text: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  reply_markup: Option<&'a ReplyKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesData {
  offset: Option<i64>,
  timeout: u64,
  allowed_updates: [&'static str; 1],
}

#[derive(Debug, Serialize)]
struct NoParameters {}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
  ok: bool,
  result: Option<T>,
  description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
  pub update_id: i64,
  pub message: Option<Message>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
  pub chat: Chat,
  pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
  pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
  pub id: i64,
  pub username: Option<String>,
}

impl Telegram {
  pub fn new(token: &str) -> anyhow::Result<Self> {
    Self::with_api_url(API_URL, token)
  }

  /// Talks to a self-hosted Bot API server instead of api.telegram.org.
  pub fn with_api_url(api_url: &str, token: &str) -> anyhow::Result<Self> {
    let raw = format!("{}/bot{}/", api_url.trim_end_matches('/'), token);
    let base = Url::parse(&raw)?;

    Ok(Self {
      client: Client::new(),
      base,
    })
  }

  pub async fn send_text(
    &self,
    chat_id: i64,
    text: &str,
    keyboard: Option<&ReplyKeyboardMarkup>,
  ) -> anyhow::Result<()> {
    // plain text, schedule separators are full of markdown characters
    let _: Message = self
      .call(
        "sendMessage",
        &SendMessageData {
          chat_id,
          text,
          reply_markup: keyboard,
        },
        None,
      )
      .await?;

    debug!("Sent {} characters to chat {}", text.chars().count(), chat_id);
    Ok(())
  }

  /// The bot account behind the token.
  pub async fn get_me(&self) -> anyhow::Result<User> {
    self.call("getMe", &NoParameters {}, None).await
  }

  /// Long polls for new messages, waiting at most `timeout` seconds on the server side.
  pub async fn get_updates(&self, offset: Option<i64>, timeout: u64) -> anyhow::Result<Vec<Update>> {
    self
      .call(
        "getUpdates",
        &GetUpdatesData {
          offset,
          timeout,
          allowed_updates: ["message"],
        },
        Some(Duration::from_secs(timeout + 10)),
      )
      .await
  }

  async fn call<B: Serialize, T: DeserializeOwned>(
    &self,
    method: &str,
    body: &B,
    timeout: Option<Duration>,
  ) -> anyhow::Result<T> {
    let mut request = self.client.post(self.base.join(method)?).json(body);

    if let Some(timeout) = timeout {
      request = request.timeout(timeout);
    }

    // error responses carry a description in the body, so the status code is checked last
    let response = request.send().await?;
    let status = response.status();
    let body = response.json::<ApiResponse<T>>().await;

    match body {
      Ok(ApiResponse {
        ok: true,
        result: Some(result),
        ..
      }) => Ok(result),
      Ok(ApiResponse { description, .. }) => Err(anyhow!(
        "Telegram {} failed ({}): {}",
        method,
        status,
        description.unwrap_or_else(|| "no description".to_string())
      )),
      Err(err) => Err(anyhow!("Telegram {} failed ({}): {}", method, status, err)),
    }
  }
}
