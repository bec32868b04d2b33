use async_trait::async_trait;

use crate::telegram::{ReplyKeyboardMarkup, Telegram};

pub mod telegram;

/// Delivers a reply to a chat.
#[async_trait]
pub trait Messenger {
  async fn send(
    &self,
    chat_id: i64,
    text: &str,
    keyboard: &ReplyKeyboardMarkup,
  ) -> anyhow::Result<()>;
}

#[async_trait]
impl Messenger for Telegram {
  async fn send(
    &self,
    chat_id: i64,
    text: &str,
    keyboard: &ReplyKeyboardMarkup,
  ) -> anyhow::Result<()> {
    self.send_text(chat_id, text, Some(keyboard)).await
  }
}

#[async_trait]
impl<T: Messenger + Sync + ?Sized> Messenger for &T {
  async fn send(
    &self,
    chat_id: i64,
    text: &str,
    keyboard: &ReplyKeyboardMarkup,
  ) -> anyhow::Result<()> {
    (**self).send(chat_id, text, keyboard).await
  }
}
