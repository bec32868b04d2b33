use time::Weekday;
use tracing::info;

use kstu_notify::telegram::ReplyKeyboardMarkup;
use kstu_notify::Messenger;
use kstu_schedule::day::{RussianWeekday, WORK_DAYS};
use kstu_schedule::store::LessonStore;
use kstu_schedule::timetable::format_schedule;
use kstu_schedule::week::WeekSelector;
use kstu_schedule::ScheduleLookup;

use crate::command::{Command, CURRENT_WEEK, NEXT_WEEK};

pub const GREETING: &str = "Здравствуйте! Я бот с расписанием занятий. Чем могу помочь?";
pub const KSTU_LINK: &str = "Официальный сайт КНИТУ: https://www.kstu.ru/";
pub const FALLBACK: &str = "Извините, я Вас не понял";
pub const HELP: &str = "Я бот с расписанием занятий. Вот что я умею:

Основные команды:
/start - начать работу с ботом
/week - узнать текущую неделю (верхняя/нижняя)
/kstu - получить ссылку на сайт КНИТУ
/help - показать эту справку

Вы можете нажимать на кнопки ниже, чтобы получить расписание на нужный день или неделю.";

/// The five day buttons followed by both week buttons, two per row.
pub fn main_keyboard() -> ReplyKeyboardMarkup {
  let mut labels = WORK_DAYS
    .iter()
    .map(RussianWeekday::russian_name)
    .collect::<Vec<&str>>();
  labels.extend([CURRENT_WEEK, NEXT_WEEK]);

  ReplyKeyboardMarkup::from_labels(&labels, 2).resized()
}

/// Answers one inbound text message at a time.
pub struct Handler<S, M> {
  lookup: ScheduleLookup<S>,
  messenger: M,
  keyboard: ReplyKeyboardMarkup,
  bot_username: Option<String>,
}

impl<S: LessonStore, M: Messenger> Handler<S, M> {
  pub fn new(lookup: ScheduleLookup<S>, messenger: M) -> Self {
    Self {
      lookup,
      messenger,
      keyboard: main_keyboard(),
      bot_username: None,
    }
  }

  /// Commands addressed to any other `@username` are left unanswered.
  pub fn with_bot_username(mut self, username: String) -> Self {
    self.bot_username = Some(username);
    self
  }

  /// Replies to `text` sent in `chat_id`. Storage failures are returned without any reply.
  pub async fn handle(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
    let command = Command::parse(text, self.bot_username.as_deref());
    info!("Chat {} requested {:?}", chat_id, command);

    match command {
      Command::Start => self.reply(chat_id, GREETING).await,
      Command::Week => {
        let variant = self.lookup.resolver().current_variant();
        let text = format!("Сейчас {} неделя", variant.russian_name());
        self.reply(chat_id, &text).await
      }
      Command::Kstu => self.reply(chat_id, KSTU_LINK).await,
      Command::Help => self.reply(chat_id, HELP).await,
      Command::Day(day) => self.send_day(chat_id, day).await,
      Command::CurrentWeek => self.send_week(chat_id, WeekSelector::Current).await,
      Command::NextWeek => self.send_week(chat_id, WeekSelector::Next).await,
      Command::ForOtherBot => Ok(()),
      Command::Unknown => self.reply(chat_id, FALLBACK).await,
    }
  }

  async fn send_day(&self, chat_id: i64, day: Weekday) -> anyhow::Result<()> {
    let lessons = self.lookup.lookup(day, WeekSelector::Current).await?;
    let text = format_schedule(day.russian_name(), &lessons);

    self.reply(chat_id, &text).await
  }

  /// One message per day; nothing is sent if any day cannot be looked up.
  async fn send_week(&self, chat_id: i64, selector: WeekSelector) -> anyhow::Result<()> {
    for (day, lessons) in self.lookup.lookup_week(selector).await? {
      let text = format_schedule(day.russian_name(), &lessons);
      self.reply(chat_id, &text).await?;
    }

    Ok(())
  }

  async fn reply(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
    self.messenger.send(chat_id, text, &self.keyboard).await
  }
}

#[cfg(test)]
mod test {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  use anyhow::anyhow;
  use async_trait::async_trait;
  use time::macros::time;

  use kstu_schedule::timetable::Lesson;
  use kstu_schedule::week::WeekVariantResolver;

  use super::*;

  #[derive(Default)]
  struct CountingStore {
    calls: Arc<AtomicUsize>,
    fail: bool,
  }

  #[async_trait]
  impl LessonStore for CountingStore {
    async fn fetch_day(&self, day: &str, _variant: &str) -> anyhow::Result<Vec<Lesson>> {
      self.calls.fetch_add(1, Ordering::SeqCst);

      if self.fail {
        return Err(anyhow!("connection refused"));
      }

      Ok(match day {
        "Понедельник" => vec![
          Lesson::new("Физика", "Б-101", time!(9:45), Some("Кузнецова Е. В.")),
          Lesson::new("Математика", "А-204", time!(8:00), Some("Сидоров П. П.")),
        ],
        _ => Vec::new(),
      })
    }
  }

  #[derive(Default)]
  struct Outbox {
    sent: Mutex<Vec<(i64, String)>>,
  }

  #[async_trait]
  impl Messenger for Outbox {
    async fn send(
      &self,
      chat_id: i64,
      text: &str,
      keyboard: &ReplyKeyboardMarkup,
    ) -> anyhow::Result<()> {
      assert_eq!(keyboard, &main_keyboard());
      self.sent.lock().unwrap().push((chat_id, text.to_string()));
      Ok(())
    }
  }

  impl Outbox {
    fn texts(&self) -> Vec<String> {
      self
        .sent
        .lock()
        .unwrap()
        .iter()
        .map(|(_, text)| text.clone())
        .collect()
    }
  }

  /// The handler together with the number of store calls it makes.
  fn handler(store: CountingStore) -> (Handler<CountingStore, Outbox>, Arc<AtomicUsize>) {
    let calls = store.calls.clone();
    let handler = Handler::new(
      ScheduleLookup::new(store, WeekVariantResolver::default()),
      Outbox::default(),
    )
    .with_bot_username("kstu_timetable_bot".to_string());

    (handler, calls)
  }

  #[test]
  fn keyboard_layout() {
    let keyboard = main_keyboard();
    let rows = keyboard
      .keyboard
      .iter()
      .map(|row| row.iter().map(|button| button.text.as_str()).collect::<Vec<_>>())
      .collect::<Vec<_>>();

    assert_eq!(
      rows,
      vec![
        vec!["Понедельник", "Вторник"],
        vec!["Среда", "Четверг"],
        vec!["Пятница", CURRENT_WEEK],
        vec![NEXT_WEEK],
      ]
    );
    assert_eq!(keyboard.resize_keyboard, Some(true));
  }

  #[tokio::test]
  async fn saturday_gets_fallback_without_lookup() -> anyhow::Result<()> {
    let (handler, calls) = handler(CountingStore::default());

    handler.handle(7, "Суббота").await?;

    assert_eq!(
      handler.messenger.sent.lock().unwrap().as_slice(),
      [(7, FALLBACK.to_string())]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
  }

  #[tokio::test]
  async fn static_commands() -> anyhow::Result<()> {
    let (handler, calls) = handler(CountingStore::default());

    handler.handle(1, "/start").await?;
    handler.handle(1, "/kstu").await?;
    handler.handle(1, "/help").await?;
    handler.handle(1, "как дела?").await?;

    assert_eq!(handler.messenger.texts(), [GREETING, KSTU_LINK, HELP, FALLBACK]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
  }

  #[tokio::test]
  async fn week_command_names_current_variant() -> anyhow::Result<()> {
    let (handler, _) = handler(CountingStore::default());

    handler.handle(1, "/week").await?;

    let variant = WeekVariantResolver::default().current_variant();
    assert_eq!(
      handler.messenger.texts(),
      [format!("Сейчас {} неделя", variant.russian_name())]
    );
    Ok(())
  }

  #[tokio::test]
  async fn day_button_sends_formatted_schedule() -> anyhow::Result<()> {
    let (handler, calls) = handler(CountingStore::default());

    handler.handle(3, "Понедельник").await?;
    handler.handle(3, "Среда").await?;

    assert_eq!(
      handler.messenger.texts(),
      [
        "Понедельник\n___________\n\
         Математика | А-204 | 08:00 | Сидоров П. П.\n\
         Физика | Б-101 | 09:45 | Кузнецова Е. В.\n\
         ___________",
        "Среда\n___________\nЗанятий нет\n___________",
      ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
  }

  #[tokio::test]
  async fn week_buttons_send_five_days() -> anyhow::Result<()> {
    let (handler, calls) = handler(CountingStore::default());

    handler.handle(3, CURRENT_WEEK).await?;
    handler.handle(3, NEXT_WEEK).await?;

    let headers = handler
      .messenger
      .texts()
      .iter()
      .map(|text| text.lines().next().unwrap_or_default().to_string())
      .collect::<Vec<_>>();
    let days = ["Понедельник", "Вторник", "Среда", "Четверг", "Пятница"];

    assert_eq!(headers, [days, days].concat());
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    Ok(())
  }

  #[tokio::test]
  async fn storage_failure_is_returned_without_reply() {
    let (handler, _) = handler(CountingStore {
      fail: true,
      ..Default::default()
    });

    assert!(handler.handle(3, "Вторник").await.is_err());
    assert!(handler.handle(3, NEXT_WEEK).await.is_err());
    assert!(handler.messenger.texts().is_empty());
  }

  #[tokio::test]
  async fn malformed_commands_get_fallback() -> anyhow::Result<()> {
    let (handler, calls) = handler(CountingStore::default());

    handler.handle(1, "/ start").await?;
    handler.handle(1, " /help").await?;

    assert_eq!(handler.messenger.texts(), [FALLBACK, FALLBACK]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
  }

  #[tokio::test]
  async fn commands_for_other_bots_stay_unanswered() -> anyhow::Result<()> {
    let (handler, _) = handler(CountingStore::default());

    handler.handle(1, "/start@some_other_bot").await?;
    handler.handle(1, "/help@kstu_timetable_bot").await?;

    assert_eq!(handler.messenger.texts(), [HELP]);
    Ok(())
  }
}
