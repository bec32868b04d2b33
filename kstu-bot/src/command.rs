use time::Weekday;

use kstu_schedule::day::{RussianWeekday, WORK_DAYS};

pub const CURRENT_WEEK: &str = "Расписание на текущую неделю";
pub const NEXT_WEEK: &str = "Расписание на следующую неделю";

/// Everything the bot reacts to; any other text ends up as [`Command::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
  Start,
  Week,
  Kstu,
  Help,
  Day(Weekday),
  CurrentWeek,
  NextWeek,
  /// A slash command addressed to another bot of a group chat, left unanswered.
  ForOtherBot,
  Unknown,
}

impl Command {
  /// `bot_username` is compared with the `@suffix` of slash commands; without it every
  /// suffix is accepted.
  pub fn parse(text: &str, bot_username: Option<&str>) -> Self {
    // only the raw text counts as a command, the first token is taken whole
    if text.starts_with('/') {
      let token = text.split_whitespace().next().unwrap_or_default();
      let (name, addressee) = match token[1..].split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (&token[1..], None),
      };

      if let (Some(addressee), Some(username)) = (addressee, bot_username) {
        if !addressee.eq_ignore_ascii_case(username.trim_start_matches('@')) {
          return Self::ForOtherBot;
        }
      }

      return match name {
        "start" => Self::Start,
        "week" => Self::Week,
        "kstu" => Self::Kstu,
        "help" => Self::Help,
        _ => Self::Unknown,
      };
    }

    match text.trim() {
      CURRENT_WEEK => Self::CurrentWeek,
      NEXT_WEEK => Self::NextWeek,
      text => match Weekday::from_russian(text) {
        Some(day) if WORK_DAYS.contains(&day) => Self::Day(day),
        _ => Self::Unknown,
      },
    }
  }
}
