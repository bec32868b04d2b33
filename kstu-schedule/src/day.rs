use time::Weekday;

/// Days a timetable is published for, in display order.
pub const WORK_DAYS: [Weekday; 5] = [
  Weekday::Monday,
  Weekday::Tuesday,
  Weekday::Wednesday,
  Weekday::Thursday,
  Weekday::Friday,
];

/// Russian day names, as shown to students and stored in the `day` column.
pub trait RussianWeekday: Sized {
  fn russian_name(&self) -> &'static str;
  fn from_russian(name: &str) -> Option<Self>;
}

impl RussianWeekday for Weekday {
  fn russian_name(&self) -> &'static str {
    match self {
      Weekday::Monday => "Понедельник",
      Weekday::Tuesday => "Вторник",
      Weekday::Wednesday => "Среда",
      Weekday::Thursday => "Четверг",
      Weekday::Friday => "Пятница",
      Weekday::Saturday => "Суббота",
      Weekday::Sunday => "Воскресенье",
    }
  }

  /// Exact match only, no case folding.
  fn from_russian(name: &str) -> Option<Self> {
    match name {
      "Понедельник" => Some(Weekday::Monday),
      "Вторник" => Some(Weekday::Tuesday),
      "Среда" => Some(Weekday::Wednesday),
      "Четверг" => Some(Weekday::Thursday),
      "Пятница" => Some(Weekday::Friday),
      "Суббота" => Some(Weekday::Saturday),
      "Воскресенье" => Some(Weekday::Sunday),
      _ => None,
    }
  }
}
