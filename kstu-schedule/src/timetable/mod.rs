use time::Time;

/// Line drawn above and below every day block.
pub const SEPARATOR: &str = "___________";
pub const NO_LESSONS: &str = "Занятий нет";

/// One row of the `timetable` table, joined with its subject and teacher.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Lesson {
  pub subject: String,
  pub room: String,
  pub start_time: Time,
  pub teacher: Option<String>,
}

impl Lesson {
  pub fn new(subject: &str, room: &str, start_time: Time, teacher: Option<&str>) -> Self {
    Self {
      subject: subject.to_string(),
      room: room.to_string(),
      start_time,
      teacher: teacher.map(str::to_string),
    }
  }

  /// `subject | room | HH:MM | teacher`, the teacher column is left out when unknown.
  pub fn line(&self) -> String {
    let mut line = format!(
      "{} | {} | {:0>2}:{:0>2}",
      self.subject,
      self.room,
      self.start_time.hour(),
      self.start_time.minute()
    );

    if let Some(teacher) = &self.teacher {
      line.push_str(" | ");
      line.push_str(teacher);
    }

    line
  }
}

/// Renders the message sent for a single day.
pub fn format_schedule(day: &str, lessons: &[Lesson]) -> String {
  let mut text = format!("{day}\n{SEPARATOR}\n");

  if lessons.is_empty() {
    text.push_str(NO_LESSONS);
    text.push('\n');
  }

  for lesson in lessons {
    text.push_str(&lesson.line());
    text.push('\n');
  }

  text.push_str(SEPARATOR);
  text
}
