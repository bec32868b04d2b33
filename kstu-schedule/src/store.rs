use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, warn};

use crate::timetable::Lesson;

/// Rows of one day under one week variant, plus the rows valid in both weeks.
const DAY_QUERY: &str = r#"
SELECT s.name AS subject, t.room_numb::text AS room, t.start_time, te.full_name AS teacher
FROM timetable t
JOIN subject s ON t.subject = s.name
LEFT JOIN teacher te ON t.teacher_id = te.id
WHERE t.day = $1 AND (t.week_type = $2 OR t.week_type = 'both')
ORDER BY t.start_time
"#;

/// Read access to the lesson tables.
#[async_trait]
pub trait LessonStore {
  /// `day` and `variant` are compared literally against the stored values.
  async fn fetch_day(&self, day: &str, variant: &str) -> anyhow::Result<Vec<Lesson>>;
}

/// Postgres backed store, opening one connection per request.
pub struct PostgresLessonStore {
  options: PgConnectOptions,
}

impl PostgresLessonStore {
  pub fn new(options: PgConnectOptions) -> Self {
    Self { options }
  }
}

#[async_trait]
impl LessonStore for PostgresLessonStore {
  async fn fetch_day(&self, day: &str, variant: &str) -> anyhow::Result<Vec<Lesson>> {
    let mut connection = PgConnection::connect_with(&self.options)
      .await
      .context("Unable to connect to lesson database")?;

    let result = sqlx::query_as::<_, Lesson>(DAY_QUERY)
      .bind(day)
      .bind(variant)
      .fetch_all(&mut connection)
      .await;

    // the connection is released on every path, the query result decides the outcome
    if let Err(err) = connection.close().await {
      warn!("Error closing lesson database connection: {}", err);
    }

    let lessons = result.with_context(|| format!("Unable to query lessons for {day} ({variant})"))?;
    debug!("Fetched {} lessons for {} ({})", lessons.len(), day, variant);

    Ok(lessons)
  }
}
