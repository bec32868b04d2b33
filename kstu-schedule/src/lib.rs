use anyhow::Context;
use time::Weekday;
use tracing::info;

use crate::day::{RussianWeekday, WORK_DAYS};
use crate::store::LessonStore;
use crate::timetable::Lesson;
use crate::week::{WeekSelector, WeekVariant, WeekVariantResolver};

pub mod day;
pub mod store;
pub mod timetable;
pub mod week;

/// Answers "which lessons take place on this day" against a [`LessonStore`].
pub struct ScheduleLookup<S> {
  store: S,
  resolver: WeekVariantResolver,
}

impl<S: LessonStore> ScheduleLookup<S> {
  pub fn new(store: S, resolver: WeekVariantResolver) -> Self {
    Self { store, resolver }
  }

  pub fn resolver(&self) -> &WeekVariantResolver {
    &self.resolver
  }

  /// Lessons of `day` in the selected week, ordered by start time. An empty day is not an error.
  pub async fn lookup(&self, day: Weekday, selector: WeekSelector) -> anyhow::Result<Vec<Lesson>> {
    self.fetch(day, self.resolver.resolve(selector)).await
  }

  /// Monday to Friday of the selected week; stops at the first failing day.
  pub async fn lookup_week(
    &self,
    selector: WeekSelector,
  ) -> anyhow::Result<Vec<(Weekday, Vec<Lesson>)>> {
    let variant = self.resolver.resolve(selector);
    let mut week = Vec::with_capacity(WORK_DAYS.len());

    for day in WORK_DAYS {
      week.push((day, self.fetch(day, variant).await?));
    }

    Ok(week)
  }

  async fn fetch(&self, day: Weekday, variant: WeekVariant) -> anyhow::Result<Vec<Lesson>> {
    info!("Looking up {} of the {} week", day, variant);

    let mut lessons = self
      .store
      .fetch_day(day.russian_name(), variant.as_str())
      .await
      .with_context(|| format!("Unable to look up lessons for {day}"))?;

    // the store is not trusted with the ordering
    lessons.sort_by_key(|lesson| lesson.start_time);

    Ok(lessons)
  }
}
