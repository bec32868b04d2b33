use std::fmt::{Display, Formatter};

use time::{Date, OffsetDateTime, UtcOffset};

/// One of the two alternating timetable configurations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeekVariant {
  Upper,
  Lower,
}

/// Which week a schedule request refers to, relative to today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeekSelector {
  Current,
  Next,
}

impl WeekVariant {
  /// Odd ISO weeks are upper weeks, even ISO weeks are lower weeks.
  pub fn for_date(date: Date) -> Self {
    if date.iso_week() % 2 == 1 {
      Self::Upper
    } else {
      Self::Lower
    }
  }

  pub fn opposite(self) -> Self {
    match self {
      Self::Upper => Self::Lower,
      Self::Lower => Self::Upper,
    }
  }

  /// Literal stored in the `week_type` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Upper => "upper",
      Self::Lower => "lower",
    }
  }

  pub fn russian_name(self) -> &'static str {
    match self {
      Self::Upper => "верхняя",
      Self::Lower => "нижняя",
    }
  }
}

impl Display for WeekVariant {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Derives the active week variant from the wall clock of the campus.
#[derive(Clone, Copy, Debug)]
pub struct WeekVariantResolver {
  offset: UtcOffset,
}

impl WeekVariantResolver {
  pub fn new(offset: UtcOffset) -> Self {
    Self { offset }
  }

  pub fn today(&self) -> Date {
    OffsetDateTime::now_utc().to_offset(self.offset).date()
  }

  pub fn current_variant(&self) -> WeekVariant {
    WeekVariant::for_date(self.today())
  }

  pub fn resolve(&self, selector: WeekSelector) -> WeekVariant {
    Self::variant_on(self.today(), selector)
  }

  pub fn variant_on(date: Date, selector: WeekSelector) -> WeekVariant {
    let current = WeekVariant::for_date(date);

    match selector {
      WeekSelector::Current => current,
      WeekSelector::Next => current.opposite(),
    }
  }
}

impl Default for WeekVariantResolver {
  fn default() -> Self {
    Self::new(UtcOffset::UTC)
  }
}
