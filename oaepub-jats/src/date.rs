//! Dates from `<date>` and `<pub-date>` elements.
use jiff::{civil::Date, fmt::strtime};

use crate::tree::Element;

/// How much of a date the source element gave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
  Year,
  Month,
  Day,
}

/// A possibly partial publication or history date.
///
/// Missing parts are stored as the first month or day; [`Self::precision`]
/// records which parts are real.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDate {
  /// `date-type` or `pub-type` of the source element.
  pub kind:      Option<String>,
  pub date:      Date,
  pub precision: DatePrecision,
  pub season:    Option<String>,
}

impl ArticleDate {
  /// Read a date element.
  ///
  /// Returns `None` when it has no usable year, or when its parts do not
  /// form a calendar date (e.g. 31 February).
  #[must_use]
  pub fn from_element(element: &Element) -> Option<Self> {
    let kind = element
      .attr("date-type")
      .or_else(|| element.attr("pub-type"))
      .map(str::to_string);
    let year: i16 = element.child_text("year")?.parse().ok()?;
    let season = element.child_text("season");

    let month = season
      .is_none()
      .then(|| element.child_text("month").and_then(|m| parse_month(&m)))
      .flatten();
    let day = month
      .and_then(|_| element.child_text("day"))
      .and_then(|d| d.parse::<i8>().ok());

    let (date, precision) = match (month, day) {
      (Some(month), Some(day)) => {
        match Date::new(year, month, day) {
          Ok(date) => (date, DatePrecision::Day),
          Err(err) => {
            log::warn!("Ignoring impossible date {year}-{month}-{day}: {err}");
            return None;
          },
        }
      },
      (Some(month), None) => {
        (Date::new(year, month, 1).ok()?, DatePrecision::Month)
      },
      (None, _) => (Date::new(year, 1, 1).ok()?, DatePrecision::Year),
    };

    Some(Self {
      kind,
      date,
      precision,
      season,
    })
  }

  /// Human-readable rendering, e.g. "January 5, 2011".
  #[must_use]
  pub fn nice_string(&self) -> String {
    match (&self.season, self.precision) {
      (Some(season), _) => format!("{season} {}", self.date.year()),
      (None, DatePrecision::Day) => {
        self.date.strftime("%B %-d, %Y").to_string()
      },
      (None, DatePrecision::Month) => self.date.strftime("%B %Y").to_string(),
      (None, DatePrecision::Year) => self.date.strftime("%Y").to_string(),
    }
  }

  /// Sortable rendering, e.g. "2011-01-05", truncated to the known parts.
  #[must_use]
  pub fn date_string(&self) -> String {
    let format = match self.precision {
      DatePrecision::Day => "%Y-%m-%d",
      DatePrecision::Month => "%Y-%m",
      DatePrecision::Year => "%Y",
    };
    self.date.strftime(format).to_string()
  }
}

/// Month number or English month name.
fn parse_month(value: &str) -> Option<i8> {
  value
    .parse::<i8>()
    .ok()
    .or_else(|| strtime::parse("%B", value).ok()?.month())
    .filter(|month| (1..=12).contains(month))
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  fn date(year: &str, month: Option<&str>, day: Option<&str>) -> Element {
    let mut element = Element::new("pub-date").with_attr("pub-type", "epub");
    if let Some(day) = day {
      element.push(Element::new("day").with_text(day));
    }
    if let Some(month) = month {
      element.push(Element::new("month").with_text(month));
    }
    element.push(Element::new("year").with_text(year));
    element
  }

  #[test]
  fn test_full_date() {
    let parsed =
      ArticleDate::from_element(&date("2011", Some("1"), Some("5"))).unwrap();
    assert_eq!(parsed.kind.as_deref(), Some("epub"));
    assert_eq!(parsed.precision, DatePrecision::Day);
    assert_eq!(parsed.nice_string(), "January 5, 2011");
    assert_eq!(parsed.date_string(), "2011-01-05");
  }

  #[test]
  fn test_named_month_without_day() {
    let parsed =
      ArticleDate::from_element(&date("2015", Some("August"), None)).unwrap();
    assert_eq!(parsed.nice_string(), "August 2015");
    assert_eq!(parsed.date_string(), "2015-08");
  }

  #[test]
  fn test_leap_day() {
    let parsed =
      ArticleDate::from_element(&date("2012", Some("2"), Some("29"))).unwrap();
    assert_eq!(parsed.nice_string(), "February 29, 2012");
  }

  #[test]
  fn test_impossible_dates_are_rejected() {
    assert!(
      ArticleDate::from_element(&date("2011", Some("2"), Some("31"))).is_none()
    );
    assert!(
      ArticleDate::from_element(&date("2011", Some("2"), Some("29"))).is_none()
    );
    assert!(
      ArticleDate::from_element(&date("2011", Some("4"), Some("0"))).is_none()
    );
  }

  #[test]
  fn test_out_of_range_month_keeps_year() {
    let parsed =
      ArticleDate::from_element(&date("2011", Some("13"), Some("1"))).unwrap();
    assert_eq!(parsed.precision, DatePrecision::Year);
    assert_eq!(parsed.date_string(), "2011");
  }

  #[test]
  fn test_season() {
    let element = Element::new("pub-date")
      .with_child(Element::new("season").with_text("Spring"))
      .with_child(Element::new("year").with_text("2009"));
    let parsed = ArticleDate::from_element(&element).unwrap();
    assert_eq!(parsed.nice_string(), "Spring 2009");
    assert_eq!(parsed.date_string(), "2009");
  }

  #[test]
  fn test_missing_year() {
    assert!(ArticleDate::from_element(&Element::new("date")).is_none());
  }
}
