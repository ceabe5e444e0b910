//! Human-readable "N years M months" strings for day counts.

use serde::Deserialize;

pub const DAYS_PER_YEAR: i64 = 365;
pub const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  #[default]
  Ru,
  En,
}

impl Locale {
  pub fn rules(self) -> &'static dyn PluralRules {
    match self {
      Locale::Ru => &Russian,
      Locale::En => &English,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
  Year,
  Month,
}

/// Grammatical number a count selects. Languages without a "few" form never return it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralForm {
  One,
  Few,
  Many,
}

impl PluralForm {
  fn index(self) -> usize {
    match self {
      PluralForm::One => 0,
      PluralForm::Few => 1,
      PluralForm::Many => 2,
    }
  }
}

pub trait PluralRules: Send + Sync {
  fn form(&self, n: i64) -> PluralForm;

  fn word(&self, unit: Unit, form: PluralForm) -> &'static str;

  fn count(&self, n: i64, unit: Unit) -> String {
    format!("{} {}", n, self.word(unit, self.form(n)))
  }
}

struct Russian;

/// Indexed by [unit][form]
const RU_WORDS: [[&str; 3]; 2] = [["год", "года", "лет"], ["месяц", "месяца", "месяцев"]];

impl PluralRules for Russian {
  fn form(&self, n: i64) -> PluralForm {
    let n = n.abs();
    if (11..=14).contains(&(n % 100)) {
      return PluralForm::Many;
    }
    match n % 10 {
      1 => PluralForm::One,
      2..=4 => PluralForm::Few,
      _ => PluralForm::Many,
    }
  }

  fn word(&self, unit: Unit, form: PluralForm) -> &'static str {
    RU_WORDS[unit_index(unit)][form.index()]
  }
}

struct English;

const EN_WORDS: [[&str; 3]; 2] = [["year", "years", "years"], ["month", "months", "months"]];

impl PluralRules for English {
  fn form(&self, n: i64) -> PluralForm {
    if n == 1 {
      PluralForm::One
    } else {
      PluralForm::Many
    }
  }

  fn word(&self, unit: Unit, form: PluralForm) -> &'static str {
    EN_WORDS[unit_index(unit)][form.index()]
  }
}

fn unit_index(unit: Unit) -> usize {
  match unit {
    Unit::Year => 0,
    Unit::Month => 1,
  }
}

/// Whole years and leftover 30-day months. `None` for negative spans.
pub fn split_tenure(days: i64) -> Option<(i64, i64)> {
  if days < 0 {
    return None;
  }
  Some((days / DAYS_PER_YEAR, (days % DAYS_PER_YEAR) / DAYS_PER_MONTH))
}

/// Zero parts are left out, so spans under a month format as "".
pub fn format_tenure(days: i64, locale: Locale) -> String {
  let Some((years, months)) = split_tenure(days) else {
    return String::new();
  };
  let rules = locale.rules();

  let mut parts = Vec::with_capacity(2);
  if years > 0 {
    parts.push(rules.count(years, Unit::Year));
  }
  if months > 0 {
    parts.push(rules.count(months, Unit::Month));
  }
  parts.join(" ")
}
