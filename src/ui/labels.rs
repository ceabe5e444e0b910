use crate::tenure::Locale;

/// Fixed UI strings for one locale.
#[derive(Debug)]
pub struct Labels {
  pub profile: &'static str,
  pub skills: &'static str,
  pub projects: &'static str,
  pub history: &'static str,
  pub start: &'static str,
  pub company: &'static str,
  pub position: &'static str,
  pub tenure: &'static str,
  pub work: &'static str,
  pub achievements: &'static str,
  pub certificate: &'static str,
  pub notes: &'static str,
  pub excluded: &'static str,
  pub no_comment: &'static str,
  pub show_all: &'static str,
  pub loading: &'static str,
  pub load_failed: &'static str,
  pub retry_hint: &'static str,
}

const RU: Labels = Labels {
  profile: "Профиль",
  skills: "Экспертиза и опыт",
  projects: "Демо проекты",
  history: "История",
  start: "Старт",
  company: "Компания",
  position: "Позиция",
  tenure: "Стаж",
  work: "Работа",
  achievements: "Достижения",
  certificate: "Сертификат",
  notes: "Дополнительная информация",
  excluded: "Без веса",
  no_comment: "нет комментария",
  show_all: "e: посмотреть всю историю",
  loading: "Загрузка...",
  load_failed: "Не удалось загрузить данные",
  retry_hint: "Нажмите r, чтобы повторить.",
};

const EN: Labels = Labels {
  profile: "Profile",
  skills: "Expertise",
  projects: "Demo projects",
  history: "History",
  start: "Start",
  company: "Company",
  position: "Position",
  tenure: "Tenure",
  work: "Work",
  achievements: "Achievements",
  certificate: "Certificate",
  notes: "Additional information",
  excluded: "No weight",
  no_comment: "no comment",
  show_all: "e: show full history",
  loading: "Loading...",
  load_failed: "Failed to load the dashboard",
  retry_hint: "Press r to retry.",
};

pub fn labels(locale: Locale) -> &'static Labels {
  match locale {
    Locale::Ru => &RU,
    Locale::En => &EN,
  }
}
