use std::fmt::Display;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// UI language of a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// genitive, as used after a day number
const MONTHS_RU: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "ru" => Some(Self::Ru),
            _ => None,
        }
    }

    /// Title of the trailing action column.
    pub fn action_column_title(self) -> &'static str {
        match self {
            Self::En => "Delete",
            Self::Ru => "Удаление",
        }
    }

    pub fn delete_button(self) -> &'static str {
        match self {
            Self::En => "Delete",
            Self::Ru => "Удалить",
        }
    }

    pub fn add_button(self) -> &'static str {
        match self {
            Self::En => "Add new user",
            Self::Ru => "Добавить пользователя",
        }
    }

    pub fn loading(self) -> &'static str {
        match self {
            Self::En => "Loading…",
            Self::Ru => "Загрузка…",
        }
    }

    pub fn saving(self) -> &'static str {
        match self {
            Self::En => "Saving…",
            Self::Ru => "Сохранение…",
        }
    }

    pub fn empty(self) -> &'static str {
        match self {
            Self::En => "No records",
            Self::Ru => "Нет записей",
        }
    }

    pub fn load_failed(self) -> &'static str {
        match self {
            Self::En => "Something went wrong. Can't get data from backend.",
            Self::Ru => "Что-то пошло не так. Не удалось получить данные.",
        }
    }

    pub fn create_failed(self) -> &'static str {
        match self {
            Self::En => "Something went wrong! Can't add new user.",
            Self::Ru => "Что-то пошло не так! Не удалось добавить пользователя.",
        }
    }

    pub fn delete_failed(self) -> &'static str {
        match self {
            Self::En => "Something went wrong. Can't delete!",
            Self::Ru => "Что-то пошло не так. Не удалось удалить!",
        }
    }

    /// Placeholder shown in an empty editor input.
    pub fn placeholder(self, field: impl Display) -> String {
        format!("Enter {field}")
    }

    pub fn month_name(self, month0: u32) -> &'static str {
        let names = match self {
            Self::En => &MONTHS_EN,
            Self::Ru => &MONTHS_RU,
        };
        names.get(month0 as usize).copied().unwrap_or_default()
    }

    /// `"{day} {month} {year}"`, day without padding.
    pub fn format_date(self, date: NaiveDate) -> String {
        format!(
            "{} {} {}",
            date.day(),
            self.month_name(date.month0()),
            date.year()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn english_dates() {
        assert_eq!(Locale::En.format_date(date(2020, 1, 15)), "15 January 2020");
        assert_eq!(Locale::En.format_date(date(1999, 12, 1)), "1 December 1999");
    }

    #[test]
    fn russian_dates_use_genitive_months() {
        assert_eq!(Locale::Ru.format_date(date(2020, 1, 15)), "15 января 2020");
        assert_eq!(Locale::Ru.format_date(date(2001, 5, 9)), "9 мая 2001");
    }

    #[test]
    fn labels_per_locale() {
        assert_eq!(Locale::En.action_column_title(), "Delete");
        assert_eq!(Locale::Ru.action_column_title(), "Удаление");
        assert_eq!(Locale::Ru.delete_button(), "Удалить");
        assert_eq!(Locale::Ru.add_button(), "Добавить пользователя");
        assert_eq!(Locale::Ru.placeholder("name"), "Enter name");
    }

    #[test]
    fn parse_and_serde_agree() {
        assert_eq!(Locale::parse(" RU "), Some(Locale::Ru));
        assert_eq!(Locale::parse("de"), None);
        let parsed: Locale = serde_json::from_str("\"ru\"").expect("known locale");
        assert_eq!(parsed, Locale::Ru);
    }
}
