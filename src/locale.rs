//! User-facing strings in the two languages the viewer ships with.

use crate::error::ValidationError;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

/// Labels for the statistics block.
pub struct StatsLabels {
    pub query: &'static str,
    pub technology: &'static str,
    pub total: &'static str,
    pub matching: &'static str,
}

impl Locale {
    pub fn validation_message(self, e: ValidationError) -> &'static str {
        match (self, e) {
            (Locale::En, ValidationError::MissingSearchText) => "no search query",
            (Locale::En, ValidationError::MissingTechnology) => "no technology specified",
            (Locale::En, ValidationError::CountOutOfRange) => "count may not exceed 100",
            (Locale::Ru, ValidationError::MissingSearchText) => "Нет поискового запроса",
            (Locale::Ru, ValidationError::MissingTechnology) => "Не указана технология",
            (Locale::Ru, ValidationError::CountOutOfRange) => "Количество не может превышать 100",
        }
    }

    pub fn loading(self) -> &'static str {
        match self {
            Locale::En => "Loading...",
            Locale::Ru => "Загрузка...",
        }
    }

    pub fn stats_labels(self) -> StatsLabels {
        match self {
            Locale::En => StatsLabels {
                query: "Query",
                technology: "technology",
                total: "Total vacancies analyzed",
                matching: "Matching your technology",
            },
            Locale::Ru => StatsLabels {
                query: "Запрос",
                technology: "технология",
                total: "Проанализировано всего вакансий",
                matching: "Из них связанных с вашей технологией",
            },
        }
    }
}
