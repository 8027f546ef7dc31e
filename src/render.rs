//! The two display areas and how outcomes are painted into them.

use crate::error::DispatchError;
use crate::locale::Locale;
use crate::model::{ResultView, Stats, Vacancy};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultsArea {
    #[default]
    Empty,
    Loading,
    Error(String),
    Listing {
        header: String,
        vacancies: Vec<Vacancy>,
    },
}

/// Statistics area (as lines) plus the results area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Screen {
    pub stats: Vec<String>,
    pub results: ResultsArea,
}

pub fn stats_lines(title: &str, stats: &Stats, locale: Locale) -> Vec<String> {
    let l = locale.stats_labels();
    vec![
        format!("{}: {} ({}: {})", l.query, title, l.technology, stats.technology),
        format!("{}: {}", l.total, stats.total_vacancies),
        format!(
            "{}: {} ({}%)",
            l.matching, stats.tech_vacancies, stats.tech_percentage
        ),
    ]
}

pub fn vacancy_lines(v: &Vacancy) -> Vec<String> {
    vec![
        v.name.clone(),
        format!("Company: {}", v.employer.name),
        format!("Location: {}", v.area.name),
        format!("Salary: {}", v.salary_text()),
        format!("View Vacancy: {}", v.alternate_url),
    ]
}

impl Screen {
    /// Stats cleared, placeholder in results.
    pub fn show_loading(&mut self) {
        self.stats.clear();
        self.results = ResultsArea::Loading;
    }

    /// Paint a finished action. Errors overwrite the results area; only
    /// backend errors also clear the stats area.
    pub fn apply(&mut self, outcome: &Result<ResultView, DispatchError>, locale: Locale) {
        match outcome {
            Ok(view) => {
                self.stats = stats_lines(&view.title, &view.stats, locale);
                self.results = ResultsArea::Listing {
                    header: format!("resultID = {}", view.result_id),
                    vacancies: view.vacancies.clone(),
                };
            }
            Err(e) => {
                if e.clears_stats() {
                    self.stats.clear();
                }
                self.results = ResultsArea::Error(e.display_message(locale));
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.results, ResultsArea::Error(_))
    }

    pub fn results_lines(&self, locale: Locale) -> Vec<String> {
        match &self.results {
            ResultsArea::Empty => Vec::new(),
            ResultsArea::Loading => vec![locale.loading().to_string()],
            ResultsArea::Error(msg) => vec![msg.clone()],
            ResultsArea::Listing { header, vacancies } => {
                let mut lines = vec![header.clone()];
                for v in vacancies {
                    lines.push(String::new());
                    lines.extend(vacancy_lines(v));
                }
                lines
            }
        }
    }
}
