use crate::orchestrator::bootstrap::SelectOption;
use crate::orchestrator::Session;
use crate::render::ResultsArea;

/// Focusable form controls, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Stats,
    TextSelect,
    TextInput,
    TechSelect,
    TechInput,
    Count,
}

impl Field {
    const ORDER: [Field; 6] = [
        Field::Stats,
        Field::TextSelect,
        Field::TextInput,
        Field::TechSelect,
        Field::TechInput,
        Field::Count,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            Field::Stats => "Stored result",
            Field::TextSelect => "Recent searches",
            Field::TextInput => "Search text",
            Field::TechSelect => "Recent technologies",
            Field::TechInput => "Technology",
            Field::Count => "Count (1-100)",
        }
    }

    pub fn all() -> &'static [Field] {
        &Self::ORDER
    }
}

/// A drop-down: the sentinel option first, then whatever bootstrap appended.
#[derive(Debug, Clone)]
pub struct Selector {
    pub options: Vec<SelectOption>,
    pub selected: usize,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            options: vec![SelectOption::sentinel()],
            selected: 0,
        }
    }
}

impl Selector {
    pub fn extend(&mut self, options: Vec<SelectOption>) {
        self.options.extend(options);
    }

    pub fn cycle(&mut self, forward: bool) {
        let n = self.options.len();
        self.selected = if forward {
            (self.selected + 1) % n
        } else {
            (self.selected + n - 1) % n
        };
    }

    pub fn current(&self) -> &SelectOption {
        &self.options[self.selected.min(self.options.len() - 1)]
    }
}

pub struct UiState {
    pub session: Session,
    pub stats_select: Selector,
    pub text_select: Selector,
    pub tech_select: Selector,
    pub focus: Field,
    /// Index of the vacancy shown at the top of the results pane.
    pub results_scroll: usize,
    pub show_help: bool,
    pub info: String,
}

impl UiState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            stats_select: Selector::default(),
            text_select: Selector::default(),
            tech_select: Selector::default(),
            focus: Field::Stats,
            results_scroll: 0,
            show_help: false,
            info: String::new(),
        }
    }

    pub fn selector_mut(&mut self, field: Field) -> Option<&mut Selector> {
        match field {
            Field::Stats => Some(&mut self.stats_select),
            Field::TextSelect => Some(&mut self.text_select),
            Field::TechSelect => Some(&mut self.tech_select),
            _ => None,
        }
    }

    pub fn input_mut(&mut self, field: Field) -> Option<&mut String> {
        let form = &mut self.session.form;
        match field {
            Field::TextInput => Some(&mut form.text_input),
            Field::TechInput => Some(&mut form.tech_input),
            Field::Count => Some(&mut form.count),
            _ => None,
        }
    }

    /// Shown value of a field: option label for selectors, text for inputs.
    pub fn field_text(&self, field: Field) -> &str {
        let form = &self.session.form;
        match field {
            Field::Stats => &self.stats_select.current().label,
            Field::TextSelect => &self.text_select.current().label,
            Field::TechSelect => &self.tech_select.current().label,
            Field::TextInput => &form.text_input,
            Field::TechInput => &form.tech_input,
            Field::Count => &form.count,
        }
    }

    /// Copy selector values into the form before a dispatch.
    pub fn sync_form(&mut self) {
        let form = &mut self.session.form;
        form.stats_select = self.stats_select.current().value.clone();
        form.text_select = self.text_select.current().value.clone();
        form.tech_select = self.tech_select.current().value.clone();
    }

    pub fn vacancy_count(&self) -> usize {
        match &self.session.screen.results {
            ResultsArea::Listing { vacancies, .. } => vacancies.len(),
            _ => 0,
        }
    }

    pub fn scroll(&mut self, down: bool) {
        let max = self.vacancy_count().saturating_sub(1);
        self.results_scroll = if down {
            (self.results_scroll + 1).min(max)
        } else {
            self.results_scroll.saturating_sub(1)
        };
    }

    /// Link of the vacancy at the top of the results pane.
    pub fn focused_link(&self) -> Option<&str> {
        match &self.session.screen.results {
            ResultsArea::Listing { vacancies, .. } => vacancies
                .get(self.results_scroll)
                .map(|v| v.alternate_url.as_str()),
            _ => None,
        }
    }
}
