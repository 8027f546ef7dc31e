//! Form state and the rules that turn it into exactly one action.

use crate::error::ValidationError;
use crate::model::{QueryRequest, NONE};

/// Current values of every input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub stats_select: String,
    pub text_select: String,
    pub text_input: String,
    pub tech_select: String,
    pub tech_input: String,
    /// Count exactly as typed.
    pub count: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            stats_select: NONE.into(),
            text_select: NONE.into(),
            text_input: String::new(),
            tech_select: NONE.into(),
            tech_input: String::new(),
            count: "20".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Replay { id: String },
    Search(QueryRequest),
}

impl Action {
    pub fn is_search(&self) -> bool {
        matches!(self, Action::Search(_))
    }
}

/// Selector wins over free text; the free-text field is cleared when it does.
fn resolve_choice(select: &str, input: &mut String) -> Option<String> {
    if select != NONE {
        input.clear();
    }
    let value = if input.is_empty() { select } else { input.as_str() };
    if value.is_empty() || value == NONE {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_count(raw: &str) -> Result<u8, ValidationError> {
    let n: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::CountOutOfRange)?;
    if !(1..=100).contains(&n) {
        return Err(ValidationError::CountOutOfRange);
    }
    Ok(n as u8)
}

/// Decide what the trigger does. A chosen snapshot short-circuits all other checks.
pub fn resolve_action(form: &mut FormState) -> Result<Action, ValidationError> {
    if form.stats_select != NONE {
        return Ok(Action::Replay {
            id: form.stats_select.clone(),
        });
    }

    let search_text = resolve_choice(&form.text_select, &mut form.text_input)
        .ok_or(ValidationError::MissingSearchText)?;
    let technology = resolve_choice(&form.tech_select, &mut form.tech_input)
        .ok_or(ValidationError::MissingTechnology)?;
    let count = parse_count(&form.count)?;

    Ok(Action::Search(QueryRequest {
        search_text,
        technology,
        count,
    }))
}
