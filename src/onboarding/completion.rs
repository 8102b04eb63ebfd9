//! Required-field completion tracking.

use serde::Serialize;

use super::model::TwinState;

/// A field that must be populated before the twin can be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    TwinName,
    UseCase,
    Tone,
    Channels,
    Consent,
}

impl RequiredField {
    pub const ALL: [RequiredField; 5] = [
        RequiredField::TwinName,
        RequiredField::UseCase,
        RequiredField::Tone,
        RequiredField::Channels,
        RequiredField::Consent,
    ];

    /// Whether this field counts as populated in `state`.
    ///
    /// Consent only counts when it is `true`: declining is a valid answer but
    /// not a completed one.
    pub fn is_complete(self, state: &TwinState) -> bool {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|s| !s.is_empty())
        }

        match self {
            Self::TwinName => present(&state.twin_name),
            Self::UseCase => present(&state.use_case),
            Self::Tone => state.tone.is_some(),
            Self::Channels => !state.channels.is_empty(),
            Self::Consent => state.consent,
        }
    }
}

pub fn required_field_count() -> usize {
    RequiredField::ALL.len()
}

pub fn completed_count(state: &TwinState) -> usize {
    RequiredField::ALL
        .into_iter()
        .filter(|field| field.is_complete(state))
        .count()
}

pub fn is_ready_to_confirm(state: &TwinState) -> bool {
    completed_count(state) == required_field_count()
}

/// Progress figures for the form panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub completed: usize,
    pub required: usize,
    pub percent: u8,
    pub ready: bool,
}

impl CompletionSummary {
    pub fn of(state: &TwinState) -> Self {
        let completed = completed_count(state);
        let required = required_field_count();
        let percent = if required == 0 {
            0
        } else {
            ((completed as f64 / required as f64) * 100.0).round() as u8
        };
        Self {
            completed,
            required,
            percent,
            ready: completed == required,
        }
    }
}

impl std::fmt::Display for CompletionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} required fields completed",
            self.completed, self.required
        )?;
        if self.ready {
            write!(f, " (ready to confirm)")?;
        }
        Ok(())
    }
}
