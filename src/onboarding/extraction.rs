//! Field extraction: maps a raw answer for the current step to a partial update.
//!
//! Extraction is best-effort. Input that cannot be understood yields an empty
//! update; the interview moves on and the completion tracker keeps showing the
//! field as missing.

use super::model::{Channel, Tone, TwinUpdate};
use super::steps::{Step, StepField};

/// Extract a partial state update from `input` for `step`.
pub fn extract(step: &Step, input: &str) -> TwinUpdate {
    let trimmed = input.trim();

    if step.field.is_terminal() {
        return TwinUpdate::default();
    }
    if !step.required && is_skip(trimmed) {
        return TwinUpdate::default();
    }

    match step.field {
        StepField::TwinName => TwinUpdate::twin_name(trimmed),
        StepField::UseCase => TwinUpdate::use_case(trimmed),
        StepField::RoleTitle if trimmed.is_empty() => TwinUpdate::default(),
        StepField::RoleTitle => TwinUpdate::role_title(trimmed),
        StepField::Tone => extract_tone(trimmed),
        StepField::Channels => extract_channels(trimmed),
        StepField::KnowledgeSources => extract_knowledge_sources(trimmed),
        StepField::Consent => TwinUpdate::consent(is_affirmative(trimmed)),
        StepField::Done => TwinUpdate::default(),
    }
}

fn is_skip(trimmed: &str) -> bool {
    trimmed.eq_ignore_ascii_case("skip")
}

/// Free-text consent: an answer starting with "yes" (any case) consents.
pub fn is_affirmative(trimmed: &str) -> bool {
    trimmed.to_lowercase().starts_with("yes")
}

fn extract_tone(trimmed: &str) -> TwinUpdate {
    match Tone::from_label(trimmed) {
        Some(tone) => TwinUpdate::tone(tone),
        None => TwinUpdate::default(),
    }
}

fn extract_channels(trimmed: &str) -> TwinUpdate {
    let lower = trimmed.to_lowercase();
    let both = lower.contains("both");
    let mut channels = Vec::new();
    if both || lower.contains("web") {
        channels.push(Channel::WebChat);
    }
    if both || lower.contains("voice") {
        channels.push(Channel::Voice);
    }
    if channels.is_empty() {
        TwinUpdate::default()
    } else {
        TwinUpdate::channels(channels)
    }
}

fn extract_knowledge_sources(trimmed: &str) -> TwinUpdate {
    if trimmed.is_empty() || is_skip(trimmed) {
        return TwinUpdate::default();
    }
    let sources: Vec<String> = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if sources.is_empty() {
        TwinUpdate::default()
    } else {
        TwinUpdate::knowledge_sources(sources)
    }
}
