//! Digital twin interview state and partial updates.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// How the digital twin should communicate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Friendly,
    Concise,
    Visionary,
    Custom,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Concise,
        Tone::Visionary,
        Tone::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Friendly => "friendly",
            Self::Concise => "concise",
            Self::Visionary => "visionary",
            Self::Custom => "custom",
        }
    }

    /// Match a label case-insensitively, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Tone> {
        let wanted = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == wanted)
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the digital twin is reachable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    WebChat,
    Voice,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WebChat => write!(f, "web_chat"),
            Self::Voice => write!(f, "voice"),
        }
    }
}

/// Accumulated answers of the twin interview.
///
/// Persisted as the `state_json` of the `onboarding_twin` session record,
/// so field names are part of the storage format. Loading is lenient per
/// field: a value of the wrong shape or an unknown enum label is dropped
/// and the rest of the record is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwinState {
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub twin_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub knowledge_sources: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub channels: Vec<Channel>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub consent: bool,
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Keeps the entries that parse; anything but an array loads as empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let consent: Option<bool> = lenient_option(deserializer)?;
    Ok(consent.unwrap_or(false))
}

impl TwinState {
    /// Shallow merge: every field present in `update` replaces the current
    /// value wholesale. Lists are normalized on the way in.
    pub fn apply(&mut self, update: &TwinUpdate) {
        if let Some(ref name) = update.twin_name {
            self.twin_name = Some(name.clone());
        }
        if let Some(ref use_case) = update.use_case {
            self.use_case = Some(use_case.clone());
        }
        if let Some(ref role) = update.role_title {
            self.role_title = Some(role.clone());
        }
        if let Some(tone) = update.tone {
            self.tone = Some(tone);
        }
        if let Some(ref lang) = update.preferred_language {
            self.preferred_language = Some(lang.clone());
        }
        if let Some(ref sources) = update.knowledge_sources {
            self.knowledge_sources = sources
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(ref channels) = update.channels {
            let mut deduped = Vec::with_capacity(channels.len());
            for channel in channels {
                if !deduped.contains(channel) {
                    deduped.push(*channel);
                }
            }
            self.channels = deduped;
        }
        if let Some(consent) = update.consent {
            self.consent = consent;
        }
    }

    /// Display name for the success view. Empty when no name was given.
    pub fn display_name(&self) -> &str {
        self.twin_name.as_deref().unwrap_or("")
    }
}

/// Partial update produced by extraction or a direct form edit.
///
/// Serializes to `{}` when nothing was extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwinUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<bool>,
}

impl TwinUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn twin_name(name: impl Into<String>) -> Self {
        Self {
            twin_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn use_case(use_case: impl Into<String>) -> Self {
        Self {
            use_case: Some(use_case.into()),
            ..Default::default()
        }
    }

    pub fn role_title(role: impl Into<String>) -> Self {
        Self {
            role_title: Some(role.into()),
            ..Default::default()
        }
    }

    pub fn tone(tone: Tone) -> Self {
        Self {
            tone: Some(tone),
            ..Default::default()
        }
    }

    pub fn channels(channels: Vec<Channel>) -> Self {
        Self {
            channels: Some(channels),
            ..Default::default()
        }
    }

    pub fn knowledge_sources(sources: Vec<String>) -> Self {
        Self {
            knowledge_sources: Some(sources),
            ..Default::default()
        }
    }

    pub fn consent(consent: bool) -> Self {
        Self {
            consent: Some(consent),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_matches_storage_shape() {
        let json = serde_json::to_value(TwinState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"knowledge_sources": [], "channels": [], "consent": false})
        );
    }

    #[test]
    fn partial_state_json_loads_with_defaults() {
        let state: TwinState =
            serde_json::from_str(r#"{"twin_name":"Ada","tone":"visionary"}"#).unwrap();
        assert_eq!(state.twin_name.as_deref(), Some("Ada"));
        assert_eq!(state.tone, Some(Tone::Visionary));
        assert!(state.channels.is_empty());
        assert!(!state.consent);
    }

    #[test]
    fn unknown_values_are_dropped_field_by_field() {
        let state: TwinState = serde_json::from_str(
            r#"{"twin_name":"Echo","use_case":"Sales","tone":"casual",
                "channels":["voice","fax",3],"knowledge_sources":"faq.md",
                "consent":"yes","role_title":42}"#,
        )
        .unwrap();
        assert_eq!(state.twin_name.as_deref(), Some("Echo"));
        assert_eq!(state.use_case.as_deref(), Some("Sales"));
        assert_eq!(state.tone, None);
        assert_eq!(state.channels, vec![Channel::Voice]);
        assert!(state.knowledge_sources.is_empty());
        assert!(!state.consent);
        assert!(state.role_title.is_none());
    }

    #[test]
    fn null_fields_load_as_unset() {
        let state: TwinState =
            serde_json::from_str(r#"{"tone":null,"channels":null,"consent":null}"#).unwrap();
        assert_eq!(state, TwinState::default());
    }

    #[test]
    fn channel_serde_names() {
        let json = serde_json::to_string(&vec![Channel::WebChat, Channel::Voice]).unwrap();
        assert_eq!(json, r#"["web_chat","voice"]"#);
        for channel in [Channel::WebChat, Channel::Voice] {
            assert_eq!(
                format!("\"{channel}\""),
                serde_json::to_string(&channel).unwrap()
            );
        }
    }

    #[test]
    fn tone_from_label_ignores_case_and_padding() {
        assert_eq!(Tone::from_label("  Friendly "), Some(Tone::Friendly));
        assert_eq!(Tone::from_label("CUSTOM"), Some(Tone::Custom));
        assert_eq!(Tone::from_label("friendly-ish"), None);
        assert_eq!(Tone::from_label(""), None);
    }

    #[test]
    fn apply_overwrites_and_replaces_lists() {
        let mut state = TwinState::default();
        state.apply(&TwinUpdate::twin_name("First"));
        state.apply(&TwinUpdate::channels(vec![Channel::Voice]));
        state.apply(&TwinUpdate::twin_name("Second"));
        state.apply(&TwinUpdate::channels(vec![Channel::WebChat]));

        assert_eq!(state.twin_name.as_deref(), Some("Second"));
        assert_eq!(state.channels, vec![Channel::WebChat]);
    }

    #[test]
    fn apply_normalizes_lists() {
        let mut state = TwinState::default();
        state.apply(&TwinUpdate {
            channels: Some(vec![Channel::Voice, Channel::WebChat, Channel::Voice]),
            knowledge_sources: Some(vec![
                "  https://docs.example.com ".to_string(),
                "   ".to_string(),
                "handbook.pdf".to_string(),
            ]),
            ..Default::default()
        });
        assert_eq!(state.channels, vec![Channel::Voice, Channel::WebChat]);
        assert_eq!(
            state.knowledge_sources,
            vec!["https://docs.example.com", "handbook.pdf"]
        );
    }

    #[test]
    fn empty_update_is_noop() {
        let mut state = TwinState::default();
        state.apply(&TwinUpdate::tone(Tone::Concise));
        let before = state.clone();
        state.apply(&TwinUpdate::default());
        assert_eq!(state, before);
        assert!(TwinUpdate::default().is_empty());
        assert_eq!(serde_json::to_string(&TwinUpdate::default()).unwrap(), "{}");
    }
}
