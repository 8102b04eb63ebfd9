//! Draft sessions: per-flow state persisted in a named storage slot.
//!
//! Every flow (twin interview, organisation onboarding, learning plan,
//! creation wizard) keeps one draft in one slot. Loading and saving never
//! fail from the caller's point of view: unreadable slots load as an empty
//! draft, and store failures are logged and swallowed.

pub mod creation;
pub mod org;
pub mod plan;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::onboarding::model::{TwinState, TwinUpdate};
use crate::store::SlotStore;

pub use creation::{CreationDraft, CreationUpdate};
pub use org::{OrgState, OrgUpdate};
pub use plan::{LearningPlan, PlanChange};

/// Slot keys, one per flow.
pub mod slots {
    pub const ONBOARDING_TWIN: &str = "onboarding_twin";
    pub const ONBOARDING_ORG: &str = "onboarding_org";
    pub const LEARNING_PLAN: &str = "learning_plan";
    pub const TWIN_CREATION_DRAFT: &str = "twin_creation_draft";
}

/// Identity written into a [`SessionRecord`] envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnvelope {
    pub id: &'static str,
    pub session_type: &'static str,
}

/// State that can live in a draft slot.
pub trait Draft: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partial change accepted by [`DraftSession::update`].
    type Update: Send + Sync;

    /// Storage slot key.
    const SLOT: &'static str;

    /// When set, the draft is wrapped in a [`SessionRecord`]; otherwise it is
    /// stored bare.
    const ENVELOPE: Option<SessionEnvelope>;

    fn empty() -> Self;

    fn apply_update(&mut self, update: &Self::Update);
}

impl Draft for TwinState {
    type Update = TwinUpdate;
    const SLOT: &'static str = slots::ONBOARDING_TWIN;
    const ENVELOPE: Option<SessionEnvelope> = Some(SessionEnvelope {
        id: "twin_session",
        session_type: "digital_twin",
    });

    fn empty() -> Self {
        TwinState::default()
    }

    fn apply_update(&mut self, update: &TwinUpdate) {
        self.apply(update);
    }
}

/// Persisted session wrapper: `{ id, type, state_json, created_at, updated_at }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SessionRecord<T> {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub session_type: String,
    #[serde(default)]
    pub state_json: Option<T>,
    #[serde(default = "Utc::now", with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// ISO-8601 timestamps with millisecond precision, e.g. `2025-06-01T10:00:00.000Z`.
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

/// A draft bound to its slot in a [`SlotStore`].
pub struct DraftSession<D: Draft> {
    store: Arc<dyn SlotStore>,
    user_id: String,
    draft: D,
    created_at: Option<DateTime<Utc>>,
    has_stored: bool,
}

impl<D: Draft> DraftSession<D> {
    /// Load the draft from its slot, falling back to an empty draft.
    pub async fn load(store: Arc<dyn SlotStore>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let mut session = Self {
            store,
            user_id,
            draft: D::empty(),
            created_at: None,
            has_stored: false,
        };

        let raw = match session.store.get_slot(&session.user_id, D::SLOT).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return session,
            Err(e) => {
                warn!(slot = D::SLOT, error = %e, "Draft slot unreadable, starting empty");
                return session;
            }
        };

        match decode::<D>(&raw) {
            Ok((draft, created_at)) => {
                debug!(slot = D::SLOT, "Restored draft");
                session.draft = draft;
                session.created_at = created_at;
                session.has_stored = true;
            }
            Err(e) => {
                warn!(slot = D::SLOT, error = %e, "Malformed draft, starting empty");
            }
        }
        session
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Whether the slot holds a record for this draft.
    pub fn has_stored_session(&self) -> bool {
        self.has_stored
    }

    /// Merge `update` into the draft and persist it.
    pub async fn update(&mut self, update: &D::Update) {
        self.draft.apply_update(update);
        self.persist().await;
    }

    /// Clear the slot and start over with an empty draft.
    pub async fn reset(&mut self) {
        if let Err(e) = self.store.delete_slot(&self.user_id, D::SLOT).await {
            warn!(slot = D::SLOT, error = %e, "Failed to clear draft slot");
        }
        self.draft = D::empty();
        self.created_at = None;
        self.has_stored = false;
    }

    async fn persist(&mut self) {
        let now = Utc::now();
        let created_at = *self.created_at.get_or_insert(now);
        let value = match encode(&self.draft, created_at, now) {
            Ok(v) => v,
            Err(e) => {
                warn!(slot = D::SLOT, error = %e, "Failed to serialize draft");
                return;
            }
        };
        match self.store.set_slot(&self.user_id, D::SLOT, &value).await {
            Ok(()) => self.has_stored = true,
            Err(e) => warn!(slot = D::SLOT, error = %e, "Failed to persist draft"),
        }
    }
}

fn encode<D: Draft>(
    draft: &D,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    match D::ENVELOPE {
        Some(envelope) => serde_json::to_string(&SessionRecord {
            id: envelope.id.to_string(),
            session_type: envelope.session_type.to_string(),
            state_json: Some(draft),
            created_at,
            updated_at,
        }),
        None => serde_json::to_string(draft),
    }
}

fn decode<D: Draft>(raw: &str) -> Result<(D, Option<DateTime<Utc>>), serde_json::Error> {
    match D::ENVELOPE {
        Some(_) => {
            let record: SessionRecord<D> = serde_json::from_str(raw)?;
            let draft = record.state_json.unwrap_or_else(D::empty);
            Ok((draft, Some(record.created_at)))
        }
        None => Ok((serde_json::from_str(raw)?, None)),
    }
}
