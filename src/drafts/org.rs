//! Virtual Organisation onboarding draft (`onboarding_org`).

use serde::{Deserialize, Serialize};

use super::{Draft, SessionEnvelope, slots};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetOutcome {
    Support,
    Sales,
    Hr,
    Finance,
    Compliance,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaEntry {
    pub persona_name: String,
    pub persona_role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrgState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(default)]
    pub target_outcomes: Vec<TargetOutcome>,
    #[serde(default)]
    pub persona_roster: Vec<PersonaEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance_rules: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_boundaries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_contact_email: Option<String>,
}

/// Partial org update; present fields overwrite, lists are replaced wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrgUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_outcomes: Option<Vec<TargetOutcome>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_roster: Option<Vec<PersonaEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance_rules: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_boundaries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_contact_email: Option<String>,
}

impl Draft for OrgState {
    type Update = OrgUpdate;
    const SLOT: &'static str = slots::ONBOARDING_ORG;
    const ENVELOPE: Option<SessionEnvelope> = Some(SessionEnvelope {
        id: "org_session",
        session_type: "virtual_org",
    });

    fn empty() -> Self {
        Self::default()
    }

    fn apply_update(&mut self, update: &OrgUpdate) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        set(&mut self.org_name, &update.org_name);
        set(&mut self.industry_domain, &update.industry_domain);
        set(&mut self.primary_goal, &update.primary_goal);
        set(&mut self.governance_rules, &update.governance_rules);
        set(&mut self.data_boundaries, &update.data_boundaries);
        set(&mut self.admin_contact_email, &update.admin_contact_email);
        if let Some(ref outcomes) = update.target_outcomes {
            self.target_outcomes = outcomes.clone();
        }
        if let Some(ref roster) = update.persona_roster {
            self.persona_roster = roster.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::drafts::DraftSession;
    use crate::store::{MemorySlotStore, SlotStore};

    #[test]
    fn empty_org_matches_storage_shape() {
        assert_eq!(
            serde_json::to_value(OrgState::empty()).unwrap(),
            serde_json::json!({"target_outcomes": [], "persona_roster": []})
        );
    }

    #[test]
    fn update_replaces_roster_wholesale() {
        let mut org = OrgState::empty();
        org.apply_update(&OrgUpdate {
            org_name: Some("Acme".to_string()),
            persona_roster: Some(vec![PersonaEntry {
                persona_name: "Ava".to_string(),
                persona_role: "Support lead".to_string(),
            }]),
            ..Default::default()
        });
        org.apply_update(&OrgUpdate {
            persona_roster: Some(vec![]),
            target_outcomes: Some(vec![TargetOutcome::Hr, TargetOutcome::Compliance]),
            ..Default::default()
        });
        assert_eq!(org.org_name.as_deref(), Some("Acme"));
        assert!(org.persona_roster.is_empty());
        assert_eq!(
            serde_json::to_value(&org.target_outcomes).unwrap(),
            serde_json::json!(["hr", "compliance"])
        );
    }

    #[tokio::test]
    async fn org_draft_uses_its_own_slot_and_envelope() {
        let raw = Arc::new(MemorySlotStore::new());
        let store: Arc<dyn SlotStore> = raw.clone();
        let mut session = DraftSession::<OrgState>::load(store, "u").await;
        session
            .update(&OrgUpdate {
                admin_contact_email: Some("ops@acme.test".to_string()),
                ..Default::default()
            })
            .await;

        let stored = raw.get_slot("u", "onboarding_org").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(json["id"], "org_session");
        assert_eq!(json["type"], "virtual_org");
        assert_eq!(json["state_json"]["admin_contact_email"], "ops@acme.test");
        assert!(raw.get_slot("u", "onboarding_twin").await.unwrap().is_none());
    }
}
