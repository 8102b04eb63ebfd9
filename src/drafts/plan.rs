//! Learning plan draft (`learning_plan`): marketplace modules saved for a target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Draft, SessionEnvelope, slots};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanTargetType {
    #[default]
    Twin,
    OrgPersona,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LearningPlan {
    pub id: String,
    pub target_type: PlanTargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default)]
    pub module_ids: Vec<String>,
    #[serde(with = "super::iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl LearningPlan {
    /// Add a module. Returns false when it was already in the plan.
    pub fn add_module(&mut self, module_id: &str) -> bool {
        if self.contains(module_id) {
            return false;
        }
        self.module_ids.push(module_id.to_string());
        true
    }

    /// Remove a module. Returns false when it was not in the plan.
    pub fn remove_module(&mut self, module_id: &str) -> bool {
        let before = self.module_ids.len();
        self.module_ids.retain(|id| id != module_id);
        self.module_ids.len() != before
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.module_ids.iter().any(|id| id == module_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanChange {
    AddModule(String),
    RemoveModule(String),
    Retarget {
        target_type: PlanTargetType,
        target_id: Option<String>,
    },
}

impl Draft for LearningPlan {
    type Update = PlanChange;
    const SLOT: &'static str = slots::LEARNING_PLAN;
    const ENVELOPE: Option<SessionEnvelope> = None;

    fn empty() -> Self {
        Self {
            id: "plan_1".to_string(),
            target_type: PlanTargetType::Twin,
            target_id: None,
            module_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn apply_update(&mut self, change: &PlanChange) {
        match change {
            PlanChange::AddModule(id) => {
                self.add_module(id);
            }
            PlanChange::RemoveModule(id) => {
                self.remove_module(id);
            }
            PlanChange::Retarget {
                target_type,
                target_id,
            } => {
                self.target_type = *target_type;
                self.target_id = target_id.clone();
            }
        }
    }
}
