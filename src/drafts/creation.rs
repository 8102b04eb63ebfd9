//! Twin creation wizard draft (`twin_creation_draft`).
//!
//! Only the serializable parts of the wizard are kept: the current step, the
//! identity form and the deployment choices. Uploaded media never hits the slot.

use serde::{Deserialize, Serialize};

use super::{Draft, SessionEnvelope, slots};

pub const FIRST_STEP: u8 = 1;
pub const DEPLOYMENT_STEP: u8 = 3;
pub const LAST_STEP: u8 = 4;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub about: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default)]
    pub use_case: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub interaction_style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreationDraft {
    #[serde(default = "first_step")]
    pub step: u8,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub deployment: Deployment,
}

fn first_step() -> u8 {
    FIRST_STEP
}

impl CreationDraft {
    /// Move to `step`, clamped to the wizard. Steps past deployment need a
    /// use case; the draft stays on deployment otherwise.
    pub fn go_to_step(&mut self, step: u8) {
        let step = step.clamp(FIRST_STEP, LAST_STEP);
        self.step = if step > DEPLOYMENT_STEP && !self.can_leave_deployment() {
            DEPLOYMENT_STEP
        } else {
            step
        };
    }

    /// Whether there is anything worth restoring.
    pub fn has_content(&self) -> bool {
        self.identity != Identity::default() || self.deployment != Deployment::default()
    }

    /// The deployment step cannot be left without a use case.
    pub fn can_leave_deployment(&self) -> bool {
        self.deployment.use_case.is_some()
    }

    /// Add the channel if absent, remove it if present.
    pub fn toggle_channel(&mut self, channel: &str) {
        if let Some(pos) = self.deployment.channels.iter().position(|c| c == channel) {
            self.deployment.channels.remove(pos);
        } else {
            self.deployment.channels.push(channel.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CreationUpdate {
    pub step: Option<u8>,
    pub identity: Option<Identity>,
    pub deployment: Option<Deployment>,
    /// Deployment channel to add or remove.
    pub toggle_channel: Option<String>,
}

impl Draft for CreationDraft {
    type Update = CreationUpdate;
    const SLOT: &'static str = slots::TWIN_CREATION_DRAFT;
    const ENVELOPE: Option<SessionEnvelope> = None;

    fn empty() -> Self {
        Self {
            step: FIRST_STEP,
            identity: Identity::default(),
            deployment: Deployment::default(),
        }
    }

    fn apply_update(&mut self, update: &CreationUpdate) {
        if let Some(ref identity) = update.identity {
            self.identity = identity.clone();
        }
        if let Some(ref deployment) = update.deployment {
            self.deployment = deployment.clone();
        }
        if let Some(ref channel) = update.toggle_channel {
            self.toggle_channel(channel);
        }
        // Last, so a use case arriving in the same update can unlock the step.
        if let Some(step) = update.step {
            self.go_to_step(step);
        }
    }
}
