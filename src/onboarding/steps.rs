//! The fixed interview script and its forward-only sequencer.

use serde::{Deserialize, Serialize};

/// The field a step collects, or the terminal `done` marker.
///
/// Progresses linearly: TwinName → UseCase → RoleTitle → Tone → Channels →
/// KnowledgeSources → Consent → Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepField {
    TwinName,
    UseCase,
    RoleTitle,
    Tone,
    Channels,
    KnowledgeSources,
    Consent,
    Done,
}

impl StepField {
    /// Whether this is the terminal marker (no further extraction).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for StepField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TwinName => "twin_name",
            Self::UseCase => "use_case",
            Self::RoleTitle => "role_title",
            Self::Tone => "tone",
            Self::Channels => "channels",
            Self::KnowledgeSources => "knowledge_sources",
            Self::Consent => "consent",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// One question of the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub field: StepField,
    pub prompt: &'static str,
    pub quick_replies: &'static [&'static str],
    pub required: bool,
}

pub const SKIP_REPLY: &str = "Skip";
pub const CONSENT_YES_REPLY: &str = "Yes, I consent";
pub const CONSENT_NO_REPLY: &str = "No, cancel";

/// The interview script. Index 0 is the greeting, the last entry is terminal.
pub static TWIN_STEPS: [Step; 8] = [
    Step {
        field: StepField::TwinName,
        prompt: "Hi! I'm your onboarding assistant. Let's create your Digital Twin together.\n\nWhat would you like to name it?",
        quick_replies: &[],
        required: true,
    },
    Step {
        field: StepField::UseCase,
        prompt: "Great! What will your Digital Twin mainly be used for? Describe its primary use case.",
        quick_replies: &["Customer support", "Internal knowledge base", "Sales assistant"],
        required: true,
    },
    Step {
        field: StepField::RoleTitle,
        prompt: "What role or job title does this Digital Twin represent? (Optional. Tap Skip to continue)",
        quick_replies: &[SKIP_REPLY],
        required: false,
    },
    Step {
        field: StepField::Tone,
        prompt: "How should your Digital Twin communicate? Pick a tone:",
        quick_replies: &["Professional", "Friendly", "Concise", "Visionary", "Custom"],
        required: true,
    },
    Step {
        field: StepField::Channels,
        prompt: "Which channels should your Digital Twin be available on?",
        quick_replies: &["Web Chat only", "Voice only", "Both"],
        required: true,
    },
    Step {
        field: StepField::KnowledgeSources,
        prompt: "Any knowledge sources to connect? Add URLs or document names, one per line. (Optional. Tap Skip if none)",
        quick_replies: &[SKIP_REPLY],
        required: false,
    },
    Step {
        field: StepField::Consent,
        prompt: "Almost done! Do you consent to 4th-IR processing this information to create your Digital Twin?",
        quick_replies: &[CONSENT_YES_REPLY, CONSENT_NO_REPLY],
        required: true,
    },
    Step {
        field: StepField::Done,
        prompt: "You're all set! Review your details on the right and click Confirm & Create whenever you're ready.",
        quick_replies: &[],
        required: false,
    },
];

/// Forward-only cursor over [`TWIN_STEPS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSequencer {
    index: usize,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_index() -> usize {
        TWIN_STEPS.len() - 1
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static Step {
        &TWIN_STEPS[self.index]
    }

    /// Move one step forward; idempotent once the terminal step is reached.
    pub fn advance(&mut self) -> &'static Step {
        self.index = (self.index + 1).min(Self::last_index());
        self.current()
    }

    pub fn is_done(&self) -> bool {
        self.index >= Self::last_index()
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
