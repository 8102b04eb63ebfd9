//! InterviewSession ties extraction and the step sequencer to the chat log
//! and the persisted twin draft.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::drafts::DraftSession;
use crate::error::SessionError;
use crate::store::SlotStore;

use super::chat::ChatMessage;
use super::completion::{CompletionSummary, is_ready_to_confirm};
use super::extraction::extract;
use super::model::{TwinState, TwinUpdate};
use super::steps::{CONSENT_NO_REPLY, CONSENT_YES_REPLY, Step, StepField, StepSequencer, TWIN_STEPS};

/// Explicit answer to the consent question, as captured by a button rather
/// than parsed from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentChoice {
    Granted,
    Declined,
}

impl ConsentChoice {
    pub fn from_bool(consent: bool) -> Self {
        if consent { Self::Granted } else { Self::Declined }
    }

    fn as_reply(&self) -> &'static str {
        match self {
            Self::Granted => CONSENT_YES_REPLY,
            Self::Declined => CONSENT_NO_REPLY,
        }
    }
}

/// Result of one accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Update applied to the state (possibly empty).
    pub update: TwinUpdate,
    /// Step index after advancing.
    pub step_index: usize,
    pub is_done: bool,
}

/// Returned by a successful confirm. Only the display name survives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub twin_name: String,
    /// Success view location, carrying the name as a query parameter.
    pub redirect: String,
}

const SUCCESS_PATH: &str = "/onboarding/twin/success";

/// Serializable view of the whole session, for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: TwinState,
    pub messages: Vec<ChatMessage>,
    pub step_index: usize,
    pub current_step: Step,
    pub is_done: bool,
    pub completion: CompletionSummary,
    pub has_stored_session: bool,
}

/// One guided twin interview.
///
/// Answers are processed one at a time to completion: extract, merge,
/// advance, log.
pub struct InterviewSession {
    draft: DraftSession<TwinState>,
    sequencer: StepSequencer,
    messages: Vec<ChatMessage>,
}

impl InterviewSession {
    /// Open the interview for `user_id`, restoring any saved twin draft.
    /// The chat always starts from the greeting.
    pub async fn open(store: Arc<dyn SlotStore>, user_id: impl Into<String>) -> Self {
        let draft = DraftSession::<TwinState>::load(store, user_id).await;
        if draft.has_stored_session() {
            info!(user_id = draft.user_id(), "Resuming twin draft");
        }
        Self {
            draft,
            sequencer: StepSequencer::new(),
            messages: initial_messages(),
        }
    }

    pub fn state(&self) -> &TwinState {
        self.draft.draft()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn step_index(&self) -> usize {
        self.sequencer.index()
    }

    pub fn current_step(&self) -> &'static Step {
        self.sequencer.current()
    }

    pub fn is_done(&self) -> bool {
        self.sequencer.is_done()
    }

    pub fn has_stored_session(&self) -> bool {
        self.draft.has_stored_session()
    }

    pub fn completion(&self) -> CompletionSummary {
        CompletionSummary::of(self.state())
    }

    pub fn is_ready_to_confirm(&self) -> bool {
        is_ready_to_confirm(self.state())
    }

    /// Answer the current step with free text (typed, quick reply or voice).
    ///
    /// Blank input is ignored and returns `None`. Otherwise the step always
    /// advances, whether or not anything could be extracted.
    pub async fn send_message(&mut self, text: &str) -> Option<TurnOutcome> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let update = extract(self.current_step(), trimmed);
        Some(self.accept_answer(trimmed, update).await)
    }

    /// Answer the consent step with an explicit choice.
    pub async fn choose_consent(
        &mut self,
        choice: ConsentChoice,
    ) -> Result<TurnOutcome, SessionError> {
        let field = self.current_step().field;
        if field != StepField::Consent {
            return Err(SessionError::NotAtStep {
                expected: StepField::Consent.to_string(),
                actual: field.to_string(),
            });
        }
        let update = TwinUpdate::consent(choice == ConsentChoice::Granted);
        Ok(self.accept_answer(choice.as_reply(), update).await)
    }

    /// Direct form edit: merge and persist, leaving the chat untouched.
    pub async fn update_fields(&mut self, update: &TwinUpdate) {
        if update.is_empty() {
            return;
        }
        self.draft.update(update).await;
    }

    /// Back to a single greeting at step 0. The draft is left as is.
    pub fn reset_chat(&mut self) {
        self.messages = initial_messages();
        self.sequencer.reset();
    }

    /// Drop the stored draft and start the interview over.
    pub async fn reset(&mut self) {
        self.draft.reset().await;
        self.reset_chat();
        info!(user_id = self.draft.user_id(), "Twin interview reset");
    }

    /// Finalize the twin. Clears the draft slot and the chat; only the display
    /// name is carried to the success view.
    pub async fn confirm(&mut self) -> Result<Confirmation, SessionError> {
        let completion = self.completion();
        if !completion.ready {
            return Err(SessionError::NotReady {
                completed: completion.completed,
                required: completion.required,
            });
        }

        let twin_name = self.state().display_name().to_string();
        self.draft.reset().await;
        self.reset_chat();

        info!(user_id = self.draft.user_id(), twin_name = %twin_name, "Twin confirmed");
        Ok(Confirmation {
            redirect: format!("{SUCCESS_PATH}?name={}", encode_uri_component(&twin_name)),
            twin_name,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state().clone(),
            messages: self.messages.clone(),
            step_index: self.step_index(),
            current_step: *self.current_step(),
            is_done: self.is_done(),
            completion: self.completion(),
            has_stored_session: self.has_stored_session(),
        }
    }

    async fn accept_answer(&mut self, answer: &str, update: TwinUpdate) -> TurnOutcome {
        let answered = self.current_step().field;
        // Saved even when empty so updated_at tracks every accepted answer.
        self.draft.update(&update).await;
        let next = self.sequencer.advance();

        debug!(
            step = %answered,
            extracted = !update.is_empty(),
            next = %next.field,
            "Interview answer accepted"
        );

        self.messages.push(ChatMessage::user(answer));
        self.messages
            .push(ChatMessage::assistant_with_update(next.prompt, update.clone()));

        TurnOutcome {
            update,
            step_index: self.sequencer.index(),
            is_done: self.sequencer.is_done(),
        }
    }
}

fn initial_messages() -> Vec<ChatMessage> {
    vec![ChatMessage::assistant(TWIN_STEPS[0].prompt)]
}

/// Percent-encode everything except the characters JavaScript's
/// `encodeURIComponent` leaves alone.
fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::chat::Role;
    use crate::onboarding::model::{Channel, Tone};
    use crate::store::MemorySlotStore;

    async fn new_session() -> (Arc<MemorySlotStore>, InterviewSession) {
        let raw = Arc::new(MemorySlotStore::new());
        let store: Arc<dyn SlotStore> = raw.clone();
        let session = InterviewSession::open(store, "tester").await;
        (raw, session)
    }

    async fn answer_all(session: &mut InterviewSession) {
        for answer in [
            "Nova",
            "Customer support",
            "Skip",
            "Friendly",
            "Both",
            "Skip",
            "Yes, I consent",
        ] {
            session.send_message(answer).await.unwrap();
        }
    }

    #[tokio::test]
    async fn opens_with_greeting() {
        let (_, session) = new_session().await;
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert_eq!(session.messages()[0].content, TWIN_STEPS[0].prompt);
        assert!(!session.has_stored_session());
    }

    #[tokio::test]
    async fn full_interview_becomes_ready() {
        let (_, mut session) = new_session().await;
        answer_all(&mut session).await;

        let state = session.state();
        assert_eq!(state.twin_name.as_deref(), Some("Nova"));
        assert_eq!(state.use_case.as_deref(), Some("Customer support"));
        assert!(state.role_title.is_none());
        assert_eq!(state.tone, Some(Tone::Friendly));
        assert_eq!(state.channels, vec![Channel::WebChat, Channel::Voice]);
        assert!(state.knowledge_sources.is_empty());
        assert!(state.consent);

        assert!(session.is_done());
        assert_eq!(session.step_index(), 7);
        assert!(session.is_ready_to_confirm());
        // Greeting plus a user/assistant pair per answer.
        assert_eq!(session.messages().len(), 1 + 7 * 2);
    }

    #[tokio::test]
    async fn each_answer_logs_user_then_next_prompt() {
        let (_, mut session) = new_session().await;
        let outcome = session.send_message("  Nova ").await.unwrap();
        assert_eq!(outcome.step_index, 1);
        assert_eq!(outcome.update, TwinUpdate::twin_name("Nova"));

        let log = session.messages();
        assert_eq!(log[1].role, Role::User);
        assert_eq!(log[1].content, "Nova");
        assert_eq!(log[2].role, Role::Assistant);
        assert_eq!(log[2].content, TWIN_STEPS[1].prompt);
        assert_eq!(log[2].extracted_update, Some(TwinUpdate::twin_name("Nova")));
    }

    #[tokio::test]
    async fn skip_on_optional_step_advances_without_update() {
        let (_, mut session) = new_session().await;
        session.send_message("Nova").await;
        session.send_message("Sales").await;
        assert_eq!(session.current_step().field, StepField::RoleTitle);

        let before = session.state().clone();
        let outcome = session.send_message("SKIP").await.unwrap();
        assert!(outcome.update.is_empty());
        assert_eq!(outcome.step_index, 3);
        assert_eq!(session.state(), &before);
    }

    #[tokio::test]
    async fn skip_on_knowledge_sources_advances_by_one() {
        let (_, mut session) = new_session().await;
        for answer in ["Nova", "Sales", "Skip", "Friendly", "Both"] {
            session.send_message(answer).await;
        }
        assert_eq!(session.step_index(), 5);
        assert_eq!(session.current_step().field, StepField::KnowledgeSources);

        let before = session.state().clone();
        let outcome = session.send_message("skip").await.unwrap();
        assert!(outcome.update.is_empty());
        assert_eq!(outcome.step_index, 6);
        assert_eq!(session.current_step().field, StepField::Consent);
        assert_eq!(session.state(), &before);
    }

    #[tokio::test]
    async fn repeating_a_tone_leaves_state_unchanged() {
        let (raw, mut session) = new_session().await;
        for answer in ["Nova", "Sales", "Skip", "Concise"] {
            session.send_message(answer).await;
        }
        let once = session.state().clone();
        assert_eq!(once.tone, Some(Tone::Concise));

        // Restart the chat and give the same tone again.
        session.reset_chat();
        for answer in ["Nova", "Sales", "Skip", "Concise"] {
            session.send_message(answer).await;
        }
        assert_eq!(session.state(), &once);

        let stored: crate::drafts::SessionRecord<TwinState> = serde_json::from_str(
            &raw.get_slot("tester", "onboarding_twin").await.unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(stored.state_json.as_ref(), Some(&once));
    }

    #[tokio::test]
    async fn empty_answers_still_refresh_the_saved_record() {
        let (raw, mut session) = new_session().await;
        session.send_message("Nova").await;
        session.send_message("Sales").await;
        let read = |raw: String| -> crate::drafts::SessionRecord<TwinState> {
            serde_json::from_str(&raw).unwrap()
        };
        let before = read(raw.get_slot("tester", "onboarding_twin").await.unwrap().unwrap());

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let outcome = session.send_message("Skip").await.unwrap();
        assert!(outcome.update.is_empty());

        let after = read(raw.get_slot("tester", "onboarding_twin").await.unwrap().unwrap());
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.state_json, before.state_json);
    }

    #[tokio::test]
    async fn unrecognized_answer_still_advances() {
        let (_, mut session) = new_session().await;
        for answer in ["Nova", "Sales", "Skip", "Friendly"] {
            session.send_message(answer).await;
        }
        let outcome = session.send_message("maybe later").await.unwrap();
        assert!(outcome.update.is_empty());
        assert_eq!(session.current_step().field, StepField::KnowledgeSources);
        assert!(session.state().channels.is_empty());
        assert_eq!(session.completion().completed, 3);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (_, mut session) = new_session().await;
        assert!(session.send_message("   \n").await.is_none());
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn answers_after_done_repeat_terminal_prompt() {
        let (_, mut session) = new_session().await;
        answer_all(&mut session).await;
        let state = session.state().clone();

        let outcome = session.send_message("Rename it to Orion").await.unwrap();
        assert!(outcome.update.is_empty());
        assert_eq!(outcome.step_index, 7);
        assert_eq!(session.state(), &state);
        let last = session.messages().last().unwrap();
        assert_eq!(last.content, TWIN_STEPS[7].prompt);
    }

    #[tokio::test]
    async fn consent_choice_only_at_consent_step() {
        let (_, mut session) = new_session().await;
        let err = session
            .choose_consent(ConsentChoice::Granted)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::NotAtStep {
                expected: "consent".to_string(),
                actual: "twin_name".to_string(),
            }
        );

        for answer in ["Nova", "Sales", "Skip", "Concise", "web", "Skip"] {
            session.send_message(answer).await;
        }
        let outcome = session
            .choose_consent(ConsentChoice::Declined)
            .await
            .unwrap();
        assert_eq!(outcome.update, TwinUpdate::consent(false));
        assert!(outcome.is_done);
        assert!(!session.state().consent);
        assert_eq!(session.messages()[session.messages().len() - 2].content, "No, cancel");
        assert_eq!(session.completion().completed, 4);
    }

    #[tokio::test]
    async fn reset_chat_keeps_state() {
        let (_, mut session) = new_session().await;
        for answer in ["Nova", "Sales", "Skip"] {
            session.send_message(answer).await;
        }
        session.reset_chat();
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert_eq!(session.state().twin_name.as_deref(), Some("Nova"));
    }

    #[tokio::test]
    async fn reset_clears_draft() {
        let (raw, mut session) = new_session().await;
        session.send_message("Nova").await;
        assert!(raw.get_slot("tester", "onboarding_twin").await.unwrap().is_some());

        session.reset().await;
        assert_eq!(session.state(), &TwinState::default());
        assert!(raw.get_slot("tester", "onboarding_twin").await.unwrap().is_none());
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn confirm_requires_all_required_fields() {
        let (_, mut session) = new_session().await;
        session.send_message("Nova").await;
        let err = session.confirm().await.unwrap_err();
        assert_eq!(
            err,
            SessionError::NotReady {
                completed: 1,
                required: 5
            }
        );
    }

    #[tokio::test]
    async fn confirm_clears_everything_but_the_name() {
        let (raw, mut session) = new_session().await;
        session.send_message("Nova & Co").await;
        for answer in ["Sales", "Skip", "Visionary", "voice", "Skip", "yes"] {
            session.send_message(answer).await;
        }

        let confirmation = session.confirm().await.unwrap();
        assert_eq!(confirmation.twin_name, "Nova & Co");
        assert_eq!(
            confirmation.redirect,
            "/onboarding/twin/success?name=Nova%20%26%20Co"
        );
        assert!(raw.get_slot("tester", "onboarding_twin").await.unwrap().is_none());
        assert_eq!(session.state(), &TwinState::default());
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn reopening_resumes_state_but_not_chat() {
        let raw = Arc::new(MemorySlotStore::new());
        let store: Arc<dyn SlotStore> = raw.clone();
        {
            let mut first = InterviewSession::open(store.clone(), "tester").await;
            first.send_message("Nova").await;
            first.send_message("Sales").await;
        }
        let resumed = InterviewSession::open(store, "tester").await;
        assert!(resumed.has_stored_session());
        assert_eq!(resumed.state().use_case.as_deref(), Some("Sales"));
        assert_eq!(resumed.step_index(), 0);
        assert_eq!(resumed.messages().len(), 1);
    }

    #[tokio::test]
    async fn form_edits_skip_the_chat() {
        let (_, mut session) = new_session().await;
        session
            .update_fields(&TwinUpdate {
                preferred_language: Some("de".to_string()),
                channels: Some(vec![Channel::Voice, Channel::Voice]),
                ..Default::default()
            })
            .await;
        assert_eq!(session.state().preferred_language.as_deref(), Some("de"));
        assert_eq!(session.state().channels, vec![Channel::Voice]);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.step_index(), 0);
    }

    #[test]
    fn uri_component_encoding() {
        assert_eq!(encode_uri_component("Nova"), "Nova");
        assert_eq!(encode_uri_component("a b/c?"), "a%20b%2Fc%3F");
        assert_eq!(encode_uri_component("it's (ok)!"), "it's%20(ok)!");
        assert_eq!(encode_uri_component("Zoë"), "Zo%C3%AB");
        assert_eq!(encode_uri_component(""), "");
    }
}
