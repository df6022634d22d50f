//! Automation state shared by the creation and onboarding machines.

use autopilot_types::{QuestStep, SpellId, StepId};

/// Phase of the session automation.
///
/// `Inactive -> CreationPending -> Created -> TutorialActive -> Inactive`.
/// A rejected creation or a reset also returns to `Inactive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing in progress.
    #[default]
    Inactive,
    /// A creation request is being prepared or awaits its result.
    CreationPending,
    /// The server confirmed the creation.
    Created,
    /// The onboarding quest is being walked.
    TutorialActive,
}

/// Onboarding progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationContext {
    /// The onboarding quest is being walked.
    pub active: bool,
    /// Steps entered so far. Only grows while `active`.
    pub step_number: u32,
    /// Identity of the last step entered, used to drop re-deliveries.
    pub last_step_id: Option<StepId>,
    /// Position inside the equip batch.
    pub batch_cursor: u32,
}

/// Mutable automation state of one session.
#[derive(Debug, Clone, Default)]
pub(crate) struct AutomationState {
    pub(crate) phase: Phase,
    pub(crate) context: AutomationContext,
    pub(crate) current_step: Option<QuestStep>,
    /// Follow-ups of the current step that already ran.
    pub(crate) fired: Vec<usize>,
    pub(crate) created: bool,
    pub(crate) name_attempts: u32,
}

/// Last budgets the opportunistic allocator acted on, so an unchanged
/// re-delivery does not resend the same spend.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpendGuard {
    pub(crate) stat: Option<(u32, u32)>,
    pub(crate) spells: Option<(u32, u32, Vec<(SpellId, u8)>)>,
}
