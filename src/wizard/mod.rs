//! Step navigation for the sniping wizards.
//!
//! Both wizard variants are one state machine parameterised by a
//! [`WizardLayout`]: an ordered step list plus mode-dependent skip rules.
//! Navigation never checks readiness; that is what [`gates`] is for.

pub mod gates;
pub mod presets;

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::fault::InsufficientFundsFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    Introduction,
    ModeSelection,
    PresetConfiguration,
    LiquidityManagement,
    WalletSetup,
    SnipeConfiguration,
    FeeDistribution,
    Simulation,
    Execution,
    PostOperation,
}

impl WizardStep {
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Introduction => "Introduction",
            WizardStep::ModeSelection => "Mode Selection",
            WizardStep::PresetConfiguration => "Preset Configuration",
            WizardStep::LiquidityManagement => "Liquidity Management",
            WizardStep::WalletSetup => "Wallet Setup",
            WizardStep::SnipeConfiguration => "Snipe Configuration",
            WizardStep::FeeDistribution => "Fee Distribution",
            WizardStep::Simulation => "Simulation",
            WizardStep::Execution => "Execution",
            WizardStep::PostOperation => "Post Operation",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardMode {
    Preset,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// "In `mode`, moving `direction` from `from` lands on `to`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipRule {
    pub mode: WizardMode,
    pub direction: Direction,
    pub from: WizardStep,
    pub to: WizardStep,
}

const ADVANCED_SKIPS: &[SkipRule] = &[
    SkipRule {
        mode: WizardMode::Advanced,
        direction: Direction::Forward,
        from: WizardStep::ModeSelection,
        to: WizardStep::LiquidityManagement,
    },
    SkipRule {
        mode: WizardMode::Advanced,
        direction: Direction::Backward,
        from: WizardStep::LiquidityManagement,
        to: WizardStep::ModeSelection,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardLayout {
    pub name: &'static str,
    pub steps: &'static [WizardStep],
    pub skip_rules: &'static [SkipRule],
    /// Whether the layout offers the Preset/Advanced choice.
    pub offers_modes: bool,
}

impl WizardLayout {
    /// Nine-step bundle variant with the Preset/Advanced choice.
    pub const fn bundle_sniping() -> Self {
        WizardLayout {
            name: "Bundle Sniping",
            steps: &[
                WizardStep::Introduction,
                WizardStep::ModeSelection,
                WizardStep::PresetConfiguration,
                WizardStep::LiquidityManagement,
                WizardStep::WalletSetup,
                WizardStep::FeeDistribution,
                WizardStep::Simulation,
                WizardStep::Execution,
                WizardStep::PostOperation,
            ],
            skip_rules: ADVANCED_SKIPS,
            offers_modes: true,
        }
    }

    /// Eight-step variant without modes.
    pub const fn snipe() -> Self {
        WizardLayout {
            name: "Snipe",
            steps: &[
                WizardStep::Introduction,
                WizardStep::LiquidityManagement,
                WizardStep::WalletSetup,
                WizardStep::SnipeConfiguration,
                WizardStep::FeeDistribution,
                WizardStep::Simulation,
                WizardStep::Execution,
                WizardStep::PostOperation,
            ],
            skip_rules: &[],
            offers_modes: false,
        }
    }

    pub fn first_step(&self) -> WizardStep {
        self.steps.first().copied().unwrap_or(WizardStep::Introduction)
    }

    pub fn last_step(&self) -> WizardStep {
        self.steps.last().copied().unwrap_or(WizardStep::PostOperation)
    }

    pub fn contains(&self, step: WizardStep) -> bool {
        self.steps.contains(&step)
    }

    pub fn position(&self, step: WizardStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    fn skip_target(&self, mode: WizardMode, direction: Direction, from: WizardStep) -> Option<WizardStep> {
        if !self.offers_modes {
            return None;
        }
        self.skip_rules
            .iter()
            .find(|r| r.mode == mode && r.direction == direction && r.from == from && self.contains(r.to))
            .map(|r| r.to)
    }

    /// Step reached by moving from `from`; `None` at the boundary.
    pub fn neighbour(&self, mode: WizardMode, direction: Direction, from: WizardStep) -> Option<WizardStep> {
        if let Some(to) = self.skip_target(mode, direction, from) {
            return Some(to);
        }
        let index = self.position(from)?;
        match direction {
            Direction::Forward => self.steps.get(index + 1).copied(),
            Direction::Backward => index.checked_sub(1).and_then(|i| self.steps.get(i).copied()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    layout: WizardLayout,
    current_step: WizardStep,
    mode: WizardMode,
    pub insufficient_funds_fault: Option<InsufficientFundsFault>,
    /// Set by a successful simulation, cleared whenever the estimate is discarded.
    pub simulation_passed: bool,
    pub executed: bool,
}

impl WizardSession {
    pub fn new(layout: WizardLayout) -> Self {
        WizardSession {
            layout,
            current_step: layout.first_step(),
            mode: WizardMode::Preset,
            insufficient_funds_fault: None,
            simulation_passed: false,
            executed: false,
        }
    }

    pub fn layout(&self) -> &WizardLayout {
        &self.layout
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: WizardMode) {
        if self.layout.offers_modes {
            self.mode = mode;
        }
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == self.layout.first_step()
    }

    pub fn is_terminal(&self) -> bool {
        self.current_step == self.layout.last_step()
    }

    /// Moves forward one step, honouring skip rules. No-op on the last step.
    pub fn advance(&mut self) -> WizardStep {
        self.step(Direction::Forward)
    }

    /// Moves back one step, honouring skip rules. No-op on the first step.
    pub fn retreat(&mut self) -> WizardStep {
        self.step(Direction::Backward)
    }

    fn step(&mut self, direction: Direction) -> WizardStep {
        if let Some(next) = self.layout.neighbour(self.mode, direction, self.current_step) {
            debug!("{}: {} -> {}", self.layout.name, self.current_step, next);
            self.current_step = next;
        }
        self.current_step
    }

    /// Direct transition; refused for steps outside the layout.
    pub fn jump_to(&mut self, step: WizardStep) -> bool {
        if !self.layout.contains(step) {
            return false;
        }
        debug!("{}: jump {} -> {}", self.layout.name, self.current_step, step);
        self.current_step = step;
        true
    }

    /// 1-based position for "Step n of m" displays.
    pub fn progress(&self) -> (usize, usize) {
        let index = self.layout.position(self.current_step).unwrap_or(0);
        (index + 1, self.layout.steps.len())
    }
}

/// Open/closed holder for a per-dialog session. Opening from closed builds a
/// fresh session; closing drops it, so nothing survives between openings.
#[derive(Debug)]
pub struct WizardDialog<T> {
    session: Option<T>,
}

impl<T> Default for WizardDialog<T> {
    fn default() -> Self {
        WizardDialog { session: None }
    }
}

impl<T> WizardDialog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Opens the dialog, building the session with `create` only on the
    /// closed-to-open transition.
    pub fn open_with(&mut self, create: impl FnOnce() -> T) -> &mut T {
        self.session.get_or_insert_with(create)
    }

    pub fn close(&mut self) -> Option<T> {
        self.session.take()
    }

    pub fn session(&self) -> Option<&T> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut T> {
        self.session.as_mut()
    }
}
