//! Reveal state machine.
//!
//! Owns the draw flow: which step is current, which is displayed, what
//! has been revealed so far, and the slot-machine animation that picks
//! the next step. The machine is pure state: time comes in as
//! [`Instant`] arguments, randomness as an injected [`Rng`], and
//! persistence is the driver's job (it saves progress when a tick
//! reports [`TickOutcome::Revealed`]).
//!
//! Animation is tick-driven. A reveal spins for `spin_ticks` ticks,
//! each showing a random step, then holds the final candidate for
//! `settle_ticks` ticks before committing to the real target.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::Deserialize;
use tracing::warn;

use crate::errors::Error;
use crate::models::step::sort_by_ordinal;
use crate::models::{ProgressRecord, Step};

/// Which step a successful draw reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealRule {
    /// The strict successor of the current step, and only if unlocked.
    #[default]
    NextInOrder,
    /// The highest unlocked step past the current one, skipping gaps.
    HighestUnlocked,
}

/// Animation and rule knobs, already converted to tick counts.
#[derive(Debug, Clone)]
pub struct RevealParams {
    pub rule: RevealRule,
    pub spin_ticks: u32,
    pub settle_ticks: u32,
    pub banner: Duration,
}

impl Default for RevealParams {
    fn default() -> Self {
        RevealParams {
            rule: RevealRule::default(),
            spin_ticks: crate::models::constants::DEFAULT_SPIN_TICKS,
            settle_ticks: (crate::models::constants::DEFAULT_SETTLE_MS
                / crate::models::constants::DEFAULT_TICK_MS) as u32,
            banner: Duration::from_secs(crate::models::constants::DEFAULT_BANNER_SECS),
        }
    }
}

/// Where the machine is in the draw animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Cycling random steps; counts down to the settle hold.
    Rolling { ticks_left: u32 },
    /// Holding the last candidate before the commit.
    Settling { ticks_left: u32 },
}

/// What a reveal request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawAttempt {
    Started,
    /// An animation is already running; the request was dropped.
    AlreadyRolling,
    /// Nothing is revealable; an error banner was raised.
    Locked,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    /// Spin tick: the display moved to a random step.
    Spinning,
    /// Settle tick: the display is holding the final candidate.
    Settling,
    /// The draw committed. The driver should persist this step id.
    Revealed { step_id: String },
    /// The animation finished but no target was revealable anymore.
    Abandoned,
}

struct Banner {
    message: String,
    until: Instant,
}

pub struct RevealMachine {
    params: RevealParams,
    steps: Vec<Step>,
    current: Option<String>,
    display: Option<String>,
    history: Vec<String>,
    phase: Phase,
    next_ready: bool,
    banner: Option<Banner>,
}

impl RevealMachine {
    /// Builds the machine from a step snapshot and the persisted
    /// progress, if any.
    ///
    /// With progress pointing at a known step, that step becomes
    /// current and every step up to and including it counts as already
    /// revealed. Without usable progress the first unlocked step
    /// becomes current with an empty history.
    pub fn new(params: RevealParams, mut steps: Vec<Step>, progress: Option<ProgressRecord>) -> Self {
        sort_by_ordinal(&mut steps);

        let mut current = None;
        let mut history = Vec::new();
        if let Some(record) = progress {
            match steps
                .iter()
                .position(|s| s.id == record.last_drawn_step_id)
            {
                Some(pos) => {
                    current = Some(steps[pos].id.clone());
                    history = steps[..=pos].iter().map(|s| s.id.clone()).collect();
                }
                None => {
                    warn!(
                        "progress points at unknown step {}, starting fresh",
                        record.last_drawn_step_id
                    );
                }
            }
        }
        if current.is_none() {
            current = steps.iter().find(|s| s.is_unlocked).map(|s| s.id.clone());
        }

        let mut machine = RevealMachine {
            params,
            steps,
            display: current.clone(),
            current,
            history,
            phase: Phase::Idle,
            next_ready: false,
            banner: None,
        };
        machine.recompute_ready();
        machine
    }

    /// Asks for a draw. Rejections while locked raise the banner;
    /// requests during an animation are dropped silently.
    pub fn request_reveal(&mut self, now: Instant) -> DrawAttempt {
        if self.phase != Phase::Idle {
            return DrawAttempt::AlreadyRolling;
        }
        if !self.next_ready {
            self.show_error(Error::NextStepLocked.to_string(), now);
            return DrawAttempt::Locked;
        }
        self.banner = None;
        self.phase = Phase::Rolling {
            ticks_left: self.params.spin_ticks,
        };
        DrawAttempt::Started
    }

    /// Advances the animation by one tick and expires the banner.
    pub fn on_tick<R: Rng>(&mut self, now: Instant, rng: &mut R) -> TickOutcome {
        if let Some(banner) = &self.banner {
            if now >= banner.until {
                self.banner = None;
            }
        }

        match self.phase {
            Phase::Idle => TickOutcome::Idle,
            Phase::Rolling { ticks_left } => {
                if self.steps.is_empty() {
                    return self.abandon();
                }
                if ticks_left > 0 {
                    let pick = rng.gen_range(0..self.steps.len());
                    self.display = Some(self.steps[pick].id.clone());
                    self.phase = Phase::Rolling {
                        ticks_left: ticks_left - 1,
                    };
                    TickOutcome::Spinning
                } else {
                    self.phase = Phase::Settling {
                        ticks_left: self.params.settle_ticks,
                    };
                    TickOutcome::Settling
                }
            }
            Phase::Settling { ticks_left } => {
                let ticks_left = ticks_left.saturating_sub(1);
                if ticks_left > 0 {
                    self.phase = Phase::Settling { ticks_left };
                    return TickOutcome::Settling;
                }
                self.commit()
            }
        }
    }

    /// Applies a fresh step snapshot from the store.
    ///
    /// While an animation is running the display is left alone; it
    /// belongs to the animation until the commit. The current step is
    /// re-resolved when it got locked out from under us: it moves back
    /// to the highest step that is still unlocked.
    pub fn sync_steps(&mut self, mut steps: Vec<Step>) {
        sort_by_ordinal(&mut steps);
        self.steps = steps;

        let still_good = self
            .current_step()
            .map(|step| step.is_unlocked)
            .unwrap_or(false);
        if !still_good {
            let replacement = if self.current.is_some() {
                self.highest_unlocked().map(|s| s.id.clone())
            } else {
                self.first_unlocked().map(|s| s.id.clone())
            };
            self.current = replacement;
        }
        if self.phase == Phase::Idle {
            self.display = self.current.clone();
        }
        self.recompute_ready();
    }

    /// Raises the transient error banner.
    pub fn show_error(&mut self, message: impl Into<String>, now: Instant) {
        self.banner = Some(Banner {
            message: message.into(),
            until: now + self.params.banner,
        });
    }

    /// The banner text, if one is showing at `now`.
    pub fn banner(&self, now: Instant) -> Option<&str> {
        self.banner
            .as_ref()
            .filter(|banner| now < banner.until)
            .map(|banner| banner.message.as_str())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.step_by_id(self.current.as_deref()?)
    }

    pub fn display_step(&self) -> Option<&Step> {
        self.step_by_id(self.display.as_deref()?)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn next_ready(&self) -> bool {
        self.next_ready
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True from the moment a draw starts until it commits or gives up.
    pub fn is_rolling(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Whether this step was already revealed.
    pub fn is_revealed(&self, step_id: &str) -> bool {
        self.history.iter().any(|id| id == step_id)
            || self.current.as_deref() == Some(step_id)
    }

    fn commit(&mut self) -> TickOutcome {
        self.phase = Phase::Idle;
        let target = match self.reveal_target() {
            Some(step) => step.id.clone(),
            None => return self.abandon(),
        };
        self.current = Some(target.clone());
        self.display = Some(target.clone());
        self.history.push(target.clone());
        self.recompute_ready();
        TickOutcome::Revealed { step_id: target }
    }

    /// Ends the animation without revealing anything.
    fn abandon(&mut self) -> TickOutcome {
        self.phase = Phase::Idle;
        self.display = self.current.clone();
        self.recompute_ready();
        TickOutcome::Abandoned
    }

    fn recompute_ready(&mut self) {
        self.next_ready = self.reveal_target().is_some();
    }

    /// The step a draw would reveal right now, per the configured rule.
    fn reveal_target(&self) -> Option<&Step> {
        match self.params.rule {
            RevealRule::NextInOrder => match self.current_step() {
                Some(current) => {
                    let next = ordinal_of(current).checked_add(1)?;
                    self.steps
                        .iter()
                        .find(|s| s.ordinal() == Some(next) && s.is_unlocked)
                }
                None => self.first_unlocked(),
            },
            RevealRule::HighestUnlocked => {
                let highest = self.highest_unlocked()?;
                match self.current_step() {
                    Some(current) if ordinal_of(highest) <= ordinal_of(current) => None,
                    _ => Some(highest),
                }
            }
        }
    }

    fn step_by_id(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    fn first_unlocked(&self) -> Option<&Step> {
        self.steps.iter().find(|s| s.is_unlocked)
    }

    fn highest_unlocked(&self) -> Option<&Step> {
        self.steps.iter().rev().find(|s| s.is_unlocked)
    }
}

fn ordinal_of(step: &Step) -> u64 {
    step.ordinal().unwrap_or(u64::MAX)
}
