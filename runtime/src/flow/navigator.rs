// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Multi-step application wizard driver.
//!
//! ```text
//! Filling ──submit──▶ Submitted
//!    │ ──review──▶ Reviewing ──▶ Filling
//!    │ ──next────▶ Advancing ──▶ Filling
//!    │ ──none────▶ Blocked
//!    └ step limit ▶ LimitExceeded
//! ```
//!
//! Submit beats review, review beats next. Every click is followed by a
//! wait for the page to settle before the next inspection.

use crate::config::{AppConfig, ApplicantProfile};
use crate::error::ApplyError;
use crate::fill::FieldFiller;
use crate::locate::Locator;
use crate::model::ApplicationStatus;
use crate::renderer::{ControlQuery, RenderContext};
use serde::Serialize;
use tracing::{debug, info, warn};

/// States of one application attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowState {
    Filling,
    Reviewing,
    Advancing,
    Submitted,
    Blocked,
    LimitExceeded,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted | Self::Blocked | Self::LimitExceeded)
    }

    /// Logged status for a terminal state.
    pub fn status(&self) -> ApplicationStatus {
        match self {
            Self::Submitted => ApplicationStatus::Applied,
            _ => ApplicationStatus::Failed,
        }
    }
}

/// Step counter for one attempt. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicationFlowState {
    current_step: u32,
    max_steps: u32,
    terminal: bool,
}

impl ApplicationFlowState {
    pub fn new(max_steps: u32) -> Self {
        Self {
            current_step: 0,
            max_steps,
            terminal: false,
        }
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Claim the next advancing transition.
    pub fn advance(&mut self) -> Result<u32, ApplyError> {
        if self.terminal || self.current_step >= self.max_steps {
            return Err(ApplyError::FlowExhausted {
                steps: self.current_step,
            });
        }
        self.current_step += 1;
        Ok(self.current_step)
    }

    pub fn finish(&mut self) {
        self.terminal = true;
    }
}

/// Navigation controls of one site's application wizard.
#[derive(Debug, Clone)]
pub struct FlowControls {
    pub submit: Locator,
    pub review: Locator,
    pub next: Locator,
    /// Optional autofill helper clicked once before the first fill.
    pub autofill: Option<Locator>,
    /// Optional proof of submission awaited after the submit click.
    pub confirmation: Option<Locator>,
}

impl FlowControls {
    /// Plain HTML forms.
    pub fn generic() -> Self {
        Self {
            submit: Locator::new(
                "submit",
                vec![
                    ControlQuery::css("button[type='submit']"),
                    ControlQuery::css("input[type='submit']"),
                    ControlQuery::button("Submit"),
                ],
            ),
            review: Locator::new("review", vec![ControlQuery::button("Review")]),
            next: Locator::new(
                "next",
                vec![ControlQuery::button("Next"), ControlQuery::button("Continue")],
            ),
            autofill: None,
            confirmation: None,
        }
    }

    /// LinkedIn Easy Apply modal.
    pub fn linkedin() -> Self {
        Self {
            submit: Locator::new(
                "submit",
                vec![
                    ControlQuery::css("button[aria-label='Submit application']"),
                    ControlQuery::button("Submit application"),
                ],
            ),
            review: Locator::new(
                "review",
                vec![
                    ControlQuery::css("button[aria-label='Review your application']"),
                    ControlQuery::button("Review"),
                ],
            ),
            next: Locator::new(
                "next",
                vec![
                    ControlQuery::css("button[data-easy-apply-next-button]"),
                    ControlQuery::css("button[aria-label='Continue to next step']"),
                    ControlQuery::button("Next"),
                ],
            ),
            autofill: None,
            confirmation: None,
        }
    }

    /// Greenhouse hosted application form.
    pub fn greenhouse() -> Self {
        Self {
            autofill: Some(Locator::new(
                "autofill",
                vec![
                    ControlQuery::css("#fill-button"),
                    ControlQuery::text("Autofill this page"),
                ],
            )),
            confirmation: Some(Locator::new(
                "confirmation",
                vec![ControlQuery::text("Your application has been submitted")],
            )),
            ..Self::generic()
        }
    }
}

/// Wait budgets for the navigator.
#[derive(Debug, Clone, Copy)]
pub struct FlowOptions {
    pub max_steps: u32,
    pub navigation_timeout_ms: u64,
    pub probe_timeout_ms: u64,
}

impl FlowOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_steps: config.flow.max_steps,
            navigation_timeout_ms: config.timeouts.navigation_ms,
            probe_timeout_ms: config.timeouts.probe_ms,
        }
    }
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            max_steps: 10,
            navigation_timeout_ms: 30_000,
            probe_timeout_ms: 5_000,
        }
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, Serialize)]
pub struct FlowOutcome {
    /// Terminal state.
    pub state: FlowState,
    /// Every state entered, in order.
    pub transitions: Vec<FlowState>,
    pub steps: u32,
    pub fields_filled: usize,
    pub unrecognized: Vec<String>,
    pub reason: String,
}

impl FlowOutcome {
    pub fn status(&self) -> ApplicationStatus {
        self.state.status()
    }

    /// Count of transitions into `state`.
    pub fn count(&self, state: FlowState) -> usize {
        self.transitions.iter().filter(|s| **s == state).count()
    }

    /// Notes string for the result log.
    pub fn notes(&self) -> String {
        let mut notes = self.reason.clone();
        if !self.unrecognized.is_empty() {
            notes.push_str(&format!(
                " (unrecognized fields: {})",
                self.unrecognized.join("; ")
            ));
        }
        notes
    }
}

/// Drives one application attempt page by page.
pub struct FlowNavigator<'a> {
    filler: FieldFiller<'a>,
    controls: &'a FlowControls,
    options: FlowOptions,
}

struct Run {
    state: ApplicationFlowState,
    transitions: Vec<FlowState>,
    fields_filled: usize,
    unrecognized: Vec<String>,
}

impl Run {
    fn enter(&mut self, state: FlowState) {
        debug!(?state, step = self.state.current_step(), "flow transition");
        self.transitions.push(state);
    }

    fn end(mut self, state: FlowState, reason: impl Into<String>) -> FlowOutcome {
        self.enter(state);
        self.state.finish();
        let reason = reason.into();
        match state {
            FlowState::Submitted => info!(steps = self.state.current_step(), "{reason}"),
            _ => warn!(steps = self.state.current_step(), ?state, "{reason}"),
        }
        FlowOutcome {
            state,
            transitions: self.transitions,
            steps: self.state.current_step(),
            fields_filled: self.fields_filled,
            unrecognized: self.unrecognized,
            reason,
        }
    }
}

impl<'a> FlowNavigator<'a> {
    pub fn new(profile: &'a ApplicantProfile, controls: &'a FlowControls, options: FlowOptions) -> Self {
        Self {
            filler: FieldFiller::new(profile),
            controls,
            options,
        }
    }

    /// Run the wizard on an already loaded page until a terminal state.
    pub async fn run(&self, ctx: &mut dyn RenderContext) -> FlowOutcome {
        let mut run = Run {
            state: ApplicationFlowState::new(self.options.max_steps),
            transitions: Vec::new(),
            fields_filled: 0,
            unrecognized: Vec::new(),
        };

        self.trigger_autofill(ctx).await;

        loop {
            run.enter(FlowState::Filling);
            let report = self.filler.fill_page(&*ctx).await;
            run.fields_filled += report.filled;
            run.unrecognized.extend(report.unrecognized);
            if !report.success {
                let reason = report
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "control enumeration failed".to_string());
                return run.end(FlowState::Blocked, reason);
            }

            if let Some(submit) = self.controls.submit.find(&*ctx).await {
                if let Err(e) = ctx.click(&submit.handle).await {
                    let err = ApplyError::ControlNotInteractable {
                        control: "submit".to_string(),
                        reason: format!("{e:#}"),
                    };
                    return run.end(FlowState::Blocked, err.to_string());
                }
                if let Err(e) = ctx.wait_for_navigation(self.options.navigation_timeout_ms).await {
                    debug!("post-submit settle: {e:#}");
                }
                if let Some(confirmation) = &self.controls.confirmation {
                    if confirmation
                        .wait(&*ctx, self.options.probe_timeout_ms)
                        .await
                        .is_none()
                    {
                        return run.end(FlowState::Blocked, "Submit confirmation not found");
                    }
                }
                return run.end(FlowState::Submitted, "Application submitted successfully");
            }

            let (next_state, control) =
                if let Some(review) = self.controls.review.find(&*ctx).await {
                    (FlowState::Reviewing, review)
                } else if let Some(next) = self.controls.next.find(&*ctx).await {
                    (FlowState::Advancing, next)
                } else {
                    return run.end(FlowState::Blocked, "no navigation controls");
                };

            if run.state.advance().is_err() {
                return run.end(FlowState::LimitExceeded, "step limit exceeded");
            }
            run.enter(next_state);

            if let Err(e) = ctx.click(&control.handle).await {
                let err = ApplyError::ControlNotInteractable {
                    control: format!("{next_state:?}"),
                    reason: format!("{e:#}"),
                };
                return run.end(FlowState::Blocked, err.to_string());
            }
            if let Err(e) = ctx.wait_for_navigation(self.options.navigation_timeout_ms).await {
                return run.end(FlowState::Blocked, ApplyError::classify(&e).to_string());
            }
        }
    }

    async fn trigger_autofill(&self, ctx: &mut dyn RenderContext) {
        let Some(autofill) = &self.controls.autofill else {
            return;
        };
        match autofill.wait(&*ctx, self.options.probe_timeout_ms).await {
            Some(button) => {
                info!("clicking autofill helper");
                if let Err(e) = ctx.click(&button.handle).await {
                    debug!("autofill helper not clickable: {e:#}");
                    return;
                }
                let _ = ctx.wait_for_navigation(self.options.probe_timeout_ms).await;
            }
            None => debug!("no autofill helper; assuming fields are ours to fill"),
        }
    }
}
