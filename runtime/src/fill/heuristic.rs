// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page-level filling.
//!
//! [`FieldFiller::plan`] decides, without touching the browser, what to do
//! with one control. [`FieldFiller::fill_page`] enumerates the page, plans
//! every control and executes the plans. A failure on one control is
//! recorded and never stops the others; only a failed enumeration fails
//! the page.

use super::rules::{classify, FillAction};
use crate::config::ApplicantProfile;
use crate::error::ApplyError;
use crate::model::{is_placeholder_option, ControlKind, FormControl, RadioGroup, RadioOption};
use crate::renderer::RenderContext;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Value typed into unlabeled text controls no rule recognizes.
pub const UNLABELED_PLACEHOLDER: &str = "N/A";

/// Browser operation chosen for a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOp {
    Type(String),
    Select(String),
    Check,
    Attach(PathBuf),
}

/// Decision for one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillPlan {
    Act(FillOp),
    /// Left alone on purpose.
    Leave(&'static str),
    /// Labeled, but no rule matched. Surfaced for review, never guessed.
    Unrecognized,
}

/// Result of one per-control operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    Filled(String),
    Skipped(String),
    Failed(ApplyError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReport {
    pub control: String,
    pub outcome: FieldOutcome,
}

/// Summary of one page pass.
#[derive(Debug, Clone, Default)]
pub struct FillReport {
    pub filled: usize,
    /// False only when the page could not be enumerated.
    pub success: bool,
    pub fields: Vec<FieldReport>,
    /// Descriptions of labeled controls no rule recognized.
    pub unrecognized: Vec<String>,
    pub error: Option<ApplyError>,
}

impl FillReport {
    fn aborted(error: ApplyError) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::default()
        }
    }

    fn push(&mut self, control: String, outcome: FieldOutcome) {
        if matches!(outcome, FieldOutcome::Filled(_)) {
            self.filled += 1;
        }
        self.fields.push(FieldReport { control, outcome });
    }
}

/// Fills form controls from an applicant profile.
pub struct FieldFiller<'a> {
    profile: &'a ApplicantProfile,
}

impl<'a> FieldFiller<'a> {
    pub fn new(profile: &'a ApplicantProfile) -> Self {
        Self { profile }
    }

    /// Decide what to do with one control.
    pub fn plan(&self, control: &FormControl) -> FillPlan {
        if !control.enabled {
            return FillPlan::Leave("disabled");
        }
        // File inputs are routinely hidden behind custom upload widgets.
        if !control.visible && control.kind != ControlKind::File {
            return FillPlan::Leave("hidden");
        }
        if control.has_value() {
            return FillPlan::Leave("already filled");
        }

        let rule = control.hints.primary().and_then(classify);
        let labeled = control.hints.is_labeled();

        match control.kind {
            ControlKind::File => FillPlan::Act(FillOp::Attach(self.profile.resume_path.clone())),
            ControlKind::Text | ControlKind::TextArea => match rule.map(|r| r.action) {
                Some(FillAction::Text(field)) => {
                    let value = field.value(self.profile).trim();
                    if value.is_empty() {
                        FillPlan::Leave("no profile value")
                    } else {
                        FillPlan::Act(FillOp::Type(value.to_string()))
                    }
                }
                Some(FillAction::Affirm | FillAction::Check) => {
                    FillPlan::Act(FillOp::Type("Yes".to_string()))
                }
                None if labeled => FillPlan::Unrecognized,
                None => FillPlan::Act(FillOp::Type(UNLABELED_PLACEHOLDER.to_string())),
            },
            ControlKind::Select => {
                let action = rule.map(|r| r.action);
                let preferred = match action {
                    Some(FillAction::Text(field)) => Some(field.value(self.profile)),
                    _ => None,
                };
                match choose_option(&control.options, action, preferred) {
                    Some(option) => FillPlan::Act(FillOp::Select(option)),
                    None if action.is_none() && labeled => FillPlan::Unrecognized,
                    None => FillPlan::Leave("no safe option"),
                }
            }
            ControlKind::Radio | ControlKind::Checkbox => match rule.map(|r| r.action) {
                Some(FillAction::Affirm | FillAction::Check) => FillPlan::Act(FillOp::Check),
                Some(FillAction::Text(_)) => FillPlan::Leave("text rule on a toggle"),
                None if labeled => FillPlan::Unrecognized,
                None => FillPlan::Leave("unlabeled toggle"),
            },
        }
    }

    /// Fill every empty control on the current page.
    pub async fn fill_page(&self, ctx: &dyn RenderContext) -> FillReport {
        let snapshot = match ctx.snapshot().await {
            Ok(s) => s.group_named_radios(),
            Err(e) => {
                let err = ApplyError::EnumerationFailed(format!("{e:#}"));
                warn!("{err}");
                return FillReport::aborted(err);
            }
        };

        let mut report = FillReport {
            success: true,
            ..FillReport::default()
        };

        for group in &snapshot.radio_groups {
            self.fill_radio_group(ctx, group, &mut report).await;
        }

        for control in &snapshot.controls {
            let desc = control.hints.describe();
            let outcome = match self.plan(control) {
                FillPlan::Leave(reason) => FieldOutcome::Skipped(reason.to_string()),
                FillPlan::Unrecognized => {
                    warn!(control = %desc, "unrecognized labeled control left for review");
                    report.unrecognized.push(desc.clone());
                    FieldOutcome::Skipped("unrecognized".to_string())
                }
                FillPlan::Act(op) => match self.execute(ctx, control, &op, &desc).await {
                    Ok(value) => {
                        debug!(control = %desc, %value, "filled");
                        FieldOutcome::Filled(value)
                    }
                    Err(e) => {
                        warn!(control = %desc, "skipping control: {e}");
                        FieldOutcome::Failed(e)
                    }
                },
            };
            report.push(desc, outcome);
        }

        report
    }

    async fn fill_radio_group(
        &self,
        ctx: &dyn RenderContext,
        group: &RadioGroup,
        report: &mut FillReport,
    ) {
        let desc = if group.legend.trim().is_empty() {
            "<radio group>".to_string()
        } else {
            group.legend.trim().to_string()
        };

        if group.any_checked() {
            report.push(desc, FieldOutcome::Skipped("already answered".to_string()));
            return;
        }

        let yes = match answer_group(group) {
            GroupAnswer::Yes(yes) => yes,
            GroupAnswer::YesUnavailable => {
                warn!(control = %desc, "\"Yes\" option is hidden or disabled; group left unanswered");
                report.push(desc, FieldOutcome::Skipped("yes option not interactable".to_string()));
                return;
            }
            GroupAnswer::Unknown => {
                warn!(control = %desc, "radio group is not a yes/no question; left for review");
                report.unrecognized.push(desc.clone());
                report.push(desc, FieldOutcome::Skipped("unrecognized".to_string()));
                return;
            }
        };

        let outcome = match ctx.check(&yes.handle).await {
            Ok(()) => FieldOutcome::Filled("Yes".to_string()),
            Err(e) => {
                let err = not_interactable(&desc, &e);
                warn!(control = %desc, "skipping radio group: {err}");
                FieldOutcome::Failed(err)
            }
        };
        report.push(desc, outcome);
    }

    async fn execute(
        &self,
        ctx: &dyn RenderContext,
        control: &FormControl,
        op: &FillOp,
        desc: &str,
    ) -> Result<String, ApplyError> {
        let handle = &control.handle;
        let result = match op {
            FillOp::Type(value) => ctx.fill(handle, value).await.map(|()| value.clone()),
            FillOp::Select(option) => ctx
                .select_option(handle, option)
                .await
                .map(|()| option.clone()),
            FillOp::Check => ctx.check(handle).await.map(|()| "checked".to_string()),
            FillOp::Attach(path) => {
                if !path.exists() {
                    return Err(ApplyError::ResumeMissing(path.clone()));
                }
                ctx.set_files(handle, path)
                    .await
                    .map(|()| path.display().to_string())
            }
        };
        result.map_err(|e| not_interactable(desc, &e))
    }
}

fn not_interactable(desc: &str, err: &anyhow::Error) -> ApplyError {
    match ApplyError::classify(err) {
        ApplyError::Browser(reason) => ApplyError::ControlNotInteractable {
            control: desc.to_string(),
            reason,
        },
        other => other,
    }
}

/// How an unanswered radio group can be answered.
#[derive(Debug, PartialEq)]
pub enum GroupAnswer<'a> {
    Yes(&'a RadioOption),
    /// A "Yes" option exists but is hidden or disabled.
    YesUnavailable,
    Unknown,
}

/// Find the "Yes" radio of a group.
///
/// A group of exactly "Yes" and "No" is answered "Yes" whatever it asks.
/// A group whose legend matches an authorization or relocation rule takes
/// the first option starting with "Yes". Only one radio is ever chosen.
pub fn answer_group(group: &RadioGroup) -> GroupAnswer<'_> {
    let exact = |want: &str| group.options.iter().find(|o| o.label.trim() == want);
    let yes_no = group.options.len() == 2 && exact("No").is_some();
    let yes = match exact("Yes") {
        Some(yes) if yes_no => Some(yes),
        _ if affirms(&group.legend) => group
            .options
            .iter()
            .find(|o| o.label.trim().to_lowercase().starts_with("yes")),
        _ => None,
    };
    match yes {
        Some(option) if option.visible && option.enabled => GroupAnswer::Yes(option),
        Some(_) => GroupAnswer::YesUnavailable,
        None => GroupAnswer::Unknown,
    }
}

fn affirms(question: &str) -> bool {
    classify(question.trim())
        .is_some_and(|rule| matches!(rule.action, FillAction::Affirm | FillAction::Check))
}

/// Pick the option to select in an empty select control.
///
/// Order: a literal "Yes"; the rule's own value; "No" when the rule expects
/// a yes/no answer; the second option of a menu that does not open with a
/// placeholder. Anything else stays unset.
pub fn choose_option(
    options: &[String],
    action: Option<FillAction>,
    preferred: Option<&str>,
) -> Option<String> {
    let find = |want: &str| {
        options
            .iter()
            .find(|o| o.trim().eq_ignore_ascii_case(want))
            .cloned()
    };

    if let Some(yes) = find("Yes") {
        return Some(yes);
    }
    if let Some(value) = preferred.map(str::trim).filter(|v| !v.is_empty()) {
        if let Some(option) = find(value) {
            return Some(option);
        }
    }
    if action.is_some_and(|a| a.expects_boolean()) {
        if let Some(no) = find("No") {
            return Some(no);
        }
    }
    match options {
        [first, second, ..] if !is_placeholder_option(first) => Some(second.clone()),
        _ => None,
    }
}
