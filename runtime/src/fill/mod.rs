// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Field-fill heuristic: classify every empty control on a page and assign
//! it a value from the applicant profile.

pub mod heuristic;
pub mod rules;

pub use heuristic::{FieldFiller, FieldOutcome, FieldReport, FillPlan, FillReport};
pub use rules::{classify, FillAction, FillRule, ProfileField};
