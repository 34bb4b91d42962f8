// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Application flow: page-by-page wizard navigation and indirect URL
//! resolution.

pub mod navigator;
pub mod resolve;

pub use navigator::{
    ApplicationFlowState, FlowControls, FlowNavigator, FlowOptions, FlowOutcome, FlowState,
};
pub use resolve::UrlResolver;
