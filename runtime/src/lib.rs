// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! autoapply runtime library: browser-driven job application runner.
//!
//! Listing sources produce job listings; indirect listings are resolved to
//! a provider form; the flow navigator fills and advances the form page by
//! page; every attempt ends in exactly one logged record.

#![allow(clippy::new_without_default)]

pub mod cli;
pub mod config;
pub mod error;
pub mod fill;
pub mod flow;
pub mod journal;
pub mod listing;
pub mod locate;
pub mod model;
pub mod orchestrator;
pub mod renderer;
pub mod rest;
