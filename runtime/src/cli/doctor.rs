// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use crate::cli::output::{self, Styled};
use crate::config::AppConfig;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;

/// Check Chromium, configuration, resume file and result log location.
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let s = Styled::new();
    let (config, source) = AppConfig::load(config_path)?;

    let chromium = find_chromium(config.browser.chromium_path.as_deref());
    let resume_ok = config.profile.resume_path.is_file();
    let log_path = config.log_path();
    let log_dir_ok = log_path
        .parent()
        .map(|p| p.as_os_str().is_empty() || p.is_dir() || std::fs::create_dir_all(p).is_ok())
        .unwrap_or(true);
    let airtable_ok = !config.listing.airtable.api_key.is_empty();
    let profile_ok = !config.profile.full_name.is_empty() && !config.profile.email.is_empty();
    let ready = chromium.is_some() && resume_ok;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "chromium": chromium.as_ref().map(|p| p.display().to_string()),
            "config": source.as_ref().map(|p| p.display().to_string()),
            "resume": config.profile.resume_path.display().to_string(),
            "resume_found": resume_ok,
            "profile_complete": profile_ok,
            "airtable_key": airtable_ok,
            "log_path": log_path.display().to_string(),
            "log_dir_writable": log_dir_ok,
            "ready": ready,
        }));
        return Ok(());
    }

    println!("{}", s.bold("autoapply doctor"));
    println!("================");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    match &chromium {
        Some(path) => println!("{} Chromium found: {}", s.ok_sym(), path.display()),
        None => println!(
            "{} Chromium NOT found. Install Chrome or set AUTOAPPLY_CHROMIUM_PATH.",
            s.fail_sym()
        ),
    }
    match &source {
        Some(path) => println!("{} Config: {}", s.ok_sym(), path.display()),
        None => println!("{} No config file; using built-in defaults", s.warn_sym()),
    }
    if profile_ok {
        println!("{} Applicant profile: {}", s.ok_sym(), config.profile.full_name);
    } else {
        println!("{} Applicant profile incomplete (name/email empty)", s.warn_sym());
    }
    if resume_ok {
        println!("{} Resume: {}", s.ok_sym(), config.profile.resume_path.display());
    } else {
        println!(
            "{} Resume NOT found: {}",
            s.fail_sym(),
            config.profile.resume_path.display()
        );
    }
    if airtable_ok {
        println!("{} Airtable API key set", s.ok_sym());
    } else {
        println!("{} AIRTABLE_API_KEY not set (provider runs unavailable)", s.warn_sym());
    }
    if log_dir_ok {
        println!("{} Result log: {}", s.ok_sym(), log_path.display());
    } else {
        println!("{} Result log directory not writable: {}", s.fail_sym(), log_path.display());
    }

    println!();
    if ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }
    Ok(())
}
