// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! The classification table: ordered (hint pattern → action) rules.
//!
//! Rules are evaluated top to bottom against a control's primary hint; the
//! first match wins. The table is static for the lifetime of the process.

use crate::config::ApplicantProfile;
use regex::Regex;
use std::sync::OnceLock;

/// Applicant detail a text rule types into the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FullName,
    Email,
    Phone,
    LinkedIn,
    GitHub,
    Website,
    ExpectedSalary,
    YearsExperience,
    City,
}

impl ProfileField {
    pub fn value<'p>(&self, profile: &'p ApplicantProfile) -> &'p str {
        match self {
            Self::FullName => &profile.full_name,
            Self::Email => &profile.email,
            Self::Phone => &profile.phone,
            Self::LinkedIn => &profile.linkedin_url,
            Self::GitHub => &profile.github_url,
            Self::Website => &profile.website_url,
            Self::ExpectedSalary => &profile.expected_salary,
            Self::YearsExperience => &profile.years_experience,
            Self::City => &profile.city,
        }
    }
}

/// What a matched rule does to its control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillAction {
    /// Type a profile value.
    Text(ProfileField),
    /// Answer "Yes": check a radio, type "Yes", or pick the "Yes" option.
    Affirm,
    /// Tick the control (boolean true).
    Check,
}

impl FillAction {
    /// Whether the control is expected to take a yes/no answer.
    pub fn expects_boolean(&self) -> bool {
        matches!(self, Self::Affirm | Self::Check)
    }
}

#[derive(Debug)]
pub struct FillRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub action: FillAction,
}

impl FillRule {
    pub fn matches(&self, hint: &str) -> bool {
        self.pattern.is_match(hint)
    }
}

const TABLE: &[(&str, &str, FillAction)] = &[
    ("name", r"(?i)name", FillAction::Text(ProfileField::FullName)),
    ("email", r"(?i)e-?mail", FillAction::Text(ProfileField::Email)),
    ("phone", r"(?i)phone", FillAction::Text(ProfileField::Phone)),
    ("linkedin", r"(?i)linkedin", FillAction::Text(ProfileField::LinkedIn)),
    ("github", r"(?i)github", FillAction::Text(ProfileField::GitHub)),
    ("website", r"(?i)website", FillAction::Text(ProfileField::Website)),
    ("salary", r"(?i)salary", FillAction::Text(ProfileField::ExpectedSalary)),
    ("experience", r"(?i)year|experience", FillAction::Text(ProfileField::YearsExperience)),
    ("city", r"(?i)city", FillAction::Text(ProfileField::City)),
    (
        "authorization",
        r"(?i)authoriz(ed|ation)|legally authorized",
        FillAction::Affirm,
    ),
    ("relocate", r"(?i)relocat", FillAction::Check),
];

/// The process-wide rule table.
pub fn rules() -> &'static [FillRule] {
    static RULES: OnceLock<Vec<FillRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        TABLE
            .iter()
            .filter_map(|&(name, pattern, action)| {
                Regex::new(pattern).ok().map(|pattern| FillRule {
                    name,
                    pattern,
                    action,
                })
            })
            .collect()
    })
}

/// First rule matching the hint, if any.
pub fn classify(hint: &str) -> Option<&'static FillRule> {
    rules().iter().find(|r| r.matches(hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(rules().len(), TABLE.len());
    }

    #[test]
    fn test_classify_table_order() {
        let cases = [
            ("first_name", "name"),
            ("Email Address", "email"),
            ("candidate[e-mail]", "email"),
            ("phoneNumber", "phone"),
            ("LinkedIn Profile", "linkedin"),
            ("GitHub URL", "github"),
            ("Personal website", "website"),
            ("Expected salary (USD)", "salary"),
            ("How many years of experience with Rust?", "experience"),
            ("Current city", "city"),
            ("Are you legally authorized to work in the US?", "authorization"),
            ("Do you require work authorization?", "authorization"),
            ("Willing to relocate?", "relocate"),
        ];
        for (hint, rule) in cases {
            assert_eq!(classify(hint).map(|r| r.name), Some(rule), "hint {hint:?}");
        }
    }

    #[test]
    fn test_unknown_hint_has_no_rule() {
        assert!(classify("Why do you want to work here?").is_none());
        assert!(classify("q_55023923").is_none());
    }

    #[test]
    fn test_profile_field_lookup() {
        let profile = ApplicantProfile {
            city: "Boston".into(),
            ..ApplicantProfile::default()
        };
        assert_eq!(ProfileField::City.value(&profile), "Boston");
        assert_eq!(ProfileField::Email.value(&profile), "");
    }
}
