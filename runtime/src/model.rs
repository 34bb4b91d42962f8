// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data types shared by every stage of an application run.
//!
//! [`Listing`] and [`JobRecord`] describe jobs and logged outcomes. The
//! remaining types ([`FormControl`], [`RadioGroup`], [`PageSnapshot`]) model
//! the interactive controls observed on one page visit; they hold live
//! element handles and are discarded on navigation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Where a job was found or applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "RemoteOK")]
    RemoteOk,
    LinkedIn,
    Greenhouse,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RemoteOk => "RemoteOK",
            Self::LinkedIn => "LinkedIn",
            Self::Greenhouse => "Greenhouse",
        };
        f.write_str(s)
    }
}

/// Outcome of one application attempt (or of a scraped listing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Skipped,
    Failed,
    #[serde(rename = "Manual Review")]
    ManualReview,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Applied => "Applied",
            Self::Skipped => "Skipped",
            Self::Failed => "Failed",
            Self::ManualReview => "Manual Review",
        };
        f.write_str(s)
    }
}

/// A job posting produced by a listing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub company: String,
    pub apply_url: String,
    pub platform: Platform,
    /// Source fields not mapped onto the common shape.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Listing {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        apply_url: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            apply_url: apply_url.into(),
            platform,
            extra: Map::new(),
        }
    }

    /// Build the outcome record for this listing.
    pub fn record(&self, status: ApplicationStatus, notes: impl Into<String>) -> JobRecord {
        JobRecord {
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            apply_url: self.apply_url.clone(),
            platform: self.platform,
            status,
            notes: notes.into(),
            logged_at: Utc::now(),
        }
    }
}

/// One appended entry of the result log. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub apply_url: String,
    pub platform: Platform,
    pub status: ApplicationStatus,
    pub notes: String,
    pub logged_at: DateTime<Utc>,
}

/// Opaque handle to one element on the current page.
///
/// Handles go stale on navigation; operations on a stale handle fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(pub String);

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of interactive control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    TextArea,
    Select,
    Radio,
    Checkbox,
    File,
}

/// Human- and machine-readable hints attached to a control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlHints {
    pub name: String,
    pub aria_label: String,
    pub placeholder: String,
    /// Text of the associated `<label>` element.
    pub label: String,
}

impl ControlHints {
    /// The first non-empty hint in priority order: name, aria-label,
    /// placeholder, label text.
    pub fn primary(&self) -> Option<&str> {
        [
            self.name.as_str(),
            self.aria_label.as_str(),
            self.placeholder.as_str(),
            self.label.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .find(|h| !h.is_empty())
    }

    /// Whether a human-readable label (aria-label or `<label>`) is attached.
    pub fn is_labeled(&self) -> bool {
        !self.aria_label.trim().is_empty() || !self.label.trim().is_empty()
    }

    /// Short description for logs and fill reports.
    pub fn describe(&self) -> String {
        let label = [self.label.trim(), self.aria_label.trim()]
            .into_iter()
            .find(|s| !s.is_empty());
        match (label, self.primary()) {
            (Some(label), _) => label.to_string(),
            (None, Some(hint)) => hint.to_string(),
            (None, None) => "<unlabeled>".to_string(),
        }
    }
}

/// One interactive control observed on the current page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormControl {
    pub handle: ElementRef,
    pub kind: ControlKind,
    #[serde(default)]
    pub hints: ControlHints,
    /// Current value. For selects, the label of the selected option when it
    /// carries a value; empty otherwise.
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    /// Option labels, for selects.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl FormControl {
    /// Whether the control already holds a value the filler must not touch.
    pub fn has_value(&self) -> bool {
        match self.kind {
            ControlKind::Radio | ControlKind::Checkbox => self.checked,
            ControlKind::Select => {
                !self.value.trim().is_empty() && !is_placeholder_option(&self.value)
            }
            _ => !self.value.trim().is_empty(),
        }
    }
}

/// Whether a select option label is a generic prompt such as "Select...".
pub fn is_placeholder_option(label: &str) -> bool {
    let l = label.trim().to_lowercase();
    l.is_empty()
        || l.contains("select")
        || l.starts_with("choose")
        || l.starts_with('-')
        || l == "option"
}

/// One radio button inside a fieldset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioOption {
    pub handle: ElementRef,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Radio buttons grouped by a fieldset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioGroup {
    #[serde(default)]
    pub legend: String,
    pub options: Vec<RadioOption>,
}

impl RadioGroup {
    pub fn any_checked(&self) -> bool {
        self.options.iter().any(|o| o.checked)
    }
}

/// All controls enumerated on one page visit.
///
/// Radios inside a fieldset appear only in `radio_groups`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub controls: Vec<FormControl>,
    #[serde(default)]
    pub radio_groups: Vec<RadioGroup>,
}

impl PageSnapshot {
    /// Move radios that share a `name` out of `controls` into one group per
    /// name, legend set to the name. Radios with a unique or empty name stay.
    pub fn group_named_radios(mut self) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for c in &self.controls {
            let name = c.hints.name.trim();
            if c.kind == ControlKind::Radio && !name.is_empty() {
                *counts.entry(name.to_string()).or_default() += 1;
            }
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<RadioGroup> = Vec::new();
        let mut controls = Vec::with_capacity(self.controls.len());
        for c in self.controls {
            let name = c.hints.name.trim().to_string();
            if c.kind != ControlKind::Radio || counts.get(&name).copied().unwrap_or(0) < 2 {
                controls.push(c);
                continue;
            }
            let label = [c.hints.label.trim(), c.hints.aria_label.trim()]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or_default()
                .to_string();
            let option = RadioOption {
                handle: c.handle,
                label,
                checked: c.checked,
                visible: c.visible,
                enabled: c.enabled,
            };
            match index.get(&name) {
                Some(&i) => groups[i].options.push(option),
                None => {
                    index.insert(name.clone(), groups.len());
                    groups.push(RadioGroup {
                        legend: name,
                        options: vec![option],
                    });
                }
            }
        }

        self.controls = controls;
        self.radio_groups.extend(groups);
        self
    }
}

/// An element matched by a [`ControlQuery`](crate::renderer::ControlQuery).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundElement {
    pub handle: ElementRef,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl FoundElement {
    pub fn is_actionable(&self) -> bool {
        self.visible && self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(name: &str, aria: &str, placeholder: &str, label: &str) -> ControlHints {
        ControlHints {
            name: name.into(),
            aria_label: aria.into(),
            placeholder: placeholder.into(),
            label: label.into(),
        }
    }

    #[test]
    fn test_primary_hint_priority() {
        assert_eq!(hints("email", "Phone", "", "").primary(), Some("email"));
        assert_eq!(hints("  ", "Phone", "x", "").primary(), Some("Phone"));
        assert_eq!(hints("", "", "City", "Where").primary(), Some("City"));
        assert_eq!(hints("", "", "", "Where").primary(), Some("Where"));
        assert_eq!(hints("", "", "", "").primary(), None);
    }

    #[test]
    fn test_is_labeled_ignores_name_and_placeholder() {
        assert!(!hints("q_123", "", "Type here", "").is_labeled());
        assert!(hints("", "Salary", "", "").is_labeled());
        assert!(hints("", "", "", "Why us?").is_labeled());
    }

    #[test]
    fn test_select_placeholder_is_not_a_value() {
        let mut c = FormControl {
            handle: ElementRef("1".into()),
            kind: ControlKind::Select,
            hints: ControlHints::default(),
            value: "Select...".into(),
            checked: false,
            options: vec!["Select...".into(), "Yes".into()],
            visible: true,
            enabled: true,
        };
        assert!(!c.has_value());
        c.value = "Yes".into();
        assert!(c.has_value());
    }

    #[test]
    fn test_same_named_radios_become_one_group() {
        let radio = |id: &str, name: &str, label: &str| FormControl {
            handle: ElementRef(id.into()),
            kind: ControlKind::Radio,
            hints: hints(name, "", "", label),
            value: String::new(),
            checked: false,
            options: Vec::new(),
            visible: true,
            enabled: true,
        };
        let snap = PageSnapshot {
            controls: vec![
                radio("1", "work_authorization", "Yes"),
                radio("2", "", "Lonely"),
                radio("3", "work_authorization", "No"),
                radio("4", "newsletter", "Sure"),
            ],
            radio_groups: Vec::new(),
        }
        .group_named_radios();

        let left: Vec<&str> = snap.controls.iter().map(|c| c.handle.0.as_str()).collect();
        assert_eq!(left, vec!["2", "4"]);
        assert_eq!(snap.radio_groups.len(), 1);
        let group = &snap.radio_groups[0];
        assert_eq!(group.legend, "work_authorization");
        let labels: Vec<&str> = group.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "No"]);
    }

    #[test]
    fn test_listing_record_trims_title_and_company() {
        let listing = Listing::new(" Backend Engineer\n", " Acme ", "https://a.example", Platform::LinkedIn);
        let rec = listing.record(ApplicationStatus::Applied, "ok");
        assert_eq!(rec.title, "Backend Engineer");
        assert_eq!(rec.company, "Acme");
        assert_eq!(rec.platform.to_string(), "LinkedIn");
    }

    #[test]
    fn test_status_serializes_display_names() {
        let json = serde_json::to_string(&ApplicationStatus::ManualReview).unwrap();
        assert_eq!(json, "\"Manual Review\"");
        let json = serde_json::to_string(&Platform::RemoteOk).unwrap();
        assert_eq!(json, "\"RemoteOK\"");
    }
}
