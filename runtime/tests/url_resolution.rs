// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Listing-to-form resolution over scripted redirects and tabs.

mod support;

use autoapply_runtime::config::{ProviderConfig, Timeouts};
use autoapply_runtime::flow::UrlResolver;
use autoapply_runtime::renderer::ControlQuery;
use support::{FakeBrowser, FakeElement, FakePage};

const LISTING: &str = "https://board.test/job/42";
const INTERSTITIAL: &str = "https://board.test/redirect/42";

fn timeouts() -> Timeouts {
    Timeouts {
        navigation_ms: 1_000,
        probe_ms: 200,
        apply_button_ms: 200,
        easy_apply_ms: 200,
        popup_ms: 50,
        settle_ms: 0,
    }
}

fn resolver() -> UrlResolver {
    UrlResolver::new(ProviderConfig::default(), timeouts())
}

fn apply_now() -> FakeElement {
    FakeElement::new(ControlQuery::button("Apply Now"), "apply-now")
}

fn continue_to_apply() -> FakeElement {
    FakeElement::new(ControlQuery::button("No, continue to apply"), "continue")
}

#[tokio::test]
async fn foreign_final_url_resolves_to_nothing() {
    let browser = FakeBrowser::new()
        .page(LISTING, FakePage::new().element(apply_now().opens_tab(INTERSTITIAL)))
        .page(
            INTERSTITIAL,
            FakePage::new().element(continue_to_apply().navigates_to("https://careers.other.test/apply/42")),
        );

    let resolved = resolver().resolve(&browser, LISTING).await;

    assert_eq!(resolved, None);
    assert_eq!(browser.clicks(), vec!["apply-now".to_string(), "continue".to_string()]);
    assert_eq!(browser.opened(), 2);
    assert_eq!(browser.closed(), 2);
}

#[tokio::test]
async fn popup_chain_to_provider_resolves() {
    let form = "https://boards.greenhouse.io/acme/jobs/42";
    let browser = FakeBrowser::new()
        .page(LISTING, FakePage::new().element(apply_now().opens_tab(INTERSTITIAL)))
        .page(
            INTERSTITIAL,
            FakePage::new().element(continue_to_apply().opens_tab(form)),
        );

    let resolved = resolver().resolve(&browser, LISTING).await;

    assert_eq!(resolved.as_deref(), Some(form));
    assert_eq!(browser.opened(), 3);
    assert_eq!(browser.closed(), 3);
}

#[tokio::test]
async fn form_already_on_listing_page_resolves_without_clicks() {
    let form = "https://boards.greenhouse.io/acme/jobs/7";
    let browser = FakeBrowser::new().page(
        form,
        FakePage::new().element(FakeElement::new(
            ControlQuery::css("form[action*='job_app']"),
            "form",
        )),
    );

    let resolved = resolver().resolve(&browser, form).await;

    assert_eq!(resolved.as_deref(), Some(form));
    assert!(browser.clicks().is_empty());
}

#[tokio::test]
async fn missing_apply_control_keeps_the_listing_url() {
    let browser = FakeBrowser::new().page(LISTING, FakePage::new());

    let resolved = resolver().resolve(&browser, LISTING).await;

    assert_eq!(resolved, None);
    assert_eq!(browser.closed(), 1);
}

#[tokio::test]
async fn navigation_failure_is_a_negative_result() {
    let browser = FakeBrowser::new()
        .page(LISTING, FakePage::new())
        .timeout_on(LISTING);

    let resolved = resolver().resolve(&browser, LISTING).await;

    assert_eq!(resolved, None);
    assert_eq!(browser.opened(), 1);
    assert_eq!(browser.closed(), 1);
}
