// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scripted in-memory browser for integration tests.
//!
//! Pages are keyed by URL; a context shows the page whose URL is the
//! longest prefix of its current URL. Fills, selects and checks update the
//! page state so a later snapshot sees them. Every operation is recorded.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use autoapply_runtime::error::ApplyError;
use autoapply_runtime::model::{
    ControlHints, ControlKind, ElementRef, FormControl, FoundElement, PageSnapshot, RadioGroup,
    RadioOption,
};
use autoapply_runtime::renderer::{ControlQuery, NavigationResult, RenderContext, Renderer};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What clicking an element does.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// The same context moves to this URL.
    Navigate(String),
    /// A new tab opens at this URL.
    Popup(String),
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub query: ControlQuery,
    pub handle: String,
    pub text: String,
    pub visible: bool,
    pub enabled: bool,
    pub effect: Effect,
}

impl FakeElement {
    pub fn new(query: ControlQuery, handle: &str) -> Self {
        Self {
            query,
            handle: handle.to_string(),
            text: String::new(),
            visible: true,
            enabled: true,
            effect: Effect::None,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn navigates_to(mut self, url: &str) -> Self {
        self.effect = Effect::Navigate(url.to_string());
        self
    }

    pub fn opens_tab(mut self, url: &str) -> Self {
        self.effect = Effect::Popup(url.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub controls: Vec<FormControl>,
    pub radio_groups: Vec<RadioGroup>,
    pub elements: Vec<FakeElement>,
    pub fail_snapshot: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control(mut self, control: FormControl) -> Self {
        self.controls.push(control);
        self
    }

    pub fn radio_group(mut self, group: RadioGroup) -> Self {
        self.radio_groups.push(group);
        self
    }

    pub fn element(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn failing_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }
}

/// Build a control with the given kind and hints.
pub fn control(handle: &str, kind: ControlKind, hints: ControlHints) -> FormControl {
    FormControl {
        handle: ElementRef(handle.to_string()),
        kind,
        hints,
        value: String::new(),
        checked: false,
        options: Vec::new(),
        visible: true,
        enabled: true,
    }
}

pub fn labeled(label: &str) -> ControlHints {
    ControlHints {
        label: label.to_string(),
        ..ControlHints::default()
    }
}

pub fn named(name: &str) -> ControlHints {
    ControlHints {
        name: name.to_string(),
        ..ControlHints::default()
    }
}

pub fn yes_no_group(legend: &str, prefix: &str) -> RadioGroup {
    let option = |label: &str| RadioOption {
        handle: ElementRef(format!("{prefix}-{}", label.to_lowercase())),
        label: label.to_string(),
        checked: false,
        visible: true,
        enabled: true,
    };
    RadioGroup {
        legend: legend.to_string(),
        options: vec![option("Yes"), option("No")],
    }
}

/// One recorded browser operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Navigate(String),
    Fill(String, String),
    Select(String, String),
    Check(String),
    SetFiles(String),
    Click(String),
}

#[derive(Default)]
struct State {
    pages: HashMap<String, FakePage>,
    timeout_urls: HashSet<String>,
    navigation_delay: Duration,
    context_urls: HashMap<usize, String>,
    popups: HashMap<usize, String>,
    next_id: usize,
    opened: usize,
    closed: usize,
    ops: Vec<Op>,
}

impl State {
    fn page_key(&self, url: &str) -> Option<String> {
        self.pages
            .keys()
            .filter(|k| url.starts_with(k.as_str()))
            .max_by_key(|k| k.len())
            .cloned()
    }

    fn page_mut(&mut self, url: &str) -> Option<&mut FakePage> {
        let key = self.page_key(url)?;
        self.pages.get_mut(&key)
    }

    fn open(&mut self, url: &str) -> usize {
        self.next_id += 1;
        self.opened += 1;
        self.context_urls.insert(self.next_id, url.to_string());
        self.next_id
    }
}

/// Shared handle to a scripted browser.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<State>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.state.lock().unwrap().pages.insert(url.to_string(), page);
        self
    }

    /// Navigating to `url` times out.
    pub fn timeout_on(self, url: &str) -> Self {
        self.state.lock().unwrap().timeout_urls.insert(url.to_string());
        self
    }

    /// Every navigation takes `ms` before it lands.
    pub fn navigation_delay(self, ms: u64) -> Self {
        self.state.lock().unwrap().navigation_delay = Duration::from_millis(ms);
        self
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Click(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Fill(h, v) => Some((h, v)),
                _ => None,
            })
            .collect()
    }

    /// Current state of a control on the page registered at `url`.
    pub fn control(&self, url: &str, handle: &str) -> Option<FormControl> {
        let state = self.state.lock().unwrap();
        state
            .pages
            .get(url)?
            .controls
            .iter()
            .find(|c| c.handle.0 == handle)
            .cloned()
    }

    pub fn radio_group(&self, url: &str, index: usize) -> Option<RadioGroup> {
        let state = self.state.lock().unwrap();
        state.pages.get(url)?.radio_groups.get(index).cloned()
    }

    /// A context already showing `url`, outside any renderer bookkeeping.
    pub fn context_at(&self, url: &str) -> FakeContext {
        let id = self.state.lock().unwrap().open(url);
        FakeContext {
            id,
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl Renderer for FakeBrowser {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(self.context_at("about:blank")))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.opened - state.closed
    }
}

pub struct FakeContext {
    id: usize,
    state: Arc<Mutex<State>>,
}

impl FakeContext {
    fn url(&self) -> String {
        self.state
            .lock()
            .unwrap()
            .context_urls
            .get(&self.id)
            .cloned()
            .unwrap_or_default()
    }

    fn element(&self, handle: &ElementRef) -> Result<FakeElement> {
        let url = self.url();
        let mut state = self.state.lock().unwrap();
        let page = state.page_mut(&url).ok_or_else(|| anyhow!("no page at {url}"))?;
        page.elements
            .iter()
            .find(|e| e.handle == handle.0)
            .cloned()
            .ok_or_else(|| anyhow!("stale element {handle}"))
    }

    fn with_control<T>(
        &self,
        handle: &ElementRef,
        f: impl FnOnce(&mut FormControl) -> Result<T>,
    ) -> Result<T> {
        let url = self.url();
        let mut state = self.state.lock().unwrap();
        let page = state.page_mut(&url).ok_or_else(|| anyhow!("no page at {url}"))?;
        let control = page
            .controls
            .iter_mut()
            .find(|c| c.handle == *handle)
            .ok_or_else(|| anyhow!("stale element {handle}"))?;
        if !control.enabled {
            bail!("disabled");
        }
        f(control)
    }

    fn record(&self, op: Op) {
        self.state.lock().unwrap().ops.push(op);
    }
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        self.record(Op::Navigate(url.to_string()));
        let delay = self.state.lock().unwrap().navigation_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        if state.timeout_urls.contains(url) {
            return Err(ApplyError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms,
            }
            .into());
        }
        state.context_urls.insert(self.id, url.to_string());
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn get_url(&self) -> Result<String> {
        Ok(self.url())
    }

    async fn snapshot(&self) -> Result<PageSnapshot> {
        let url = self.url();
        let mut state = self.state.lock().unwrap();
        let Some(page) = state.page_mut(&url) else {
            return Ok(PageSnapshot::default());
        };
        if page.fail_snapshot {
            bail!("Execution context was destroyed");
        }
        Ok(PageSnapshot {
            controls: page.controls.clone(),
            radio_groups: page.radio_groups.clone(),
        })
    }

    async fn query(&self, query: &ControlQuery) -> Result<Vec<FoundElement>> {
        let url = self.url();
        let mut state = self.state.lock().unwrap();
        let Some(page) = state.page_mut(&url) else {
            return Ok(Vec::new());
        };
        Ok(page
            .elements
            .iter()
            .filter(|e| e.query == *query)
            .map(|e| FoundElement {
                handle: ElementRef(e.handle.clone()),
                text: e.text.clone(),
                visible: e.visible,
                enabled: e.enabled,
            })
            .collect())
    }

    async fn fill(&self, element: &ElementRef, value: &str) -> Result<()> {
        self.with_control(element, |c| {
            c.value = value.to_string();
            Ok(())
        })?;
        self.record(Op::Fill(element.0.clone(), value.to_string()));
        Ok(())
    }

    async fn select_option(&self, element: &ElementRef, label: &str) -> Result<()> {
        self.with_control(element, |c| {
            if !c.options.iter().any(|o| o == label) {
                bail!("no option {label}");
            }
            c.value = label.to_string();
            Ok(())
        })?;
        self.record(Op::Select(element.0.clone(), label.to_string()));
        Ok(())
    }

    async fn check(&self, element: &ElementRef) -> Result<()> {
        let url = self.url();
        {
            let mut state = self.state.lock().unwrap();
            let page = state.page_mut(&url).ok_or_else(|| anyhow!("no page at {url}"))?;
            let in_group = page.radio_groups.iter_mut().find_map(|g| {
                g.options
                    .iter()
                    .any(|o| o.handle == *element)
                    .then_some(g)
            });
            if let Some(group) = in_group {
                for option in &mut group.options {
                    option.checked = option.handle == *element;
                }
            } else {
                let target = page
                    .controls
                    .iter()
                    .find(|c| c.handle == *element)
                    .cloned()
                    .ok_or_else(|| anyhow!("stale element {element}"))?;
                for control in &mut page.controls {
                    if control.handle == *element {
                        control.checked = true;
                    } else if target.kind == ControlKind::Radio
                        && control.kind == ControlKind::Radio
                        && !target.hints.name.is_empty()
                        && control.hints.name == target.hints.name
                    {
                        // Same-named radios are exclusive.
                        control.checked = false;
                    }
                }
            }
        }
        self.record(Op::Check(element.0.clone()));
        Ok(())
    }

    async fn set_files(&self, element: &ElementRef, path: &Path) -> Result<()> {
        self.with_control(element, |c| {
            c.value = path.display().to_string();
            Ok(())
        })?;
        self.record(Op::SetFiles(element.0.clone()));
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        let target = self.element(element)?;
        if !target.enabled {
            bail!("disabled");
        }
        self.record(Op::Click(element.0.clone()));
        let mut state = self.state.lock().unwrap();
        match target.effect {
            Effect::None => {}
            Effect::Navigate(url) => {
                state.context_urls.insert(self.id, url);
            }
            Effect::Popup(url) => {
                state.popups.insert(self.id, url);
            }
        }
        Ok(())
    }

    async fn wait_for_navigation(&mut self, timeout_ms: u64) -> Result<()> {
        let url = self.url();
        if self.state.lock().unwrap().timeout_urls.contains(&url) {
            return Err(ApplyError::NavigationTimeout { url, timeout_ms }.into());
        }
        Ok(())
    }

    async fn wait_for_new_context(
        &mut self,
        _timeout_ms: u64,
    ) -> Result<Option<Box<dyn RenderContext>>> {
        let mut state = self.state.lock().unwrap();
        let Some(url) = state.popups.remove(&self.id) else {
            return Ok(None);
        };
        let id = state.open(&url);
        Ok(Some(Box::new(FakeContext {
            id,
            state: Arc::clone(&self.state),
        })))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.closed += 1;
        state.context_urls.remove(&self.id);
        Ok(())
    }
}
