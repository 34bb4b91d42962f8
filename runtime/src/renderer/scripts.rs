// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! JavaScript snippets evaluated in the page by the Chromium renderer.
//!
//! Elements are addressed through a `data-autoapply-ref` attribute stamped
//! on them during enumeration. A fresh document has no stamps, so every
//! handle from a previous page resolves to nothing ("stale element").
//!
//! All caller-provided values are escaped with [`sanitize_js_string`] and
//! injected only into string literals.

use crate::model::ElementRef;
use crate::renderer::ControlQuery;

/// Attribute carrying element handles.
pub const REF_ATTR: &str = "data-autoapply-ref";

/// Shared helpers prepended to every script.
const PRELUDE: &str = r#"
const __tag = (el) => {
    if (!el.dataset.autoapplyRef) {
        window.__autoapplyRef = (window.__autoapplyRef || 0) + 1;
        el.dataset.autoapplyRef = String(window.__autoapplyRef);
    }
    return el.dataset.autoapplyRef;
};
const __visible = (el) => !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
const __labelOf = (el) => {
    if (el.labels && el.labels.length) {
        return Array.from(el.labels).map(l => l.textContent.trim()).join(' ');
    }
    const wrap = el.closest('label');
    return wrap ? wrap.textContent.trim() : '';
};
const __byRef = (r) => document.querySelector('[data-autoapply-ref="' + r + '"]');
"#;

/// Enumerate fillable controls and radio groups.
///
/// Radios group by fieldset, or by shared `name` outside a fieldset.
pub fn snapshot() -> String {
    format!(
        r#"(() => {{
{PRELUDE}
    const kindOf = (el) => {{
        const t = el.tagName.toLowerCase();
        if (t === 'select') return 'select';
        if (t === 'textarea') return 'text_area';
        const ty = (el.getAttribute('type') || 'text').toLowerCase();
        if (ty === 'radio') return 'radio';
        if (ty === 'checkbox') return 'checkbox';
        if (ty === 'file') return 'file';
        if (['text', 'email', 'tel', 'number', 'url', 'search'].includes(ty)) return 'text';
        return null;
    }};
    const optionOf = (r) => ({{
        handle: __tag(r),
        label: __labelOf(r) || r.getAttribute('aria-label') || '',
        checked: r.checked,
        visible: __visible(r),
        enabled: !r.disabled,
    }});
    const radio_groups = [];
    for (const fs of document.querySelectorAll('fieldset')) {{
        const radios = fs.querySelectorAll('input[type="radio"]');
        if (!radios.length) continue;
        const legend = fs.querySelector('legend');
        radio_groups.push({{
            legend: legend ? legend.textContent.trim() : '',
            options: Array.from(radios).map(optionOf),
        }});
    }}
    const named = new Map();
    for (const r of document.querySelectorAll('input[type="radio"]')) {{
        if (r.closest('fieldset') || !r.name) continue;
        if (!named.has(r.name)) named.set(r.name, []);
        named.get(r.name).push(r);
    }}
    const grouped = new Set();
    for (const [name, radios] of named) {{
        if (radios.length < 2) continue;
        grouped.add(name);
        const box = radios[0].closest('[role="radiogroup"]');
        radio_groups.push({{
            legend: (box && box.getAttribute('aria-label')) || name,
            options: radios.map(optionOf),
        }});
    }}
    const controls = [];
    for (const el of document.querySelectorAll('input, select, textarea')) {{
        const kind = kindOf(el);
        if (!kind) continue;
        if (kind === 'radio' && (el.closest('fieldset') || grouped.has(el.name))) continue;
        let value = el.value || '';
        let options = [];
        if (kind === 'select') {{
            options = Array.from(el.options).map(o => o.textContent.trim());
            const sel = el.selectedOptions[0];
            value = (el.value && sel) ? sel.textContent.trim() : '';
        }}
        controls.push({{
            handle: __tag(el),
            kind,
            hints: {{
                name: el.getAttribute('name') || '',
                aria_label: el.getAttribute('aria-label') || '',
                placeholder: el.getAttribute('placeholder') || '',
                label: __labelOf(el),
            }},
            value,
            checked: !!el.checked,
            options,
            visible: __visible(el),
            enabled: !el.disabled && !el.readOnly,
        }});
    }}
    return {{ controls, radio_groups }};
}})()"#
    )
}

/// Find elements matching a query and stamp them with handles.
pub fn query(q: &ControlQuery) -> String {
    let candidates = match q {
        ControlQuery::Css(sel) => format!(
            "Array.from(document.querySelectorAll('{}'))",
            sanitize_js_string(sel)
        ),
        ControlQuery::Button(text) => format!(
            r#"Array.from(document.querySelectorAll('button, a, [role="button"], input[type="submit"], input[type="button"]'))
                .filter(el => (el.innerText || el.value || el.getAttribute('aria-label') || '').toLowerCase().includes('{}'))"#,
            sanitize_js_string(&text.to_lowercase())
        ),
        ControlQuery::Text(text) => format!(
            r#"Array.from(document.querySelectorAll('body *'))
                .filter(el => el.children.length === 0 && (el.textContent || '').toLowerCase().includes('{}'))"#,
            sanitize_js_string(&text.to_lowercase())
        ),
    };
    format!(
        r#"(() => {{
{PRELUDE}
    try {{
        return {candidates}.map(el => ({{
            handle: __tag(el),
            text: (el.innerText || el.value || el.textContent || '').trim(),
            visible: __visible(el),
            enabled: !el.disabled && el.getAttribute('aria-disabled') !== 'true',
        }}));
    }} catch (e) {{
        return [];
    }}
}})()"#
    )
}

/// Wrap an element operation: resolve the handle, refuse disabled elements.
fn on_element(element: &ElementRef, body: &str) -> String {
    format!(
        r#"(() => {{
{PRELUDE}
    const el = __byRef('{}');
    if (!el) return {{ ok: false, reason: 'stale element' }};
    if (el.disabled) return {{ ok: false, reason: 'disabled' }};
    {body}
}})()"#,
        sanitize_js_string(&element.0)
    )
}

/// Set a text value through the native setter so framework listeners fire.
pub fn fill(element: &ElementRef, value: &str) -> String {
    let body = format!(
        r#"if (el.readOnly) return {{ ok: false, reason: 'read-only' }};
    const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
    Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, '{}');
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return {{ ok: true }};"#,
        sanitize_js_string(value)
    );
    on_element(element, &body)
}

pub fn select_option(element: &ElementRef, label: &str) -> String {
    let body = format!(
        r#"const want = '{}'.trim().toLowerCase();
    const opt = Array.from(el.options || []).find(o => o.textContent.trim().toLowerCase() === want);
    if (!opt) return {{ ok: false, reason: 'no such option' }};
    el.value = opt.value;
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return {{ ok: true }};"#,
        sanitize_js_string(label)
    );
    on_element(element, &body)
}

pub fn check(element: &ElementRef) -> String {
    on_element(
        element,
        r#"if (!el.checked) el.click();
    return el.checked ? { ok: true } : { ok: false, reason: 'did not become checked' };"#,
    )
}

pub fn click(element: &ElementRef) -> String {
    on_element(
        element,
        r#"el.scrollIntoView({ block: 'center' });
    el.click();
    return { ok: true };"#,
    )
}

/// CSS selector addressing a stamped element.
pub fn ref_selector(element: &ElementRef) -> String {
    format!("[{REF_ATTR}=\"{}\"]", element.0.replace('"', ""))
}

/// Escape a value for a single-quoted JS literal. Angle brackets become
/// hex escapes and NUL is dropped.
pub fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applicant_values_stay_inside_the_literal() {
        assert_eq!(sanitize_js_string("Jane \"JD\" O'Neil"), "Jane \\\"JD\\\" O\\'Neil");
        assert_eq!(sanitize_js_string("line one\nline two\0"), "line one\\nline two");
        let cover = sanitize_js_string("Hi</script><b>");
        assert!(!cover.contains('<'));
        assert_eq!(cover, "Hi\\x3c/script\\x3e\\x3cb\\x3e");
    }

    #[test]
    fn test_fill_script_escapes_value() {
        let js = fill(&ElementRef("7".into()), "O'Brien");
        assert!(js.contains("O\\'Brien"));
        assert!(js.contains("__byRef('7')"));
    }

    #[test]
    fn test_snapshot_groups_radios_by_name() {
        let js = snapshot();
        assert!(js.contains("named.set(r.name, [])"));
        assert!(js.contains("grouped.has(el.name)"));
    }

    #[test]
    fn test_button_query_is_lowercased() {
        let js = query(&ControlQuery::button("Submit Application"));
        assert!(js.contains("includes('submit application')"));
    }

    #[test]
    fn test_ref_selector_strips_quotes() {
        assert_eq!(
            ref_selector(&ElementRef("1\"2".into())),
            "[data-autoapply-ref=\"12\"]"
        );
    }
}
