#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-kimerizm-ui]";

/// Default panel CSS; the custom properties are the override points.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --kimerizm-font-family: 'Inter', system-ui, -apple-system, 'Segoe UI', sans-serif;
  --kimerizm-card-bg: #ffffff;
  --kimerizm-card-border: rgba(148, 163, 184, 0.28);
  --kimerizm-radius: 12px;
  --kimerizm-text: #1f2933;
  --kimerizm-muted: #52606d;
  --kimerizm-surface: #f8fafc;
  --kimerizm-accent: #2563eb;
  --kimerizm-good: #16a34a;
  --kimerizm-borderline: #ca8a04;
  --kimerizm-moderate: #ea580c;
  --kimerizm-critical: #dc2626;
}

.kimerizm-panel {
  font-family: var(--kimerizm-font-family);
  color: var(--kimerizm-text);
  background: var(--kimerizm-card-bg);
  border: 1px solid var(--kimerizm-card-border);
  border-radius: var(--kimerizm-radius);
  padding: 16px;
  display: flex;
  flex-direction: column;
  gap: 14px;
}

.panel-header {
  display: flex;
  justify-content: space-between;
  align-items: baseline;
  gap: 12px;
}

.panel-header h2 {
  margin: 0;
  font-size: 1.1rem;
}

.panel-focus {
  color: var(--kimerizm-muted);
  font-size: 0.85rem;
}

.risk-badge {
  border-radius: 999px;
  padding: 2px 10px;
  font-size: 0.8rem;
  font-weight: 600;
  color: #ffffff;
}

.risk-badge[data-escalated="true"]::after {
  content: " ▲";
}

.panel-nav,
.order-strip,
.note-tabs {
  display: flex;
  flex-wrap: wrap;
  gap: 6px;
}

.panel-nav button,
.order-strip button,
.note-tabs button {
  border: 1px solid var(--kimerizm-card-border);
  background: var(--kimerizm-surface);
  border-radius: 8px;
  padding: 4px 10px;
  cursor: pointer;
  font: inherit;
}

.panel-nav button:disabled {
  opacity: 0.45;
  cursor: default;
}

.order-strip button[data-observed="false"] {
  color: var(--kimerizm-muted);
  border-style: dashed;
}

.order-strip button[aria-pressed="true"],
.note-tabs button[aria-pressed="true"] {
  border-color: var(--kimerizm-accent);
  color: var(--kimerizm-accent);
}

.readings {
  width: 100%;
  border-collapse: collapse;
  font-size: 0.9rem;
}

.readings th,
.readings td {
  text-align: left;
  padding: 6px 8px;
  border-bottom: 1px solid var(--kimerizm-card-border);
}

.readings td[data-severity="good"] { color: var(--kimerizm-good); }
.readings td[data-severity="borderline"] { color: var(--kimerizm-borderline); }
.readings td[data-severity="moderate"] { color: var(--kimerizm-moderate); }
.readings td[data-severity="critical"] { color: var(--kimerizm-critical); font-weight: 600; }

.notes {
  list-style: none;
  margin: 0;
  padding: 0;
  display: flex;
  flex-direction: column;
  gap: 6px;
}

.notes li {
  border-left: 3px solid var(--kimerizm-card-border);
  padding: 4px 8px;
  background: var(--kimerizm-surface);
}

.notes li[data-kind="success"] { border-color: var(--kimerizm-good); }
.notes li[data-kind="warning"] { border-color: var(--kimerizm-borderline); }
.notes li[data-kind="danger"] { border-color: var(--kimerizm-critical); }
.notes li[data-kind="info"] { border-color: var(--kimerizm-accent); }

.panel-empty {
  color: var(--kimerizm-muted);
  font-style: italic;
}

@media (max-width: 640px) {
  .panel-header {
    flex-direction: column;
    align-items: flex-start;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head> element"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-kimerizm-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.dyn_into::<Node>()?)?;

    Ok(())
}
