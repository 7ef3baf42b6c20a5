//! Content plan parsing.
//!
//! Model output is unstructured text that should contain a JSON payload
//! somewhere inside it. The parser extracts the substring between the
//! first `{` and the last `}`, navigates it tolerantly, and always comes
//! back with a usable plan: placeholder values for placeholder templates,
//! a layout plan otherwise, and a deterministic text-segmentation fallback
//! when the model ignored the format entirely.

use crate::introspect::TemplateInfo;
use crate::placeholder::strip_list_marker;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hard ceiling on planned slides.
pub const MAX_PLAN_SLIDES: usize = 30;

/// Delimiters a scalar string is split on when a list was expected.
const LIST_DELIMITERS: [char; 4] = ['\n', ';', '\u{ff1b}', '\u{3001}'];

/// The joiner used when a list has to collapse into a single line.
const LIST_JOINER: &str = "\u{ff1b}";

/// A parsed content plan, in one of its two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentPlan {
    /// Slide-by-slide construction plan
    Layout(LayoutPlan),
    /// Values keyed by placeholder name
    Placeholders(PlaceholderValues),
}

/// An ordered list of slides to construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub slides: Vec<SlideSpec>,
}

/// One slide of a layout plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    /// Requested layout role, e.g. "TITLE_AND_CONTENT"
    pub layout: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub bullets: Vec<String>,
}

/// Placeholder values in first-sighting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderValues {
    values: Vec<(String, PlaceholderValue)>,
}

impl PlaceholderValues {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, name: &str) -> Option<&PlaceholderValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn insert(&mut self, name: String, value: PlaceholderValue) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlaceholderValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A single placeholder value: scalar text or a list of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaceholderValue {
    Text(String),
    List(Vec<String>),
}

impl PlaceholderValue {
    pub fn is_list(&self) -> bool {
        matches!(self, PlaceholderValue::List(_))
    }

    /// The items of a list value; a scalar has none.
    pub fn items(&self) -> &[String] {
        match self {
            PlaceholderValue::List(items) => items,
            PlaceholderValue::Text(_) => &[],
        }
    }

    /// The single-line rendering used for inline substitution.
    pub fn as_single_line(&self) -> String {
        match self {
            PlaceholderValue::Text(text) => text.clone(),
            PlaceholderValue::List(items) => items.join(LIST_JOINER),
        }
    }
}

/// Turn raw model output into a content plan.
///
/// Placeholder mode is selected when the template has placeholders; an
/// empty value map degrades to layout mode so a deck still comes out. The
/// same inputs always produce a structurally equal plan.
pub fn build_plan(
    raw: &str,
    info: Option<&TemplateInfo>,
    title: &str,
    desired_slides: u32,
) -> ContentPlan {
    if let Some(info) = info
        && info.has_placeholders()
    {
        let values = parse_placeholder_values(raw, info);
        if values.is_empty() {
            warn!("placeholder parse produced no values, falling back to layout mode");
        } else {
            return ContentPlan::Placeholders(values);
        }
    }

    match parse_layout_plan(raw) {
        Some(plan) => ContentPlan::Layout(plan),
        None => {
            info!("model output is not a structured plan, segmenting text instead");
            ContentPlan::Layout(fallback_plan(title, raw, desired_slides))
        },
    }
}

/// The JSON payload embedded in the raw text: the substring between the
/// first `{` and the last `}`.
fn extract_json(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

/// Parse a placeholder-value object, keeping only names the template
/// declares and coercing each value to its descriptor's cardinality.
pub fn parse_placeholder_values(raw: &str, info: &TemplateInfo) -> PlaceholderValues {
    let mut values = PlaceholderValues::default();

    let Some(root) = extract_json(raw) else {
        return values;
    };
    // The object may arrive wrapped in a "placeholders" key
    let node = match root.get("placeholders") {
        Some(inner) if inner.is_object() => inner,
        _ => &root,
    };
    let Some(object) = node.as_object() else {
        return values;
    };

    for (key, value) in object {
        let Some(descriptor) = info.placeholder(key) else {
            continue;
        };
        if descriptor.is_list {
            let items = coerce_list(value);
            if !items.is_empty() {
                values.insert(key.clone(), PlaceholderValue::List(items));
            }
        } else if let Some(text) = coerce_text(value) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                values.insert(key.clone(), PlaceholderValue::Text(trimmed.to_string()));
            }
        }
    }

    values
}

/// A list from either a native array or a delimiter-separated string.
fn coerce_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(text) => text
            .split(LIST_DELIMITERS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// A single string from a scalar or an array the model returned anyway.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(scalar_to_string)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            Some(parts.join(LIST_JOINER))
        },
        other => scalar_to_string(other),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a `{"slides":[...]}` layout plan. `None` when the payload is
/// missing, malformed, or has no slides.
pub fn parse_layout_plan(raw: &str) -> Option<LayoutPlan> {
    let root = extract_json(raw)?;
    let slides = root.get("slides")?.as_array()?;

    let mut specs = Vec::with_capacity(slides.len().min(MAX_PLAN_SLIDES));
    for entry in slides.iter().take(MAX_PLAN_SLIDES) {
        let bullets = entry
            .get("bullets")
            .or_else(|| entry.get("points"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(scalar_to_string)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        specs.push(SlideSpec {
            layout: field_string(entry, "layout"),
            title: field_string(entry, "title"),
            subtitle: field_string(entry, "subtitle"),
            bullets,
        });
    }

    if specs.is_empty() { None } else { Some(LayoutPlan { slides: specs }) }
}

fn field_string(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(scalar_to_string).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Deterministic fallback: a cover slide plus content slides segmented
/// from the raw text on blank lines.
pub fn fallback_plan(title: &str, raw: &str, desired_slides: u32) -> LayoutPlan {
    let mut slides = vec![SlideSpec {
        layout: Some("TITLE".to_string()),
        title: Some(title.to_string()),
        ..SlideSpec::default()
    }];

    let mut sections: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    if sections.is_empty() {
        sections.push(vec!["Contents", "\u{2022} Background", "\u{2022} Approach", "\u{2022} Outlook"]);
    }

    let desired = (desired_slides as usize).min(MAX_PLAN_SLIDES);
    let content_slides = sections.len().min(desired.saturating_sub(1).max(1));

    for (i, section) in sections.into_iter().take(content_slides).enumerate() {
        let mut lines = section.into_iter();
        let heading = lines.next().map(str::trim).unwrap_or_default();
        let slide_title =
            if heading.is_empty() { format!("Slide {}", i + 1) } else { heading.to_string() };

        let bullets = lines
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| strip_list_marker(l).to_string())
            .filter(|l| !l.is_empty())
            .collect();

        slides.push(SlideSpec {
            layout: Some("TITLE_AND_CONTENT".to_string()),
            title: Some(slide_title),
            subtitle: None,
            bullets,
        });
    }

    LayoutPlan { slides }
}
