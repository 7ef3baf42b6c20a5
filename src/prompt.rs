//! Prompt construction for the completion service.
//!
//! A pure function of the generation request and the introspected template.
//! Placeholder templates get an instruction listing every token and
//! demanding a flat JSON object; everything else gets the layout-plan
//! instruction, biased by the template's layouts and sample structure when
//! one is available.

use crate::introspect::TemplateInfo;
use crate::pipeline::GenerationRequest;
use std::fmt::Write as FmtWrite;

/// How much of a sample text survives into the prompt.
const SAMPLE_ELIDE_CHARS: usize = 80;

/// Build the instruction text for a generation request.
pub fn build_prompt(request: &GenerationRequest, info: Option<&TemplateInfo>) -> String {
    match info {
        Some(info) if info.has_placeholders() => placeholder_prompt(request, info),
        _ => layout_prompt(request, info),
    }
}

fn placeholder_prompt(request: &GenerationRequest, info: &TemplateInfo) -> String {
    let mut prompt = String::with_capacity(1024);
    let _ = write!(
        prompt,
        "You are a professional presentation copywriter. Write text content for the topic '{}' according to the requirements below.",
        request.title
    );
    if !request.prompt.trim().is_empty() {
        let _ = write!(prompt, "\n\nAdditional requirements: {}", request.prompt);
    }

    prompt.push_str(
        "\n\nThe template marks its replaceable positions with placeholders. Provide suitable text for every placeholder.",
    );
    prompt.push_str("\nPlaceholders (in slide order):");
    for descriptor in &info.placeholders {
        let _ = write!(
            prompt,
            "\n- slide {}: {{{{{}}}}}",
            descriptor.origin_slide + 1,
            descriptor.name
        );
        if descriptor.is_list {
            prompt.push_str(" (array of 3-6 short bullets)");
        } else {
            prompt.push_str(" (single clause, at most 50 characters)");
        }
        if let Some(sample) = descriptor.sample_text.as_deref()
            && !sample.is_empty()
        {
            let _ = write!(prompt, ", template sample: {sample}");
        }
    }

    prompt.push_str("\n\nRespond with strict JSON: one flat object keyed by placeholder name. For example:");
    prompt.push_str("\n{");
    prompt.push_str("\n  \"cover_title\": \"Palace Overview\",");
    prompt.push_str("\n  \"cover_bullets\": [\"History\", \"Architecture\"]");
    prompt.push_str("\n}");
    prompt.push_str("\nRules:");
    prompt.push_str("\n1. No prose or Markdown outside the JSON object.");
    prompt.push_str("\n2. Use only the given placeholder names; unknown keys are ignored.");
    prompt.push_str("\n3. Array placeholders take 3-6 items of at most 30 characters each.");
    prompt.push_str("\n4. Text placeholders stay professional and single-line, with no line breaks.");
    prompt
}

fn layout_prompt(request: &GenerationRequest, info: Option<&TemplateInfo>) -> String {
    let mut prompt = String::with_capacity(1024);
    let _ = write!(prompt, "Create a slide deck outline on the topic '{}'.", request.title);
    let _ = write!(prompt, "\n\nUser requirements: {}", request.prompt);

    if let Some(count) = request.slide_count {
        let _ = write!(prompt, "\n\nDesired slide count: {count}");
    }

    if let Some(info) = info {
        prompt.push_str("\n\nTemplate information:");
        let _ = write!(prompt, "\n- Page size: {}x{}", info.page_width, info.page_height);
        prompt.push_str("\n- Available layouts:");
        for layout in &info.layouts {
            let shown = layout
                .role
                .as_ref()
                .map(|r| r.as_plan_str().to_string())
                .unwrap_or_else(|| layout.name.clone());
            let _ = write!(
                prompt,
                "\n  * {} (placeholders: {})",
                shown,
                layout.placeholder_roles.join(",")
            );
        }
        if !info.samples.is_empty() {
            prompt.push_str("\n- Sample content structure:");
            for (idx, sample) in info.samples.iter().enumerate() {
                let layout_label = if !sample.layout_name.is_empty() {
                    sample.layout_name.clone()
                } else if let Some(role) = &sample.layout_role {
                    role.as_plan_str().to_string()
                } else {
                    "unknown".to_string()
                };
                let _ = write!(prompt, "\n  Slide {} (layout: {layout_label})", idx + 1);
                for text in &sample.texts {
                    prompt.push_str("\n    * ");
                    if let Some(role) = &text.role {
                        let _ = write!(prompt, "{role}: ");
                    }
                    let cleaned = elide(&text.text);
                    if cleaned.is_empty() {
                        prompt.push_str("(empty)");
                    } else {
                        prompt.push_str(&cleaned);
                    }
                }
            }
            prompt.push_str(
                "\nMirror the template's text hierarchy and volume in the generated content.",
            );
        }
    }

    prompt.push_str(
        "\n\nGiven the requirements and template layouts above, respond with strict JSON (no extra explanation), for example:\n",
    );
    prompt.push_str(concat!(
        "{\n  \"slides\": [\n",
        "    { \"layout\": \"TITLE\", \"title\": \"Cover title\", \"subtitle\": \"optional\" },\n",
        "    { \"layout\": \"TITLE_AND_CONTENT\", \"title\": \"Agenda\", \"bullets\": [\"Point 1\", \"Point 2\"] }\n",
        "  ]\n}\n",
    ));
    prompt.push_str(
        "Prefer layout values that exist in the template (such as TITLE, TITLE_ONLY, TITLE_AND_CONTENT, SECTION_HEADER). Use TITLE for the cover slide and TITLE_AND_CONTENT for content slides, with 3-6 bullets per slide.",
    );
    prompt
}

/// Collapse whitespace and elide long sample text.
fn elide(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > SAMPLE_ELIDE_CHARS {
        let head: String = collapsed.chars().take(SAMPLE_ELIDE_CHARS).collect();
        format!("{head}...")
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{LayoutDescriptor, PlaceholderDescriptor, SampleText, SlideSample};
    use crate::pptx::LayoutRole;

    fn request() -> GenerationRequest {
        GenerationRequest {
            title: "AI Trends".to_string(),
            prompt: "Cover history and outlook".to_string(),
            template_ref: None,
            slide_count: Some(8),
            style: None,
        }
    }

    fn placeholder_info() -> TemplateInfo {
        TemplateInfo {
            page_width: 1280,
            page_height: 720,
            layouts: vec![],
            samples: vec![],
            placeholders: vec![
                PlaceholderDescriptor {
                    name: "cover_title".to_string(),
                    origin_slide: 0,
                    is_list: false,
                    sample_text: Some("Annual report".to_string()),
                },
                PlaceholderDescriptor {
                    name: "cover_bullets".to_string(),
                    origin_slide: 1,
                    is_list: true,
                    sample_text: None,
                },
            ],
        }
    }

    #[test]
    fn test_placeholder_prompt_lists_descriptors() {
        let prompt = build_prompt(&request(), Some(&placeholder_info()));
        assert!(prompt.contains("slide 1: {{cover_title}} (single clause"));
        assert!(prompt.contains("slide 2: {{cover_bullets}} (array of 3-6"));
        assert!(prompt.contains("template sample: Annual report"));
        assert!(prompt.contains("unknown keys are ignored"));
    }

    #[test]
    fn test_layout_prompt_without_template() {
        let prompt = build_prompt(&request(), None);
        assert!(prompt.contains("'AI Trends'"));
        assert!(prompt.contains("Desired slide count: 8"));
        assert!(prompt.contains("\"slides\""));
        assert!(!prompt.contains("Template information"));
    }

    #[test]
    fn test_layout_prompt_with_template_structure() {
        let info = TemplateInfo {
            page_width: 960,
            page_height: 540,
            layouts: vec![LayoutDescriptor {
                name: "Big Title".to_string(),
                role: Some(LayoutRole::Title),
                placeholder_roles: vec!["ctrTitle".to_string(), "subTitle".to_string()],
            }],
            samples: vec![SlideSample {
                layout_name: "Big Title".to_string(),
                layout_role: Some(LayoutRole::Title),
                texts: vec![SampleText { role: Some("ctrTitle".to_string()), text: "Welcome".to_string() }],
            }],
            placeholders: vec![],
        };
        let prompt = build_prompt(&request(), Some(&info));
        assert!(prompt.contains("Page size: 960x540"));
        assert!(prompt.contains("TITLE (placeholders: ctrTitle,subTitle)"));
        assert!(prompt.contains("Slide 1 (layout: Big Title)"));
        assert!(prompt.contains("ctrTitle: Welcome"));
    }
}
