//! Template introspection.
//!
//! Derives a machine-usable description of a template's layout vocabulary,
//! sample content, and placeholder tokens. The description drives prompt
//! construction, content-plan parsing, and deck assembly; introspection is
//! the only component that decides between placeholder mode and layout
//! mode.

use crate::error::Result;
use crate::opc::PackURI;
use crate::opc::rel::reltype;
use crate::placeholder;
use crate::pptx::slide::{LayoutRole, csld_name, layout_role, master_layout_rids};
use crate::pptx::{Package, shapes};
use log::warn;
use serde::{Deserialize, Serialize};

/// How many slides feed the sample and placeholder scans.
const MAX_SAMPLE_SLIDES: usize = 8;

/// Page size assumed when the template does not declare one, in pixels.
pub const DEFAULT_PAGE_SIZE: (u32, u32) = (1280, 720);

/// A machine-usable description of a slide-deck template.
///
/// Owned by a single introspection call and immutable afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInfo {
    /// Page width in pixels
    pub page_width: u32,
    /// Page height in pixels
    pub page_height: u32,
    /// Every layout reachable from every master
    pub layouts: Vec<LayoutDescriptor>,
    /// Content samples from the first slides, for prompting only
    pub samples: Vec<SlideSample>,
    /// Discovered substitution tokens, in order of first sighting
    pub placeholders: Vec<PlaceholderDescriptor>,
}

impl TemplateInfo {
    /// Whether the template carries `{{...}}` tokens; selects placeholder
    /// mode downstream.
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Look up a placeholder descriptor by name.
    pub fn placeholder(&self, name: &str) -> Option<&PlaceholderDescriptor> {
        self.placeholders.iter().find(|p| p.name == name)
    }
}

/// A layout declared by one of the template's masters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    /// Declared layout name
    pub name: String,
    /// Layout role, when the layout declares a type
    pub role: Option<LayoutRole>,
    /// Placeholder roles found among the layout's text shapes
    pub placeholder_roles: Vec<String>,
}

/// Sample content captured from one template slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSample {
    /// Name of the slide's layout
    pub layout_name: String,
    /// Role of the slide's layout
    pub layout_role: Option<LayoutRole>,
    /// Text shapes on the slide, in document order
    pub texts: Vec<SampleText>,
}

/// One text shape of a sample slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleText {
    /// The shape's placeholder role, if any
    pub role: Option<String>,
    /// Raw text
    pub text: String,
}

/// A `{{name}}` substitution point discovered in the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderDescriptor {
    /// Token name, unique within a template
    pub name: String,
    /// Zero-based index of the slide the token was first seen on
    pub origin_slide: usize,
    /// Whether values should be lists of bullet items
    pub is_list: bool,
    /// Token-stripped excerpt of the surrounding template text
    pub sample_text: Option<String>,
}

/// Inspect template bytes into a `TemplateInfo`.
///
/// Unparseable input is not fatal: the failure is logged and `None`
/// returned, and the caller proceeds as if no template was given.
pub fn inspect_template(bytes: &[u8]) -> Option<TemplateInfo> {
    if bytes.is_empty() {
        return None;
    }
    match inspect(bytes) {
        Ok(info) => Some(info),
        Err(e) => {
            warn!("template introspection failed, proceeding without template: {e}");
            None
        },
    }
}

fn inspect(bytes: &[u8]) -> Result<TemplateInfo> {
    let package = Package::from_bytes(bytes)?;
    let pres = package.presentation()?;

    let (page_width, page_height) = pres.page_size()?.unwrap_or(DEFAULT_PAGE_SIZE);

    let mut layouts = Vec::new();
    for master_partname in pres.master_partnames()? {
        let master = package.opc().part(&master_partname)?;
        for rid in master_layout_rids(master.blob())? {
            let layout_partname = master.target_partname(&rid)?;
            let layout_part = package.opc().part(&layout_partname)?;
            layouts.push(describe_layout(layout_part.blob())?);
        }
    }

    let mut samples = Vec::new();
    let mut placeholders: Vec<PlaceholderDescriptor> = Vec::new();

    for (slide_index, slide_partname) in
        pres.slide_partnames()?.iter().take(MAX_SAMPLE_SLIDES).enumerate()
    {
        let slide_part = package.opc().part(slide_partname)?;
        let (layout_name, role) = slide_layout_identity(&package, slide_partname)?;

        let mut texts = Vec::new();
        for shape in shapes::collect_text_shapes(slide_part.blob())? {
            let text = shape.text()?;
            collect_placeholders(&mut placeholders, &shape, &text, slide_index);
            texts.push(SampleText { role: shape.placeholder_role(), text });
        }

        samples.push(SlideSample { layout_name, layout_role: role, texts });
    }

    Ok(TemplateInfo { page_width, page_height, layouts, samples, placeholders })
}

fn describe_layout(xml: &[u8]) -> Result<LayoutDescriptor> {
    let mut placeholder_roles = Vec::new();
    for shape in shapes::collect_text_shapes(xml)? {
        if let Some(role) = shape.placeholder_role() {
            placeholder_roles.push(role);
        }
    }
    Ok(LayoutDescriptor { name: csld_name(xml)?, role: layout_role(xml)?, placeholder_roles })
}

/// The name and role of the layout a slide is built on.
fn slide_layout_identity(
    package: &Package,
    slide_partname: &PackURI,
) -> Result<(String, Option<LayoutRole>)> {
    let slide_part = package.opc().part(slide_partname)?;
    if let Some(rel) = slide_part.rels().rel_of_type(reltype::SLIDE_LAYOUT)
        && let Ok(layout_partname) = rel.target_partname()
        && let Ok(layout_part) = package.opc().part(&layout_partname)
    {
        return Ok((csld_name(layout_part.blob())?, layout_role(layout_part.blob())?));
    }
    Ok((String::new(), None))
}

/// Merge every token occurrence of one text shape into the descriptor set.
///
/// Cardinality promotion is monotonic, the origin slide keeps the minimum,
/// and the sample text keeps the first non-blank summary.
fn collect_placeholders(
    collector: &mut Vec<PlaceholderDescriptor>,
    shape: &shapes::TextShape,
    text: &str,
    slide_index: usize,
) {
    let tokens = placeholder::find_tokens(text);
    if tokens.is_empty() {
        return;
    }

    let bullet_style = shape.has_bulleted_paragraph();
    let sample = placeholder::summarize_sample(text);

    for token in tokens {
        let list_candidate = bullet_style || placeholder::looks_like_list_name(&token.name);
        match collector.iter_mut().find(|d| d.name == token.name) {
            Some(descriptor) => {
                if list_candidate {
                    descriptor.is_list = true;
                }
                if slide_index < descriptor.origin_slide {
                    descriptor.origin_slide = slide_index;
                }
                if descriptor.sample_text.as_deref().is_none_or(str::is_empty) && !sample.is_empty()
                {
                    descriptor.sample_text = Some(sample.clone());
                }
            },
            None => {
                collector.push(PlaceholderDescriptor {
                    name: token.name,
                    origin_slide: slide_index,
                    is_list: list_candidate,
                    sample_text: if sample.is_empty() { None } else { Some(sample.clone()) },
                });
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_rejects_garbage() {
        assert!(inspect_template(b"").is_none());
        assert!(inspect_template(b"not a zip archive").is_none());
    }

    #[test]
    fn test_blank_scaffold_has_no_placeholders() {
        let bytes = crate::pptx::scaffold::blank_package(1280, 720).to_bytes().unwrap();
        let info = inspect_template(&bytes).unwrap();

        assert_eq!((info.page_width, info.page_height), (1280, 720));
        assert!(!info.has_placeholders());
        assert_eq!(info.layouts.len(), 4);
        assert_eq!(info.layouts[0].role, Some(LayoutRole::Title));
        assert!(info.layouts[1].placeholder_roles.iter().any(|r| r == "body"));
        assert!(info.samples.is_empty());
    }

    #[test]
    fn test_descriptor_merge_rules() {
        let mut collector = Vec::new();
        let shape_xml: &[u8] = br#"<p:sp><p:txBody><a:p><a:r><a:t>{{agenda}}</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let shapes = shapes::collect_text_shapes(shape_xml).unwrap();

        // Seen plain on slide 2 first
        collect_placeholders(&mut collector, &shapes[0], "{{agenda}}", 2);
        assert_eq!(collector.len(), 1);
        assert!(!collector[0].is_list);
        assert_eq!(collector[0].origin_slide, 2);

        // Seen again on slide 0 inside a bulleted shape
        let bulleted_xml: &[u8] = br#"<p:sp><p:txBody><a:p><a:pPr><a:buChar char="&#8226;"/></a:pPr><a:r><a:t>{{agenda}}</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let bulleted = shapes::collect_text_shapes(bulleted_xml).unwrap();
        collect_placeholders(&mut collector, &bulleted[0], "Intro {{agenda}}", 0);

        assert_eq!(collector.len(), 1);
        assert!(collector[0].is_list);
        assert_eq!(collector[0].origin_slide, 0);
        assert_eq!(collector[0].sample_text.as_deref(), Some("Intro"));
    }

    #[test]
    fn test_introspection_is_deterministic() {
        let template = crate::testkit::template_with(&[
            vec![
                crate::testkit::sp(Some("title"), false, "{{cover_title}}"),
                crate::testkit::sp(None, true, "{{agenda}}"),
            ],
            vec![crate::testkit::sp(None, false, "Closing {{agenda}} notes")],
        ]);

        let first = inspect_template(&template).unwrap();
        let second = inspect_template(&template).unwrap();
        assert_eq!(first, second);

        // Descriptor names are pairwise distinct
        let names: Vec<_> = first.placeholders.iter().map(|p| p.name.as_str()).collect();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
        assert_eq!(names, vec!["cover_title", "agenda"]);
    }

    #[test]
    fn test_promotion_across_slides() {
        // The same name on two slides, bulleted on the first sighting only:
        // the descriptor is a list and keeps the lower origin index
        let template = crate::testkit::template_with(&[
            vec![crate::testkit::sp(None, true, "{{notes}}")],
            vec![crate::testkit::sp(None, false, "More {{notes}}")],
        ]);

        let info = inspect_template(&template).unwrap();
        let descriptor = info.placeholder("notes").unwrap();
        assert!(descriptor.is_list);
        assert_eq!(descriptor.origin_slide, 0);
        assert_eq!(descriptor.sample_text.as_deref(), Some("More"));

        // Samples capture the slides' text and roles
        assert_eq!(info.samples.len(), 2);
        assert_eq!(info.samples[0].texts[0].text, "{{notes}}");
        assert_eq!(info.samples[0].layout_name, "Title and Content");
    }

    #[test]
    fn test_list_promotion_by_name() {
        let mut collector = Vec::new();
        let shape_xml: &[u8] = br#"<p:sp><p:txBody><a:p><a:r><a:t>x</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let shapes = shapes::collect_text_shapes(shape_xml).unwrap();
        collect_placeholders(&mut collector, &shapes[0], "{{cover_bullets}} {{cover_title}}", 0);

        assert_eq!(collector.len(), 2);
        assert!(collector[0].is_list);
        assert!(!collector[1].is_list);
    }
}
