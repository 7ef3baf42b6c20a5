//! Deck assembly: the document mutation that turns a content plan into
//! final deck bytes.
//!
//! Two modes, selected by the plan shape. Placeholder plans substitute
//! into the template structure-preservingly: slide count and ordering
//! never change, only text does. Layout plans build the deck slide by
//! slide, cloning template slides when a template exists and
//! instantiating layout placeholders otherwise.

use crate::error::{Error, Result};
use crate::introspect::{DEFAULT_PAGE_SIZE, TemplateInfo};
use crate::opc::{PackURI, Part, Relationships};
use crate::placeholder::{
    contains_token, exact_token, find_tokens, replace_tokens, strip_list_marker,
};
use crate::plan::{ContentPlan, PlaceholderValues, SlideSpec};
use crate::pptx::presentation::{append_slide, remove_all_slides};
use crate::pptx::shapes::{TextShape, collect_text_shapes};
use crate::pptx::slide::{csld_name, layout_role};
use crate::pptx::txbody::{ParagraphSpec, rebuild_paragraphs, substitute_text_runs, transform_text_shapes};
use crate::pptx::{Package, scaffold};

// Run sizes in hundredths of a point, matching what a writer would pick
// by hand for each target
const TITLE_SIZE: u32 = 3200;
const FALLBACK_TITLE_SIZE: u32 = 3600;
const SUBTITLE_SIZE: u32 = 2000;
const SUBTITLE_IN_BODY_SIZE: u32 = 1800;
const BULLET_SIZE: u32 = 2000;
const SCALAR_SIZE: u32 = 2400;

/// Assemble final deck bytes from a content plan.
///
/// `template` is the original template archive; layout mode works without
/// one (a blank deck is scaffolded at the template's page size, or the
/// default). `default_title` fills slides whose spec has no usable title.
pub fn assemble(
    info: Option<&TemplateInfo>,
    plan: &ContentPlan,
    template: Option<&[u8]>,
    default_title: &str,
) -> Result<Vec<u8>> {
    match plan {
        ContentPlan::Placeholders(values) => {
            let template = template.ok_or_else(|| {
                Error::Assembly("placeholder plan requires template bytes".to_string())
            })?;
            assemble_placeholder_mode(template, values)
        },
        ContentPlan::Layout(layout_plan) => {
            assemble_layout_mode(info, &layout_plan.slides, template, default_title)
        },
    }
}

// ============================================================================
// Placeholder mode
// ============================================================================

fn assemble_placeholder_mode(template: &[u8], values: &PlaceholderValues) -> Result<Vec<u8>> {
    let mut package = Package::from_bytes(template)?;
    let slide_partnames = package.presentation()?.slide_partnames()?;

    for partname in &slide_partnames {
        let xml = package.opc().part(partname).map_err(Error::Opc)?.blob().to_vec();
        let substituted = substitute_slide(&xml, values)?;
        let swept = sweep_residual_tokens(&substituted)?;
        package.opc_mut().part_mut(partname).map_err(Error::Opc)?.set_blob(swept);
    }

    package.to_bytes()
}

/// Apply placeholder values to every text shape of one slide.
fn substitute_slide(slide_xml: &[u8], values: &PlaceholderValues) -> Result<Vec<u8>> {
    transform_text_shapes(slide_xml, |_, sp| {
        let shape = TextShape::from_sp_xml(sp.to_vec());
        let text = shape.text()?;
        if find_tokens(&text).is_empty() {
            return Ok(None);
        }

        // A shape that is nothing but one token gets structural
        // replacement; anything else keeps its runs and formatting
        if let Some(name) = exact_token(&text) {
            let paragraphs = match values.get(&name) {
                None => Vec::new(),
                Some(value) if value.is_list() => value
                    .items()
                    .iter()
                    .map(|item| strip_list_marker(item.trim()))
                    .filter(|item| !item.is_empty())
                    .map(|item| ParagraphSpec::bulleted(item, BULLET_SIZE))
                    .collect(),
                Some(value) => {
                    let line = value.as_single_line();
                    let line = line.trim();
                    if line.is_empty() {
                        Vec::new()
                    } else {
                        vec![ParagraphSpec::plain(line, SCALAR_SIZE)]
                    }
                },
            };
            return Ok(Some(rebuild_paragraphs(sp, &paragraphs)?));
        }

        let rewritten = substitute_text_runs(sp, |run| {
            if contains_token(run) {
                Some(replace_tokens(run, |name| {
                    values.get(name).map(|v| v.as_single_line()).unwrap_or_default()
                }))
            } else {
                None
            }
        })?;
        Ok(Some(rewritten))
    })
}

/// Strip any token that survived substitution, clearing shapes whose text
/// becomes blank. Keeps template syntax from leaking into the artifact.
fn sweep_residual_tokens(slide_xml: &[u8]) -> Result<Vec<u8>> {
    transform_text_shapes(slide_xml, |_, sp| {
        let shape = TextShape::from_sp_xml(sp.to_vec());
        let text = shape.text()?;
        if find_tokens(&text).is_empty() {
            return Ok(None);
        }

        let stripped = substitute_text_runs(sp, |run| {
            if contains_token(run) { Some(replace_tokens(run, |_| String::new())) } else { None }
        })?;

        let remaining = TextShape::from_sp_xml(stripped.clone()).text()?;
        if remaining.trim().is_empty() {
            Ok(Some(rebuild_paragraphs(&stripped, &[])?))
        } else {
            Ok(Some(stripped))
        }
    })
}

// ============================================================================
// Layout mode
// ============================================================================

fn assemble_layout_mode(
    info: Option<&TemplateInfo>,
    slides: &[SlideSpec],
    template: Option<&[u8]>,
    default_title: &str,
) -> Result<Vec<u8>> {
    let mut package = match template {
        Some(bytes) => Package::from_bytes(bytes)?,
        None => {
            let (width, height) = info
                .map(|i| (i.page_width, i.page_height))
                .unwrap_or(DEFAULT_PAGE_SIZE);
            Package::from_opc(scaffold::blank_package(width, height))
        },
    };

    // Capture the template's own slides before emptying the deck; they are
    // the visual source each plan slide clones from
    let source_partnames = package.presentation()?.slide_partnames()?;
    let mut sources: Vec<Part> = Vec::with_capacity(source_partnames.len());
    for partname in &source_partnames {
        sources.push(package.opc().part(partname).map_err(Error::Opc)?.clone());
    }
    remove_all_slides(package.opc_mut())?;

    for (index, spec) in slides.iter().enumerate() {
        let is_cover = index == 0;
        let (slide_xml, rels) = if sources.is_empty() {
            instantiate_from_layout(&package, spec, is_cover)?
        } else {
            // Index-clamped clone keeps per-template visuals even when the
            // plan outruns the template
            let source = &sources[index.min(sources.len() - 1)];
            (source.blob().to_vec(), source.rels().clone())
        };
        let slide_xml = apply_slide_content(&slide_xml, spec, is_cover, default_title)?;
        append_slide(package.opc_mut(), slide_xml, rels)?;
    }

    package.to_bytes()
}

/// Pick a layout by role across every master and instantiate a slide from
/// its placeholder shapes. Falls back through the default roles, then any
/// layout at all, and finally a bare slide when the package has none.
fn instantiate_from_layout(
    package: &Package,
    spec: &SlideSpec,
    is_cover: bool,
) -> Result<(Vec<u8>, Relationships)> {
    let mut wants: Vec<String> = Vec::new();
    if let Some(layout) = &spec.layout {
        wants.push(layout.to_uppercase());
    }
    wants.push(if is_cover { "TITLE" } else { "TITLE_AND_CONTENT" }.to_string());
    wants.push("TITLE_ONLY".to_string());
    wants.dedup();

    let layouts = enumerate_layouts(package)?;
    let chosen = choose_layout(&layouts, &wants);

    let Some((layout_partname, _, _)) = chosen else {
        // No masters or layouts anywhere: a bare slide is still a slide
        return Ok((bare_slide_xml(""), Relationships::new("/ppt/slides".to_string())));
    };

    let layout_part = package.opc().part(layout_partname).map_err(Error::Opc)?;
    let mut shapes_xml = String::new();
    for shape in collect_text_shapes(layout_part.blob())? {
        // Content placeholders carry over; date, footer and slide-number
        // chrome stays with the layout
        if matches!(
            shape.placeholder_role().as_deref(),
            Some("title") | Some("ctrTitle") | Some("subTitle") | Some("body")
        ) {
            shapes_xml.push_str(std::str::from_utf8(shape.xml()).map_err(|e| Error::Xml(e.to_string()))?);
        }
    }

    let mut rels = Relationships::new("/ppt/slides".to_string());
    rels.get_or_add(
        crate::opc::rel::reltype::SLIDE_LAYOUT,
        &layout_partname.relative_ref("/ppt/slides"),
    );

    Ok((bare_slide_xml(&shapes_xml), rels))
}

/// All layouts of all masters, in master-then-declaration order.
fn enumerate_layouts(
    package: &Package,
) -> Result<Vec<(PackURI, Option<crate::pptx::LayoutRole>, String)>> {
    let mut layouts = Vec::new();
    let pres = package.presentation()?;
    for master_partname in pres.master_partnames()? {
        let master = package.opc().part(&master_partname).map_err(Error::Opc)?;
        for rid in crate::pptx::slide::master_layout_rids(master.blob())? {
            let layout_partname = master.target_partname(&rid).map_err(Error::Opc)?;
            let layout_part = package.opc().part(&layout_partname).map_err(Error::Opc)?;
            let role = layout_role(layout_part.blob())?;
            let name = csld_name(layout_part.blob())?;
            layouts.push((layout_partname, role, name));
        }
    }
    Ok(layouts)
}

fn choose_layout<'a>(
    layouts: &'a [(PackURI, Option<crate::pptx::LayoutRole>, String)],
    wants: &[String],
) -> Option<&'a (PackURI, Option<crate::pptx::LayoutRole>, String)> {
    for want in wants {
        if let Some(found) = layouts
            .iter()
            .find(|(_, role, _)| role.as_ref().is_some_and(|r| r.matches(want)))
        {
            return Some(found);
        }
        if let Some(found) = layouts
            .iter()
            .find(|(_, _, name)| name.to_uppercase().replace(' ', "_").contains(want.as_str()))
        {
            return Some(found);
        }
    }
    layouts.first()
}

fn bare_slide_xml(shapes: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
    .into_bytes()
}

// ============================================================================
// Per-slide content overwrite
// ============================================================================

/// Where the subtitle ended up, mirroring how it constrains bullet
/// placement.
#[derive(PartialEq)]
enum SubtitlePlacement {
    None,
    SubtitlePlaceholder,
    BodyOrOther,
}

/// Overwrite a slide's text with the planned content.
///
/// Role-typed shapes and ghost text are cleared first; the title goes to
/// the title placeholder or, failing that, a prominent rendering in the
/// first non-title/non-body shape. Subtitle and bullets follow the
/// cover/content rules. No shapes are ever created.
fn apply_slide_content(
    slide_xml: &[u8],
    spec: &SlideSpec,
    is_cover: bool,
    default_title: &str,
) -> Result<Vec<u8>> {
    let shapes = collect_text_shapes(slide_xml)?;

    // None = leave untouched, Some(paragraphs) = rebuild (empty clears)
    let mut decisions: Vec<Option<Vec<ParagraphSpec>>> = vec![None; shapes.len()];
    let mut claimed = vec![false; shapes.len()];

    for (i, shape) in shapes.iter().enumerate() {
        if shape.placeholder_role().is_some() {
            decisions[i] = Some(Vec::new());
        } else if is_ghost_text(&shape.text()?) {
            decisions[i] = Some(Vec::new());
        }
    }

    let title = spec
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(default_title);
    let subtitle = spec.subtitle.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let mut bullets: Vec<String> = spec
        .bullets
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    // Title: placeholder first, then a prominent fallback shape
    if let Some(i) = find_shape(&shapes, &claimed, |s| s.is_title_placeholder()) {
        decisions[i] = Some(vec![ParagraphSpec::title(title, TITLE_SIZE)]);
        claimed[i] = true;
    } else if let Some(i) = find_shape(&shapes, &claimed, |s| {
        !s.is_title_placeholder() && !s.is_body_placeholder()
    }) {
        decisions[i] = Some(vec![ParagraphSpec::title(title, FALLBACK_TITLE_SIZE).centered()]);
        claimed[i] = true;
    }

    let mut placement = SubtitlePlacement::None;
    if is_cover {
        if let Some(subtitle) = subtitle {
            placement =
                write_subtitle(&shapes, &mut decisions, &mut claimed, subtitle, bullets.is_empty());
        }
        if !bullets.is_empty() && placement != SubtitlePlacement::BodyOrOther {
            write_bullets(&shapes, &mut decisions, &mut claimed, &bullets);
        }
    } else {
        if let Some(subtitle) = subtitle {
            placement = write_subtitle(&shapes, &mut decisions, &mut claimed, subtitle, false);
            if placement == SubtitlePlacement::None {
                // A subtitle with nowhere to live leads the bullet list
                // rather than being dropped
                bullets.insert(0, subtitle.to_string());
            }
        }
        if !bullets.is_empty() {
            write_bullets(&shapes, &mut decisions, &mut claimed, &bullets);
        }
    }

    transform_text_shapes(slide_xml, |index, sp| match decisions.get(index) {
        Some(Some(paragraphs)) => Ok(Some(rebuild_paragraphs(sp, paragraphs)?)),
        _ => Ok(None),
    })
}

fn find_shape<F>(shapes: &[TextShape], claimed: &[bool], pred: F) -> Option<usize>
where
    F: Fn(&TextShape) -> bool,
{
    shapes.iter().enumerate().find(|(i, s)| !claimed[*i] && pred(s)).map(|(i, _)| i)
}

fn write_subtitle(
    shapes: &[TextShape],
    decisions: &mut [Option<Vec<ParagraphSpec>>],
    claimed: &mut [bool],
    subtitle: &str,
    allow_body_fallback: bool,
) -> SubtitlePlacement {
    if let Some(i) = find_shape(shapes, claimed, |s| s.is_subtitle_placeholder()) {
        decisions[i] = Some(vec![ParagraphSpec::inherit(subtitle, SUBTITLE_SIZE)]);
        claimed[i] = true;
        return SubtitlePlacement::SubtitlePlaceholder;
    }
    if !allow_body_fallback {
        return SubtitlePlacement::None;
    }
    if let Some(i) = find_shape(shapes, claimed, |s| s.is_body_placeholder()) {
        decisions[i] = Some(vec![ParagraphSpec::inherit(subtitle, SUBTITLE_IN_BODY_SIZE)]);
        claimed[i] = true;
        return SubtitlePlacement::BodyOrOther;
    }
    if let Some(i) = find_shape(shapes, claimed, |s| s.placeholder_role().is_none()) {
        decisions[i] = Some(vec![ParagraphSpec::inherit(subtitle, SUBTITLE_IN_BODY_SIZE)]);
        claimed[i] = true;
        return SubtitlePlacement::BodyOrOther;
    }
    SubtitlePlacement::None
}

fn write_bullets(
    shapes: &[TextShape],
    decisions: &mut [Option<Vec<ParagraphSpec>>],
    claimed: &mut [bool],
    bullets: &[String],
) {
    let paragraphs: Vec<ParagraphSpec> = bullets
        .iter()
        .map(|b| strip_list_marker(b.trim()))
        .filter(|b| !b.is_empty())
        .map(|b| ParagraphSpec::bulleted(b, BULLET_SIZE))
        .collect();

    let target = find_shape(shapes, claimed, |s| s.is_body_placeholder()).or_else(|| {
        // Never create a shape; reuse any non-title, non-subtitle text
        // shape that is still free
        find_shape(shapes, claimed, |s| {
            !s.is_title_placeholder() && !s.is_subtitle_placeholder()
        })
    });

    if let Some(i) = target {
        decisions[i] = Some(paragraphs);
        claimed[i] = true;
    }
}

/// Template-authored prompt text that must never survive into a deck.
fn is_ghost_text(text: &str) -> bool {
    let normalized: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if normalized.is_empty() {
        return false;
    }
    let lower = normalized.to_lowercase();
    lower.contains("clicktoadd")
        || lower.contains("clicktoedit")
        || normalized.contains("\u{5355}\u{51fb}\u{6b64}\u{5904}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{LayoutPlan, PlaceholderValue};

    fn sp(ph: Option<&str>, text: &str) -> String {
        let nv = match ph {
            Some(ph) => format!(r#"<p:nvSpPr><p:nvPr><p:ph type="{ph}"/></p:nvPr></p:nvSpPr>"#),
            None => "<p:nvSpPr><p:nvPr/></p:nvSpPr>".to_string(),
        };
        format!(
            r#"<p:sp>{nv}<p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
        )
    }

    fn slide(shapes: &[String]) -> Vec<u8> {
        format!(
            r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            shapes.join("")
        )
        .into_bytes()
    }

    fn shape_texts(xml: &[u8]) -> Vec<String> {
        collect_text_shapes(xml).unwrap().iter().map(|s| s.text().unwrap()).collect()
    }

    #[test]
    fn test_substitute_slide_structural_list() {
        let mut values = PlaceholderValues::default();
        values.insert(
            "items".to_string(),
            PlaceholderValue::List(vec!["First".to_string(), "\u{2022} Second".to_string()]),
        );
        let xml = slide(&[sp(None, "{{items}}")]);

        let out = substitute_slide(&xml, &values).unwrap();
        assert_eq!(shape_texts(&out), vec!["First\nSecond"]);
        assert!(String::from_utf8(out).unwrap().contains("buChar"));
    }

    #[test]
    fn test_substitute_slide_inline_keeps_surroundings() {
        let mut values = PlaceholderValues::default();
        values.insert("name".to_string(), PlaceholderValue::Text("Ada".to_string()));
        let xml = slide(&[sp(None, "Welcome, {{name}}!")]);

        let out = substitute_slide(&xml, &values).unwrap();
        assert_eq!(shape_texts(&out), vec!["Welcome, Ada!"]);
    }

    #[test]
    fn test_unmatched_exact_token_clears_shape() {
        let values = PlaceholderValues::default();
        let xml = slide(&[sp(None, "{{orphan}}")]);

        let out = substitute_slide(&xml, &values).unwrap();
        assert_eq!(shape_texts(&out), vec![""]);
    }

    #[test]
    fn test_sweep_strips_leftovers() {
        let xml = slide(&[sp(None, "prefix {{leftover}} suffix")]);
        let out = sweep_residual_tokens(&xml).unwrap();
        let texts = shape_texts(&out);
        assert_eq!(texts, vec!["prefix  suffix"]);
        assert!(!String::from_utf8(out).unwrap().contains("{{"));
    }

    #[test]
    fn test_apply_slide_content_cover() {
        let xml = slide(&[
            sp(Some("ctrTitle"), "old title"),
            sp(Some("subTitle"), "old subtitle"),
            sp(None, "Click to add text"),
        ]);
        let spec = SlideSpec {
            layout: Some("TITLE".to_string()),
            title: Some("AI Trends".to_string()),
            subtitle: Some("2026 outlook".to_string()),
            bullets: vec![],
        };
        let out = apply_slide_content(&xml, &spec, true, "fallback").unwrap();
        let texts = shape_texts(&out);
        assert_eq!(texts, vec!["AI Trends", "2026 outlook", ""]);
    }

    #[test]
    fn test_apply_slide_content_subtitle_prepends_when_homeless() {
        let xml = slide(&[sp(Some("title"), ""), sp(Some("body"), "ghost")]);
        let spec = SlideSpec {
            layout: None,
            title: Some("Topic".to_string()),
            subtitle: Some("A subtitle".to_string()),
            bullets: vec!["one".to_string()],
        };
        let out = apply_slide_content(&xml, &spec, false, "fallback").unwrap();
        let texts = shape_texts(&out);
        assert_eq!(texts[0], "Topic");
        assert_eq!(texts[1], "A subtitle\none");
    }

    #[test]
    fn test_apply_slide_content_blank_title_uses_default() {
        let xml = slide(&[sp(Some("title"), "x")]);
        let spec = SlideSpec::default();
        let out = apply_slide_content(&xml, &spec, false, "Deck Title").unwrap();
        assert_eq!(shape_texts(&out), vec!["Deck Title"]);
    }

    #[test]
    fn test_layout_mode_scaffold_counts() {
        let slides: Vec<SlideSpec> = vec![
            SlideSpec {
                layout: Some("TITLE".to_string()),
                title: Some("Cover".to_string()),
                ..SlideSpec::default()
            },
            SlideSpec {
                layout: Some("TITLE_AND_CONTENT".to_string()),
                title: Some("Body".to_string()),
                bullets: vec!["a".to_string(), "b".to_string()],
                ..SlideSpec::default()
            },
        ];
        let plan = ContentPlan::Layout(LayoutPlan { slides });
        let bytes = assemble(None, &plan, None, "Cover").unwrap();

        let package = Package::from_bytes(&bytes).unwrap();
        let partnames = package.presentation().unwrap().slide_partnames().unwrap();
        assert_eq!(partnames.len(), 2);

        let second = package.opc().part(&partnames[1]).unwrap();
        let texts = shape_texts(second.blob());
        assert!(texts.contains(&"Body".to_string()));
        assert!(texts.contains(&"a\nb".to_string()));
    }

    #[test]
    fn test_choose_layout_prefers_role_then_name() {
        use crate::pptx::LayoutRole;
        let layouts = vec![
            (PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap(), Some(LayoutRole::Blank), "Plain".to_string()),
            (PackURI::new("/ppt/slideLayouts/slideLayout2.xml").unwrap(), Some(LayoutRole::TitleAndContent), "Body".to_string()),
            (PackURI::new("/ppt/slideLayouts/slideLayout3.xml").unwrap(), None, "My Title Only".to_string()),
        ];

        let wants = vec!["TITLE_AND_CONTENT".to_string()];
        let chosen = choose_layout(&layouts, &wants).unwrap();
        assert_eq!(chosen.0.as_str(), "/ppt/slideLayouts/slideLayout2.xml");

        let wants = vec!["TITLE_ONLY".to_string()];
        let chosen = choose_layout(&layouts, &wants).unwrap();
        assert_eq!(chosen.0.as_str(), "/ppt/slideLayouts/slideLayout3.xml");

        let wants = vec!["SECTION_HEADER".to_string()];
        let chosen = choose_layout(&layouts, &wants).unwrap();
        assert_eq!(chosen.0.as_str(), "/ppt/slideLayouts/slideLayout1.xml");
    }

    #[test]
    fn test_placeholder_roundtrip_scenario() {
        use crate::testkit::{deck_slide_xml, deck_texts, sp, template_with};

        let template = template_with(&[vec![
            sp(Some("title"), false, "{{cover_title}}"),
            sp(None, true, "{{cover_bullets}}"),
            sp(None, false, "Presented by {{cover_title}}"),
        ]]);
        let info = crate::introspect::inspect_template(&template).unwrap();
        assert!(info.has_placeholders());

        let raw = r#"{"cover_title":"Palace Overview","cover_bullets":["History","Architecture","Legacy"]}"#;
        let plan = crate::plan::build_plan(raw, Some(&info), "fallback", 10);
        let deck = assemble(Some(&info), &plan, Some(&template), "fallback").unwrap();

        let texts = deck_texts(&deck);
        // Slide count and ordering preserved, only text mutated
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0][0], "Palace Overview");
        assert_eq!(texts[0][1], "History\nArchitecture\nLegacy");
        assert_eq!(texts[0][2], "Presented by Palace Overview");

        // Round-trip cleanliness: no token survives anywhere
        assert!(!deck_slide_xml(&deck).contains("{{"));
    }

    #[test]
    fn test_placeholder_mode_clears_unanswered_tokens() {
        use crate::testkit::{deck_slide_xml, deck_texts, sp, template_with};

        let template = template_with(&[
            vec![sp(None, false, "{{answered}}"), sp(None, false, "mixed {{ignored}} tail")],
            vec![sp(None, true, "{{ignored_list}}")],
        ]);
        let info = crate::introspect::inspect_template(&template).unwrap();

        let raw = r#"{"answered":"Yes"}"#;
        let plan = crate::plan::build_plan(raw, Some(&info), "fallback", 10);
        let deck = assemble(Some(&info), &plan, Some(&template), "fallback").unwrap();

        let texts = deck_texts(&deck);
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0][0], "Yes");
        assert_eq!(texts[0][1], "mixed  tail");
        assert_eq!(texts[1][0], "");
        assert!(!deck_slide_xml(&deck).contains("{{"));
    }

    #[test]
    fn test_layout_plan_scenario() {
        use crate::testkit::deck_texts;

        let raw = r#"{"slides":[
            {"layout":"TITLE","title":"AI Trends"},
            {"layout":"TITLE_AND_CONTENT","title":"History","bullets":["1950s","2020s"]}
        ]}"#;
        let plan = crate::plan::build_plan(raw, None, "AI Trends", 10);
        let deck = assemble(None, &plan, None, "AI Trends").unwrap();

        let texts = deck_texts(&deck);
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains(&"AI Trends".to_string()));
        assert!(texts[1].contains(&"History".to_string()));
        assert!(texts[1].contains(&"1950s\n2020s".to_string()));
    }

    #[test]
    fn test_unparseable_output_segments_to_requested_count() {
        use crate::testkit::deck_texts;

        let raw = "Intro paragraph about nothing.\n\nOrigins\nfacts\n\nGrowth\nmore facts\n\nRisks\nsome\n\nOutlook\nbright\n\nExtra\nignored";
        let plan = crate::plan::build_plan(raw, None, "AI Trends", 5);
        let deck = assemble(None, &plan, None, "AI Trends").unwrap();

        let texts = deck_texts(&deck);
        assert_eq!(texts.len(), 5);
        // Cover carries the request title; every slide has a non-empty title
        assert!(texts[0].contains(&"AI Trends".to_string()));
        for slide in &texts {
            assert!(slide.iter().any(|t| !t.trim().is_empty()));
        }
    }

    #[test]
    fn test_layout_mode_clones_template_visuals() {
        use crate::testkit::{deck_texts, sp, template_with};

        // One styled template slide, three planned slides: the clone is
        // index-clamped so every slide inherits the template's shapes
        let template = template_with(&[vec![
            sp(Some("title"), false, "Template Heading"),
            sp(Some("body"), false, "Template body"),
        ]]);
        let info = crate::introspect::inspect_template(&template).unwrap();
        assert!(!info.has_placeholders());

        let slides = vec![
            SlideSpec { title: Some("One".to_string()), ..SlideSpec::default() },
            SlideSpec {
                title: Some("Two".to_string()),
                bullets: vec!["b1".to_string()],
                ..SlideSpec::default()
            },
            SlideSpec { title: Some("Three".to_string()), ..SlideSpec::default() },
        ];
        let plan = ContentPlan::Layout(LayoutPlan { slides });
        let deck = assemble(Some(&info), &plan, Some(&template), "One").unwrap();

        let texts = deck_texts(&deck);
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0][0], "One");
        assert_eq!(texts[1][0], "Two");
        assert_eq!(texts[1][1], "b1");
        assert_eq!(texts[2][0], "Three");
        // Template ghost content never leaks through
        assert!(!texts.iter().flatten().any(|t| t.contains("Template")));
    }

    #[test]
    fn test_ghost_text() {
        assert!(is_ghost_text("Click to add text"));
        assert!(is_ghost_text(" Click  to edit Master title style "));
        assert!(is_ghost_text("\u{5355}\u{51fb}\u{6b64}\u{5904}\u{6dfb}\u{52a0}\u{6807}\u{9898}"));
        assert!(!is_ghost_text("Quarterly results"));
        assert!(!is_ghost_text(""));
    }
}
