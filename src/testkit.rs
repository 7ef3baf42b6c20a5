//! Shared fixture builders for tests.
//!
//! Fixtures are synthesized with the crate's own scaffold and OPC writer,
//! so no binary files ride along with the sources.

use crate::opc::rel::reltype;
use crate::opc::Relationships;
use crate::pptx::presentation::append_slide;
use crate::pptx::scaffold::blank_package;
use crate::pptx::shapes::collect_text_shapes;
use crate::pptx::Package;

/// A text shape fragment: optional placeholder role, optional bullet
/// styling, text.
pub(crate) fn sp(ph: Option<&str>, bulleted: bool, text: &str) -> String {
    let nv = match ph {
        Some(ph) => format!(r#"<p:nvSpPr><p:cNvPr id="2" name="t"/><p:nvPr><p:ph type="{ph}"/></p:nvPr></p:nvSpPr>"#),
        None => r#"<p:nvSpPr><p:cNvPr id="2" name="t"/><p:nvPr/></p:nvSpPr>"#.to_string(),
    };
    let ppr = if bulleted { r#"<a:pPr><a:buChar char="&#8226;"/></a:pPr>"# } else { "" };
    format!(
        r#"<p:sp>{nv}<p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="4572000" cy="914400"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p>{ppr}<a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        crate::xmlutil::escape_xml(text),
    )
}

fn slide_xml(shapes: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
    .into_bytes()
}

/// Build template bytes: the blank scaffold plus one slide per shape set.
pub(crate) fn template_with(slides: &[Vec<String>]) -> Vec<u8> {
    let mut opc = blank_package(1280, 720);
    for shapes in slides {
        let mut rels = Relationships::new("/ppt/slides".to_string());
        rels.get_or_add(reltype::SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml");
        append_slide(&mut opc, slide_xml(&shapes.join("")), rels).expect("fixture slide");
    }
    opc.to_bytes().expect("fixture serialization")
}

/// Per-slide shape texts of a deck, in presentation order.
pub(crate) fn deck_texts(deck: &[u8]) -> Vec<Vec<String>> {
    let package = Package::from_bytes(deck).expect("deck parses");
    let partnames =
        package.presentation().expect("presentation").slide_partnames().expect("slides");
    partnames
        .iter()
        .map(|partname| {
            let part = package.opc().part(partname).expect("slide part");
            collect_text_shapes(part.blob())
                .expect("shapes parse")
                .iter()
                .map(|s| s.text().expect("text"))
                .collect()
        })
        .collect()
}

/// All slide XML of a deck concatenated, for whole-deck assertions.
pub(crate) fn deck_slide_xml(deck: &[u8]) -> String {
    let package = Package::from_bytes(deck).expect("deck parses");
    let partnames =
        package.presentation().expect("presentation").slide_partnames().expect("slides");
    partnames
        .iter()
        .map(|partname| {
            String::from_utf8_lossy(package.opc().part(partname).expect("slide part").blob())
                .into_owned()
        })
        .collect()
}
