//! Minimal valid scaffolding for building a presentation from nothing.
//!
//! When generation runs without a template, the deck starts from these
//! embedded parts: a presentation, one slide master, four layouts (Title
//! Slide, Title and Content, Title Only, Blank), a theme, and document
//! properties. The fragments are the bare minimum a consumer opens without
//! complaint, in the spirit of the python-pptx default template.

use crate::opc::constants::content_type as ct;
use crate::opc::rel::reltype;
use crate::opc::{OpcPackage, PackURI, Part};
use crate::pptx::presentation::EMU_PER_PX;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

fn presentation_xml(width_emu: i64, height_emu: i64) -> String {
    format!(
        r#"{XML_DECL}<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst/><p:sldSz cx="{width_emu}" cy="{height_emu}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

/// One placeholder shape for a layout or master body.
fn placeholder_sp(id: u32, name: &str, ph: &str, idx: Option<u32>, frame: (i64, i64, i64, i64)) -> String {
    let idx_attr = idx.map(|i| format!(r#" idx="{i}""#)).unwrap_or_default();
    let (x, y, cx, cy) = frame;
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{ph}"{idx_attr}/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>"#
    )
}

fn sp_tree(shapes: &str) -> String {
    format!(
        r#"<p:cSld name="{{name}}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{shapes}</p:spTree></p:cSld>"#
    )
}

fn csld(name: &str, shapes: &str) -> String {
    sp_tree(shapes).replace("{name}", name)
}

const CLR_MAP: &str = r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#;

const CLR_MAP_OVR: &str = r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#;

fn slide_master_xml() -> String {
    let title = placeholder_sp(2, "Title Placeholder 1", "title", None, (838200, 365125, 10515600, 1325563));
    let body = placeholder_sp(3, "Text Placeholder 2", "body", Some(1), (838200, 1825625, 10515600, 4351338));
    format!(
        r#"{XML_DECL}<p:sldMaster {NS}>{}{CLR_MAP}<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/><p:sldLayoutId id="2147483651" r:id="rId3"/><p:sldLayoutId id="2147483652" r:id="rId4"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles></p:sldMaster>"#,
        csld("Office Theme", &format!("{title}{body}")),
    )
}

fn layout_xml(layout_type: &str, name: &str, shapes: &str) -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout {NS} type="{layout_type}" preserve="1">{}{CLR_MAP_OVR}</p:sldLayout>"#,
        csld(name, shapes),
    )
}

fn title_slide_layout_xml() -> String {
    let title = placeholder_sp(2, "Title 1", "ctrTitle", None, (1097280, 2362200, 9997440, 1325563));
    let subtitle = placeholder_sp(3, "Subtitle 2", "subTitle", Some(1), (1828800, 3887472, 8534400, 1655762));
    layout_xml("title", "Title Slide", &format!("{title}{subtitle}"))
}

fn title_and_content_layout_xml() -> String {
    let title = placeholder_sp(2, "Title 1", "title", None, (838200, 365125, 10515600, 1325563));
    let body = placeholder_sp(3, "Content Placeholder 2", "body", Some(1), (838200, 1825625, 10515600, 4351338));
    layout_xml("obj", "Title and Content", &format!("{title}{body}"))
}

fn title_only_layout_xml() -> String {
    let title = placeholder_sp(2, "Title 1", "title", None, (838200, 365125, 10515600, 1325563));
    layout_xml("titleOnly", "Title Only", &title)
}

fn blank_layout_xml() -> String {
    layout_xml("blank", "Blank", "")
}

fn theme_xml() -> String {
    format!(
        r#"{XML_DECL}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#
    )
}

fn core_props_xml() -> String {
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title></dc:title><dc:creator>pitaya</dc:creator></cp:coreProperties>"#
    )
}

fn app_props_xml() -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>pitaya</Application></Properties>"#
    )
}

fn add_xml_part(opc: &mut OpcPackage, partname: &str, content_type: &str, xml: String) -> PackURI {
    let uri = PackURI::new(partname).expect("scaffold partnames are absolute");
    opc.add_part(Part::new(uri.clone(), content_type.to_string(), xml.into_bytes()));
    uri
}

/// Build a blank presentation package at the given pixel dimensions.
pub fn blank_package(width_px: u32, height_px: u32) -> OpcPackage {
    let width_emu = width_px as i64 * EMU_PER_PX;
    let height_emu = height_px as i64 * EMU_PER_PX;

    let mut opc = OpcPackage::new();

    let pres = add_xml_part(
        &mut opc,
        "/ppt/presentation.xml",
        ct::PML_PRESENTATION_MAIN,
        presentation_xml(width_emu, height_emu),
    );
    let master = add_xml_part(
        &mut opc,
        "/ppt/slideMasters/slideMaster1.xml",
        ct::PML_SLIDE_MASTER,
        slide_master_xml(),
    );
    let layouts = [
        add_xml_part(&mut opc, "/ppt/slideLayouts/slideLayout1.xml", ct::PML_SLIDE_LAYOUT, title_slide_layout_xml()),
        add_xml_part(&mut opc, "/ppt/slideLayouts/slideLayout2.xml", ct::PML_SLIDE_LAYOUT, title_and_content_layout_xml()),
        add_xml_part(&mut opc, "/ppt/slideLayouts/slideLayout3.xml", ct::PML_SLIDE_LAYOUT, title_only_layout_xml()),
        add_xml_part(&mut opc, "/ppt/slideLayouts/slideLayout4.xml", ct::PML_SLIDE_LAYOUT, blank_layout_xml()),
    ];
    let theme = add_xml_part(&mut opc, "/ppt/theme/theme1.xml", ct::OFC_THEME, theme_xml());
    let core = add_xml_part(&mut opc, "/docProps/core.xml", ct::OPC_CORE_PROPERTIES, core_props_xml());
    let app = add_xml_part(&mut opc, "/docProps/app.xml", ct::OFC_EXTENDED_PROPERTIES, app_props_xml());

    // Package-level wiring
    {
        let rels = opc.rels_mut();
        rels.get_or_add(reltype::OFFICE_DOCUMENT, "ppt/presentation.xml");
        rels.get_or_add(reltype::CORE_PROPERTIES, core.membername());
        rels.get_or_add(reltype::EXTENDED_PROPERTIES, app.membername());
    }

    // Presentation -> master (rId1, matching the sldMasterIdLst) and theme
    {
        let pres_part = opc.part_mut(&pres).expect("presentation part just added");
        pres_part.relate_to(&master, reltype::SLIDE_MASTER);
        pres_part.relate_to(&theme, reltype::THEME);
    }

    // Master -> layouts (rId1..rId4, matching the sldLayoutIdLst) and theme
    {
        let master_part = opc.part_mut(&master).expect("master part just added");
        for layout in &layouts {
            master_part.relate_to(layout, reltype::SLIDE_LAYOUT);
        }
        master_part.relate_to(&theme, reltype::THEME);
    }

    // Each layout -> master
    for layout in &layouts {
        let layout_part = opc.part_mut(layout).expect("layout part just added");
        layout_part.relate_to(&master, reltype::SLIDE_MASTER);
    }

    opc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::Package;
    use crate::pptx::slide::{LayoutRole, layout_role};

    #[test]
    fn test_blank_package_shape() {
        let opc = blank_package(1280, 720);
        let package = Package::from_opc(opc);
        let pres = package.presentation().unwrap();

        assert_eq!(pres.page_size().unwrap(), Some((1280, 720)));
        assert!(pres.slide_rids().unwrap().is_empty());

        let masters = pres.master_partnames().unwrap();
        assert_eq!(masters.len(), 1);

        let master = package.opc().part(&masters[0]).unwrap();
        let layout_rids = crate::pptx::slide::master_layout_rids(master.blob()).unwrap();
        assert_eq!(layout_rids.len(), 4);

        let first_layout = master.target_partname(&layout_rids[0]).unwrap();
        let layout_part = package.opc().part(&first_layout).unwrap();
        assert_eq!(layout_role(layout_part.blob()).unwrap(), Some(LayoutRole::Title));
    }

    #[test]
    fn test_blank_package_roundtrips() {
        let opc = blank_package(960, 540);
        let bytes = opc.to_bytes().unwrap();
        let package = Package::from_bytes(&bytes).unwrap();
        assert_eq!(package.presentation().unwrap().page_size().unwrap(), Some((960, 540)));
    }
}
