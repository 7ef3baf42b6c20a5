//! First-slide thumbnail rendering.
//!
//! Reopens assembled deck bytes and rasterizes the first slide onto a
//! white canvas at the deck's page size: each shape is drawn as a light
//! panel at its real position, so the preview shows the slide's layout at
//! a glance. Glyph rendering is out of scope for a preview; callers treat
//! any failure here as non-fatal and simply omit the thumbnail.

use crate::error::{Error, Result};
use crate::introspect::DEFAULT_PAGE_SIZE;
use crate::pptx::Package;
use crate::pptx::presentation::EMU_PER_PX;
use crate::pptx::shapes::collect_text_shapes;
use image::{ImageEncoder, Rgba, RgbaImage};

const CANVAS_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PANEL_FILL: Rgba<u8> = Rgba([225, 232, 243, 255]);
const PANEL_BORDER: Rgba<u8> = Rgba([163, 180, 204, 255]);

/// Render the first slide of a deck as a PNG.
pub fn render_thumbnail(deck: &[u8]) -> Result<Vec<u8>> {
    let package = Package::from_bytes(deck)?;
    let pres = package.presentation()?;

    let (width, height) = pres.page_size()?.unwrap_or(DEFAULT_PAGE_SIZE);
    let mut canvas = RgbaImage::from_pixel(width, height, CANVAS_WHITE);

    if let Some(partname) = pres.slide_partnames()?.first() {
        let slide = package.opc().part(partname).map_err(Error::Opc)?;
        for shape in collect_text_shapes(slide.blob())? {
            if let Some((x, y, cx, cy)) = shape.frame() {
                draw_panel(&mut canvas, x / EMU_PER_PX, y / EMU_PER_PX, cx / EMU_PER_PX, cy / EMU_PER_PX);
            }
        }
    }

    encode_png(&canvas)
}

/// Fill a rectangle with the panel color and a one-pixel border, clipped
/// to the canvas.
fn draw_panel(canvas: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (canvas_w, canvas_h) = (canvas.width() as i64, canvas.height() as i64);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(canvas_w);
    let y1 = (y + h).min(canvas_h);

    for py in y0..y1 {
        for px in x0..x1 {
            let on_border = py == y0 || py == y1 - 1 || px == x0 || px == x1 - 1;
            let color = if on_border { PANEL_BORDER } else { PANEL_FILL };
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| Error::Render(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ContentPlan, LayoutPlan, SlideSpec};

    #[test]
    fn test_thumbnail_of_scaffold_deck() {
        let plan = ContentPlan::Layout(LayoutPlan {
            slides: vec![SlideSpec {
                layout: Some("TITLE".to_string()),
                title: Some("Cover".to_string()),
                ..SlideSpec::default()
            }],
        });
        let deck = crate::assemble::assemble(None, &plan, None, "Cover").unwrap();

        let png = render_thumbnail(&deck).unwrap();
        // PNG signature
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (1280, 720));
        // Canvas is white at the corner, panel-colored where the title
        // placeholder sits
        assert_eq!(decoded.get_pixel(0, 0), &CANVAS_WHITE);
        let panel_x = (1097280 / EMU_PER_PX) as u32 + 10;
        let panel_y = (2362200 / EMU_PER_PX) as u32 + 10;
        assert_eq!(decoded.get_pixel(panel_x, panel_y), &PANEL_FILL);
    }

    #[test]
    fn test_thumbnail_rejects_garbage() {
        assert!(render_thumbnail(b"not a deck").is_err());
    }
}
