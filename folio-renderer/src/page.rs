//! Page SVG builder.
//!
//! Draws a [`PageView`] as an SVG document in canvas units: background,
//! elements in z-order rotated about their centres, the selection outline
//! and resize handle when something is selected, and the alignment grid when
//! it is visible. Export hides the overlays before calling in here, so what
//! gets drawn is exactly what the page currently shows.

use std::fmt::Write;

use folio_core::element::{RESIZE_HANDLE_RADIUS, TEXT_LINE_HEIGHT, TEXT_PADDING};
use folio_core::{Element, ElementKind, PageView, RasterOptions, Size};

/// Distance between grid lines in canvas units.
pub const GRID_SPACING: f32 = 20.0;

const GRID_COLOR: &str = "#e5e7eb";
const GUIDE_COLOR: &str = "#ef4444";
const SELECTION_COLOR: &str = "#3b82f6";
const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Output pixel dimensions of a page at `scale`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn output_dimensions(canvas_size: Size, scale: f32) -> (u32, u32) {
    let out_w = (canvas_size.width * scale).round().max(1.0) as u32;
    let out_h = (canvas_size.height * scale).round().max(1.0) as u32;
    (out_w, out_h)
}

/// Render the page to an SVG string sized for `options.scale`.
#[must_use]
pub fn render_page_svg(page: &PageView<'_>, options: &RasterOptions) -> String {
    let (out_w, out_h) = output_dimensions(page.canvas_size, options.scale);
    let view_w = page.canvas_size.width;
    let view_h = page.canvas_size.height;

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
    );

    // Background
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&options.background),
    );

    for element in page.elements {
        let selected = page.selected == Some(&element.id);
        render_element_svg(&mut svg, element, selected);
    }

    if page.grid_visible {
        render_grid_svg(&mut svg, page.canvas_size);
    }

    svg.push_str("</svg>");
    svg
}

/// Render a single element, wrapped in its rotation group.
fn render_element_svg(svg: &mut String, element: &Element, selected: bool) {
    let x = element.position.x;
    let y = element.position.y;
    let size = element.box_size();
    let center = element.center();

    let _ = write!(
        svg,
        "<g transform=\"rotate({} {} {})\">",
        element.rotation, center.x, center.y,
    );

    match &element.kind {
        ElementKind::Text {
            font_size,
            font_family,
            color,
        } => {
            let fill = escape_xml(color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR));
            let family = escape_xml(font_family);
            let line_height = font_size * TEXT_LINE_HEIGHT;
            let text_x = x + TEXT_PADDING;

            let _ = write!(
                svg,
                "<text font-size=\"{font_size}\" font-family=\"{family}\" fill=\"{fill}\" xml:space=\"preserve\">",
            );
            let mut baseline = y + TEXT_PADDING + font_size;
            for line in element.content.split('\n') {
                let _ = write!(
                    svg,
                    "<tspan x=\"{text_x}\" y=\"{baseline}\">{}</tspan>",
                    escape_xml(line),
                );
                baseline += line_height;
            }
            svg.push_str("</text>");
        }

        ElementKind::Image { width, height } => {
            let _ = write!(
                svg,
                "<image x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                escape_xml(&element.content),
            );
        }
    }

    if selected {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{SELECTION_COLOR}\" stroke-width=\"1\" stroke-dasharray=\"4 2\"/>",
            x - 2.0,
            y - 2.0,
            size.width + 4.0,
            size.height + 4.0,
        );
        if element.is_image() {
            let _ = write!(
                svg,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{RESIZE_HANDLE_RADIUS}\" fill=\"{SELECTION_COLOR}\" stroke=\"#ffffff\" stroke-width=\"2\"/>",
                x + size.width,
                y + size.height,
            );
        }
    }

    svg.push_str("</g>");
}

/// Grid lines every [`GRID_SPACING`] units plus red centre guides.
fn render_grid_svg(svg: &mut String, canvas: Size) {
    let mut path = String::new();
    let mut x = 0.0;
    while x <= canvas.width {
        let _ = write!(path, "M{x} 0V{}", canvas.height);
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y <= canvas.height {
        let _ = write!(path, "M0 {y}H{}", canvas.width);
        y += GRID_SPACING;
    }
    let _ = write!(
        svg,
        "<path d=\"{path}\" fill=\"none\" stroke=\"{GRID_COLOR}\" stroke-width=\"0.5\"/>",
    );

    let cx = canvas.width / 2.0;
    let cy = canvas.height / 2.0;
    let _ = write!(
        svg,
        "<path d=\"M{cx} 0V{}M0 {cy}H{}\" fill=\"none\" stroke=\"{GUIDE_COLOR}\" stroke-width=\"1\" stroke-opacity=\"0.6\"/>",
        canvas.height, canvas.width,
    );
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Point, Size};

    fn view<'a>(
        elements: &'a [Element],
        selected: Option<&'a folio_core::ElementId>,
    ) -> PageView<'a> {
        PageView {
            canvas_size: Size::a4(),
            elements,
            selected,
            grid_visible: false,
        }
    }

    #[test]
    fn empty_page_is_scaled_a4() {
        let svg = render_page_svg(&view(&[], None), &RasterOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"1588\""));
        assert!(svg.contains("height=\"2246\""));
        assert!(svg.contains("viewBox=\"0 0 794 1123\""));
        assert!(svg.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn text_lines_become_tspans() {
        let elements = [Element::text("first\nsecond <b>", Point::new(10.0, 20.0))];
        let svg = render_page_svg(&view(&elements, None), &RasterOptions::default());
        assert_eq!(svg.matches("<tspan").count(), 2);
        assert!(svg.contains("second &lt;b&gt;"));
        assert!(svg.contains("font-size=\"16\""));
        assert!(svg.contains("fill=\"#000000\""));
    }

    #[test]
    fn rotation_pivots_on_centre() {
        let element = Element::image("data:,", Size::new(2.0, 1.0), Point::new(0.0, 0.0))
            .with_rotation(90.0);
        let elements = [element];
        let svg = render_page_svg(&view(&elements, None), &RasterOptions::default());
        assert!(svg.contains("rotate(90 100 50)"));
    }

    #[test]
    fn overlays_only_for_selected() {
        let image = Element::image("data:,", Size::new(1.0, 1.0), Point::new(0.0, 0.0));
        let text = Element::text("t", Point::new(300.0, 300.0));
        let (image_id, text_id) = (image.id.clone(), text.id.clone());
        let elements = [image, text];

        let plain = render_page_svg(&view(&elements, None), &RasterOptions::default());
        assert!(!plain.contains("stroke-dasharray"));
        assert!(!plain.contains("<circle"));

        let with_image =
            render_page_svg(&view(&elements, Some(&image_id)), &RasterOptions::default());
        assert!(with_image.contains("stroke-dasharray"));
        assert!(with_image.contains("<circle cx=\"200\" cy=\"200\""));

        let with_text =
            render_page_svg(&view(&elements, Some(&text_id)), &RasterOptions::default());
        assert!(with_text.contains("stroke-dasharray"));
        assert!(!with_text.contains("<circle"));
    }

    #[test]
    fn grid_drawn_when_visible() {
        let mut page = view(&[], None);
        assert!(!render_page_svg(&page, &RasterOptions::default()).contains(GUIDE_COLOR));
        page.grid_visible = true;
        let svg = render_page_svg(&page, &RasterOptions::default());
        assert!(svg.contains(GUIDE_COLOR));
        assert!(svg.contains("M397 0V1123"));
    }

    #[test]
    fn xml_escaping() {
        assert_eq!(escape_xml("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&apos;");
    }
}
