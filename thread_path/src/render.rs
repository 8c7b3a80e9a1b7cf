use image::{Rgb, RgbImage};
use palette::{Srgb, Srgba};
use svg::node::element::{Circle, Line};

use crate::{nails::NailSet, path::NailPath, Grid};

/// Default thread color: black, slightly translucent.
pub const THREAD: Srgba<u8> = Srgba {
    color: Srgb::new(0, 0, 0),
    alpha: 235,
};

/// Draws every chord of `path` on a white canvas of `grid` size, compositing the
/// thread color over what is already there.
pub fn build_rgb(grid: Grid, nails: &NailSet, path: &NailPath, color: Srgba<u8>) -> RgbImage {
    let mut image = RgbImage::from_pixel(grid.width as u32, grid.height as u32, Rgb([255; 3]));
    let alpha = color.alpha as f32 / 255.0;
    let over = [color.red, color.green, color.blue];
    for (from, to) in path.chords() {
        for index in grid.indexes_in(nails.chord(from, to)) {
            let point = grid.point_of(index);
            let pixel = image.get_pixel_mut(point.x as u32, point.y as u32);
            for (channel, over) in pixel.0.iter_mut().zip(over) {
                *channel = (over as f32 * alpha + *channel as f32 * (1.0 - alpha)).round() as u8;
            }
        }
    }
    image
}

pub fn build_svg(grid: Grid, nails: &NailSet, path: &NailPath, color: Srgba<u8>, stroke_width: f32) -> svg::Document {
    let mut doc = svg::Document::new().set(
        "viewBox",
        (0.0f32, 0.0f32, grid.width as f32, grid.height as f32),
    );
    doc = doc.add(
        svg::node::element::Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", "white"),
    );
    for nail in nails.iter() {
        doc = doc.add(
            Circle::new()
                .set("cx", nail.x as f32)
                .set("cy", nail.y as f32)
                .set("r", stroke_width)
                .set("fill", "gray"),
        );
    }
    let stroke = format!("rgb({}, {}, {})", color.red, color.green, color.blue);
    let opacity = format!("{:.4}", color.alpha as f32 / 255.0);
    for (from, to) in path.chords() {
        let (start, end) = (nails[from], nails[to]);
        doc = doc.add(
            Line::new()
                .set("x1", start.x as f32)
                .set("y1", start.y as f32)
                .set("x2", end.x as f32)
                .set("y2", end.y as f32)
                .set("stroke", stroke.as_str())
                .set("stroke-opacity", opacity.as_str())
                .set("stroke-width", stroke_width),
        );
    }
    doc
}
