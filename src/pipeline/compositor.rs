use super::{joints::JointTracker, strokes::StrokeAccumulator};
use crate::{
    speech::glyph::GlyphImage,
    types::{Canvas, ImagePoint, PersonId},
};

pub const STROKE_THICKNESS: i32 = 8;
const STROKE_ALPHA: u8 = 200;
const JOINT_MARKER_RADIUS: i32 = 6;
const JOINT_MARKER_COLOR: [u8; 4] = [248, 113, 113, 255];

// One fixed color per person, cycled by tracking id.
const PERSON_COLORS: &[[u8; 3]] = &[
    [56, 189, 248],
    [16, 185, 129],
    [250, 204, 21],
    [244, 114, 182],
    [167, 139, 250],
    [251, 146, 60],
];

/// Draw every sealed and in-progress stroke, the tracked-joint markers and
/// the pending glyph onto the canvas in place. Tolerates an empty stroke set
/// and an absent glyph.
pub fn composite(
    canvas: &mut Canvas,
    strokes: &StrokeAccumulator,
    joints: &JointTracker,
    glyph: Option<&GlyphImage>,
) {
    for stroke in strokes.sealed() {
        draw_polyline(canvas, &stroke.points, person_color(stroke.person));
    }
    for stroke in strokes.in_progress() {
        draw_polyline(canvas, &stroke.points, person_color(stroke.person));
    }

    for point in joints.tracked_image_points() {
        draw_circle(
            canvas,
            (point.x as i32, point.y as i32),
            JOINT_MARKER_RADIUS,
            JOINT_MARKER_COLOR,
        );
    }

    if let Some(image) = glyph {
        blit_centered(canvas, image);
    }
}

fn person_color(person: PersonId) -> [u8; 4] {
    let [r, g, b] = PERSON_COLORS[(person as usize) % PERSON_COLORS.len()];
    [r, g, b, STROKE_ALPHA]
}

fn draw_polyline(canvas: &mut Canvas, points: &[ImagePoint], color: [u8; 4]) {
    match points {
        [] => {}
        [only] => draw_circle(
            canvas,
            (only.x as i32, only.y as i32),
            (STROKE_THICKNESS / 2).max(1),
            color,
        ),
        _ => {
            for pair in points.windows(2) {
                draw_line(canvas, &pair[0], &pair[1], color, STROKE_THICKNESS);
            }
        }
    }
}

fn draw_line(canvas: &mut Canvas, p0: &ImagePoint, p1: &ImagePoint, color: [u8; 4], thickness: i32) {
    let (mut x0, mut y0) = (p0.x as i32, p0.y as i32);
    let (x1, y1) = (p1.x as i32, p1.y as i32);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        blend_pixel_safe(canvas, x0, y0, color);
        if radius > 0 {
            for ox in -radius..=radius {
                for oy in -radius..=radius {
                    if ox == 0 && oy == 0 {
                        continue;
                    }
                    if ox.abs() + oy.abs() <= radius {
                        blend_pixel_safe(canvas, x0 + ox, y0 + oy, color);
                    }
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(canvas: &mut Canvas, center: (i32, i32), radius: i32, color: [u8; 4]) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                blend_pixel_safe(canvas, cx + dx, cy + dy, color);
            }
        }
    }
}

fn blit_centered(canvas: &mut Canvas, image: &GlyphImage) {
    let left = (canvas.width as i32 - image.width as i32) / 2;
    let top = (canvas.height as i32 - image.height as i32) / 2;

    for y in 0..image.height as i32 {
        for x in 0..image.width as i32 {
            let idx = ((y as u32 * image.width + x as u32) as usize) * 4;
            let px = [
                image.rgba[idx],
                image.rgba[idx + 1],
                image.rgba[idx + 2],
                image.rgba[idx + 3],
            ];
            if px[3] == 0 {
                continue;
            }
            blend_pixel_safe(canvas, left + x, top + y, px);
        }
    }
}

fn blend_pixel_safe(canvas: &mut Canvas, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= canvas.width || uy >= canvas.height {
        return;
    }
    let idx = ((uy * canvas.width + ux) as usize) * 4;
    if idx + 3 >= canvas.rgba.len() {
        return;
    }

    let alpha = color[3] as u32;
    if alpha == 255 {
        canvas.rgba[idx..idx + 4].copy_from_slice(&[color[0], color[1], color[2], 255]);
        return;
    }
    let inv = 255 - alpha;
    for c in 0..3 {
        let src = color[c] as u32;
        let dst = canvas.rgba[idx + c] as u32;
        canvas.rgba[idx + c] = ((src * alpha + dst * inv) / 255) as u8;
    }
    canvas.rgba[idx + 3] = 255;
}
