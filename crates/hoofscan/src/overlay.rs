//! Diagnostic overlay of a leg analysis.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::keypoints::KEYPOINT_COUNT;
use crate::oracle::LegImage;
use crate::pipeline::LegAnalysis;

/// Keypoint marker colors in role order.
pub const KEYPOINT_COLORS: [Rgb<u8>; KEYPOINT_COUNT] = [
    Rgb([255, 0, 0]),
    Rgb([255, 165, 0]),
    Rgb([0, 255, 0]),
    Rgb([0, 0, 255]),
];
const PASTERN_LINE: Rgb<u8> = Rgb([255, 165, 0]);
const HOOF_LINE: Rgb<u8> = Rgb([0, 128, 255]);
const STATUS_OK: Rgb<u8> = Rgb([0, 200, 0]);
const STATUS_BAD: Rgb<u8> = Rgb([220, 0, 0]);

/// Deviations below this are shown as aligned.
pub const ALIGNED_DEVIATION_DEG: f64 = 3.0;

const MARKER_RADIUS: i32 = 6;
const STATUS_BAR_SIZE: (u32, u32) = (240, 36);

/// Annotated copy of the photograph: raw keypoints, both axes when the
/// leg was measured, and a status bar in the top-left corner.
pub fn render_overlay(image: &LegImage, analysis: &LegAnalysis) -> RgbImage {
    let mut canvas = image.pixels.clone();
    let pts = analysis.detection.keypoints.to_array();

    if analysis.success {
        draw_thick_line(&mut canvas, pts[1], pts[0], PASTERN_LINE);
        draw_thick_line(&mut canvas, pts[3], pts[2], HOOF_LINE);
    }

    for (p, color) in pts.iter().zip(KEYPOINT_COLORS) {
        draw_filled_circle_mut(
            &mut canvas,
            (p[0].round() as i32, p[1].round() as i32),
            MARKER_RADIUS,
            color,
        );
    }

    let aligned = analysis
        .hpa_dev
        .is_some_and(|dev| analysis.success && dev < ALIGNED_DEVIATION_DEG);
    let bar_w = STATUS_BAR_SIZE.0.min(canvas.width()).max(1);
    let bar_h = STATUS_BAR_SIZE.1.min(canvas.height()).max(1);
    draw_filled_rect_mut(
        &mut canvas,
        Rect::at(0, 0).of_size(bar_w, bar_h),
        if aligned { STATUS_OK } else { STATUS_BAD },
    );

    canvas
}

fn draw_thick_line(canvas: &mut RgbImage, from: [f64; 2], to: [f64; 2], color: Rgb<u8>) {
    for d in [-1.0f32, 0.0, 1.0] {
        draw_line_segment_mut(
            canvas,
            (from[0] as f32 + d, from[1] as f32),
            (to[0] as f32 + d, to[1] as f32),
            color,
        );
    }
}
