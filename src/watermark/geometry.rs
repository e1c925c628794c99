use super::types::Anchor;

/// Top-left placement of an overlay on a canvas.
///
/// Offsets are added after anchor resolution and the result is never clamped,
/// so overlays may land partially or fully outside the canvas.
pub fn resolve(
    canvas: (u32, u32),
    overlay: (u32, u32),
    anchor: Anchor,
    offset_x: i32,
    offset_y: i32,
) -> (i64, i64) {
    let (canvas_w, canvas_h) = (canvas.0 as i64, canvas.1 as i64);
    let (overlay_w, overlay_h) = (overlay.0 as i64, overlay.1 as i64);

    let left = 0;
    let center = (canvas_w - overlay_w).div_euclid(2);
    let right = canvas_w - overlay_w;
    let top = 0;
    let middle = (canvas_h - overlay_h).div_euclid(2);
    let bottom = canvas_h - overlay_h;

    let (x, y) = match anchor {
        Anchor::TopLeft => (left, top),
        Anchor::TopMiddle => (center, top),
        Anchor::TopRight => (right, top),
        Anchor::MiddleLeft => (left, middle),
        Anchor::Center => (center, middle),
        Anchor::MiddleRight => (right, middle),
        Anchor::BottomLeft => (left, bottom),
        Anchor::BottomMiddle => (center, bottom),
        Anchor::BottomRight => (right, bottom),
    };

    (x + offset_x as i64, y + offset_y as i64)
}
