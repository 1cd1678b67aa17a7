use crate::content::SpriteSheet;
use crate::geometry::Rect;

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width as usize)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

pub(crate) fn blit_frame(
    frame: &mut [u8],
    width: u32,
    height: u32,
    sheet: &SpriteSheet,
    frame_index: u32,
    dest: Rect,
    rotation_degrees: f32,
) {
    if dest.is_empty() || width == 0 || height == 0 {
        return;
    }
    let Some(source) = sheet.frame_rect(frame_index) else {
        return;
    };
    let Some(visible) = dest.intersection(&Rect::new(0, 0, width as i32, height as i32)) else {
        return;
    };

    let radians = rotation_degrees.to_radians();
    let (sin, cos) = if rotation_degrees == 0.0 || !radians.is_finite() {
        (0.0, 1.0)
    } else {
        radians.sin_cos()
    };
    let half_w = dest.width as f32 * 0.5;
    let half_h = dest.height as f32 * 0.5;
    let scale_x = source.width as f32 / dest.width as f32;
    let scale_y = source.height as f32 / dest.height as f32;

    for out_y in visible.top()..visible.bottom() {
        let dy = out_y as f32 + 0.5 - (dest.y as f32 + half_h);
        for out_x in visible.left()..visible.right() {
            let dx = out_x as f32 + 0.5 - (dest.x as f32 + half_w);
            let local_x = dx * cos - dy * sin + half_w;
            let local_y = dx * sin + dy * cos + half_h;
            if local_x < 0.0 || local_y < 0.0 {
                continue;
            }
            let src_x = (local_x * scale_x).floor() as i32;
            let src_y = (local_y * scale_y).floor() as i32;
            if src_x >= source.width || src_y >= source.height {
                continue;
            }
            let Some(color) = sheet.pixel(source.x + src_x, source.y + src_y) else {
                continue;
            };
            if color[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(frame, width, height, out_x, out_y, color);
        }
    }
}
