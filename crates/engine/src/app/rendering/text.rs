use super::raster::write_pixel_rgba_clipped;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const TEXT_SCALE: i32 = 2;
const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;

/// Rows top to bottom; the low three bits of each row are the pixels, most
/// significant bit on the left.
type Glyph = [u8; GLYPH_HEIGHT as usize];

const BLANK: Glyph = [0b000; 5];
const UNKNOWN: Glyph = [0b111, 0b001, 0b011, 0b000, 0b010];

fn glyph_for(ch: char) -> Glyph {
    match ch.to_ascii_uppercase() {
        ' ' => BLANK,
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        _ => UNKNOWN,
    }
}

pub(crate) fn draw_text_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
) {
    for ch in text.chars() {
        draw_glyph_clipped(frame, width, height, x, y, glyph_for(ch), color);
        x += GLYPH_ADVANCE;
    }
}

fn draw_glyph_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    glyph: Glyph,
    color: [u8; 4],
) {
    for (row_index, row_bits) in glyph.iter().enumerate() {
        let glyph_y = y + row_index as i32 * TEXT_SCALE;
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            let glyph_x = x + col * TEXT_SCALE;
            for sy in 0..TEXT_SCALE {
                for sx in 0..TEXT_SCALE {
                    write_pixel_rgba_clipped(
                        frame,
                        width,
                        height,
                        glyph_x + sx,
                        glyph_y + sy,
                        color,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn lit_pixels(frame: &[u8]) -> usize {
        frame.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    #[test]
    fn hud_strings_have_real_glyphs() {
        for text in ["STAR RAID", "Kill them ALL!", "Bullets left: 8", "FPS: 59.94"] {
            for ch in text.chars().filter(|ch| *ch != ' ') {
                assert_ne!(glyph_for(ch), UNKNOWN, "missing glyph for {ch:?}");
            }
        }
    }

    #[test]
    fn lowercase_shares_uppercase_glyphs() {
        assert_eq!(glyph_for('k'), glyph_for('K'));
        assert_eq!(glyph_for('~'), UNKNOWN);
    }

    #[test]
    fn glyph_is_scaled_per_lit_bit() {
        let mut frame = vec![0u8; 16 * 16 * 4];
        draw_text_clipped(&mut frame, 16, 16, 0, 0, "1", WHITE);
        let bits: u32 = glyph_for('1').iter().map(|row| row.count_ones()).sum();
        assert_eq!(lit_pixels(&frame), (bits as i32 * TEXT_SCALE * TEXT_SCALE) as usize);
    }

    #[test]
    fn text_partly_off_frame_is_clipped_without_panic() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        draw_text_clipped(&mut frame, 8, 8, -5, -3, "WWW", WHITE);
        draw_text_clipped(&mut frame, 8, 8, 6, 6, "888", WHITE);
        assert!(lit_pixels(&frame) > 0);
        draw_text_clipped(&mut [], 0, 0, 0, 0, "A", WHITE);
    }
}
