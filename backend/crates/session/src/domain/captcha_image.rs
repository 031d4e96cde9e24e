//! CAPTCHA Image Rendering
//!
//! Renders a generated answer into an obfuscated PNG: jittered and
//! sheared block glyphs over arc noise, decoy strokes and speckle. The
//! glyphs come from an embedded 5x7 stroke table, so the crate carries
//! no font asset.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_antialiased_line_segment_mut, draw_filled_rect_mut};
use imageproc::pixelops::interpolate;
use imageproc::rect::Rect;
use rand::Rng;

const BACKGROUND: Rgb<u8> = Rgb([26, 30, 35]);

/// Pixel size of one glyph cell
const SCALE: u32 = 6;
const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
const CHAR_SPACING: u32 = 12;
const MARGIN: u32 = 14;
const IMG_HEIGHT: u32 = 84;

/// 5x7 bitmap rows for every character in `ANSWER_CHARSET`.
/// Bit 4 is the leftmost column.
const fn glyph_rows(ch: char) -> Option<[u8; 7]> {
    Some(match ch {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        _ => return None,
    })
}

/// Render the answer into an obfuscated PNG.
pub fn render_answer_png(answer: &str, rng: &mut impl Rng) -> Result<Vec<u8>, String> {
    let char_count = answer.chars().count() as u32;
    if char_count == 0 {
        return Err("empty answer".to_string());
    }

    let cell_width = GLYPH_COLS * SCALE;
    let width = 2 * MARGIN + char_count * (cell_width + CHAR_SPACING) - CHAR_SPACING;
    let mut img: RgbImage = ImageBuffer::from_pixel(width, IMG_HEIGHT, BACKGROUND);

    let (colors, line_colors) = generate_colors(rng);

    draw_noise_arcs(&mut img, rng, &line_colors);
    draw_glyphs(&mut img, answer, rng, &colors)?;
    draw_strike_lines(&mut img, rng, &line_colors);
    draw_speckle(&mut img, rng);

    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| format!("PNG encode failed: {e}"))?;

    Ok(png)
}

/// Wrap encoded PNG bytes into a `data:` URI for the API response.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

fn generate_colors(rng: &mut impl Rng) -> (Vec<Rgb<u8>>, Vec<Rgb<u8>>) {
    let mut colors: Vec<Rgb<u8>> = Vec::new();
    for _ in 0..4 {
        let mut c = [
            rng.random_range(110..=255),
            rng.random_range(110..=255),
            rng.random_range(110..=255),
        ];
        c[rng.random_range(0..3)] = rng.random_range(190..=255);
        colors.push(Rgb(c));
    }
    // Dimmer variants for noise so the answer stays human-legible
    let line_colors: Vec<Rgb<u8>> = colors
        .iter()
        .take(2)
        .map(|c| Rgb([c.0[0] / 2, c.0[1] / 2, c.0[2] / 2]))
        .collect();
    (colors, line_colors)
}

fn draw_noise_arcs(img: &mut RgbImage, rng: &mut impl Rng, line_colors: &[Rgb<u8>]) {
    let (width, height) = img.dimensions();
    let w = width as i32;
    let h = height as i32;

    for _ in 0..10 {
        let color = line_colors[rng.random_range(0..line_colors.len())];
        let cx = rng.random_range(0..w);
        let cy = rng.random_range(0..h);
        let radius = rng.random_range(10..40) as f32;
        let start: f32 = rng.random_range(0.0..360.0f32).to_radians();
        let sweep: f32 = rng.random_range(40.0..180.0f32).to_radians();

        let steps = 24;
        let mut prev_x = cx + (radius * start.cos()) as i32;
        let mut prev_y = cy + (radius * start.sin()) as i32;
        for i in 1..=steps {
            let angle = start + sweep * (i as f32) / (steps as f32);
            let curr_x = cx + (radius * angle.cos()) as i32;
            let curr_y = cy + (radius * angle.sin()) as i32;
            draw_antialiased_line_segment_mut(
                img,
                (prev_x, prev_y),
                (curr_x, curr_y),
                color,
                interpolate,
            );
            prev_x = curr_x;
            prev_y = curr_y;
        }
    }
}

fn draw_glyphs(
    img: &mut RgbImage,
    answer: &str,
    rng: &mut impl Rng,
    colors: &[Rgb<u8>],
) -> Result<(), String> {
    let cell_width = GLYPH_COLS * SCALE;
    let glyph_height = GLYPH_ROWS * SCALE;

    for (index, ch) in answer.chars().enumerate() {
        let rows =
            glyph_rows(ch).ok_or_else(|| format!("no glyph for character {ch:?}"))?;

        let base_x = (MARGIN + index as u32 * (cell_width + CHAR_SPACING)) as i32
            + rng.random_range(-3..=3);
        let base_y = ((IMG_HEIGHT - glyph_height) / 2) as i32 + rng.random_range(-6..=6);
        // Per-character shear in pixels per glyph row
        let shear = rng.random_range(-1.2..1.2f32);
        let color = colors[rng.random_range(0..colors.len())];

        for (row, bits) in rows.iter().enumerate() {
            let row_offset = (shear * row as f32) as i32;
            for col in 0..GLYPH_COLS {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let x = base_x + (col * SCALE) as i32 + row_offset;
                let y = base_y + (row as u32 * SCALE) as i32;
                draw_filled_rect_mut(
                    img,
                    Rect::at(x, y).of_size(SCALE, SCALE),
                    color,
                );
            }
        }
    }

    Ok(())
}

fn draw_strike_lines(img: &mut RgbImage, rng: &mut impl Rng, line_colors: &[Rgb<u8>]) {
    let (width, height) = img.dimensions();
    let w = width as i32;
    let h = height as i32;

    for _ in 0..3 {
        let color = line_colors[rng.random_range(0..line_colors.len())];
        let y0 = rng.random_range(h / 4..3 * h / 4);
        let y1 = rng.random_range(h / 4..3 * h / 4);
        draw_antialiased_line_segment_mut(img, (0, y0), (w - 1, y1), color, interpolate);
    }
}

fn draw_speckle(img: &mut RgbImage, rng: &mut impl Rng) {
    let (width, height) = img.dimensions();
    let dots = (width * height) / 60;
    for _ in 0..dots {
        let x = rng.random_range(0..width);
        let y = rng.random_range(0..height);
        let v = rng.random_range(60..160);
        img.put_pixel(x, y, Rgb([v, v, v]));
    }
}
