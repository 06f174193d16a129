//! Helvetica text metrics and line wrapping.
//!
//! Widths are the standard Helvetica AFM advance widths in 1/1000 of
//! the em, so `width_pts = advance * font_size / 1000`. Only the ASCII
//! range is tabulated; everything else falls back to the average glyph
//! advance, which is plenty for wrap estimation.

/// Advance widths for ASCII 0x20..=0x7E, in 1/1000 em units.
#[rustfmt::skip]
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Fallback advance for characters outside the table.
const DEFAULT_ADVANCE: u16 = 556;

fn advance(c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        ASCII_WIDTHS[(code - 0x20) as usize]
    } else {
        DEFAULT_ADVANCE
    }
}

/// Width of `text` in page units when drawn in Helvetica at `font_size`.
pub fn string_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| advance(c) as u32).sum();
    units as f32 * font_size / 1000.0
}

/// Greedy word wrap to `max_width` page units. Explicit newlines force
/// a break; a single word wider than the line is split mid-word so it
/// never overflows the box.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if string_width(word, font_size) > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = split_long_word(word, max_width, font_size, &mut lines);
                continue;
            }
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if string_width(&candidate, font_size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_owned();
            }
        }
        lines.push(current);
    }
    lines
}

/// Hard-split a word wider than the line, pushing full chunks and
/// returning the trailing partial chunk.
fn split_long_word(word: &str, max_width: f32, font_size: f32, lines: &mut Vec<String>) -> String {
    let mut chunk = String::new();
    for c in word.chars() {
        chunk.push(c);
        if string_width(&chunk, font_size) > max_width && chunk.chars().count() > 1 {
            chunk.pop();
            lines.push(std::mem::take(&mut chunk));
            chunk.push(c);
        }
    }
    chunk
}
