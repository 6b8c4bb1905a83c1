// src/display/render.rs - Compose decoded digits into a full terminal frame
use std::io::{self, Write};

use super::decode::{DecodedDisplay, decode};
use super::segment_map::{Indicator, SEG_A, SEG_B, SEG_C, SEG_D, SEG_DP, SEG_E, SEG_F, SEG_G};
use crate::hardware::DeviceState;
use crate::hardware::lcd::LcdBuffer;

pub const GLYPH_ROWS: usize = 5;
/// Characters between the two box borders.
pub const INNER_WIDTH: usize = 40;
/// Index of the first digit row within `Frame::lines`.
pub const DIGIT_ROW_OFFSET: usize = 3;

const LIT: char = '█';
const COLON: char = '●';
const CLEAR_AND_HOME: &str = "\x1b[2J\x1b[H";

/// Screen column (in chars, border included) where digit `pos` starts.
///
/// Position 7 is leftmost. The colon cell sits after digit 6, pushing
/// positions 5..0 one column further right.
pub const fn digit_column(pos: usize) -> usize {
    let colon_shift = if pos < 6 { 1 } else { 0 };
    5 + (7 - pos) * 4 + colon_shift
}

const fn colon_column() -> usize {
    digit_column(6) + 4
}

const INDICATOR_CELLS: [(Indicator, usize, &str); 5] = [
    (Indicator::Am, 5, "AM"),
    (Indicator::Pm, 8, "PM"),
    (Indicator::Minus, 12, "-"),
    (Indicator::Plus, 14, "+"),
    (Indicator::Divide, 16, "÷"),
];

/// One rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn digit_rows(&self) -> &[String] {
        &self.lines[DIGIT_ROW_OFFSET..DIGIT_ROW_OFFSET + GLYPH_ROWS]
    }

    /// `width` chars of digit row `row` starting at screen column `col`.
    pub fn cells(&self, row: usize, col: usize, width: usize) -> String {
        self.digit_rows()
            .get(row)
            .map(|line| line.chars().skip(col).take(width).collect())
            .unwrap_or_default()
    }

    /// Clear, home, then every line separated by CR LF so raw mode lays it out.
    pub fn to_ansi(&self) -> String {
        let mut out = String::from(CLEAR_AND_HOME);
        out.push_str(&self.lines.join("\r\n"));
        out
    }

    /// Emit the frame as one buffered write.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(self.to_ansi().as_bytes())?;
        sink.flush()
    }
}

/// Turns LCD memory into frames.
#[derive(Debug, Clone)]
pub struct Renderer {
    title: String,
    footer: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new("GoodWatch")
    }
}

impl Renderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            footer: String::new(),
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Render whichever bank the LCD controller is displaying.
    pub fn render_state(&self, state: &DeviceState) -> Frame {
        self.render(state.displayed_lcd())
    }

    pub fn render(&self, lcd: &LcdBuffer) -> Frame {
        self.render_decoded(&decode(lcd))
    }

    pub fn render_decoded(&self, display: &DecodedDisplay) -> Frame {
        let rule = "═".repeat(INNER_WIDTH);
        let mut lines = Vec::with_capacity(DIGIT_ROW_OFFSET + GLYPH_ROWS + 4);
        lines.push(format!("╔{rule}╗"));
        lines.push(boxed(&centered(&self.title)));
        lines.push(format!("╠{rule}╣"));

        let mut rows = [[' '; INNER_WIDTH + 2]; GLYPH_ROWS];
        for (pos, mask) in display.digits.iter().enumerate() {
            draw_glyph(&mut rows, digit_column(pos), *mask);
        }
        if display.indicators.contains(Indicator::Colon) {
            rows[1][colon_column()] = COLON;
            rows[3][colon_column()] = COLON;
        }
        for row in rows.iter_mut() {
            row[0] = '║';
            row[INNER_WIDTH + 1] = '║';
            lines.push(row.iter().collect());
        }

        let mut indicators = vec![' '; INNER_WIDTH];
        for (indicator, col, label) in INDICATOR_CELLS {
            if display.indicators.contains(indicator) {
                for (i, c) in label.chars().enumerate() {
                    indicators[col - 1 + i] = c;
                }
            }
        }
        lines.push(boxed(&indicators.iter().collect::<String>()));

        lines.push(format!("╠{rule}╣"));
        lines.push(boxed(&centered(&self.footer)));
        lines.push(format!("╚{rule}╝"));
        Frame { lines }
    }
}

fn draw_glyph(rows: &mut [[char; INNER_WIDTH + 2]; GLYPH_ROWS], col: usize, mask: u8) {
    let lit = |flag: u8| if mask & flag != 0 { LIT } else { ' ' };
    let bar = |flag: u8| [lit(flag); 3];
    let sides = |left: u8, right: u8| [lit(left), ' ', lit(right)];

    let glyph: [[char; 3]; GLYPH_ROWS] = [
        bar(SEG_A),
        sides(SEG_F, SEG_B),
        bar(SEG_G),
        sides(SEG_E, SEG_C),
        bar(SEG_D),
    ];
    for (row, cells) in rows.iter_mut().zip(glyph.iter()) {
        row[col..col + 3].copy_from_slice(cells);
    }
    if mask & SEG_DP != 0 {
        rows[GLYPH_ROWS - 1][col + 3] = '.';
    }
}

fn centered(text: &str) -> String {
    let text: String = text.chars().take(INNER_WIDTH).collect();
    let len = text.chars().count();
    let left = (INNER_WIDTH - len) / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(INNER_WIDTH - len - left))
}

fn boxed(inner: &str) -> String {
    format!("║{inner}║")
}

const _: () = assert!(digit_column(0) + 3 < INNER_WIDTH + 1);
