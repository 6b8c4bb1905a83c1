// src/display/mod.rs - LCD segment decode and terminal rendering
pub mod decode;
pub mod render;
pub mod segment_map;

pub use decode::{DecodedDisplay, IndicatorSet, decode, decode_with};
pub use render::{Frame, Renderer, digit_column};
pub use segment_map::{Indicator, LCD_MAP, SegmentBit, SegmentMap};
