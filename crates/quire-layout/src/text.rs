//! Text measurement service.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! Shaping and font selection live outside layout. Layout only needs two
//! questions answered, both pure functions of (text, style, width):
//!
//! - [`TextMeasurer::measure`]: the longest prefix that fits on a line.
//! - [`TextMeasurer::line_widths`]: the width of each forced line, for
//!   preferred (max-content) widths.
//!
//! All offsets are byte offsets into the measured string.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::style::{ComputedStyle, WhiteSpace, WordBreak};

/// The answer to a [`TextMeasurer::measure`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMeasure {
    /// Length in bytes of the prefix placed on this line, trailing spaces
    /// included.
    pub fitted_len: usize,
    /// Advance width of the fitted prefix, trailing spaces included.
    pub width: f32,
    /// Line height of the text.
    pub height: f32,
    /// Distance from the top of the line height to the baseline.
    pub baseline: f32,
    /// Byte offset where the next line starts, or `None` when the whole
    /// text was consumed.
    pub resume_at: Option<usize>,
}

/// External text measurement.
///
/// Implementations must return at least one break unit whenever `text` is
/// non-empty, even if that unit overflows `available_width`; the inline
/// layout relies on this for forward progress.
pub trait TextMeasurer {
    /// Find the longest prefix of `text` fitting in `available_width`
    /// (`None` means unbounded), honoring forced breaks.
    fn measure(&self, text: &str, style: &ComputedStyle, available_width: Option<f32>)
    -> TextMeasure;

    /// Width of each forced line of `text`.
    fn line_widths(&self, text: &str, style: &ComputedStyle) -> Vec<f32>;
}

/// Fixed-advance font metrics.
///
/// Every character advances `font_size * advance_ratio`. Without access to
/// real font data this mirrors proportional Latin text well enough for
/// pagination, and it makes tests exact.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    /// Advance of one character as a multiple of the font size.
    pub advance_ratio: f32,
    /// Ascent as a multiple of the font size.
    pub ascent_ratio: f32,
}

impl Default for MonospaceMeasurer {
    /// The average advance width of Latin glyphs in a proportional font is
    /// approximately 0.6× the font size.
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            ascent_ratio: 0.8,
        }
    }
}

impl MonospaceMeasurer {
    /// Create a measurer with the given advance ratio.
    #[must_use]
    pub fn new(advance_ratio: f32) -> Self {
        Self {
            advance_ratio,
            ..Self::default()
        }
    }

    fn advance(&self, text: &str, style: &ComputedStyle) -> f32 {
        text.chars().count() as f32 * style.font_size * self.advance_ratio
    }

    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "Half the leading is added above A and the other half below D."
    fn vertical_metrics(&self, style: &ComputedStyle) -> (f32, f32) {
        let height = style.line_height_px();
        let ascent = style.font_size * self.ascent_ratio;
        let half_leading = (height - style.font_size) / 2.0;
        (height, half_leading + ascent)
    }

    /// Soft wrap opportunities inside one forced line, as byte offsets where
    /// a new line may start.
    fn break_opportunities(segment: &str, style: &ComputedStyle) -> Vec<usize> {
        if !style.white_space.wraps() {
            return Vec::new();
        }
        let break_all = style.word_break == WordBreak::BreakAll;
        let mut opportunities = Vec::new();
        let mut previous: Option<char> = None;
        for (offset, ch) in segment.char_indices() {
            if let Some(prev) = previous {
                let after_space = prev == ' ' && ch != ' ';
                let between_letters = break_all && prev != ' ' && ch != ' ';
                if after_space || between_letters {
                    opportunities.push(offset);
                }
            }
            previous = Some(ch);
        }
        opportunities
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(
        &self,
        text: &str,
        style: &ComputedStyle,
        available_width: Option<f32>,
    ) -> TextMeasure {
        let (height, baseline) = self.vertical_metrics(style);

        // STEP 1: Cut at the first forced break.
        // [§ 16.6](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
        //
        // "Lines are only broken at preserved newline characters" for `pre`.
        let (segment, forced_resume) = if style.white_space.preserves_newlines() {
            match text.find('\n') {
                Some(newline) => (&text[..newline], Some(newline + 1)),
                None => (text, None),
            }
        } else {
            (text, None)
        };
        let forced_resume = forced_resume.filter(|&offset| offset < text.len());

        let fit_width = |prefix: &str| {
            let trimmed = if style.white_space.collapses_spaces() || style.white_space.wraps() {
                prefix.trim_end_matches(' ')
            } else {
                prefix
            };
            self.advance(trimmed, style)
        };

        // STEP 2: The whole segment fits.
        let fits_whole = available_width.is_none_or(|available| fit_width(segment) <= available);
        let opportunities = Self::break_opportunities(segment, style);
        if fits_whole || opportunities.is_empty() {
            return TextMeasure {
                fitted_len: segment.len(),
                width: self.advance(segment, style),
                height,
                baseline,
                resume_at: forced_resume,
            };
        }

        // STEP 3: Take the last opportunity that fits, or the first one when
        // none does (a break unit is never split).
        let available = available_width.unwrap_or(f32::INFINITY);
        let cut = opportunities
            .iter()
            .rev()
            .copied()
            .find(|&offset| fit_width(&segment[..offset]) <= available)
            .unwrap_or(opportunities[0]);

        TextMeasure {
            fitted_len: cut,
            width: self.advance(&segment[..cut], style),
            height,
            baseline,
            resume_at: Some(cut),
        }
    }

    fn line_widths(&self, text: &str, style: &ComputedStyle) -> Vec<f32> {
        if style.white_space.preserves_newlines() {
            text.split('\n')
                .map(|line| self.advance(line, style))
                .collect()
        } else {
            vec![self.advance(text, style)]
        }
    }
}

/// The style properties measurement depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    font_size: u32,
    line_height: u32,
    white_space: WhiteSpace,
    word_break: WordBreak,
    available: Option<u32>,
}

impl MeasureKey {
    fn new(text: &str, style: &ComputedStyle, available: Option<f32>) -> Self {
        Self {
            text: text.to_string(),
            font_size: style.font_size.to_bits(),
            line_height: style.line_height_px().to_bits(),
            white_space: style.white_space,
            word_break: style.word_break,
            available: available.map(f32::to_bits),
        }
    }
}

/// Memoizing wrapper around any [`TextMeasurer`].
///
/// Measurement is a pure function of its inputs, so results are cached per
/// (text, relevant style, width). Layout is single-threaded; the cache uses a
/// `RefCell`.
pub struct CachedMeasurer<M> {
    inner: M,
    cache: RefCell<HashMap<MeasureKey, TextMeasure>>,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    /// Wrap `inner`.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of memoized `measure` results.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn measure(
        &self,
        text: &str,
        style: &ComputedStyle,
        available_width: Option<f32>,
    ) -> TextMeasure {
        let key = MeasureKey::new(text, style, available_width);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return *hit;
        }
        let result = self.inner.measure(text, style, available_width);
        let _ = self.cache.borrow_mut().insert(key, result);
        result
    }

    fn line_widths(&self, text: &str, style: &ComputedStyle) -> Vec<f32> {
        self.inner.line_widths(text, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(font_size: f32) -> ComputedStyle {
        ComputedStyle {
            font_size,
            ..ComputedStyle::default()
        }
    }

    #[test]
    fn test_whole_text_fits() {
        let m = MonospaceMeasurer::new(1.0);
        let r = m.measure("hello world", &style(2.0), Some(100.0));
        assert_eq!(r.fitted_len, 11);
        assert_eq!(r.width, 22.0);
        assert_eq!(r.resume_at, None);
    }

    #[test]
    fn test_breaks_after_space() {
        let m = MonospaceMeasurer::new(1.0);
        // "hello " is 12px wide but its trailing space does not count.
        let r = m.measure("hello world", &style(2.0), Some(10.0));
        assert_eq!(r.fitted_len, 6);
        assert_eq!(r.width, 12.0);
        assert_eq!(r.resume_at, Some(6));
    }

    #[test]
    fn test_first_unit_always_returned() {
        let m = MonospaceMeasurer::new(1.0);
        let r = m.measure("unbreakable word", &style(2.0), Some(1.0));
        assert_eq!(r.fitted_len, "unbreakable ".len());
        assert_eq!(r.resume_at, Some("unbreakable ".len()));
    }

    #[test]
    fn test_break_all_splits_letters() {
        let m = MonospaceMeasurer::new(1.0);
        let mut s = style(2.0);
        s.word_break = WordBreak::BreakAll;
        let r = m.measure("AB", &s, Some(3.0));
        assert_eq!(r.fitted_len, 1);
        assert_eq!(r.width, 2.0);
        assert_eq!(r.resume_at, Some(1));
    }

    #[test]
    fn test_nowrap_never_breaks() {
        let m = MonospaceMeasurer::new(1.0);
        let mut s = style(2.0);
        s.white_space = WhiteSpace::Nowrap;
        let r = m.measure("a b c", &s, Some(1.0));
        assert_eq!(r.fitted_len, 5);
        assert_eq!(r.resume_at, None);
    }

    #[test]
    fn test_pre_forced_break() {
        let m = MonospaceMeasurer::new(1.0);
        let mut s = style(2.0);
        s.white_space = WhiteSpace::Pre;
        let r = m.measure("ab\ncd", &s, None);
        assert_eq!(r.fitted_len, 2);
        assert_eq!(r.resume_at, Some(3));
        assert_eq!(m.line_widths("ab\ncd e", &s), vec![4.0, 8.0]);
    }

    #[test]
    fn test_trailing_newline_does_not_resume() {
        let m = MonospaceMeasurer::new(1.0);
        let mut s = style(2.0);
        s.white_space = WhiteSpace::PreLine;
        let r = m.measure("ab\n", &s, None);
        assert_eq!(r.fitted_len, 2);
        assert_eq!(r.resume_at, None);
    }

    #[test]
    fn test_empty_text_reports_strut() {
        let m = MonospaceMeasurer::default();
        let r = m.measure("", &style(10.0), Some(50.0));
        assert_eq!(r.fitted_len, 0);
        assert_eq!(r.width, 0.0);
        assert!((r.height - 12.0).abs() < 1e-4);
        assert!((r.baseline - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_cache_memoizes() {
        let m = CachedMeasurer::new(MonospaceMeasurer::default());
        let s = style(10.0);
        let a = m.measure("cached text", &s, Some(30.0));
        let b = m.measure("cached text", &s, Some(30.0));
        assert_eq!(a, b);
        assert_eq!(m.cached_entries(), 1);
        let _ = m.measure("cached text", &s, None);
        assert_eq!(m.cached_entries(), 2);
    }
}
