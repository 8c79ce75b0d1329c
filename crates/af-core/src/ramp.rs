use crate::error::CoreError;

/// 10 caractères — la rampe de référence, bon contraste.
pub const RAMP_DEFAULT: &str = " .:-=+*#%@";

/// 11 caractères — variante plus ronde.
pub const RAMP_SIMPLE: &str = " .-*:o+8&#@";

/// 70 caractères — Paul Bourke extended, résolution maximale.
pub const RAMP_EXTENDED: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Highest possible sum of the three 8-bit channels.
const MAX_CHANNEL_SUM: usize = 3 * 255;

/// Ordered glyph ramp, darkest → brightest.
///
/// The brightness → index mapping is pre-computed for every possible
/// channel sum (0..=765), so a lookup is O(1) and exact: the index is
/// `floor(mean / 256 × N)` where `mean = sum / 3`, computed in integers as
/// `sum × N / 768`.
///
/// # Example
/// ```
/// use af_core::ramp::GlyphRamp;
/// let ramp = GlyphRamp::new(" .:-=+*#%@").unwrap();
/// assert_eq!(ramp.len(), 10);
/// assert_eq!(ramp.blank(), ' ');
/// assert_eq!(ramp.glyph_for_sum(765), '@');
/// ```
#[derive(Clone, Debug)]
pub struct GlyphRamp {
    chars: Vec<char>,
    /// Channel sum → ramp index.
    lut: Vec<u16>,
}

impl GlyphRamp {
    /// Build a ramp from characters ordered darkest → brightest.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidRamp`] if the ramp is empty, has more
    /// than 65535 entries, or repeats a character.
    pub fn new(ramp: &str) -> Result<Self, CoreError> {
        let chars: Vec<char> = ramp.chars().collect();
        if chars.is_empty() {
            return Err(CoreError::InvalidRamp("rampe vide".to_string()));
        }
        if chars.len() > usize::from(u16::MAX) {
            return Err(CoreError::InvalidRamp(format!(
                "{} caractères, maximum {}",
                chars.len(),
                u16::MAX
            )));
        }
        for (i, c) in chars.iter().enumerate() {
            if chars[..i].contains(c) {
                return Err(CoreError::InvalidRamp(format!("caractère dupliqué {c:?}")));
            }
        }

        let lut = build_lut(chars.len());
        Ok(Self { chars, lut })
    }

    /// Resolve a built-in ramp by name: `default`, `simple`, `extended`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidRamp`] for an unknown name.
    pub fn preset(name: &str) -> Result<Self, CoreError> {
        match name {
            "default" => Self::new(RAMP_DEFAULT),
            "simple" => Self::new(RAMP_SIMPLE),
            "extended" => Self::new(RAMP_EXTENDED),
            other => Err(CoreError::InvalidRamp(format!(
                "preset inconnu '{other}' (default, simple, extended)"
            ))),
        }
    }

    /// Number of glyphs in the ramp.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// A ramp is never empty; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The darkest entry, used for background pixels.
    #[must_use]
    pub fn blank(&self) -> char {
        self.chars[0]
    }

    /// Glyphs in ramp order.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Ramp index for a channel sum `r + g + b` (clamped to 765).
    #[inline(always)]
    #[must_use]
    pub fn index_for_sum(&self, sum: u16) -> usize {
        usize::from(self.lut[usize::from(sum).min(MAX_CHANNEL_SUM)])
    }

    /// Ramp glyph for a channel sum `r + g + b`.
    #[inline(always)]
    #[must_use]
    pub fn glyph_for_sum(&self, sum: u16) -> char {
        self.chars[self.index_for_sum(sum)]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        let chars: Vec<char> = RAMP_DEFAULT.chars().collect();
        let lut = build_lut(chars.len());
        Self { chars, lut }
    }
}

/// `floor((sum / 3) / 256 × n)`, clamped to the last entry.
fn build_lut(n: usize) -> Vec<u16> {
    (0..=MAX_CHANNEL_SUM)
        .map(|sum| (sum * n / 768).min(n - 1) as u16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ramp_scenarios() {
        let ramp = GlyphRamp::default();
        assert_eq!(ramp.glyph_for_sum(3 * 255), '@');
        assert_eq!(ramp.glyph_for_sum(3 * 128), '+');
        assert_eq!(ramp.glyph_for_sum(3 * 127), '=');
        assert_eq!(ramp.glyph_for_sum(0), ' ');
    }

    #[test]
    fn index_matches_float_formula() {
        let ramp = GlyphRamp::new(RAMP_EXTENDED).unwrap();
        let n = ramp.len() as f64;
        for sum in 0..=765u16 {
            let mean = f64::from(sum) / 3.0;
            let expected = ((mean / 256.0 * n).floor() as usize).min(ramp.len() - 1);
            assert_eq!(ramp.index_for_sum(sum), expected, "sum {sum}");
        }
    }

    #[test]
    fn ramp_lookup_monotonic() {
        let ramp = GlyphRamp::new(RAMP_SIMPLE).unwrap();
        let mut prev = 0usize;
        for sum in 0..=765u16 {
            let idx = ramp.index_for_sum(sum);
            assert!(idx >= prev, "rampe non monotone à {sum}");
            prev = idx;
        }
    }

    #[test]
    fn single_glyph_ramp() {
        let ramp = GlyphRamp::new("#").unwrap();
        assert_eq!(ramp.glyph_for_sum(0), '#');
        assert_eq!(ramp.glyph_for_sum(765), '#');
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(matches!(GlyphRamp::new(""), Err(CoreError::InvalidRamp(_))));
        assert!(matches!(GlyphRamp::new(" ..@"), Err(CoreError::InvalidRamp(_))));
    }

    #[test]
    fn presets_resolve() {
        assert_eq!(GlyphRamp::preset("default").unwrap().len(), 10);
        assert_eq!(GlyphRamp::preset("simple").unwrap().len(), 11);
        assert_eq!(GlyphRamp::preset("extended").unwrap().len(), 70);
        assert!(GlyphRamp::preset("braille").is_err());
    }
}
