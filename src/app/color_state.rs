use rand::Rng;

use crate::{
    constants::{DEFAULT_COLORS, SWATCHES},
    domain::ColorScheme,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCombo {
    pub bg: String,
    pub text: String,
}

/// Eight background/text combos derived from one primary color: odd steps
/// darken, even steps lighten, in 5% increments, with the text color picked
/// for readability against each background.
pub fn generate_color_combos(primary: &str) -> Vec<ColorCombo> {
    let base = parse_hex(primary).unwrap_or((255, 255, 255));
    (1..=SWATCHES.count)
        .map(|step| {
            let amount = (step * SWATCHES.step_percent) as f32 / 100.0;
            let bg = if step % 2 == 0 {
                lighten(base, amount)
            } else {
                darken(base, amount)
            };
            ColorCombo {
                bg: format_hex(bg),
                text: format_hex(readable_text_on(bg)),
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct ColorPicker {
    primary: String,
    combos: Vec<ColorCombo>,
    active: usize,
}

impl Default for ColorPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorPicker {
    pub fn new() -> Self {
        let mut picker = Self {
            primary: DEFAULT_COLORS.bg.to_string(),
            combos: Vec::new(),
            active: 0,
        };
        picker.display_swatches(DEFAULT_COLORS.bg, true);
        picker
    }

    /// Regenerates the swatch row. On the initial load the white/black combo
    /// is preselected when present; afterwards selection resets to the first
    /// swatch.
    pub fn display_swatches(&mut self, primary: &str, initial_load: bool) {
        self.primary = primary.to_string();
        self.combos = generate_color_combos(primary);
        self.active = if initial_load {
            self.combos
                .iter()
                .position(|combo| {
                    combo.bg.eq_ignore_ascii_case(DEFAULT_COLORS.bg)
                        && combo.text.eq_ignore_ascii_case(DEFAULT_COLORS.text)
                })
                .unwrap_or(0)
        } else {
            0
        };
    }

    pub fn randomize(&mut self, rng: &mut impl Rng) {
        let primary = format_hex((rng.r#gen(), rng.r#gen(), rng.r#gen()));
        self.display_swatches(&primary, false);
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn combos(&self) -> &[ColorCombo] {
        &self.combos
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_combo(&self) -> Option<&ColorCombo> {
        self.combos.get(self.active)
    }

    pub fn select(&mut self, index: usize) -> Option<&ColorCombo> {
        if index < self.combos.len() {
            self.active = index;
        }
        self.combos.get(self.active)
    }

    pub fn select_prev(&mut self) -> Option<&ColorCombo> {
        let index = self.active.saturating_sub(1);
        self.select(index)
    }

    pub fn select_next(&mut self) -> Option<&ColorCombo> {
        let index = (self.active + 1).min(self.combos.len().saturating_sub(1));
        self.select(index)
    }

    /// Color sync hook: highlight the swatch matching the saved scheme, if
    /// the current row contains it.
    pub fn sync_with_saved(&mut self, colors: &ColorScheme) -> bool {
        let (Some(bg), Some(text)) = (colors.bg.as_deref(), colors.text.as_deref()) else {
            return false;
        };
        if let Some(index) = self.combos.iter().position(|combo| {
            combo.bg.eq_ignore_ascii_case(bg) && combo.text.eq_ignore_ascii_case(text)
        }) {
            self.active = index;
            return true;
        }
        false
    }
}

pub fn parse_hex(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn format_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn lighten((r, g, b): (u8, u8, u8), amount: f32) -> (u8, u8, u8) {
    let blend = |channel: u8| channel as f32 + (255.0 - channel as f32) * amount;
    (blend(r) as u8, blend(g) as u8, blend(b) as u8)
}

fn darken((r, g, b): (u8, u8, u8), amount: f32) -> (u8, u8, u8) {
    let blend = |channel: u8| channel as f32 * (1.0 - amount);
    (blend(r) as u8, blend(g) as u8, blend(b) as u8)
}

/// Black or white, whichever reads better against the background.
pub fn readable_text_on((r, g, b): (u8, u8, u8)) -> (u8, u8, u8) {
    let brightness = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
    if brightness > 128 { (0, 0, 0) } else { (255, 255, 255) }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generates_eight_combos() {
        let combos = generate_color_combos("#3366cc");
        assert_eq!(combos.len(), 8);
        for combo in &combos {
            assert!(parse_hex(&combo.bg).is_some());
            assert!(combo.text == "#000000" || combo.text == "#ffffff");
        }
    }

    #[test]
    fn test_initial_load_prefers_white_black() {
        let picker = ColorPicker::new();
        let active = picker.active_combo().expect("swatches exist");
        assert_eq!(active.bg, "#ffffff");
        assert_eq!(active.text, "#000000");
    }

    #[test]
    fn test_reload_selects_first_swatch() {
        let mut picker = ColorPicker::new();
        picker.display_swatches("#204060", false);
        assert_eq!(picker.active_index(), 0);
    }

    #[test]
    fn test_readable_text_flips_on_dark_backgrounds() {
        assert_eq!(readable_text_on((255, 255, 255)), (0, 0, 0));
        assert_eq!(readable_text_on((16, 16, 48)), (255, 255, 255));
    }

    #[test]
    fn test_randomize_regenerates_swatches() {
        let mut picker = ColorPicker::new();
        let before = picker.combos().to_vec();
        let mut rng = StdRng::seed_from_u64(7);
        picker.randomize(&mut rng);
        assert_eq!(picker.combos().len(), 8);
        assert_ne!(picker.combos(), before.as_slice());
    }

    #[test]
    fn test_sync_with_saved_highlights_matching_swatch() {
        let mut picker = ColorPicker::new();
        let target = picker.combos()[4].clone();
        let saved = ColorScheme {
            bg: Some(target.bg.to_uppercase()),
            text: Some(target.text.clone()),
        };
        assert!(picker.sync_with_saved(&saved));
        assert_eq!(picker.active_index(), 4);

        let missing = ColorScheme {
            bg: Some("#123456".to_string()),
            text: Some("#654321".to_string()),
        };
        assert!(!picker.sync_with_saved(&missing));
        assert_eq!(picker.active_index(), 4);
    }
}
