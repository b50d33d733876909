use crate::{constants::FONT_PICKER, domain::FontChoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontCategory {
    SansSerif,
    Serif,
    Display,
    Handwriting,
    Monospace,
}

impl FontCategory {
    pub const ALL: [FontCategory; 5] = [
        FontCategory::SansSerif,
        FontCategory::Serif,
        FontCategory::Display,
        FontCategory::Handwriting,
        FontCategory::Monospace,
    ];

    pub fn css_name(self) -> &'static str {
        match self {
            FontCategory::SansSerif => "sans-serif",
            FontCategory::Serif => "serif",
            FontCategory::Display => "display",
            FontCategory::Handwriting => "handwriting",
            FontCategory::Monospace => "monospace",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|category| *category == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontEntry {
    pub family: &'static str,
    pub category: FontCategory,
}

const fn entry(family: &'static str, category: FontCategory) -> FontEntry {
    FontEntry { family, category }
}

/// Built-in catalog, popularity ordered within each category.
pub const FONT_CATALOG: &[FontEntry] = &[
    entry("Roboto", FontCategory::SansSerif),
    entry("Open Sans", FontCategory::SansSerif),
    entry("Lato", FontCategory::SansSerif),
    entry("Montserrat", FontCategory::SansSerif),
    entry("Poppins", FontCategory::SansSerif),
    entry("Inter", FontCategory::SansSerif),
    entry("Raleway", FontCategory::SansSerif),
    entry("Nunito", FontCategory::SansSerif),
    entry("Ubuntu", FontCategory::SansSerif),
    entry("Work Sans", FontCategory::SansSerif),
    entry("Rubik", FontCategory::SansSerif),
    entry("Karla", FontCategory::SansSerif),
    entry("Merriweather", FontCategory::Serif),
    entry("Playfair Display", FontCategory::Serif),
    entry("Lora", FontCategory::Serif),
    entry("PT Serif", FontCategory::Serif),
    entry("Noto Serif", FontCategory::Serif),
    entry("Crimson Text", FontCategory::Serif),
    entry("Libre Baskerville", FontCategory::Serif),
    entry("EB Garamond", FontCategory::Serif),
    entry("Bitter", FontCategory::Serif),
    entry("Cormorant Garamond", FontCategory::Serif),
    entry("Source Serif Pro", FontCategory::Serif),
    entry("Spectral", FontCategory::Serif),
    entry("Oswald", FontCategory::Display),
    entry("Bebas Neue", FontCategory::Display),
    entry("Lobster", FontCategory::Display),
    entry("Abril Fatface", FontCategory::Display),
    entry("Alfa Slab One", FontCategory::Display),
    entry("Righteous", FontCategory::Display),
    entry("Anton", FontCategory::Display),
    entry("Archivo Black", FontCategory::Display),
    entry("Passion One", FontCategory::Display),
    entry("Staatliches", FontCategory::Display),
    entry("Titan One", FontCategory::Display),
    entry("Fredoka One", FontCategory::Display),
    entry("Dancing Script", FontCategory::Handwriting),
    entry("Pacifico", FontCategory::Handwriting),
    entry("Caveat", FontCategory::Handwriting),
    entry("Shadows Into Light", FontCategory::Handwriting),
    entry("Satisfy", FontCategory::Handwriting),
    entry("Indie Flower", FontCategory::Handwriting),
    entry("Amatic SC", FontCategory::Handwriting),
    entry("Great Vibes", FontCategory::Handwriting),
    entry("Sacramento", FontCategory::Handwriting),
    entry("Courgette", FontCategory::Handwriting),
    entry("Kalam", FontCategory::Handwriting),
    entry("Patrick Hand", FontCategory::Handwriting),
    entry("Roboto Mono", FontCategory::Monospace),
    entry("Source Code Pro", FontCategory::Monospace),
    entry("JetBrains Mono", FontCategory::Monospace),
    entry("Fira Code", FontCategory::Monospace),
    entry("IBM Plex Mono", FontCategory::Monospace),
    entry("Space Mono", FontCategory::Monospace),
    entry("Inconsolata", FontCategory::Monospace),
    entry("Ubuntu Mono", FontCategory::Monospace),
    entry("PT Mono", FontCategory::Monospace),
    entry("Cousine", FontCategory::Monospace),
    entry("Anonymous Pro", FontCategory::Monospace),
    entry("VT323", FontCategory::Monospace),
];

pub fn fonts_in_category(category: FontCategory) -> Vec<FontEntry> {
    FONT_CATALOG
        .iter()
        .copied()
        .filter(|entry| entry.category == category)
        .collect()
}

/// One font list (title or body): the matching set for the chosen category,
/// paginated ten at a time, plus the active selection.
///
/// Loads are split into begin/finish and stamped with a generation so a
/// response that was overtaken by a newer request is discarded instead of
/// clobbering the newer list.
#[derive(Debug)]
pub struct FontPicker {
    category: FontCategory,
    matching: Vec<FontEntry>,
    page: usize,
    active: Option<FontChoice>,
    generation: u64,
}

impl FontPicker {
    pub fn new(category: FontCategory) -> Self {
        let mut picker = Self {
            category,
            matching: Vec::new(),
            page: 0,
            active: None,
            generation: 0,
        };
        let request = picker.begin_load(category);
        picker.finish_load(request, fonts_in_category(category));
        picker
    }

    /// Starts a load for `category`: resets to the first page and invalidates
    /// every outstanding request. Returns the token the completion must
    /// present.
    pub fn begin_load(&mut self, category: FontCategory) -> u64 {
        self.category = category;
        self.page = 0;
        self.generation += 1;
        self.generation
    }

    /// Applies a completed load, unless a newer request was issued since.
    pub fn finish_load(&mut self, request: u64, entries: Vec<FontEntry>) -> bool {
        if request != self.generation {
            return false;
        }
        self.matching = entries;
        self.page = self.page.min(self.max_page());
        true
    }

    pub fn category(&self) -> FontCategory {
        self.category
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn max_page(&self) -> usize {
        if self.matching.is_empty() {
            0
        } else {
            (self.matching.len() - 1) / FONT_PICKER.page_size
        }
    }

    pub fn page_entries(&self) -> &[FontEntry] {
        let start = (self.page * FONT_PICKER.page_size).min(self.matching.len());
        let end = (start + FONT_PICKER.page_size).min(self.matching.len());
        &self.matching[start..end]
    }

    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
        }
    }

    pub fn next_page(&mut self) {
        if self.page < self.max_page() {
            self.page += 1;
        }
    }

    pub fn active(&self) -> Option<&FontChoice> {
        self.active.as_ref()
    }

    pub fn select_on_page(&mut self, row: usize) -> Option<FontChoice> {
        let entry = *self.page_entries().get(row)?;
        let choice = FontChoice {
            family: entry.family.to_string(),
            category: Some(entry.category.css_name().to_string()),
        };
        self.active = Some(choice.clone());
        Some(choice)
    }

    /// Font sync hook: pre-select a saved family, switching to its category
    /// and paginating to the page that contains it. Families outside the
    /// catalog leave the picker untouched.
    pub fn sync_with_saved(&mut self, font: &FontChoice) -> bool {
        let Some(entry) = FONT_CATALOG
            .iter()
            .find(|entry| entry.family.eq_ignore_ascii_case(&font.family))
        else {
            return false;
        };

        let request = self.begin_load(entry.category);
        self.finish_load(request, fonts_in_category(entry.category));

        if let Some(index) = self
            .matching
            .iter()
            .position(|candidate| candidate.family == entry.family)
        {
            self.page = index / FONT_PICKER.page_size;
        }
        self.active = Some(FontChoice {
            family: entry.family.to_string(),
            category: Some(entry.category.css_name().to_string()),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_pages_are_clamped() {
        let mut picker = FontPicker::new(FontCategory::Serif);
        assert_eq!(picker.page_entries().len(), 10);
        assert_eq!(picker.max_page(), 1);

        picker.next_page();
        assert_eq!(picker.page(), 1);
        assert_eq!(picker.page_entries().len(), 2);

        picker.next_page();
        assert_eq!(picker.page(), 1);

        picker.prev_page();
        picker.prev_page();
        assert_eq!(picker.page(), 0);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut picker = FontPicker::new(FontCategory::SansSerif);

        let stale = picker.begin_load(FontCategory::Serif);
        let fresh = picker.begin_load(FontCategory::Monospace);

        assert!(picker.finish_load(fresh, fonts_in_category(FontCategory::Monospace)));
        // The serif response arrives late and must not clobber the mono list.
        assert!(!picker.finish_load(stale, fonts_in_category(FontCategory::Serif)));
        assert_eq!(picker.category(), FontCategory::Monospace);
        assert_eq!(picker.page_entries()[0].family, "Roboto Mono");
    }

    #[test]
    fn test_select_on_page_sets_active_choice() {
        let mut picker = FontPicker::new(FontCategory::Handwriting);
        let choice = picker.select_on_page(1).expect("row exists");
        assert_eq!(choice.family, "Pacifico");
        assert_eq!(choice.category.as_deref(), Some("handwriting"));
        assert_eq!(picker.active(), Some(&choice));
    }

    #[test]
    fn test_sync_with_saved_jumps_to_containing_page() {
        let mut picker = FontPicker::new(FontCategory::SansSerif);
        let saved = FontChoice {
            family: "Spectral".to_string(),
            category: Some("serif".to_string()),
        };

        assert!(picker.sync_with_saved(&saved));
        assert_eq!(picker.category(), FontCategory::Serif);
        // Spectral is the twelfth serif entry, so it lives on the second page.
        assert_eq!(picker.page(), 1);
        assert!(
            picker
                .page_entries()
                .iter()
                .any(|entry| entry.family == "Spectral")
        );
    }

    #[test]
    fn test_sync_with_unknown_family_is_a_no_op() {
        let mut picker = FontPicker::new(FontCategory::SansSerif);
        let saved = FontChoice {
            family: "Comic Sans MS".to_string(),
            category: None,
        };
        assert!(!picker.sync_with_saved(&saved));
        assert_eq!(picker.category(), FontCategory::SansSerif);
        assert!(picker.active().is_none());
    }

    #[test]
    fn test_category_cycle_covers_all() {
        let mut category = FontCategory::SansSerif;
        for _ in 0..FontCategory::ALL.len() {
            category = category.next();
        }
        assert_eq!(category, FontCategory::SansSerif);
    }
}
