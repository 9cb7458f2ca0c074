//! Site design tokens and the utility-framework theme extension built on them.
//!
//! Colours are declared once as CSS custom properties, for the light theme on
//! `:root` and for the dark theme on `[data-theme="dark"]`. The utility
//! framework only ever sees `var(--token)` references, so switching the
//! `data-theme` attribute restyles every utility class.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Selector carrying the dark palette.
pub const DARK_SELECTOR: &str = r#"[data-theme="dark"]"#;

/// An ordered set of colour tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    tokens: Vec<(String, String)>,
}

impl Palette {
    /// Build a palette from `(name, value)` pairs, keeping their order.
    pub fn new(tokens: &[(&str, &str)]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Light palette of the site.
    pub fn light() -> Self {
        Self::new(&[
            ("primary", "#0d9488"),
            ("primary-dark", "#0b7c72"),
            ("background", "#ffffff"),
            ("text", "#333333"),
            ("muted", "#6B7280"),
            ("accent", "#F472B6"),
            ("code-bg", "#F3F4F6"),
            ("code-text", "#1F2937"),
        ])
    }

    /// Dark palette of the site.
    pub fn dark() -> Self {
        Self::new(&[
            ("primary", "#2dd4bf"),
            ("primary-dark", "#0d9488"),
            ("background", "#0e1117"),
            ("text", "#f0f0f0"),
            ("muted", "#9CA3AF"),
            ("accent", "#F472B6"),
            ("code-bg", "#1a1a1a"),
            ("code-text", "#f0f0f0"),
        ])
    }

    /// Value of a token.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace a token's value, or append the token if it is new.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.tokens.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.tokens.push((name.to_string(), value.to_string())),
        }
    }

    /// Token names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|(n, _)| n.as_str())
    }

    fn write_rule(&self, out: &mut String, selector: &str) {
        out.push_str(&format!("{} {{\n", selector));
        for (name, value) in &self.tokens {
            out.push_str(&format!("  --{}: {};\n", name, value));
        }
        out.push_str("}\n");
    }
}

/// Overrides read from the `[theme]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeOverrides {
    #[serde(default)]
    pub light: BTreeMap<String, String>,
    #[serde(default)]
    pub dark: BTreeMap<String, String>,
    pub font_sans: Option<Vec<String>>,
    pub prose_max_width: Option<String>,
    pub content: Option<Vec<String>>,
}

/// The complete site theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Palette on `:root`
    pub light: Palette,
    /// Palette under [`DARK_SELECTOR`]
    pub dark: Palette,
    /// Sans-serif font stack
    pub font_sans: Vec<String>,
    /// `max-width` of prose blocks
    pub prose_max_width: String,
    /// Source globs scanned for utility class names
    pub content: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            light: Palette::light(),
            dark: Palette::dark(),
            font_sans: vec![r#""Inter""#.to_string(), "sans-serif".to_string()],
            prose_max_width: "65ch".to_string(),
            content: vec![
                "_includes/**/*.njk".to_string(),
                "posts/**/*.md".to_string(),
                "*.md".to_string(),
                "*.njk".to_string(),
            ],
        }
    }
}

impl Theme {
    /// Apply overrides on top of this theme.
    pub fn with_overrides(mut self, overrides: &ThemeOverrides) -> Self {
        for (name, value) in &overrides.light {
            self.light.set(name, value);
        }
        for (name, value) in &overrides.dark {
            self.dark.set(name, value);
        }
        if let Some(fonts) = &overrides.font_sans {
            self.font_sans = fonts.clone();
        }
        if let Some(width) = &overrides.prose_max_width {
            self.prose_max_width = width.clone();
        }
        if let Some(content) = &overrides.content {
            self.content = content.clone();
        }
        self
    }

    /// Base layer declaring both palettes as custom properties.
    pub fn base_css(&self) -> String {
        let mut css = String::new();
        self.light.write_rule(&mut css, ":root");
        css.push('\n');
        self.dark.write_rule(&mut css, DARK_SELECTOR);
        css
    }

    /// Theme extension mapping utility names onto the custom properties.
    pub fn extension(&self) -> Value {
        let mut colors = Map::new();
        for name in self.light.names().chain(self.dark.names()) {
            colors
                .entry(name.to_string())
                .or_insert_with(|| Value::String(format!("var(--{})", name)));
        }

        json!({
            "colors": colors,
            "fontFamily": { "sans": self.font_sans },
            "maxWidth": { "prose": self.prose_max_width },
        })
    }

    /// Full utility-framework configuration.
    pub fn framework_config(&self) -> Value {
        json!({
            "content": self.content,
            "theme": { "extend": self.extension() },
        })
    }
}
