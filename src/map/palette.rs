use std::collections::HashMap;
use std::fmt;

/// 24-bit display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build from a 0xRRGGBB literal
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Color for categories missing from the table
pub const FALLBACK_COLOR: Rgb = Rgb::from_hex(0x4b5563);

const DEFAULT_COLORS: [(&str, Rgb); 5] = [
    ("streetlight", Rgb::from_hex(0xf59e0b)),
    ("garbage", Rgb::from_hex(0xef4444)),
    ("road", Rgb::from_hex(0x6b7280)),
    ("water", Rgb::from_hex(0x3b82f6)),
    ("traffic", Rgb::from_hex(0x22c55e)),
];

/// Category → marker color table.
///
/// Built once at startup and only read afterwards. Lookups are exact and
/// always resolve: unknown tags get the fallback color.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    colors: HashMap<String, Rgb>,
    order: Vec<String>,
    fallback: Rgb,
}

impl CategoryPalette {
    pub fn new<'a, I>(entries: I, fallback: Rgb) -> Self
    where
        I: IntoIterator<Item = (&'a str, Rgb)>,
    {
        let mut colors = HashMap::new();
        let mut order = Vec::new();
        for (category, color) in entries {
            if colors.insert(category.to_string(), color).is_none() {
                order.push(category.to_string());
            }
        }

        Self {
            colors,
            order,
            fallback,
        }
    }

    /// Marker color for a category tag
    pub fn color_for(&self, category: &str) -> Rgb {
        self.colors.get(category).copied().unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Rgb {
        self.fallback
    }

    /// Known categories in table order (for the legend)
    pub fn entries(&self) -> impl Iterator<Item = (&str, Rgb)> + '_ {
        self.order
            .iter()
            .map(|category| (category.as_str(), self.colors[category]))
    }
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS, FALLBACK_COLOR)
    }
}
