// Display colors for drivers and tyre compounds

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`, `rrggbb` or the short `#rgb` form.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => Some(Self::new(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|c| c * 17);
                Some(Self::new(channel(0).ok()?, channel(1).ok()?, channel(2).ok()?))
            }
            _ => None,
        }
    }
}

pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const UNKNOWN_COMPOUND: Rgb = Rgb::new(0x88, 0x88, 0x88);

/// Marker color for a tyre compound label. Labels are matched case-insensitively and anything
/// unrecognized gets a neutral grey.
pub fn compound_color(compound: &str) -> Rgb {
    match compound.to_ascii_uppercase().as_str() {
        "SOFT" => Rgb::new(255, 0, 0),
        "MEDIUM" => Rgb::new(255, 255, 0),
        "HARD" => WHITE,
        "INTERMEDIATE" => Rgb::new(0, 255, 0),
        "WET" => Rgb::new(0, 0, 255),
        _ => UNKNOWN_COMPOUND,
    }
}

/// Driver color from the dataset's color table, white when missing or unparsable.
pub fn driver_color(colors: &std::collections::HashMap<String, String>, driver_code: &str) -> Rgb {
    colors
        .get(driver_code)
        .and_then(|c| Rgb::from_hex(c))
        .unwrap_or(WHITE)
}
