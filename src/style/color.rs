use std::fmt;

/// 8-bit sRGB color with alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let bytes = hex.as_bytes();
        if bytes.first() != Some(&b'#') || !bytes[1..].iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
        match bytes.len() {
            4 => {
                let r = hex_1_to_u8(bytes[1]);
                let g = hex_1_to_u8(bytes[2]);
                let b = hex_1_to_u8(bytes[3]);
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            5 => {
                let r = hex_1_to_u8(bytes[1]);
                let g = hex_1_to_u8(bytes[2]);
                let b = hex_1_to_u8(bytes[3]);
                let a = hex_1_to_u8(bytes[4]);
                Some(Self::rgba(r * 17, g * 17, b * 17, a * 17))
            }
            7 => Some(Self::rgb(
                hex_2_to_u8(bytes[1], bytes[2]),
                hex_2_to_u8(bytes[3], bytes[4]),
                hex_2_to_u8(bytes[5], bytes[6]),
            )),
            9 => Some(Self::rgba(
                hex_2_to_u8(bytes[1], bytes[2]),
                hex_2_to_u8(bytes[3], bytes[4]),
                hex_2_to_u8(bytes[5], bytes[6]),
                hex_2_to_u8(bytes[7], bytes[8]),
            )),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn hex_2_to_u8(c1: u8, c2: u8) -> u8 {
    (hex_1_to_u8(c1) << 4) | hex_1_to_u8(c2)
}
