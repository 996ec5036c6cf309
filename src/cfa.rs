use num_enum::TryFromPrimitive;

/// Length of the 2x2 repeating filter tile description.
pub const CFA_PATTERN_LEN: usize = 4;

/// Fixed CFAPlaneColor mapping. DNG readers in the wild rely on this tag
/// being {Red, Green, Blue} even for CMYW filter sets, so it never varies
/// with the pattern characters.
pub const CFA_PLANE_COLOR_RGB: [u8; 3] = [0, 1, 2];

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, TryFromPrimitive)]
#[repr(u8)]
pub enum CfaColor {
  Red = 0,
  Green = 1,
  Blue = 2,
  Cyan = 3,
  Magenta = 4,
  Yellow = 5,
  White = 6,
}

impl CfaColor {
  pub fn from_char(ch: char) -> Option<Self> {
    match ch {
      'R' => Some(Self::Red),
      'G' => Some(Self::Green),
      'B' => Some(Self::Blue),
      'C' => Some(Self::Cyan),
      'M' => Some(Self::Magenta),
      'Y' => Some(Self::Yellow),
      'W' => Some(Self::White),
      _ => None,
    }
  }
}

/// Encode a filter pattern string like "RGGB" into the raw index bytes
/// the CFAPattern tag expects.
///
/// Anything that is not exactly four characters over {R,G,B,C,M,Y,W}
/// falls back to the all-Red pattern `[0, 0, 0, 0]`. Callers get no error
/// indication for malformed patterns, only the fallback.
///
/// # Example
/// ```
/// use rawout::cfa::encode_pattern;
/// assert_eq!(encode_pattern("RGGB"), [0, 1, 1, 2]);
/// assert_eq!(encode_pattern("XYZ"), [0, 0, 0, 0]);
/// ```
pub fn encode_pattern(pattern: &str) -> [u8; CFA_PATTERN_LEN] {
  let fallback = [CfaColor::Red as u8; CFA_PATTERN_LEN];
  if pattern.chars().count() != CFA_PATTERN_LEN {
    return fallback;
  }
  let mut encoded = fallback;
  for (i, ch) in pattern.chars().enumerate() {
    match CfaColor::from_char(ch) {
      Some(color) => encoded[i] = color as u8,
      None => return fallback,
    }
  }
  encoded
}
