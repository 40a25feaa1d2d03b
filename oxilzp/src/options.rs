//! Compression options.
//!
//! A stream is fully described by eight small integers: context length and
//! table size for each of the two LZP levels, and order, initial count,
//! increment and rescale limit for the PPM literal coder. They are packed
//! into one 64-bit word in the stream header.

use oxilzp_core::error::{OxiLzpError, Result};

/// Smallest allowed LZP hash table size in bits.
pub const MIN_MASK_SIZE: u8 = 15;
/// Largest allowed LZP hash table size in bits.
pub const MAX_MASK_SIZE: u8 = 30;
/// Longest allowed LZP context in bytes.
pub const MAX_CONTEXT_LENGTH: u8 = 8;
/// Largest PPM frequency total the range coder can take.
pub const MAX_PPM_TOTAL: u32 = 32767;

/// Parameters of one LZP prediction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LzpConfig {
    /// Number of preceding bytes hashed to find the prediction slot (1-8).
    pub context_length: u8,
    /// Hash table size as a power of two (15-30).
    pub mask_size: u8,
}

impl LzpConfig {
    /// Create an LZP level configuration.
    pub const fn new(context_length: u8, mask_size: u8) -> Self {
        Self {
            context_length,
            mask_size,
        }
    }
}

/// Parameters of the PPM literal coder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PpmConfig {
    /// Context order in bytes (1 or 2).
    pub order: u8,
    /// Initial frequency of every symbol (1-127).
    pub init: u8,
    /// Frequency increment after coding a symbol (1-127).
    pub step: u8,
    /// Context total above which frequencies are halved.
    pub limit: u16,
}

impl PpmConfig {
    /// Create a PPM configuration.
    pub const fn new(order: u8, init: u8, step: u8, limit: u16) -> Self {
        Self {
            order,
            init,
            step,
            limit,
        }
    }
}

/// Validated compression options.
///
/// Instances can only be obtained through [`Options::new`],
/// [`Options::from_packed`] or [`Options::default`], so every value in
/// circulation satisfies the stream invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Options {
    low: LzpConfig,
    high: LzpConfig,
    ppm: PpmConfig,
}

impl Options {
    /// Create options, checking every constraint of the stream format.
    pub fn new(low: LzpConfig, high: LzpConfig, ppm: PpmConfig) -> Result<Self> {
        validate(&low, &high, &ppm).map_err(OxiLzpError::invalid_configuration)?;
        Ok(Self { low, high, ppm })
    }

    /// Unpack options from a header word, or `None` if they are invalid.
    pub fn from_packed(packed: u64) -> Option<Self> {
        let low = LzpConfig::new((packed >> 56) as u8, (packed >> 48) as u8);
        let high = LzpConfig::new((packed >> 40) as u8, (packed >> 32) as u8);
        let ppm = PpmConfig::new(
            ((packed >> 31) & 0x01) as u8 + 1,
            ((packed >> 24) & 0x7F) as u8,
            (packed >> 16) as u8,
            packed as u16,
        );
        validate(&low, &high, &ppm).ok()?;
        Some(Self { low, high, ppm })
    }

    /// Pack options into the 64-bit header word.
    pub fn to_packed(&self) -> u64 {
        (u64::from(self.low.context_length) << 56)
            | (u64::from(self.low.mask_size) << 48)
            | (u64::from(self.high.context_length) << 40)
            | (u64::from(self.high.mask_size) << 32)
            | (u64::from(self.ppm.order - 1) << 31)
            | (u64::from(self.ppm.init & 0x7F) << 24)
            | (u64::from(self.ppm.step) << 16)
            | u64::from(self.ppm.limit)
    }

    /// Low-order LZP level.
    pub fn low(&self) -> LzpConfig {
        self.low
    }

    /// High-order LZP level.
    pub fn high(&self) -> LzpConfig {
        self.high
    }

    /// PPM literal coder parameters.
    pub fn ppm(&self) -> PpmConfig {
        self.ppm
    }

    /// Whether both LZP levels coincide, in which case only one is kept.
    pub fn only_low_lzp(&self) -> bool {
        self.low == self.high
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            low: LzpConfig::new(4, 24),
            high: LzpConfig::new(8, 27),
            ppm: PpmConfig::new(2, 1, 60, 30000),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Options {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            low: LzpConfig,
            high: LzpConfig,
            ppm: PpmConfig,
        }

        let raw = Raw::deserialize(deserializer)?;
        Options::new(raw.low, raw.high, raw.ppm).map_err(serde::de::Error::custom)
    }
}

fn validate(low: &LzpConfig, high: &LzpConfig, ppm: &PpmConfig) -> std::result::Result<(), String> {
    if !(1..=2).contains(&ppm.order) {
        return Err(format!("PPM order {} must be 1 or 2", ppm.order));
    }
    if low.context_length <= ppm.order {
        return Err(format!(
            "low LZP context length {} must exceed PPM order {}",
            low.context_length, ppm.order
        ));
    }
    if low.context_length > high.context_length || high.context_length > MAX_CONTEXT_LENGTH {
        return Err(format!(
            "LZP context lengths must satisfy {} <= {} <= {MAX_CONTEXT_LENGTH}",
            low.context_length, high.context_length
        ));
    }
    for (name, mask_size) in [("low", low.mask_size), ("high", high.mask_size)] {
        if !(MIN_MASK_SIZE..=MAX_MASK_SIZE).contains(&mask_size) {
            return Err(format!(
                "{name} LZP mask size {mask_size} outside {MIN_MASK_SIZE}..={MAX_MASK_SIZE}"
            ));
        }
    }
    if !(1..=127).contains(&ppm.init) {
        return Err(format!("PPM init {} outside 1..=127", ppm.init));
    }
    if !(1..=127).contains(&ppm.step) {
        return Err(format!("PPM step {} outside 1..=127", ppm.step));
    }
    let limit = u32::from(ppm.limit);
    let min_limit = u32::from(ppm.init) * 256;
    let max_limit = MAX_PPM_TOTAL - u32::from(ppm.step);
    if limit < min_limit || limit > max_limit {
        return Err(format!(
            "PPM limit {limit} outside {min_limit}..={max_limit}"
        ));
    }
    Ok(())
}
