//! LZP + SEE + PPM probability model.
//!
//! The model owns every adaptive table of a coding session:
//! - two LZP hash tables predicting the next byte from a hashed context,
//!   each slot holding an FSM confidence state and the predicted byte
//! - one SEE table per LZP level, mapping (match history, FSM state) to a
//!   15-bit match probability
//! - PPM order-1/order-2 frequency tables with a two-tier cumulative index
//!   for coding bytes the LZP level failed to predict
//!
//! Encoder and decoder drive the model through [`Model::code_byte`], which
//! runs the whole per-byte sequence against a [`SymbolCoder`]. The two sides
//! differ only in how a flag or a symbol crosses the range coder.

use crate::fsm::next_state;
use crate::options::{LzpConfig, Options, PpmConfig};
use oxilzp_core::error::Result;
use oxilzp_core::lg2::nlog2;

/// Initial LZP slot: FSM state 0xFF with predicted byte 0xB5.
pub const LZP_INITIAL_ENTRY: u16 = 0xFFB5;

/// Probability scale of SEE entries (15 bits).
pub const SEE_PROBABILITY_BITS: u32 = 15;

/// Initial SEE probability (one half).
pub const SEE_INITIAL_PROBABILITY: u16 = 1 << (SEE_PROBABILITY_BITS - 1);

/// SEE adaptation shift.
const SEE_ADAPT_SHIFT: u32 = 7;

/// Number of match outcomes kept in an SEE history.
const SEE_HISTORY_BITS: u32 = 4;

/// Mask applied to SEE histories.
const SEE_HISTORY_MASK: usize = (1 << SEE_HISTORY_BITS) - 1;

/// Number of symbols in one PPM group.
pub const PPM_GROUP_SIZE: usize = 16;

/// Decay shift of the recent cost average.
pub const COST_SCALE: u32 = 7;

/// Initial recent cost, also the threshold for [`PpmModel::use_fixed_probabilities`].
pub const INITIAL_RECENT_COST: u32 = 8 << (COST_SCALE + 14);

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// The last eight processed bytes, newest in the low byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextHistory(u64);

impl ContextHistory {
    /// Empty history (all zero bytes).
    pub const fn new() -> Self {
        Self(0)
    }

    /// Shift a processed byte in.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.0 = (self.0 << 8) | u64::from(byte);
    }

    /// Raw history word.
    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Byte `age` positions back (0 = newest).
    #[inline]
    pub fn byte(self, age: usize) -> u8 {
        (self.0 >> (8 * age)) as u8
    }
}

/// One LZP level: hash table plus its SEE table.
#[derive(Debug, Clone)]
pub struct LzpLevel {
    entries: Vec<u16>,
    mask: u32,
    context_length: u8,
    slot: usize,
    see: Vec<u16>,
    see_history: usize,
}

impl LzpLevel {
    /// Allocate a level with all slots at [`LZP_INITIAL_ENTRY`].
    pub fn new(config: LzpConfig) -> Self {
        let size = 1usize << config.mask_size;
        Self {
            entries: vec![LZP_INITIAL_ENTRY; size],
            mask: (size - 1) as u32,
            context_length: config.context_length,
            slot: 0,
            see: vec![SEE_INITIAL_PROBABILITY; (SEE_HISTORY_MASK + 1) << 8],
            see_history: 0,
        }
    }

    /// Number of context bytes hashed for this level.
    pub fn context_length(&self) -> u8 {
        self.context_length
    }

    /// Point the level at the slot for `hash`.
    #[inline]
    pub fn select(&mut self, hash: u32) {
        self.slot = (hash & self.mask) as usize;
    }

    /// Currently selected slot index.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// FSM state of the selected slot.
    #[inline]
    pub fn state(&self) -> u8 {
        (self.entries[self.slot] >> 8) as u8
    }

    /// Byte predicted by the selected slot.
    #[inline]
    pub fn predicted(&self) -> u8 {
        self.entries[self.slot] as u8
    }

    #[inline]
    fn see_index(&self) -> usize {
        (self.see_history << 8) + self.state() as usize
    }

    /// SEE estimate that the selected slot predicts correctly.
    #[inline]
    pub fn probability(&self) -> u16 {
        self.see[self.see_index()]
    }

    /// Current SEE history (4 bits, 1 = mismatch, newest in bit 0).
    pub fn see_history(&self) -> usize {
        self.see_history
    }

    /// Update after this level's flag was coded.
    pub fn update_coded(&mut self, actual: u8, matched: bool) {
        let index = self.see_index();
        let p = &mut self.see[index];
        if matched {
            *p += ((1 << SEE_PROBABILITY_BITS) - *p) >> SEE_ADAPT_SHIFT;
        } else {
            *p -= *p >> SEE_ADAPT_SHIFT;
        }
        self.finish_update(actual, matched);
    }

    /// Update after the other level's flag was coded. No bits were spent
    /// on this level, so its SEE probability stays untouched.
    pub fn update_passive(&mut self, actual: u8) {
        let matched = actual == self.predicted();
        self.finish_update(actual, matched);
    }

    fn finish_update(&mut self, actual: u8, matched: bool) {
        self.see_history = ((self.see_history << 1) | usize::from(!matched)) & SEE_HISTORY_MASK;
        let state = next_state(self.state(), matched);
        self.entries[self.slot] = (u16::from(state) << 8) | u16::from(actual);
    }
}

/// Order-1/order-2 PPM frequency tables.
///
/// Frequencies live in three tiers per context: one count per symbol, one
/// sum per group of 16 symbols and one total. All three always agree.
#[derive(Debug, Clone)]
pub struct PpmModel {
    order: u8,
    step: u16,
    limit: u16,
    context_mask: u64,
    single: Vec<u16>,
    grouped: Vec<u16>,
    total: Vec<u16>,
    recent_cost: u32,
}

impl PpmModel {
    /// Allocate tables for `2^(8 * order)` contexts.
    pub fn new(config: PpmConfig) -> Self {
        let context_bits = 8 * u32::from(config.order);
        let contexts = 1usize << context_bits;
        let init = u16::from(config.init);
        Self {
            order: config.order,
            step: u16::from(config.step),
            limit: config.limit,
            context_mask: (1u64 << context_bits) - 1,
            single: vec![init; contexts << 8],
            grouped: vec![init * PPM_GROUP_SIZE as u16; contexts << 4],
            total: vec![init * 256; contexts],
            recent_cost: INITIAL_RECENT_COST,
        }
    }

    /// Context order in bytes.
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Context index for the newest `order` history bytes.
    #[inline]
    pub fn context(&self, history: ContextHistory) -> usize {
        (history.bits() & self.context_mask) as usize
    }

    /// Frequency of `symbol` in `context`.
    #[inline]
    pub fn frequency(&self, context: usize, symbol: u8) -> u32 {
        u32::from(self.single[(context << 8) + symbol as usize])
    }

    /// Sum of frequencies of group `group` (symbols `16*group..16*group+16`).
    #[inline]
    pub fn group_frequency(&self, context: usize, group: usize) -> u32 {
        u32::from(self.grouped[(context << 4) + group])
    }

    /// Total frequency of `context`.
    #[inline]
    pub fn total(&self, context: usize) -> u32 {
        u32::from(self.total[context])
    }

    /// Cumulative frequency of all symbols below `symbol`, with the mass of
    /// `excluded` removed.
    pub fn cumulative_frequency(&self, context: usize, symbol: u8, excluded: u8) -> u32 {
        let group = symbol as usize / PPM_GROUP_SIZE;
        let groups = &self.grouped[context << 4..(context << 4) + group];
        let base = (context << 8) + group * PPM_GROUP_SIZE;
        let singles = &self.single[base..(context << 8) + symbol as usize];
        let mut cumulative: u32 = groups.iter().map(|&f| u32::from(f)).sum::<u32>()
            + singles.iter().map(|&f| u32::from(f)).sum::<u32>();
        if symbol > excluded {
            cumulative -= self.frequency(context, excluded);
        }
        cumulative
    }

    /// Find the symbol whose cumulative range contains `target`, treating
    /// `excluded` as having zero frequency.
    ///
    /// Returns the symbol and its cumulative frequency, or `None` when
    /// `target` lies beyond the total minus the excluded mass.
    pub fn find_symbol(&self, context: usize, target: u32, excluded: u8) -> Option<(u8, u32)> {
        let excluded_frequency = self.frequency(context, excluded);
        let excluded_group = excluded as usize / PPM_GROUP_SIZE;
        if target >= self.total(context) - excluded_frequency {
            return None;
        }

        let mut remaining = target;
        let mut group = 0;
        loop {
            let mut frequency = self.group_frequency(context, group);
            if group == excluded_group {
                frequency -= excluded_frequency;
            }
            if remaining < frequency {
                break;
            }
            remaining -= frequency;
            group += 1;
        }

        let mut symbol = group * PPM_GROUP_SIZE;
        loop {
            let frequency = if symbol == excluded as usize {
                0
            } else {
                self.frequency(context, symbol as u8)
            };
            if remaining < frequency {
                break;
            }
            remaining -= frequency;
            symbol += 1;
        }

        Some((symbol as u8, target - remaining))
    }

    /// Add `step` to all three tiers for `symbol`, rescaling if the total
    /// exceeds the limit.
    pub fn update(&mut self, context: usize, symbol: u8) {
        let index = (context << 8) + symbol as usize;
        self.single[index] += self.step;
        self.grouped[index >> 4] += self.step;
        self.total[context] += self.step;
        if self.total[context] > self.limit {
            self.rescale(context);
        }
    }

    fn rescale(&mut self, context: usize) {
        let singles = &mut self.single[context << 8..(context + 1) << 8];
        for frequency in singles.iter_mut() {
            *frequency -= *frequency >> 1;
        }

        let mut total = 0u16;
        for (group, chunk) in singles.chunks_exact(PPM_GROUP_SIZE).enumerate() {
            let sum: u16 = chunk.iter().sum();
            self.grouped[(context << 4) + group] = sum;
            total += sum;
        }
        self.total[context] = total;
    }

    /// Fold the cost of coding `symbol` in `context` into the recent cost.
    /// Must run before [`PpmModel::update`] for the same symbol.
    pub fn update_recent_cost(&mut self, context: usize, symbol: u8) {
        let cost = nlog2(self.total(context)) - nlog2(self.frequency(context, symbol));
        self.recent_cost = self.recent_cost - (self.recent_cost >> COST_SCALE) + cost;
    }

    /// Decaying average of recent per-symbol cost (log2 scaled by 2^14, times 2^7).
    pub fn recent_cost(&self) -> u32 {
        self.recent_cost
    }

    /// Whether recent symbols cost more than eight bits on average.
    pub fn use_fixed_probabilities(&self) -> bool {
        self.recent_cost > INITIAL_RECENT_COST
    }
}

/// The range coding side of a session, as seen by the model.
///
/// The encoder codes the outcome it is given; the decoder ignores it and
/// returns what the stream contains.
pub trait SymbolCoder {
    /// Code an LZP match flag with the given SEE probability.
    fn code_flag(&mut self, probability: u16, matched: bool) -> Result<bool>;

    /// Code a byte through the PPM tables of `context`, excluding the
    /// mispredicted byte `excluded`.
    fn code_symbol(&mut self, ppm: &PpmModel, context: usize, symbol: u8, excluded: u8) -> Result<u8>;
}

/// Complete model of one coding session.
#[derive(Debug, Clone)]
pub struct Model {
    history: ContextHistory,
    low: LzpLevel,
    high: Option<LzpLevel>,
    ppm: PpmModel,
}

impl Model {
    /// Allocate every table for `options`.
    ///
    /// With [`Options::only_low_lzp`] the high level is not allocated.
    pub fn new(options: &Options) -> Self {
        let high = (!options.only_low_lzp()).then(|| LzpLevel::new(options.high()));
        Self {
            history: ContextHistory::new(),
            low: LzpLevel::new(options.low()),
            high,
            ppm: PpmModel::new(options.ppm()),
        }
    }

    /// Byte history.
    pub fn history(&self) -> ContextHistory {
        self.history
    }

    /// Low-order LZP level.
    pub fn low(&self) -> &LzpLevel {
        &self.low
    }

    /// High-order LZP level, absent in single-level mode.
    pub fn high(&self) -> Option<&LzpLevel> {
        self.high.as_ref()
    }

    /// PPM tables.
    pub fn ppm(&self) -> &PpmModel {
        &self.ppm
    }

    /// Hash the newest bytes and select the slot of each LZP level.
    fn select_slots(&mut self) {
        let mut bits = self.history.bits();
        let mut hash = FNV_OFFSET_BASIS;
        for _ in 0..self.low.context_length {
            hash = hash.wrapping_mul(FNV_PRIME) ^ (bits & 0xFF) as u32;
            bits >>= 8;
        }
        self.low.select(hash);

        if let Some(high) = self.high.as_mut() {
            for _ in self.low.context_length..high.context_length {
                hash = hash.wrapping_mul(FNV_PRIME) ^ (bits & 0xFF) as u32;
                bits >>= 8;
            }
            high.select(hash);
        }
    }

    /// Code one byte and update every table.
    ///
    /// In dual mode the level with the higher SEE confidence (low on ties)
    /// is coded, the other one only learns the outcome. Returns the byte
    /// that was coded, which for a decoder is the reconstructed byte.
    pub fn code_byte<C: SymbolCoder>(&mut self, coder: &mut C, symbol: u8) -> Result<u8> {
        self.select_slots();
        let context = self.ppm.context(self.history);

        let actual = match self.high.as_mut() {
            None => code_level(&mut self.low, None, &mut self.ppm, context, coder, symbol)?,
            Some(high) if self.low.probability() >= high.probability() => code_level(
                &mut self.low,
                Some(high),
                &mut self.ppm,
                context,
                coder,
                symbol,
            )?,
            Some(high) => code_level(
                high,
                Some(&mut self.low),
                &mut self.ppm,
                context,
                coder,
                symbol,
            )?,
        };

        self.history.push(actual);
        Ok(actual)
    }
}

fn code_level<C: SymbolCoder>(
    coded: &mut LzpLevel,
    passive: Option<&mut LzpLevel>,
    ppm: &mut PpmModel,
    context: usize,
    coder: &mut C,
    symbol: u8,
) -> Result<u8> {
    let predicted = coded.predicted();
    let matched = coder.code_flag(coded.probability(), symbol == predicted)?;

    let actual = if matched {
        predicted
    } else {
        let actual = coder.code_symbol(ppm, context, symbol, predicted)?;
        ppm.update_recent_cost(context, actual);
        ppm.update(context, actual);
        actual
    };

    coded.update_coded(actual, matched);
    if let Some(level) = passive {
        level.update_passive(actual);
    }
    Ok(actual)
}
