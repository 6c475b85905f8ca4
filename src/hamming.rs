//! # Generalized Hamming Error Correction
//!
//! Encodes a data word of up to 26 bits into a Hamming codeword of up to 32 bits and
//! corrects single-bit errors on the way back. Three of the six codes are SECDED: they add
//! an overall parity bit that turns every double-bit error into a detected, uncorrectable one.
//!
//! # Layout
//!
//! Bit positions are 1-indexed as in the textbook construction. Check bit `p` sits at position
//! `2^p` and covers every position whose index has bit `p` set. Data bits fill the remaining
//! positions, lowest data bit first. For SECDED codes the overall parity bit takes the last
//! position (`total_bits`), outside the inner code.
//!
//! ```text
//! Hamming(8,4):  pos  8  7  6  5  4  3  2  1
//!                     P  d3 d2 d1 p2 d0 p1 p0
//! ```
//!
//! # Usage
//!
//! ```
//! use radiocmd::hamming::{self, HammingType};
//!
//! let config = HammingType::H84.config();
//! let codeword = hamming::encode(0x7, config).unwrap();
//! assert_eq!(codeword, 0xB4);
//!
//! let decoded = hamming::decode(codeword ^ 0b0001_0000, config).unwrap();
//! assert!(decoded.corrected);
//! assert_eq!(decoded.error_position, 5);
//! assert_eq!(decoded.data, 0x7);
//! ```

use crate::error::{Error, Result};

/// Largest data word the fixed-width accumulator supports.
pub const MAX_DATA_BITS: u8 = 26;

/// Largest codeword the fixed-width accumulator supports.
pub const MAX_TOTAL_BITS: u8 = 32;

/// The supported `(n, k)` codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum HammingType {
    H74 = 0,
    H84 = 1,
    H1511 = 2,
    H1611 = 3,
    H3126 = 4,
    H3226 = 5,
}

impl HammingType {
    pub const ALL: [HammingType; 6] = [
        HammingType::H74,
        HammingType::H84,
        HammingType::H1511,
        HammingType::H1611,
        HammingType::H3126,
        HammingType::H3226,
    ];

    pub fn config(self) -> &'static HammingConfig {
        return &CONFIGS[self as usize];
    }
}

/// Parameters of one Hamming code.
///
/// # Fields
/// - `code`: The code this record describes
/// - `total_bits`: Codeword length `n`
/// - `data_bits`: Data word length `k`
/// - `parity_bits`: Every non-data bit, the overall SECDED bit included, so `n == k + parity_bits`
/// - `has_overall_parity`: Whether the last bit is an overall parity bit (SECDED)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HammingConfig {
    pub code: HammingType,
    pub total_bits: u8,
    pub data_bits: u8,
    pub parity_bits: u8,
    pub has_overall_parity: bool,
}

impl HammingConfig {
    /// Number of check bits of the inner (non-SECDED) code.
    pub const fn check_bits(&self) -> u8 {
        return self.parity_bits - self.has_overall_parity as u8;
    }

    /// Number of positions covered by the inner code.
    pub const fn inner_bits(&self) -> u8 {
        return self.total_bits - self.has_overall_parity as u8;
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = Error::InvalidConfig {
            data_bits: self.data_bits,
            total_bits: self.total_bits,
        };

        if self.data_bits == 0 || self.data_bits > MAX_DATA_BITS || self.total_bits > MAX_TOTAL_BITS {
            return Err(invalid);
        }
        if self.parity_bits <= self.has_overall_parity as u8
            || self.total_bits as u16 != self.data_bits as u16 + self.parity_bits as u16
        {
            return Err(invalid);
        }
        // Every inner position must be reachable by a syndrome.
        if (self.inner_bits() as u32) >= (1u32 << self.check_bits()) {
            return Err(invalid);
        }

        return Ok(());
    }
}

pub static CONFIGS: [HammingConfig; 6] = [
    HammingConfig { code: HammingType::H74, total_bits: 7, data_bits: 4, parity_bits: 3, has_overall_parity: false },
    HammingConfig { code: HammingType::H84, total_bits: 8, data_bits: 4, parity_bits: 4, has_overall_parity: true },
    HammingConfig { code: HammingType::H1511, total_bits: 15, data_bits: 11, parity_bits: 4, has_overall_parity: false },
    HammingConfig { code: HammingType::H1611, total_bits: 16, data_bits: 11, parity_bits: 5, has_overall_parity: true },
    HammingConfig { code: HammingType::H3126, total_bits: 31, data_bits: 26, parity_bits: 5, has_overall_parity: false },
    HammingConfig { code: HammingType::H3226, total_bits: 32, data_bits: 26, parity_bits: 6, has_overall_parity: true },
];

/// Result of decoding one codeword.
///
/// # Fields
/// - `data`: The recovered data word. Meaningless when `uncorrectable` is set
/// - `corrected`: A single-bit error was found and fixed
/// - `uncorrectable`: Two or more bit errors were detected
/// - `error_position`: 1-indexed position of the corrected bit, 0 if none
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    pub data: u32,
    pub corrected: bool,
    pub uncorrectable: bool,
    pub error_position: u8,
}

const fn is_power_of_two(position: u8) -> bool {
    return position & (position - 1) == 0;
}

const fn bit(word: u32, position: u8) -> u32 {
    return (word >> (position - 1)) & 1;
}

/// The value check bit `parity_index` must hold for `word`.
///
/// XOR of every bit at a 1-indexed position up to `inner_bits` whose index has bit
/// `parity_index` set, the check bit's own position excluded.
pub fn calculate_parity(word: u32, parity_index: u8, inner_bits: u8) -> u8 {
    let own_position = 1u8 << parity_index;
    let mut parity: u32 = 0;

    for position in 1..=inner_bits {
        if position != own_position && position & own_position != 0 {
            parity ^= bit(word, position);
        }
    }

    return parity as u8;
}

/// Encodes the low `data_bits` bits of `data`.
pub fn encode(data: u32, config: &HammingConfig) -> Result<u32> {
    config.validate()?;

    if data >> config.data_bits != 0 {
        return Err(Error::DataOverflow {
            data,
            data_bits: config.data_bits,
        });
    }

    let mut encoded: u32 = 0;
    let mut data_bit: u8 = 0;
    for position in 1..=config.inner_bits() {
        if is_power_of_two(position) {
            continue;
        }
        encoded |= ((data >> data_bit) & 1) << (position - 1);
        data_bit += 1;
    }

    for parity_index in 0..config.check_bits() {
        let parity = calculate_parity(encoded, parity_index, config.inner_bits()) as u32;
        encoded |= parity << ((1u32 << parity_index) - 1);
    }

    if config.has_overall_parity {
        encoded |= (encoded.count_ones() & 1) << (config.total_bits - 1);
    }

    return Ok(encoded);
}

fn extract(encoded: u32, config: &HammingConfig) -> u32 {
    let mut data: u32 = 0;
    let mut data_bit: u8 = 0;

    for position in 1..=config.inner_bits() {
        if is_power_of_two(position) {
            continue;
        }
        data |= bit(encoded, position) << data_bit;
        data_bit += 1;
    }

    return data;
}

/// Decodes `codeword`, correcting a single-bit error when there is one.
///
/// Bits above `total_bits` are ignored. The only `Err` is an invalid configuration;
/// corruption is reported through the flags of [`Decoded`].
pub fn decode(codeword: u32, config: &HammingConfig) -> Result<Decoded> {
    config.validate()?;

    let mask = if config.total_bits == 32 {
        u32::MAX
    } else {
        (1u32 << config.total_bits) - 1
    };
    let mut encoded = codeword & mask;
    let inner_bits = config.inner_bits();

    let mut syndrome: u8 = 0;
    for parity_index in 0..config.check_bits() {
        let expected = calculate_parity(encoded, parity_index, inner_bits);
        let actual = bit(encoded, 1 << parity_index) as u8;
        if expected != actual {
            syndrome |= 1 << parity_index;
        }
    }

    let mut result = Decoded::default();

    if config.has_overall_parity {
        let overall_odd = encoded.count_ones() & 1 == 1;
        match (syndrome, overall_odd) {
            (0, false) => {}
            (0, true) => {
                // Only the overall parity bit itself flipped.
                encoded ^= 1 << (config.total_bits - 1);
                result.corrected = true;
                result.error_position = config.total_bits;
            }
            (s, true) if s <= inner_bits => {
                encoded ^= 1 << (s - 1);
                result.corrected = true;
                result.error_position = s;
            }
            _ => {
                result.uncorrectable = true;
                return Ok(result);
            }
        }
    } else if syndrome != 0 {
        if syndrome > config.total_bits {
            result.uncorrectable = true;
            return Ok(result);
        }
        encoded ^= 1 << (syndrome - 1);
        result.corrected = true;
        result.error_position = syndrome;
    }

    result.data = extract(encoded, config);

    return Ok(result);
}
