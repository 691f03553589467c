//! Wire codec between a raw share and its word mnemonic.
//!
//! A mnemonic is a sequence of 10-bit word indices:
//!
//! ```text
//! | id (15) | ext (1) | exp (4) | GI (4) | Gt−1 (4) | g−1 (4) | MI (4) | Mt−1 (4) |
//! | share value, zero-padded big-endian            | checksum (3 words)           |
//! ```
//!
//! The 40-bit metadata prefix occupies the first four words; the share value
//! fills whole words with its padding bits forced to zero; the RS1024
//! checksum covers everything under the customization string selected by the
//! extendable-backup flag.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::Slip39Error;
use crate::rs1024;
use crate::wordlist;

/// Bits carried by one word.
pub const RADIX_BITS: usize = 10;

/// Bits of the share-set identifier.
pub const ID_BITS_LENGTH: usize = 15;

/// Bits of the extendable-backup flag.
pub const EXTENDABLE_FLAG_BITS_LENGTH: usize = 1;

/// Bits of the iteration exponent.
pub const ITERATION_EXP_BITS_LENGTH: usize = 4;

/// Words holding identifier, flag and exponent.
pub const ID_EXP_WORDS_LENGTH: usize =
    bits_to_words(ID_BITS_LENGTH + EXTENDABLE_FLAG_BITS_LENGTH + ITERATION_EXP_BITS_LENGTH);

/// Words of RS1024 checksum at the end of every mnemonic.
pub const CHECKSUM_WORDS_LENGTH: usize = 3;

/// Mnemonic words that are not share value: prefix, group/member fields,
/// checksum.
pub const METADATA_WORDS_LENGTH: usize = ID_EXP_WORDS_LENGTH + 2 + CHECKSUM_WORDS_LENGTH;

/// Minimum entropy of a master secret in bits.
pub const MIN_STRENGTH_BITS: usize = 128;

/// Shortest valid mnemonic.
pub const MIN_MNEMONIC_WORDS_LENGTH: usize =
    METADATA_WORDS_LENGTH + bits_to_words(MIN_STRENGTH_BITS);

/// Largest representable share-set identifier.
pub const MAX_IDENTIFIER: u16 = (1 << ID_BITS_LENGTH) - 1;

const fn bits_to_words(bits: usize) -> usize {
    (bits + RADIX_BITS - 1) / RADIX_BITS
}

/// One member share with all the metadata its mnemonic carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    /// 15-bit identifier common to the whole share set.
    pub identifier: u16,
    /// Extendable-backup flag; selects customization string and salt.
    pub extendable: bool,
    /// PBKDF2 iteration exponent of the set.
    pub iteration_exponent: u8,
    /// Which group this share belongs to.
    pub group_index: u8,
    /// Groups required for recovery.
    pub group_threshold: u8,
    /// Groups in the set.
    pub group_count: u8,
    /// Index of this share within its group.
    pub member_index: u8,
    /// Member shares required to recover the group share.
    pub member_threshold: u8,
    /// The share value; as long as the master secret.
    pub value: Vec<u8>,
}

impl Share {
    /// Render this share as a space-separated word mnemonic.
    pub fn to_mnemonic(&self) -> String {
        let mut prefix = u64::from(self.identifier);
        prefix = (prefix << EXTENDABLE_FLAG_BITS_LENGTH) | u64::from(self.extendable);
        prefix = (prefix << ITERATION_EXP_BITS_LENGTH) | u64::from(self.iteration_exponent);
        prefix = (prefix << 4) | u64::from(self.group_index);
        prefix = (prefix << 4) | u64::from(self.group_threshold - 1);
        prefix = (prefix << 4) | u64::from(self.group_count - 1);
        prefix = (prefix << 4) | u64::from(self.member_index);
        prefix = (prefix << 4) | u64::from(self.member_threshold - 1);

        let prefix_words = ID_EXP_WORDS_LENGTH + 2;
        let mut words: Vec<u16> = (0..prefix_words)
            .rev()
            .map(|i| ((prefix >> (RADIX_BITS * i)) & 0x3ff) as u16)
            .collect();
        words.extend(value_to_words(&self.value));

        let checksum = rs1024::create_checksum(rs1024::customization(self.extendable), &words);
        words.extend_from_slice(&checksum);

        words
            .iter()
            .map(|&word| wordlist::WORDS[usize::from(word)])
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse and validate a mnemonic back into a [`Share`].
    pub fn from_mnemonic(mnemonic: &str) -> Result<Self, Slip39Error> {
        let mut words = Vec::new();
        for word in mnemonic.split_whitespace() {
            let index = wordlist::index_of(word).ok_or_else(|| {
                Slip39Error::InvalidMnemonic(format!("unknown word {:?}", word))
            })?;
            words.push(index);
        }
        if words.len() < MIN_MNEMONIC_WORDS_LENGTH {
            return Err(Slip39Error::InvalidMnemonic(format!(
                "mnemonic must be at least {} words",
                MIN_MNEMONIC_WORDS_LENGTH
            )));
        }
        // Value bits must leave fewer than 8 padding bits over whole bytes,
        // which also forces the decoded length to an even byte count.
        let padding_bits = (RADIX_BITS * (words.len() - METADATA_WORDS_LENGTH)) % 16;
        if padding_bits > 8 {
            return Err(Slip39Error::InvalidMnemonic(
                "invalid mnemonic length".to_string(),
            ));
        }

        let extendable = (words[1] >> ITERATION_EXP_BITS_LENGTH) & 1 == 1;
        if !rs1024::verify_checksum(rs1024::customization(extendable), &words) {
            return Err(Slip39Error::InvalidMnemonic("checksum failed".to_string()));
        }

        let mut prefix = 0u64;
        for &word in &words[..ID_EXP_WORDS_LENGTH + 2] {
            prefix = (prefix << RADIX_BITS) | u64::from(word);
        }
        let identifier = (prefix >> 25) as u16;
        let iteration_exponent = ((prefix >> 20) & 0xf) as u8;
        let group_index = ((prefix >> 16) & 0xf) as u8;
        let group_threshold = ((prefix >> 12) & 0xf) as u8 + 1;
        let group_count = ((prefix >> 8) & 0xf) as u8 + 1;
        let member_index = ((prefix >> 4) & 0xf) as u8;
        let member_threshold = (prefix & 0xf) as u8 + 1;

        if group_count < group_threshold {
            return Err(Slip39Error::InvalidMnemonic(format!(
                "group threshold {} exceeds the group count {}",
                group_threshold, group_count
            )));
        }

        let value_words = &words[ID_EXP_WORDS_LENGTH + 2..words.len() - CHECKSUM_WORDS_LENGTH];
        let value = words_to_value(value_words, padding_bits)?;

        Ok(Share {
            identifier,
            extendable,
            iteration_exponent,
            group_index,
            group_threshold,
            group_count,
            member_index,
            member_threshold,
            value,
        })
    }
}

/// Sample a fresh 15-bit identifier from the OS entropy source.
pub fn random_identifier() -> u16 {
    let mut bytes = [0u8; 2];
    OsRng.fill_bytes(&mut bytes);
    u16::from_be_bytes(bytes) & MAX_IDENTIFIER
}

/// Pack `value` as a big-endian integer into 10-bit words, zero-padding the
/// most significant bits of the first word.
fn value_to_words(value: &[u8]) -> Vec<u16> {
    let word_count = bits_to_words(value.len() * 8);
    let padding_bits = word_count * RADIX_BITS - value.len() * 8;

    let mut words = Vec::with_capacity(word_count);
    let mut acc: u32 = 0;
    let mut bits = padding_bits;
    for &byte in value {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= RADIX_BITS {
            bits -= RADIX_BITS;
            words.push(((acc >> bits) & 0x3ff) as u16);
            acc &= (1u32 << bits) - 1;
        }
    }
    words
}

/// Inverse of [`value_to_words`]; rejects nonzero padding bits.
fn words_to_value(words: &[u16], padding_bits: usize) -> Result<Vec<u8>, Slip39Error> {
    if padding_bits > 0 && words[0] >> (RADIX_BITS - padding_bits) != 0 {
        return Err(Slip39Error::InvalidMnemonic(
            "padding bits are not zero".to_string(),
        ));
    }
    let byte_count = (words.len() * RADIX_BITS - padding_bits) / 8;

    let mut value = Vec::with_capacity(byte_count);
    let mut acc: u32 = 0;
    let mut bits = 0usize;
    for (i, &word) in words.iter().enumerate() {
        if i == 0 {
            acc = u32::from(word);
            bits = RADIX_BITS - padding_bits;
        } else {
            acc = (acc << RADIX_BITS) | u32::from(word);
            bits += RADIX_BITS;
        }
        while bits >= 8 {
            bits -= 8;
            value.push((acc >> bits) as u8);
            acc &= (1u32 << bits) - 1;
        }
    }
    Ok(value)
}
