//! RS1024, the 30-bit checksum over 10-bit words used by the mnemonic
//! framing. Guarantees detection of any error touching at most three words.

/// Generator coefficients of the RS1024 polymod step.
const GEN: [u32; 10] = [
    0xe0e040, 0x1c1c080, 0x3838100, 0x7070200, 0xe0e0009, 0x1c0c2412,
    0x38086c24, 0x3090fc48, 0x21b1f890, 0x3f3f120,
];

/// Customization string of a standard share set.
pub const CUSTOMIZATION_STANDARD: &str = "shamir";

/// Customization string of an extendable share set.
pub const CUSTOMIZATION_EXTENDABLE: &str = "shamir_extendable";

/// The customization string selected by the extendable-backup flag.
pub fn customization(extendable: bool) -> &'static str {
    if extendable {
        CUSTOMIZATION_EXTENDABLE
    } else {
        CUSTOMIZATION_STANDARD
    }
}

fn polymod(values: impl IntoIterator<Item = u16>) -> u32 {
    let mut chk: u32 = 1;
    for value in values {
        let b = chk >> 20;
        chk = ((chk & 0xfffff) << 10) ^ u32::from(value);
        for (i, gen) in GEN.iter().enumerate() {
            if (b >> i) & 1 != 0 {
                chk ^= gen;
            }
        }
    }
    chk
}

/// Feed the customization string byte-wise, then the data words.
fn customized<'a>(customization: &'a str, words: &'a [u16]) -> impl Iterator<Item = u16> + 'a {
    customization
        .bytes()
        .map(u16::from)
        .chain(words.iter().copied())
}

/// `true` iff `words` (checksum included) verify under `customization`.
pub fn verify_checksum(customization: &str, words: &[u16]) -> bool {
    polymod(customized(customization, words)) == 1
}

/// Checksum for `words` (checksum excluded), as three 10-bit words.
pub fn create_checksum(customization: &str, words: &[u16]) -> [u16; 3] {
    let values = customized(customization, words).chain([0, 0, 0]);
    let chk = polymod(values) ^ 1;
    [
        ((chk >> 20) & 0x3ff) as u16,
        ((chk >> 10) & 0x3ff) as u16,
        (chk & 0x3ff) as u16,
    ]
}
