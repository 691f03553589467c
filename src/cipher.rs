//! Four-round Feistel encryption of the master secret.
//!
//! The master secret is never shared directly: it is first run through a
//! Feistel network keyed by the passphrase, so a wrong passphrase at
//! recovery yields a different but plausible secret. Each round key comes
//! from PBKDF2-HMAC-SHA-256 with the round index prefixed to the passphrase
//! and the share-set identifier mixed into the salt (unless the backup is
//! extendable, in which case the salt carries only the moving half).

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::Slip39Error;
use crate::rs1024;

/// Number of Feistel rounds.
pub const ROUND_COUNT: u8 = 4;

/// Total PBKDF2 iterations across all rounds at iteration exponent 0.
pub const BASE_ITERATION_COUNT: u32 = 10_000;

/// Upper bound on the iteration exponent accepted at this boundary.
pub const MAX_ITERATION_EXP: u8 = 16;

/// Encrypt `master_secret` under `passphrase`.
///
/// `master_secret` must have even length; the pipeline validates that
/// before calling in. The identifier is mixed into the salt only when the
/// share set is not extendable.
pub fn encrypt(
    master_secret: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    identifier: u16,
    extendable: bool,
) -> Result<Vec<u8>, Slip39Error> {
    check_crypt_inputs(passphrase, iteration_exponent)?;
    let rounds: Vec<u8> = (0..ROUND_COUNT).collect();
    Ok(feistel(
        master_secret,
        passphrase,
        iteration_exponent,
        identifier,
        extendable,
        &rounds,
    ))
}

/// Invert [`encrypt`]: same network, round keys in reverse order.
pub fn decrypt(
    encrypted_master: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    identifier: u16,
    extendable: bool,
) -> Result<Vec<u8>, Slip39Error> {
    check_crypt_inputs(passphrase, iteration_exponent)?;
    let rounds: Vec<u8> = (0..ROUND_COUNT).rev().collect();
    Ok(feistel(
        encrypted_master,
        passphrase,
        iteration_exponent,
        identifier,
        extendable,
        &rounds,
    ))
}

fn check_crypt_inputs(passphrase: &str, iteration_exponent: u8) -> Result<(), Slip39Error> {
    if passphrase.bytes().any(|b| !(32..=126).contains(&b)) {
        return Err(Slip39Error::InvalidPolicy(
            "passphrase must consist of printable ASCII characters".to_string(),
        ));
    }
    if iteration_exponent > MAX_ITERATION_EXP {
        return Err(Slip39Error::InvalidPolicy(format!(
            "iteration exponent must be at most {}",
            MAX_ITERATION_EXP
        )));
    }
    Ok(())
}

fn feistel(
    input: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    identifier: u16,
    extendable: bool,
    rounds: &[u8],
) -> Vec<u8> {
    let half = input.len() / 2;
    let salt = salt_prefix(identifier, extendable);
    debug!(
        rounds = rounds.len(),
        iteration_exponent, "running Feistel network"
    );

    let mut left = Zeroizing::new(input[..half].to_vec());
    let mut right = Zeroizing::new(input[half..].to_vec());
    for &round in rounds {
        let key = round_function(round, passphrase, iteration_exponent, &salt, &right);
        let next = Zeroizing::new(
            left.iter()
                .zip(key.iter())
                .map(|(l, k)| l ^ k)
                .collect::<Vec<u8>>(),
        );
        left = right;
        right = next;
    }

    let mut output = Vec::with_capacity(input.len());
    output.extend_from_slice(&right);
    output.extend_from_slice(&left);
    output
}

/// One round key: PBKDF2-HMAC-SHA-256 of the round byte and passphrase,
/// salted with the salt prefix and the moving half.
fn round_function(
    round: u8,
    passphrase: &str,
    iteration_exponent: u8,
    salt_prefix: &[u8],
    block: &[u8],
) -> Zeroizing<Vec<u8>> {
    let mut password = Zeroizing::new(Vec::with_capacity(1 + passphrase.len()));
    password.push(round);
    password.extend_from_slice(passphrase.as_bytes());

    let mut salt = Vec::with_capacity(salt_prefix.len() + block.len());
    salt.extend_from_slice(salt_prefix);
    salt.extend_from_slice(block);

    let iterations = (BASE_ITERATION_COUNT / u32::from(ROUND_COUNT)) << iteration_exponent;
    let mut key = Zeroizing::new(vec![0u8; block.len()]);
    pbkdf2_hmac::<Sha256>(&password, &salt, iterations, &mut key);
    key
}

fn salt_prefix(identifier: u16, extendable: bool) -> Vec<u8> {
    if extendable {
        return Vec::new();
    }
    let mut salt = rs1024::CUSTOMIZATION_STANDARD.as_bytes().to_vec();
    salt.extend_from_slice(&identifier.to_be_bytes());
    salt
}
