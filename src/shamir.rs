//! Shamir split and Lagrange interpolation over GF(256).
//!
//! A share is a point `(x, f(x))` on a byte-wise polynomial. Splitting with
//! threshold T pins the polynomial with T − 2 random filler shares at
//! abscissas 0..T−3 plus two reserved points: a digest share at index 254
//! and the secret itself at index 255. Recovery interpolates back to both
//! reserved indices and verifies the digest, so a wrong share surfaces as an
//! integrity error instead of a silently wrong secret.

use std::collections::HashSet;

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::Slip39Error;
use crate::gf256;

/// Most shares a single split can produce.
pub const MAX_SHARE_COUNT: u8 = 16;

/// Length of the share digest in bytes.
pub const DIGEST_LENGTH_BYTES: usize = 4;

/// Reserved abscissa of the digest share.
pub const DIGEST_INDEX: u8 = 254;

/// Reserved abscissa of the secret.
pub const SECRET_INDEX: u8 = 255;

/// One raw share: `(index, value)` with the value as long as the secret.
pub type RawShare = (u8, Vec<u8>);

/// Evaluate the polynomial defined by `points` at `x`.
///
/// All point values must have one common length. If `x` is already among the
/// abscissas its value is returned as-is. The evaluation runs in the log
/// domain: one shared `Σ log(x_k ⊕ x)` term, corrected per point and reduced
/// into `[0, 255)`.
pub fn interpolate(points: &[RawShare], x: u8) -> Result<Vec<u8>, Slip39Error> {
    if points.is_empty() {
        return Err(Slip39Error::InconsistentShareSet(
            "at least one share is needed for interpolation".to_string(),
        ));
    }
    let len = points[0].1.len();
    if points.iter().any(|(_, value)| value.len() != len) {
        return Err(Slip39Error::InconsistentShareSet(
            "shares have different lengths".to_string(),
        ));
    }
    let mut indices = HashSet::new();
    if !points.iter().all(|(index, _)| indices.insert(*index)) {
        return Err(Slip39Error::InconsistentShareSet(
            "duplicate share index".to_string(),
        ));
    }
    if let Some((_, value)) = points.iter().find(|(index, _)| *index == x) {
        return Ok(value.clone());
    }

    let log_prod: i32 = points
        .iter()
        .map(|(index, _)| i32::from(gf256::LOG[usize::from(index ^ x)]))
        .sum();

    let mut result = vec![0u8; len];
    for (index, value) in points {
        let log_sum: i32 = points
            .iter()
            .map(|(other, _)| i32::from(gf256::LOG[usize::from(other ^ index)]))
            .sum();
        let log_basis =
            gf256::mod_255(log_prod - i32::from(gf256::LOG[usize::from(index ^ x)]) - log_sum);
        for (out, byte) in result.iter_mut().zip(value.iter()) {
            if *byte != 0 {
                *out ^= gf256::EXP[gf256::mod_255(
                    i32::from(gf256::LOG[usize::from(*byte)]) + log_basis as i32,
                )];
            }
        }
    }
    Ok(result)
}

/// Split `secret` into `share_count` shares recoverable from any `threshold`
/// of them.
///
/// With `threshold == 1` every share is a plain copy of the secret and no
/// digest is embedded. Otherwise the share at [`DIGEST_INDEX`] carries the
/// first [`DIGEST_LENGTH_BYTES`] of HMAC-SHA-256 over the secret keyed on a
/// fresh random pad, so recovery can detect corrupted shares.
pub fn split_secret(
    threshold: u8,
    share_count: u8,
    secret: &[u8],
) -> Result<Vec<RawShare>, Slip39Error> {
    if threshold == 0 {
        return Err(Slip39Error::InvalidPolicy(
            "threshold must be at least 1".to_string(),
        ));
    }
    if threshold > share_count {
        return Err(Slip39Error::InvalidPolicy(
            "share count must not be less than the threshold".to_string(),
        ));
    }
    if share_count > MAX_SHARE_COUNT {
        return Err(Slip39Error::InvalidPolicy(format!(
            "at most {} shares can be generated",
            MAX_SHARE_COUNT
        )));
    }

    if threshold == 1 {
        return Ok((0..share_count).map(|i| (i, secret.to_vec())).collect());
    }

    if secret.len() < DIGEST_LENGTH_BYTES {
        return Err(Slip39Error::InvalidPolicy(
            "secret is too short to carry a digest share".to_string(),
        ));
    }

    let mut shares: Vec<RawShare> = Vec::with_capacity(usize::from(share_count));
    for index in 0..threshold - 2 {
        let mut filler = vec![0u8; secret.len()];
        OsRng.fill_bytes(&mut filler);
        shares.push((index, filler));
    }

    let mut random_pad = vec![0u8; secret.len() - DIGEST_LENGTH_BYTES];
    OsRng.fill_bytes(&mut random_pad);
    let mut digest_value = share_digest(&random_pad, secret).to_vec();
    digest_value.extend_from_slice(&random_pad);

    let mut base = shares.clone();
    base.push((DIGEST_INDEX, digest_value));
    base.push((SECRET_INDEX, secret.to_vec()));

    for index in threshold - 2..share_count {
        shares.push((index, interpolate(&base, index)?));
    }
    Ok(shares)
}

/// Reconstruct the secret from `threshold`-many (or more) shares and verify
/// the embedded digest.
pub fn recover_secret(threshold: u8, shares: &[RawShare]) -> Result<Vec<u8>, Slip39Error> {
    if shares.is_empty() {
        return Err(Slip39Error::InconsistentShareSet(
            "at least one share is needed for recovery".to_string(),
        ));
    }
    if threshold == 1 {
        return Ok(shares[0].1.clone());
    }

    let secret = interpolate(shares, SECRET_INDEX)?;
    let digest_share = interpolate(shares, DIGEST_INDEX)?;
    let (digest, random_pad) = digest_share.split_at(DIGEST_LENGTH_BYTES);
    if digest != share_digest(random_pad, &secret).as_slice() {
        return Err(Slip39Error::DigestMismatch);
    }
    Ok(secret)
}

/// First four bytes of HMAC-SHA-256 keyed on `random_pad` over `secret`.
pub(crate) fn share_digest(random_pad: &[u8], secret: &[u8]) -> [u8; DIGEST_LENGTH_BYTES] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(random_pad).expect("HMAC accepts keys of any length");
    mac.update(secret);
    let code = mac.finalize().into_bytes();
    let mut digest = [0u8; DIGEST_LENGTH_BYTES];
    digest.copy_from_slice(&code[..DIGEST_LENGTH_BYTES]);
    digest
}
