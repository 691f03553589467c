//! SLIP-0039: Shamir's secret sharing for mnemonic seed backups.
//!
//! Splits a master secret (typically a BIP-32 seed) into human-transcribable
//! word-list mnemonics organized in two tiers: recovery needs any
//! `group_threshold` groups to each present their member threshold of
//! shares. An optional passphrase re-encrypts the master secret through a
//! Feistel network before splitting, so different passphrases recover
//! different but plausible secrets.
//!
//! ```
//! use shamir_backup::{generate, recover, GenerateOptions, GroupSpec};
//!
//! let secret = b"ABCDEFGHIJKLMNOP";
//! let options = GenerateOptions {
//!     group_threshold: 1,
//!     groups: vec![GroupSpec::new(3, 5)],
//!     ..Default::default()
//! };
//! let set = generate(secret, &options)?;
//!
//! // Any 3 of the 5 mnemonics recover the secret.
//! let recovered = recover(&set.groups[0].mnemonics[..3], "")?;
//! assert_eq!(recovered.as_slice(), secret);
//! # Ok::<(), shamir_backup::Slip39Error>(())
//! ```

pub mod cipher;
pub mod error;
pub mod gf256;
pub mod mnemonic;
pub mod rs1024;
pub mod shamir;
pub mod slip39;
pub mod wordlist;

pub use error::Slip39Error;
pub use mnemonic::Share;
pub use slip39::{
    generate, recover, validate_mnemonic, GenerateOptions, GroupSpec, MnemonicGroup, ShareSet,
};
