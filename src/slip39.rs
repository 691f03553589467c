//! Two-tier share generation and recovery.
//!
//! Generation encrypts the master secret under the passphrase, splits the
//! result into group shares, splits every group share into member shares and
//! renders each member share as a mnemonic. Recovery runs the same pipeline
//! backwards: decode, bucket by group, reconstruct each group share, then
//! the encrypted master, then decrypt.

use std::collections::BTreeMap;

use tracing::debug;
use zeroize::Zeroizing;

use crate::cipher;
use crate::error::Slip39Error;
use crate::mnemonic::{self, Share, MAX_IDENTIFIER, MIN_STRENGTH_BITS};
use crate::shamir::{self, MAX_SHARE_COUNT};

/// Per-group split policy: `member_threshold` of `count` shares.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    /// Member shares needed to recover this group's share.
    pub member_threshold: u8,
    /// Member shares generated for this group.
    pub count: u8,
    /// Free-form label for the group; never encoded into mnemonics.
    pub description: Option<String>,
}

impl GroupSpec {
    /// A group without a description.
    pub fn new(member_threshold: u8, count: u8) -> Self {
        Self {
            member_threshold,
            count,
            description: None,
        }
    }

    /// A group with a human-readable label.
    pub fn described(member_threshold: u8, count: u8, description: &str) -> Self {
        Self {
            member_threshold,
            count,
            description: Some(description.to_string()),
        }
    }
}

/// Options for [`generate`]; `..Default::default()` fills the standard
/// single-share policy.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Groups needed for recovery.
    pub group_threshold: u8,
    /// The group policies; the position of each group is its group index.
    pub groups: Vec<GroupSpec>,
    /// Passphrase the master secret is encrypted under. Printable ASCII;
    /// empty means "no passphrase".
    pub passphrase: String,
    /// PBKDF2 work factor: total iterations are `10000 << exponent`.
    pub iteration_exponent: u8,
    /// Extendable backups leave the identifier out of the encryption salt,
    /// so further share sets can be issued later without recording it.
    pub extendable: bool,
    /// Fixed 15-bit identifier; `None` samples a fresh one.
    pub identifier: Option<u16>,
    /// Free-form label for the whole set; never encoded into mnemonics.
    pub title: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            group_threshold: 1,
            groups: vec![GroupSpec::new(1, 1)],
            passphrase: String::new(),
            iteration_exponent: 0,
            extendable: true,
            identifier: None,
            title: None,
        }
    }
}

/// One generated group with its member mnemonics in member-index order.
#[derive(Debug, Clone)]
pub struct MnemonicGroup {
    /// Label copied from the [`GroupSpec`].
    pub description: Option<String>,
    /// Member shares needed to recover this group's share.
    pub member_threshold: u8,
    /// The member mnemonics.
    pub mnemonics: Vec<String>,
}

/// The generation artifact: set-level metadata plus the group/member tree.
#[derive(Debug, Clone)]
pub struct ShareSet {
    /// Label copied from the [`GenerateOptions`].
    pub title: Option<String>,
    /// The 15-bit identifier carried by every mnemonic of the set.
    pub identifier: u16,
    /// Whether the set was generated as an extendable backup.
    pub extendable: bool,
    /// PBKDF2 work factor of the set.
    pub iteration_exponent: u8,
    /// Groups needed for recovery.
    pub group_threshold: u8,
    /// The groups, indexed by group index.
    pub groups: Vec<MnemonicGroup>,
}

impl ShareSet {
    /// All mnemonics of the set, flattened in (group, member) order.
    pub fn mnemonics(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|group| group.mnemonics.iter().cloned())
            .collect()
    }
}

/// Split `master_secret` into a two-tier set of mnemonic shares.
pub fn generate(
    master_secret: &[u8],
    options: &GenerateOptions,
) -> Result<ShareSet, Slip39Error> {
    validate_policy(master_secret, options)?;
    let identifier = match options.identifier {
        Some(identifier) if identifier > MAX_IDENTIFIER => {
            return Err(Slip39Error::InvalidPolicy(
                "identifier does not fit in 15 bits".to_string(),
            ));
        }
        Some(identifier) => identifier,
        None => mnemonic::random_identifier(),
    };
    debug!(
        groups = options.groups.len(),
        group_threshold = options.group_threshold,
        extendable = options.extendable,
        "generating share set"
    );

    let encrypted_master = Zeroizing::new(cipher::encrypt(
        master_secret,
        &options.passphrase,
        options.iteration_exponent,
        identifier,
        options.extendable,
    )?);

    let group_shares = shamir::split_secret(
        options.group_threshold,
        options.groups.len() as u8,
        &encrypted_master,
    )?;

    let mut groups = Vec::with_capacity(options.groups.len());
    for (group_index, group_share) in group_shares {
        let spec = &options.groups[usize::from(group_index)];
        let members = shamir::split_secret(spec.member_threshold, spec.count, &group_share)?;
        let mnemonics = members
            .into_iter()
            .map(|(member_index, value)| {
                Share {
                    identifier,
                    extendable: options.extendable,
                    iteration_exponent: options.iteration_exponent,
                    group_index,
                    group_threshold: options.group_threshold,
                    group_count: options.groups.len() as u8,
                    member_index,
                    member_threshold: spec.member_threshold,
                    value,
                }
                .to_mnemonic()
            })
            .collect();
        groups.push(MnemonicGroup {
            description: spec.description.clone(),
            member_threshold: spec.member_threshold,
            mnemonics,
        });
    }

    Ok(ShareSet {
        title: options.title.clone(),
        identifier,
        extendable: options.extendable,
        iteration_exponent: options.iteration_exponent,
        group_threshold: options.group_threshold,
        groups,
    })
}

/// Recover the master secret from mnemonics and the passphrase.
///
/// Exactly `group_threshold` distinct groups must be present, and each group
/// must contribute exactly its member threshold of distinct member shares.
pub fn recover<S: AsRef<str>>(
    mnemonics: &[S],
    passphrase: &str,
) -> Result<Zeroizing<Vec<u8>>, Slip39Error> {
    if mnemonics.is_empty() {
        return Err(Slip39Error::InconsistentShareSet(
            "at least one mnemonic is required".to_string(),
        ));
    }
    let shares = mnemonics
        .iter()
        .map(|mnemonic| Share::from_mnemonic(mnemonic.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let (identifier, extendable, iteration_exponent, group_threshold) = {
        let first = &shares[0];
        (
            first.identifier,
            first.extendable,
            first.iteration_exponent,
            first.group_threshold,
        )
    };
    for share in &shares {
        if share.identifier != identifier || share.extendable != extendable {
            return Err(Slip39Error::InconsistentShareSet(
                "mnemonics do not belong to the same share set".to_string(),
            ));
        }
        if share.iteration_exponent != iteration_exponent {
            return Err(Slip39Error::InconsistentShareSet(
                "mnemonics do not agree on the iteration exponent".to_string(),
            ));
        }
        if share.group_threshold != group_threshold || share.group_count != shares[0].group_count
        {
            return Err(Slip39Error::InconsistentShareSet(
                "mnemonics do not agree on the group policy".to_string(),
            ));
        }
    }
    debug!(
        shares = shares.len(),
        group_threshold, "recovering master secret"
    );

    // Bucket by group; the member threshold is recorded once per group and
    // checked on every later insert.
    let mut groups: BTreeMap<u8, (u8, BTreeMap<u8, Vec<u8>>)> = BTreeMap::new();
    for share in shares {
        let (member_threshold, members) = groups
            .entry(share.group_index)
            .or_insert_with(|| (share.member_threshold, BTreeMap::new()));
        if *member_threshold != share.member_threshold {
            return Err(Slip39Error::InconsistentShareSet(format!(
                "mnemonics of group {} do not agree on the member threshold",
                share.group_index
            )));
        }
        if members.insert(share.member_index, share.value).is_some() {
            return Err(Slip39Error::InconsistentShareSet(format!(
                "duplicate member index in group {}",
                share.group_index
            )));
        }
    }

    if (groups.len() as u8) < group_threshold {
        return Err(Slip39Error::InconsistentShareSet(format!(
            "recovery needs shares from {} groups, got {}",
            group_threshold,
            groups.len()
        )));
    }
    if groups.len() as u8 > group_threshold {
        return Err(Slip39Error::InconsistentShareSet(
            "shares from too many groups".to_string(),
        ));
    }

    let mut group_shares: Vec<shamir::RawShare> = Vec::with_capacity(groups.len());
    for (group_index, (member_threshold, members)) in groups {
        if members.len() != usize::from(member_threshold) {
            return Err(Slip39Error::InconsistentShareSet(format!(
                "group {} needs exactly {} member shares, got {}",
                group_index,
                member_threshold,
                members.len()
            )));
        }
        let member_shares: Vec<shamir::RawShare> = members.into_iter().collect();
        group_shares.push((
            group_index,
            shamir::recover_secret(member_threshold, &member_shares)?,
        ));
    }

    let encrypted_master =
        Zeroizing::new(shamir::recover_secret(group_threshold, &group_shares)?);
    let master_secret = cipher::decrypt(
        &encrypted_master,
        passphrase,
        iteration_exponent,
        identifier,
        extendable,
    )?;
    Ok(Zeroizing::new(master_secret))
}

/// `true` iff `mnemonic` parses, checksums and frames correctly.
pub fn validate_mnemonic(mnemonic: &str) -> bool {
    Share::from_mnemonic(mnemonic).is_ok()
}

fn validate_policy(master_secret: &[u8], options: &GenerateOptions) -> Result<(), Slip39Error> {
    if master_secret.len() * 8 < MIN_STRENGTH_BITS {
        return Err(Slip39Error::InvalidPolicy(format!(
            "master secret must be at least {} bits",
            MIN_STRENGTH_BITS
        )));
    }
    if master_secret.len() % 2 != 0 {
        return Err(Slip39Error::InvalidPolicy(
            "master secret length must be an even number of bytes".to_string(),
        ));
    }
    if options.groups.is_empty() {
        return Err(Slip39Error::InvalidPolicy(
            "at least one group is required".to_string(),
        ));
    }
    if options.groups.len() > usize::from(MAX_SHARE_COUNT) {
        return Err(Slip39Error::InvalidPolicy(format!(
            "at most {} groups can be generated",
            MAX_SHARE_COUNT
        )));
    }
    if options.group_threshold == 0 {
        return Err(Slip39Error::InvalidPolicy(
            "group threshold must be at least 1".to_string(),
        ));
    }
    if usize::from(options.group_threshold) > options.groups.len() {
        return Err(Slip39Error::InvalidPolicy(
            "group threshold must not exceed the number of groups".to_string(),
        ));
    }
    for (index, group) in options.groups.iter().enumerate() {
        if group.member_threshold == 0 {
            return Err(Slip39Error::InvalidPolicy(format!(
                "member threshold of group {} must be at least 1",
                index
            )));
        }
        if group.member_threshold > group.count {
            return Err(Slip39Error::InvalidPolicy(format!(
                "member threshold of group {} exceeds its share count",
                index
            )));
        }
        if group.member_threshold == 1 && group.count > 1 {
            return Err(Slip39Error::InvalidPolicy(format!(
                "group {}: a member threshold of 1 allows only a single share",
                index
            )));
        }
    }
    Ok(())
}
