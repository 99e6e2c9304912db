//! Credential candidate generation and re-ranking.
//!
//! `candidates_for` builds the ordered list a brute-force-style tool works
//! through: common factory defaults first, then vendor-specific pairs,
//! then region-adjusted variants. `optimize` re-ranks a default list with
//! derivatives of previously successful credentials. Both are fully
//! deterministic: same inputs, same ordered output, no RNG anywhere in
//! this module.

use optiscan_common::report::CredentialCandidate;

use crate::vendors::{self, VendorProfile};

/// Factory pairs common across vendors, tried before anything else.
pub const COMMON_DEFAULTS: &[(&str, &str)] = &[
    ("admin", "admin"),
    ("admin", "12345"),
    ("admin", "password"),
    ("admin", ""),
    ("root", "root"),
    ("user", "user"),
];

/// Passwords that show up disproportionately in specific regions.
const REGIONAL_VARIANTS: &[(&str, &[&str])] = &[
    ("apac", &["888888", "admin888", "123456789"]),
    ("eu", &["admin1234", "passw0rd"]),
    ("na", &["welcome1", "security"]),
    ("me", &["123123", "admin123"]),
    ("sa", &["brasil123", "123mudar"]),
];

/// Year suffix used when deriving variants. Fixed so `optimize` stays
/// deterministic across runs.
const DERIVED_YEAR: &str = "2024";

/// Builds the prioritized candidate list for one target.
///
/// With no vendor hint the vendor is guessed deterministically from the
/// subject, so repeated calls for the same target agree.
pub fn candidates_for(subject: &str, vendor_hint: Option<&str>) -> Vec<CredentialCandidate> {
    let profile: &VendorProfile = vendor_hint
        .and_then(vendors::find_profile)
        .unwrap_or_else(|| vendors::guess_for_subject(subject));

    let mut candidates: Vec<CredentialCandidate> = COMMON_DEFAULTS
        .iter()
        .map(|(user, pass)| CredentialCandidate::default_cred(*user, *pass))
        .collect();

    for (user, pass) in profile.default_credentials {
        candidates.push(CredentialCandidate::default_cred(*user, *pass).with_vendor(profile.name));
    }

    for (region, passwords) in REGIONAL_VARIANTS {
        if !profile.regions.contains(region) {
            continue;
        }
        for pass in *passwords {
            candidates.push(CredentialCandidate::new("admin", *pass).with_vendor(profile.name));
        }
    }

    dedupe(candidates)
}

/// Re-ranks `defaults` with derivatives of previously successful pairs.
///
/// Each success contributes itself plus three derived variants: a digit
/// suffix, a trailing year and a capitalization change. Duplicates (by
/// username/password) are removed, first occurrence wins, so the position
/// of anything already in `defaults` is preserved.
pub fn optimize(
    previous_successes: &[CredentialCandidate],
    defaults: &[CredentialCandidate],
) -> Vec<CredentialCandidate> {
    let mut candidates: Vec<CredentialCandidate> = defaults.to_vec();

    for success in previous_successes {
        candidates.push(success.clone());
        for password in derive_variants(&success.password) {
            candidates.push(CredentialCandidate {
                password,
                is_default: false,
                ..success.clone()
            });
        }
    }

    dedupe(candidates)
}

fn derive_variants(password: &str) -> Vec<String> {
    let mut variants = vec![
        format!("{password}123"),
        format!("{password}{DERIVED_YEAR}"),
    ];
    if let Some(capitalized) = capitalize(password) {
        variants.push(capitalized);
    }
    variants
}

/// Upper-cases the first character; `None` when that changes nothing.
fn capitalize(s: &str) -> Option<String> {
    let mut chars = s.chars();
    let first = chars.next()?;
    let capitalized: String = first.to_uppercase().chain(chars).collect();
    (capitalized != s).then_some(capitalized)
}

/// Removes exact `(username, password)` duplicates, keeping the first
/// occurrence's position.
fn dedupe(candidates: Vec<CredentialCandidate>) -> Vec<CredentialCandidate> {
    let mut seen: Vec<(String, String)> = Vec::new();
    let mut out: Vec<CredentialCandidate> = Vec::new();

    for candidate in candidates {
        let key = (candidate.username.clone(), candidate.password.clone());
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(candidate);
    }
    out
}
