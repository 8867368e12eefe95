//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. Canonical domain set has expected count (catches forgotten additions to ALL)
//! 2. All domain byte strings are unique (prevents domain collision)
//! 3. All domains are null-terminated and follow `FORMWORK::*::V1\0`
//! 4. No raw `FORMWORK::` domain literals in production source outside `hash_domain.rs`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use formwork_kernel::proof::hash::HashDomain;

// ---------------------------------------------------------------------------
// 1. Canonical set count
// ---------------------------------------------------------------------------

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        4,
        "expected 4 domain variants; if you added a new domain, update this count"
    );
}

// ---------------------------------------------------------------------------
// 2. All unique bytes
// ---------------------------------------------------------------------------

#[test]
fn hash_domain_all_unique_bytes() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(seen.insert(domain.as_bytes()), "duplicate domain bytes: {domain}");
    }
}

// ---------------------------------------------------------------------------
// 3. Wire format and naming
// ---------------------------------------------------------------------------

#[test]
fn hash_domain_all_follow_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"FORMWORK::"), "{domain} does not start with FORMWORK::");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} does not end with ::V1\\0");
        assert_eq!(
            bytes.iter().filter(|&&b| b == 0).count(),
            1,
            "{domain} has an interior null"
        );
    }
}

// ---------------------------------------------------------------------------
// 4. No raw FORMWORK:: domain literals in production source
// ---------------------------------------------------------------------------

/// Scan kernel/, problem/, harness/ source for `b"FORMWORK::` literals.
/// The only file allowed to contain them is `hash_domain.rs`.
#[test]
fn no_raw_domain_literals_outside_authority() {
    let production_dirs = [
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../kernel/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../problem/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../harness/src"),
    ];

    let pattern = "b\"FORMWORK::";
    let authority_file = "hash_domain.rs";
    let mut violations = Vec::new();
    let mut scanned = 0usize;

    for dir in &production_dirs {
        for path in walkdir(Path::new(dir)) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            scanned += 1;
            if path.file_name().and_then(|n| n.to_str()) == Some(authority_file) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if !trimmed.starts_with("//") && trimmed.contains(pattern) {
                    violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
                }
            }
        }
    }

    assert!(scanned > 0, "no source files scanned; directory layout changed?");
    assert!(
        violations.is_empty(),
        "raw FORMWORK:: domain literals found outside {authority_file}:\n{}",
        violations.join("\n")
    );
}

/// Simple recursive directory walker.
fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(walkdir(&path));
            } else {
                results.push(path);
            }
        }
    }
    results
}
