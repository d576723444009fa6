//! Certificate log name filtering
//!
//! Turns raw crt.sh entries into the set of host names that belong to a root
//! domain. A name belongs when it equals the root or ends with `.` + root;
//! a bare text suffix is not enough (`evilexample.com` is not part of
//! `example.com`).

use crate::providers::CertificateEntry;
use std::collections::BTreeSet;

/// Host names under `root_domain` found in `entries`, plus the root itself
pub fn filter_names(root_domain: &str, entries: &[CertificateEntry]) -> BTreeSet<String> {
    let root = root_domain.trim().to_lowercase();
    let dotted_root = format!(".{}", root);

    let mut names: BTreeSet<String> = entries
        .iter()
        .flat_map(|entry| entry.name_value.lines())
        .filter_map(|line| {
            let name = line.trim().to_lowercase();
            // A wildcard certificate covers the zone named after the label
            let name = name.strip_prefix("*.").map(str::to_string).unwrap_or(name);

            if name == root || name.ends_with(&dotted_root) {
                Some(name)
            } else {
                None
            }
        })
        .collect();

    names.insert(root);
    names
}
