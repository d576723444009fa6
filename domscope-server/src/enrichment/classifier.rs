//! Root / subdomain classification against the public suffix list

use domscope_common::DomainType;

/// Classify `hostname` as a registrable domain or a subdomain of one
///
/// `www.example.co.uk` is a subdomain; `example.co.uk` is a root. Names with
/// no registrable part (`co.uk`, empty or malformed input) classify as root.
pub fn classify(hostname: &str) -> DomainType {
    let name = hostname.trim().trim_end_matches('.').to_lowercase();

    match psl::domain_str(&name) {
        Some(registrable) if name.len() > registrable.len() => DomainType::Subdomain,
        _ => DomainType::Root,
    }
}
