use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain list is empty")]
    Empty,
    #[error("domain list has an empty entry at position {0}")]
    EmptyEntry(usize),
    #[error("invalid domain name '{domain}': {reason}")]
    Invalid { domain: String, reason: String },
}

/// Converts a single domain (optionally a `*.` wildcard) to its lowercase ASCII form.
pub fn normalize_domain(input: &str) -> Result<String, DomainError> {
    let trimmed = input.trim().trim_end_matches('.');
    let (wildcard, name) = match trimmed.strip_prefix("*.") {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if name.is_empty() {
        return Err(DomainError::Invalid {
            domain: input.trim().to_string(),
            reason: "domain name is required".to_string(),
        });
    }
    let ascii = idna::domain_to_ascii_strict(name).map_err(|err| DomainError::Invalid {
        domain: input.trim().to_string(),
        reason: err.to_string(),
    })?;
    let ascii = ascii.to_lowercase();
    Ok(if wildcard { format!("*.{ascii}") } else { ascii })
}

/// Directory name certbot gives a lineage: the primary domain lowercased,
/// without a trailing dot or a `*.` prefix.
pub fn lineage_name(primary_domain: &str) -> String {
    let name = primary_domain.trim().trim_end_matches('.');
    name.strip_prefix("*.").unwrap_or(name).to_lowercase()
}

/// The comma-separated domain list handed to certbot.
///
/// The raw string is kept verbatim for the `-d` argument; the entries are the
/// trimmed names, validated but not rewritten. There is always at least one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainList {
    raw: String,
    entries: Vec<String>,
}

impl DomainList {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.trim().is_empty() {
            return Err(DomainError::Empty);
        }

        let mut entries = Vec::new();
        for (index, entry) in raw.split(',').enumerate() {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(DomainError::EmptyEntry(index));
            }
            normalize_domain(entry)?;
            entries.push(entry.to_string());
        }

        Ok(Self {
            raw: raw.to_string(),
            entries,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// First entry of the list; selects the lineage and the remote prefix.
    pub fn primary(&self) -> &str {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl fmt::Display for DomainList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
