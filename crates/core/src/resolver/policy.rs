//! Single-part vs multi-part title directory naming.

use crate::config::PartPolicyKind;
use crate::metadata::MetadataRecord;

/// Decides whether a record belongs to one part of a multi-part book and,
/// if so, which marker its title directory carries.
pub trait PartPolicy: Send + Sync {
    /// Marker appended to the title directory, or `None` for a single-part
    /// book.
    fn part_marker(&self, record: &MetadataRecord) -> Option<String>;
}

/// Every book is single-part.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoParts;

impl PartPolicy for NoParts {
    fn part_marker(&self, _record: &MetadataRecord) -> Option<String> {
        None
    }
}

/// Disc numbers above 1 mark a later part: `"My Book (Part 2)"`.
///
/// Disc 1 and unknown disc both stay on the bare title so that a book split
/// across discs keeps its first part in the plain directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscSuffix;

impl PartPolicy for DiscSuffix {
    fn part_marker(&self, record: &MetadataRecord) -> Option<String> {
        match record.disc_number {
            Some(disc) if disc > 1 => Some(format!("Part {}", disc)),
            _ => None,
        }
    }
}

/// Builds the policy named in configuration.
pub fn policy_for(kind: PartPolicyKind) -> Box<dyn PartPolicy> {
    match kind {
        PartPolicyKind::None => Box::new(NoParts),
        PartPolicyKind::DiscSuffix => Box::new(DiscSuffix),
    }
}
