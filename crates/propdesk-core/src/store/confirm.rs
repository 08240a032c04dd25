use crate::models::Resource;

/// Retype-to-confirm guard for destructive deletes.
///
/// The admin must type the record's title (or name) exactly before the
/// delete is issued. This sits in front of `CollectionStore::delete`; the
/// store itself does not require it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: String,
    expected: String,
}

impl DeleteConfirmation {
    /// `None` for records that were never created remotely
    pub fn for_record<R: Resource>(record: &R) -> Option<Self> {
        let id = record.id()?;
        Some(Self {
            id: id.to_string(),
            expected: record.display_name().to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Text the admin has to type
    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn matches(&self, typed: &str) -> bool {
        typed == self.expected
    }
}
