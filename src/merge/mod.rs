//! New-entry detection against the entries a feed already has.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Entry, EntryDraft};

/// Which fields decide that two entries of one feed are the same entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityKey {
    #[default]
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "title+link")]
    TitleAndLink,
}

/// Identity of one entry under an [`IdentityKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Title(String),
    TitleAndLink(String, String),
}

impl IdentityKey {
    pub fn key(&self, title: &str, link: &str) -> EntryKey {
        match self {
            IdentityKey::Title => EntryKey::Title(title.to_string()),
            IdentityKey::TitleAndLink => EntryKey::TitleAndLink(title.to_string(), link.to_string()),
        }
    }

    pub fn of_entry(&self, entry: &Entry) -> EntryKey {
        self.key(&entry.title, &entry.link)
    }

    pub fn of_draft(&self, draft: &EntryDraft) -> EntryKey {
        self.key(&draft.title, &draft.link)
    }
}

/// Candidates whose identity key is not held by any existing entry, in
/// candidate order. A key repeated among the candidates is kept once.
pub fn diff_new<'a, I>(candidates: Vec<EntryDraft>, existing: I, identity: IdentityKey) -> Vec<EntryDraft>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut seen: HashSet<EntryKey> = existing
        .into_iter()
        .map(|entry| identity.of_entry(entry))
        .collect();

    candidates
        .into_iter()
        .filter(|draft| seen.insert(identity.of_draft(draft)))
        .collect()
}
