use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use super::document::{Document, Section};
use super::keys::{lookup_key, section_key};
use super::link::{EncodedLink, LinkJsonOptions};
use super::page_id::PageId;

/// Storage-ready form of one article.
///
/// `id` keeps the raw title for exact lookups while `title` carries the NFKD form used for display
/// and search. The two differ whenever the title holds composed characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub sections: BTreeMap<String, SectionRecord>,
    #[serde(rename = "isRedirect")]
    pub is_redirect: bool,
    #[serde(rename = "redirectTo", default)]
    pub redirect_to: Value,
    pub url: String,
    pub title: String,
    #[serde(rename = "pageID")]
    pub page_id: PageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub text: String,
    pub links: Vec<EncodedLink>,
    pub index: u32,
}

impl NormalizedRecord {
    /// Looks a section up by its raw (unescaped) title; `""` finds the lead section.
    pub fn section(&self, title: &str) -> Option<&SectionRecord> {
        self.sections.get(&lookup_key(title))
    }

    pub fn link_count(&self) -> usize {
        self.sections.values().map(|section| section.links.len()).sum()
    }
}

/// Builds the record for one document. Sections whose keys collide overwrite earlier ones.
pub fn normalize_document(document: &Document) -> NormalizedRecord {
    let mut sections = BTreeMap::new();
    for section in &document.sections {
        sections.insert(section_key(section), build_section_record(section));
    }

    NormalizedRecord {
        id: document.title.clone(),
        sections,
        is_redirect: document.is_redirect,
        redirect_to: document.redirect_to.clone(),
        url: document.url.clone(),
        title: document.title.nfkd().collect(),
        page_id: PageId::coerce(&document.page_id),
    }
}

/// Only sentence links are kept; links living in tables or infoboxes never reach a sentence.
pub fn build_section_record(section: &Section) -> SectionRecord {
    let options = LinkJsonOptions { encode: true };
    let links = section
        .sentences
        .iter()
        .flat_map(|sentence| sentence.links.iter())
        .map(|link| link.to_json(options))
        .collect();

    SectionRecord {
        text: section.text.clone(),
        links,
        index: section.index,
    }
}
