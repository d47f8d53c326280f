use serde::Deserialize;
use serde_json::Value;

use super::link::Link;
use super::page_id::RawPageId;

/// One parsed article as emitted by the dump parser, one JSON object per line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "pageID", alias = "pageId")]
    pub page_id: RawPageId,
    #[serde(default)]
    pub is_redirect: bool,
    /// Passed through untouched: a plain title, or the parser's `{page, anchor, raw}` object.
    #[serde(default)]
    pub redirect_to: Value,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Index 0 is the lead section and usually has no title.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sentence {
    #[serde(default)]
    pub links: Vec<Link>,
}
