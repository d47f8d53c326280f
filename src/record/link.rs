use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    #[default]
    Internal,
    External,
    Interwiki,
}

/// A link extracted by the dump parser from one sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    #[serde(rename = "type", default)]
    pub kind: LinkKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    /// Interwiki prefix; some dumps emit an object such as `{"lang": "fr"}` instead.
    #[serde(default)]
    pub wiki: Option<Value>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LinkJsonOptions {
    /// Percent-encode the page and anchor targets.
    pub encode: bool,
}

/// Canonical stored form of a [`Link`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedLink {
    #[serde(rename = "type")]
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<Value>,
}

impl Link {
    pub fn to_json(&self, options: LinkJsonOptions) -> EncodedLink {
        let target = |value: &Option<String>| {
            value.as_deref().map(|raw| {
                if options.encode {
                    urlencoding::encode(raw).into_owned()
                } else {
                    raw.to_string()
                }
            })
        };

        EncodedLink {
            kind: self.kind,
            text: self.text.clone(),
            page: target(&self.page),
            anchor: target(&self.anchor),
            // Sites are already URLs.
            site: self.site.clone(),
            wiki: self.wiki.clone(),
        }
    }
}
