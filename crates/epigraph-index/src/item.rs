//! Annotation item: the primary record in the search index.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Pattern extracting the source-document id from an image resource URL.
///
/// Image URLs follow the corpus IIIF layout, e.g.
/// `.../iipsrv.fcgi?IIIF=/inscription_images/ISic000085/ISic000085_tiled.tif`.
static DOC_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"inscription_images/([^/]+)/").expect("doc-id pattern is valid")
});

/// One inscription annotation.
///
/// Field names mirror the published index document. `tags` is the only
/// field mutated after load, and only by the reconciliation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexItem {
    pub id: String,

    /// Script label (e.g. `latin`).
    #[serde(rename = "scr", default, skip_serializing_if = "String::is_empty")]
    pub script: String,

    /// Allograph label (e.g. `A`).
    #[serde(rename = "chr", default, skip_serializing_if = "String::is_empty")]
    pub allograph: String,

    /// Component labels (e.g. `crossbar`).
    #[serde(rename = "com", default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    /// Feature labels (e.g. `ascending`).
    #[serde(rename = "fea", default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    /// Combined component × feature labels (e.g. `crossbar is ascending`).
    #[serde(rename = "cxf", default, skip_serializing_if = "Vec::is_empty")]
    pub component_features: Vec<String>,

    /// Tag names. Set semantics; insertion order is irrelevant.
    #[serde(rename = "tag", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    /// Image resource URL.
    #[serde(rename = "img", default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    /// Source document URL.
    #[serde(rename = "doc", default, skip_serializing_if = "String::is_empty")]
    pub document: String,
}

impl IndexItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: String::new(),
            allograph: String::new(),
            components: Vec::new(),
            features: Vec::new(),
            component_features: Vec::new(),
            tags: BTreeSet::new(),
            image: String::new(),
            document: String::new(),
        }
    }

    /// The fixed ascending sort key: image URL, script, allograph.
    ///
    /// Stable for the lifetime of a loaded index; callers break remaining
    /// ties on `id` for a total order.
    pub fn sort_key(&self) -> String {
        format!("{}-{}-{}", self.image, self.script, self.allograph)
    }

    /// Source-document id, extracted from the image URL.
    ///
    /// Empty when the URL does not follow the corpus layout.
    pub fn doc_id(&self) -> String {
        DOC_ID_PATTERN
            .captures(&self.image)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}
