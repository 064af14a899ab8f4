//! Stable file references for annotation records.
//!
//! Each annotation's edits are tied to a per-image annotation file in the
//! shared store. The reference is a slug derived from the item's source
//! document and image URLs, so it survives index rebuilds.

use crate::item::IndexItem;
use regex::Regex;
use std::sync::LazyLock;

/// Pattern extracting the image base name from a tiled-image URL, e.g.
/// `.../ISic000085_tiled.tif` → `ISic000085`.
static IMAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+)_tiled\.tif$").expect("image-name pattern is valid"));

/// Lowercase a string and collapse every non-alphanumeric run into a
/// single dash, trimming dashes at both ends.
pub fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Derive the annotation file reference for an item.
///
/// The reference is the slug of the source document URL (without its
/// `.xml` suffix) joined with the image base name, plus a `.json`
/// extension:
///
/// ```text
/// doc = http://sicily.classics.ox.ac.uk/inscription/ISic000085.xml
/// img = https://…/inscription_images/ISic000085/ISic000085_tiled.tif
///  →    http-sicily-classics-ox-ac-uk-inscription-isic000085-isic000085-jpg.json
/// ```
pub fn annotation_file_ref(item: &IndexItem) -> String {
    let doc = item
        .document
        .strip_suffix(".xml")
        .unwrap_or(&item.document);
    let mut raw = doc.to_string();
    match IMAGE_NAME_PATTERN.captures(&item.image) {
        Some(caps) => {
            raw.push('/');
            raw.push_str(&caps[1]);
            raw.push_str(".jpg");
        }
        // Foreign image URL: fall through with the whole URL, so distinct
        // images still map to distinct references.
        None => raw.push_str(&item.image),
    }
    format!("{}.json", slugify(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_non_alphanumeric_runs() {
        assert_eq!(
            slugify("http://example.org/a__b//c.xml"),
            "http-example-org-a-b-c-xml"
        );
        assert_eq!(slugify("--A--"), "a");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn file_ref_joins_document_and_image_name() {
        let mut item = IndexItem::new("a1");
        item.document = "http://sicily.classics.ox.ac.uk/inscription/ISic000085.xml".to_string();
        item.image = "https://apheleia.classics.ox.ac.uk/iipsrv/iipsrv.fcgi\
?IIIF=/inscription_images/ISic000085/ISic000085_tiled.tif"
            .to_string();

        assert_eq!(
            annotation_file_ref(&item),
            "http-sicily-classics-ox-ac-uk-inscription-isic000085-isic000085-jpg.json"
        );
    }

    #[test]
    fn file_ref_is_deterministic_for_foreign_image_urls() {
        let mut item = IndexItem::new("a1");
        item.document = "http://docs.example.org/d1.xml".to_string();
        item.image = "https://img.example.org/raw/d1.png".to_string();

        let first = annotation_file_ref(&item);
        let second = annotation_file_ref(&item);
        assert_eq!(first, second);
        assert!(first.ends_with(".json"));
        assert!(first.contains("img-example-org"));
    }
}
