//! Wire shapes of the content backend's asset and tag documents.
//!
//! Only the fields the browser reads are declared; everything else in a
//! document body is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetKind, Dimensions, Revision};
use crate::error::ParseError;
use crate::ids::{AssetId, TagId};
use crate::tag::{TAG_DOCUMENT_TYPE, Tag};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReferenceDocument {
    #[serde(rename = "_ref")]
    pub reference: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DimensionsDocument {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssetMetadataDocument {
    #[serde(default)]
    pub dimensions: Option<DimensionsDocument>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaOptDocument {
    #[serde(default)]
    pub tags: Vec<ReferenceDocument>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssetOptDocument {
    #[serde(default)]
    pub media: Option<MediaOptDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub document_type: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "originalFilename", default)]
    pub original_filename: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub metadata: Option<AssetMetadataDocument>,
    #[serde(default)]
    pub opt: Option<AssetOptDocument>,
}

impl TryFrom<AssetDocument> for Asset {
    type Error = ParseError;

    fn try_from(doc: AssetDocument) -> Result<Self, Self::Error> {
        let kind = AssetKind::from_document_type(&doc.document_type)
            .ok_or_else(|| ParseError::UnexpectedType {
                document_id: doc.id.clone(),
                document_type: doc.document_type.clone(),
            })?;

        let dimensions = match doc.metadata.and_then(|m| m.dimensions) {
            Some(dims) => Some(convert_dimensions(&doc.id, dims)?),
            None => None,
        };

        // Tag references form an ordered set; repeated refs keep their first
        // position.
        let mut tags: Vec<TagId> = Vec::new();
        let refs = doc
            .opt
            .and_then(|opt| opt.media)
            .map(|media| media.tags)
            .unwrap_or_default();
        for reference in refs {
            let tag = TagId(reference.reference);
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Asset {
            id: AssetId(doc.id),
            kind,
            revision: Revision::new(doc.rev, doc.updated_at),
            original_filename: doc.original_filename,
            mime_type: doc.mime_type,
            size: doc.size,
            dimensions,
            tags,
        })
    }
}

fn convert_dimensions(
    document_id: &str,
    dims: DimensionsDocument,
) -> Result<Dimensions, ParseError> {
    let valid = |v: f64| v.is_finite() && v >= 0.0 && v <= u32::MAX as f64;
    if !valid(dims.width) || !valid(dims.height) {
        return Err(ParseError::InvalidField {
            document_id: document_id.to_owned(),
            field: "metadata.dimensions",
        });
    }
    Ok(Dimensions {
        width: dims.width.round() as u32,
        height: dims.height.round() as u32,
    })
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlugDocument {
    pub current: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub document_type: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub name: SlugDocument,
    #[serde(default)]
    pub count: Option<u64>,
}

impl TryFrom<TagDocument> for Tag {
    type Error = ParseError;

    fn try_from(doc: TagDocument) -> Result<Self, Self::Error> {
        if doc.document_type != TAG_DOCUMENT_TYPE {
            return Err(ParseError::UnexpectedType {
                document_id: doc.id,
                document_type: doc.document_type,
            });
        }

        let name = doc.name.current.trim();
        if name.is_empty() {
            return Err(ParseError::InvalidField {
                document_id: doc.id,
                field: "name.current",
            });
        }

        Ok(Tag {
            name: name.to_owned(),
            id: TagId(doc.id),
            usage_hint: doc.count,
            revision: Revision::new(doc.rev, doc.updated_at),
        })
    }
}
