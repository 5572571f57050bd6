use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Server-side ordering of the paginated asset query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AssetOrder {
    CreatedDesc,
    CreatedAsc,
    #[default]
    UpdatedDesc,
    UpdatedAsc,
    FilenameAsc,
    FilenameDesc,
    SizeDesc,
    SizeAsc,
    MimeTypeAsc,
    MimeTypeDesc,
}

impl AssetOrder {
    /// Document field the query orders by.
    pub fn field(&self) -> &'static str {
        match self {
            AssetOrder::CreatedDesc | AssetOrder::CreatedAsc => "_createdAt",
            AssetOrder::UpdatedDesc | AssetOrder::UpdatedAsc => "_updatedAt",
            AssetOrder::FilenameAsc | AssetOrder::FilenameDesc => {
                "originalFilename"
            }
            AssetOrder::SizeDesc | AssetOrder::SizeAsc => "size",
            AssetOrder::MimeTypeAsc | AssetOrder::MimeTypeDesc => "mimeType",
        }
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            AssetOrder::CreatedAsc
            | AssetOrder::UpdatedAsc
            | AssetOrder::FilenameAsc
            | AssetOrder::SizeAsc
            | AssetOrder::MimeTypeAsc => SortDirection::Asc,
            AssetOrder::CreatedDesc
            | AssetOrder::UpdatedDesc
            | AssetOrder::FilenameDesc
            | AssetOrder::SizeDesc
            | AssetOrder::MimeTypeDesc => SortDirection::Desc,
        }
    }
}

impl Display for AssetOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field(), self.direction())
    }
}
