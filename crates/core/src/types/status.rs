//! Status enums for catalog entities.
//!
//! Both enums are stored as `TEXT` columns and travel as snake_case strings
//! on the wire, so `as_str` / `FromStr` are the single source of truth for
//! their representation.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::health::UnknownVariant;

/// Publication state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Listed and purchasable.
    #[default]
    Active,
    /// Being prepared; not shown to shoppers.
    Draft,
    /// No longer produced.
    Discontinued,
    /// Announced but not yet available.
    ComingSoon,
}

impl ProductStatus {
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::Draft,
        Self::Discontinued,
        Self::ComingSoon,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Draft => "draft",
            Self::Discontinued => "discontinued",
            Self::ComingSoon => "coming_soon",
        }
    }

    /// Whether the product should be published to sales channels.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("product status", s))
    }
}

/// Kind of research or quality document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Certificate of analysis or organic certification.
    Certificate,
    LabResult,
    Research,
    ScientificStudy,
}

impl DocumentType {
    pub const ALL: [Self; 4] = [
        Self::Certificate,
        Self::LabResult,
        Self::Research,
        Self::ScientificStudy,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::LabResult => "lab_result",
            Self::Research => "research",
            Self::ScientificStudy => "scientific_study",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|doc_type| doc_type.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("document type", s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_default_is_active() {
        assert_eq!(ProductStatus::default(), ProductStatus::Active);
        assert!(ProductStatus::default().is_active());
        assert!(!ProductStatus::ComingSoon.is_active());
    }

    #[test]
    fn test_product_status_parse() {
        assert_eq!(
            "coming_soon".parse::<ProductStatus>().unwrap(),
            ProductStatus::ComingSoon
        );
        assert!("archived".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_document_type_serde() {
        let json = serde_json::to_string(&DocumentType::ScientificStudy).unwrap();
        assert_eq!(json, "\"scientific_study\"");
        for doc_type in DocumentType::ALL {
            assert_eq!(doc_type.to_string().parse::<DocumentType>().unwrap(), doc_type);
        }
    }
}
