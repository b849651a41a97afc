//! Retail site records from the external catalog.
//!
//! Sites are read-only input: the crawler never creates or mutates them,
//! it only reads the URL to fetch and the identifier to tag deals with.

use serde::{Deserialize, Serialize};
use url::Url;

/// Store category as used by the catalog and the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteCategory {
    FastFashion,
    Luxury,
    Vintage,
    Streetwear,
    DepartmentStore,
    NordicDesign,
    Sports,
    MidRange,
    Accessories,
    #[serde(other)]
    Other,
}

impl SiteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FastFashion => "fast-fashion",
            Self::Luxury => "luxury",
            Self::Vintage => "vintage",
            Self::Streetwear => "streetwear",
            Self::DepartmentStore => "department-store",
            Self::NordicDesign => "nordic-design",
            Self::Sports => "sports",
            Self::MidRange => "mid-range",
            Self::Accessories => "accessories",
            Self::Other => "other",
        }
    }
}

/// Geographic position of the physical store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A retail site to crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Stable identifier; every deal references it.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address, informational only.
    #[serde(default)]
    pub address: String,
    /// Canonical homepage URL.
    #[serde(rename = "website", alias = "url")]
    pub url: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub category: SiteCategory,
}

impl Site {
    /// Parse the canonical URL.
    pub fn parsed_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_deserializes_catalog_shape() {
        let json = r#"{
            "id": "marimekko-esplanadi",
            "name": "Marimekko",
            "address": "Pohjoisesplanadi 33",
            "website": "https://www.marimekko.com/fi_fi",
            "lat": 60.1676,
            "lng": 24.9482,
            "category": "nordic-design"
        }"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.id, "marimekko-esplanadi");
        assert_eq!(site.url, "https://www.marimekko.com/fi_fi");
        assert_eq!(site.category, SiteCategory::NordicDesign);
        assert!((site.coordinates.lat - 60.1676).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_category_maps_to_other() {
        let json = r#"{"id":"x","name":"X","website":"https://x.fi","lat":0.0,"lng":0.0,"category":"pop-up"}"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.category, SiteCategory::Other);
    }
}
