//! Catalog and QR exports for the admin dashboard.
//!
//! - Shopify product import records (JSON)
//! - QR targets for printed batch labels (JSON and CSV)
//! - Product listing (CSV)
//!
//! CSV output follows RFC 4180: fields containing a comma, quote, CR or LF
//! are wrapped in quotes with embedded quotes doubled. Lines end in CRLF.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Serialize;

use crowe_logic_core::BatchCode;

use crate::config::StorefrontConfig;
use crate::models::{Batch, Product, ProductWithIngredients};

/// Vendor name on every Shopify record.
pub const VENDOR: &str = "Crowe Logic";

/// One product in Shopify's product import format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopifyProduct {
    pub handle: String,
    pub title: String,
    pub body_html: String,
    pub vendor: &'static str,
    pub product_type: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub variants: Vec<ShopifyVariant>,
    pub images: Vec<ShopifyImage>,
    pub metafields: Vec<ShopifyMetafield>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopifyVariant {
    pub sku: String,
    pub requires_shipping: bool,
    pub taxable: bool,
    pub inventory_policy: &'static str,
    pub inventory_management: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopifyImage {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopifyMetafield {
    pub key: &'static str,
    /// JSON-encoded payload, as Shopify expects for `json_string`.
    pub value: String,
    pub value_type: &'static str,
    pub namespace: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngredientSummary<'a> {
    name: &'a str,
    percentage: i32,
    extract_type: Option<&'a str>,
}

/// Build the Shopify import record for one product.
///
/// # Errors
///
/// Returns an error if the ingredient metafield cannot be encoded.
pub fn shopify_product(item: &ProductWithIngredients) -> Result<ShopifyProduct, serde_json::Error> {
    let product = &item.product;
    let benefit = product.health_benefit.as_str().to_string();

    let tags = std::iter::once(benefit.clone())
        .chain(item.ingredients.iter().map(|detail| detail.ingredient.name.clone()))
        .collect();

    let summary: Vec<IngredientSummary<'_>> = item
        .ingredients
        .iter()
        .map(|detail| IngredientSummary {
            name: &detail.ingredient.name,
            percentage: detail.row.percentage,
            extract_type: detail.row.extract_type.as_deref(),
        })
        .collect();

    Ok(ShopifyProduct {
        handle: handle(&product.name),
        title: product.name.clone(),
        body_html: product.description.clone(),
        vendor: VENDOR,
        product_type: benefit,
        tags,
        published: product.status.is_active(),
        variants: vec![ShopifyVariant {
            sku: product.sku.to_string(),
            requires_shipping: true,
            taxable: true,
            inventory_policy: "deny",
            inventory_management: "shopify",
        }],
        images: vec![ShopifyImage {
            src: product.image.clone().unwrap_or_default(),
        }],
        metafields: vec![ShopifyMetafield {
            key: "ingredients",
            value: serde_json::to_string(&summary)?,
            value_type: "json_string",
            namespace: "custom",
        }],
    })
}

/// Lower-case the name and replace each whitespace run with `-`.
#[must_use]
pub fn handle(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.extend(c.to_lowercase());
            in_space = false;
        }
    }
    out
}

/// Where a printed batch QR code points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrTarget {
    pub batch_code: BatchCode,
    pub qr_url: String,
}

#[must_use]
pub fn qr_targets(batches: &[Batch], config: &StorefrontConfig) -> Vec<QrTarget> {
    batches
        .iter()
        .map(|batch| QrTarget {
            batch_code: batch.batch_code.clone(),
            qr_url: config.batch_url(batch.batch_code.as_str()),
        })
        .collect()
}

/// Quote a CSV field when RFC 4180 requires it.
#[must_use]
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&csv_field(field));
    }
    out.push_str("\r\n");
}

#[must_use]
pub fn qr_csv(targets: &[QrTarget]) -> String {
    let mut out = String::new();
    push_row(&mut out, ["Batch Code", "QR URL"]);
    for target in targets {
        push_row(&mut out, [target.batch_code.as_str(), target.qr_url.as_str()]);
    }
    out
}

#[must_use]
pub fn products_csv(products: &[Product]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        ["ID", "Name", "Description", "SKU", "Health Benefit", "Status"],
    );
    for product in products {
        let id = product.id.to_string();
        push_row(
            &mut out,
            [
                id.as_str(),
                product.name.as_str(),
                product.description.as_str(),
                product.sku.as_str(),
                product.health_benefit.as_str(),
                product.status.as_str(),
            ],
        );
    }
    out
}

/// `crowe-logic-<kind>-<YYYY-MM-DD>.csv`
#[must_use]
pub fn csv_filename(kind: &str, date: NaiveDate) -> String {
    format!("crowe-logic-{kind}-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, ProductIngredient, ProductIngredientDetail};
    use crowe_logic_core::{
        HealthBenefit, IngredientId, ProductId, ProductIngredientId, ProductStatus, Sku,
    };

    fn product(status: ProductStatus) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Immune Elevation Complex".to_string(),
            description: "Powerful immune support".to_string(),
            sku: Sku::parse("CLF-002").unwrap(),
            health_benefit: HealthBenefit::Immune,
            image: None,
            status,
        }
    }

    #[test]
    fn test_handle() {
        assert_eq!(handle("Immune Elevation Complex"), "immune-elevation-complex");
        assert_eq!(handle("Neural  \tNexus"), "neural-nexus");
    }

    #[test]
    fn test_shopify_record() {
        let item = ProductWithIngredients {
            product: product(ProductStatus::Active),
            ingredients: vec![ProductIngredientDetail {
                row: ProductIngredient {
                    id: ProductIngredientId::new(1),
                    product_id: ProductId::new(1),
                    ingredient_id: IngredientId::new(3),
                    percentage: 40,
                    extract_type: Some("Dual Extraction".to_string()),
                },
                ingredient: Ingredient {
                    id: IngredientId::new(3),
                    name: "Reishi".to_string(),
                    scientific_name: Some("Ganoderma lucidum".to_string()),
                    description: None,
                },
            }],
        };

        let record = shopify_product(&item).unwrap();
        assert_eq!(record.handle, "immune-elevation-complex");
        assert_eq!(record.vendor, "Crowe Logic");
        assert_eq!(record.product_type, "immune");
        assert_eq!(record.tags, vec!["immune", "Reishi"]);
        assert!(record.published);
        assert_eq!(record.variants[0].sku, "CLF-002");
        assert_eq!(record.images[0].src, "");
        assert_eq!(record.metafields[0].namespace, "custom");

        let value: serde_json::Value = serde_json::from_str(&record.metafields[0].value).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"name": "Reishi", "percentage": 40, "extractType": "Dual Extraction"}
            ])
        );
    }

    #[test]
    fn test_unpublished_when_not_active() {
        let item = ProductWithIngredients {
            product: product(ProductStatus::ComingSoon),
            ingredients: vec![],
        };
        let record = shopify_product(&item).unwrap();
        assert!(!record.published);
        assert_eq!(record.tags, vec!["immune"]);
        assert_eq!(record.metafields[0].value, "[]");
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_products_csv() {
        let mut p = product(ProductStatus::Active);
        p.description = "Reishi, Shiitake and \"more\"".to_string();
        let csv = products_csv(&[p]);
        let mut lines = csv.split("\r\n");
        assert_eq!(
            lines.next(),
            Some("ID,Name,Description,SKU,Health Benefit,Status")
        );
        assert_eq!(
            lines.next(),
            Some("1,Immune Elevation Complex,\"Reishi, Shiitake and \"\"more\"\"\",CLF-002,immune,active")
        );
    }

    #[test]
    fn test_qr_targets_use_configured_base_url() {
        let config = StorefrontConfig {
            base_url: "https://crowelogic.com".to_string(),
            ..Default::default()
        };
        let batch = Batch {
            id: crowe_logic_core::BatchId::new(1),
            batch_code: BatchCode::parse("CLF001-2304").unwrap(),
            product_id: ProductId::new(1),
            production_date: crowe_logic_core::date::parse_flexible("2023-04-15").unwrap(),
            alcohol_percentage: None,
            organic_certification: None,
            notes: None,
        };
        let targets = qr_targets(&[batch], &config);
        assert_eq!(targets[0].qr_url, "https://crowelogic.com/batch/CLF001-2304");
        assert_eq!(
            qr_csv(&targets),
            "Batch Code,QR URL\r\nCLF001-2304,https://crowelogic.com/batch/CLF001-2304\r\n"
        );
    }

    #[test]
    fn test_csv_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(csv_filename("products", date), "crowe-logic-products-2025-03-01.csv");
    }
}
