//! The `TypeMapper` contract: `enrich(native_type, ...) -> EnrichedType`.
//! One instance is built per source technology (SSIS, Informatica); both
//! share [`crate::rules`] and differ only in their native→canonical table.

use crate::canonical::{CanonicalType, ConversionRisk, TargetPlatform};
use crate::rules::{conversion_risk, platform_template, render_template};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Enrichment result for a single native column type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedType {
    pub source_type: String,
    pub canonical_type: CanonicalType,
    pub target_types: HashMap<String, String>,
    pub type_length: Option<u32>,
    pub type_precision: Option<u32>,
    pub type_scale: Option<u32>,
    pub nullable: Option<bool>,
    pub conversion_confidence: f64,
    pub potential_issues: Vec<String>,
    pub type_category: String,
    pub supports_indexing: bool,
    pub supports_sorting: bool,
}

/// Maps a technology's native type tokens to [`CanonicalType`] and renders
/// target-platform type strings. Never fails: unknown native types degrade
/// to `CanonicalType::Unknown` with a recorded issue and low confidence.
pub struct TypeMapper {
    native_to_canonical: HashMap<String, CanonicalType>,
}

impl TypeMapper {
    pub fn new(native_to_canonical: HashMap<String, CanonicalType>) -> Self {
        TypeMapper { native_to_canonical }
    }

    pub fn canonical_type(&self, native_type: &str) -> CanonicalType {
        self.native_to_canonical
            .get(native_type)
            .copied()
            .unwrap_or(CanonicalType::Unknown)
    }

    pub fn conversion_risk(&self, source: CanonicalType, target: CanonicalType) -> ConversionRisk {
        conversion_risk(source, target)
    }

    /// `enrich(native_type, length?, precision?, scale?, nullable?, targets[])`.
    pub fn enrich(
        &self,
        native_type: &str,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
        nullable: Option<bool>,
        targets: &[TargetPlatform],
    ) -> EnrichedType {
        let canonical = self.canonical_type(native_type);
        let targets: Vec<TargetPlatform> = if targets.is_empty() {
            TargetPlatform::defaults()
        } else {
            targets.to_vec()
        };

        let mut target_types = HashMap::new();
        let mut potential_issues = Vec::new();
        let mut confidence: f64 = 1.0;

        for platform in &targets {
            match platform_template(canonical, *platform) {
                Some(template) => {
                    let rendered = render_template(template, length, precision, scale);
                    target_types.insert(platform.as_str().to_string(), rendered);
                }
                None => {
                    target_types.insert(platform.as_str().to_string(), "unknown".to_string());
                    potential_issues.push(format!("No mapping defined for {}", platform.as_str()));
                    confidence = confidence.min(0.5);
                }
            }
        }

        if canonical == CanonicalType::Unknown {
            potential_issues.push(format!("Unknown native type: {native_type}"));
            confidence = 0.3;
        }

        if let Some(l) = length {
            if l > 8000 {
                potential_issues.push("Large column length may require special handling".to_string());
                confidence = confidence.min(0.8);
            }
        }

        EnrichedType {
            source_type: native_type.to_string(),
            canonical_type: canonical,
            target_types,
            type_length: length,
            type_precision: precision,
            type_scale: scale,
            nullable,
            conversion_confidence: confidence,
            potential_issues,
            type_category: canonical.category().to_string(),
            supports_indexing: canonical.supports_indexing(),
            supports_sorting: canonical.supports_sorting(),
        }
    }
}
