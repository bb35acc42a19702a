//! etlgraph-typemap — the type-mapping engine (C2): native → canonical type
//! normalization, target-platform rendering, and conversion-risk scoring.

pub mod canonical;
pub mod informatica;
pub mod mapper;
pub mod rules;
pub mod ssis;

pub use canonical::{CanonicalType, ConversionRisk, TargetPlatform};
pub use informatica::informatica_mapper;
pub use mapper::{EnrichedType, TypeMapper};
pub use ssis::ssis_mapper;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssis_known_type_enriches_confidently() {
        let mapper = ssis_mapper();
        let enriched = mapper.enrich("DT_I4", None, None, None, Some(false), &[]);
        assert_eq!(enriched.canonical_type, CanonicalType::Integer);
        assert_eq!(enriched.conversion_confidence, 1.0);
        assert!(enriched.potential_issues.is_empty());
        assert_eq!(enriched.target_types.get("sql_server").unwrap(), "int");
    }

    #[test]
    fn unknown_native_type_never_fails() {
        let mapper = ssis_mapper();
        let enriched = mapper.enrich("DT_BOGUS", None, None, None, None, &[]);
        assert_eq!(enriched.canonical_type, CanonicalType::Unknown);
        assert!(enriched.conversion_confidence <= 0.3);
        assert!(!enriched.potential_issues.is_empty());
    }

    #[test]
    fn large_length_caps_confidence() {
        let mapper = ssis_mapper();
        let enriched = mapper.enrich("DT_WSTR", Some(10_000), None, None, None, &[]);
        assert!(enriched.conversion_confidence <= 0.8);
    }

    #[test]
    fn placeholder_substitution_renders_length() {
        let mapper = ssis_mapper();
        let enriched = mapper.enrich(
            "DT_WSTR",
            Some(50),
            None,
            None,
            None,
            &[TargetPlatform::SqlServer],
        );
        assert_eq!(enriched.target_types.get("sql_server").unwrap(), "nvarchar(50)");
    }

    #[test]
    fn informatica_guid_token_maps_to_same_canonical_guid() {
        let ssis = ssis_mapper();
        let informatica = informatica_mapper();
        assert_eq!(ssis.canonical_type("DT_GUID"), CanonicalType::Guid);
        assert_eq!(informatica.canonical_type("uuid"), CanonicalType::Guid);
    }

    #[test]
    fn conversion_risk_matches_fixed_buckets() {
        let mapper = ssis_mapper();
        assert_eq!(
            mapper.conversion_risk(CanonicalType::Integer, CanonicalType::Integer),
            ConversionRisk::None
        );
        assert_eq!(
            mapper.conversion_risk(CanonicalType::Tinyint, CanonicalType::Smallint),
            ConversionRisk::Low
        );
        assert_eq!(
            mapper.conversion_risk(CanonicalType::Bigint, CanonicalType::Integer),
            ConversionRisk::Medium
        );
        assert_eq!(
            mapper.conversion_risk(CanonicalType::Varchar, CanonicalType::Integer),
            ConversionRisk::High
        );
        assert_eq!(
            mapper.conversion_risk(CanonicalType::Xml, CanonicalType::Integer),
            ConversionRisk::Unsafe
        );
    }
}
