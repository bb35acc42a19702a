//! Canonical type enum, target-platform enum, and conversion-risk enum shared
//! by every native-type mapper (C2).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical type every native type is normalized to before a
/// target-platform lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalType {
    Integer,
    Bigint,
    Smallint,
    Tinyint,
    Decimal,
    Numeric,
    Float,
    Real,
    Money,
    Varchar,
    Nvarchar,
    Char,
    Nchar,
    Text,
    Ntext,
    Datetime,
    Date,
    Time,
    Timestamp,
    Binary,
    Varbinary,
    Image,
    Boolean,
    Guid,
    Json,
    Xml,
    Unknown,
}

impl CanonicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::Integer => "INTEGER",
            CanonicalType::Bigint => "BIGINT",
            CanonicalType::Smallint => "SMALLINT",
            CanonicalType::Tinyint => "TINYINT",
            CanonicalType::Decimal => "DECIMAL",
            CanonicalType::Numeric => "NUMERIC",
            CanonicalType::Float => "FLOAT",
            CanonicalType::Real => "REAL",
            CanonicalType::Money => "MONEY",
            CanonicalType::Varchar => "VARCHAR",
            CanonicalType::Nvarchar => "NVARCHAR",
            CanonicalType::Char => "CHAR",
            CanonicalType::Nchar => "NCHAR",
            CanonicalType::Text => "TEXT",
            CanonicalType::Ntext => "NTEXT",
            CanonicalType::Datetime => "DATETIME",
            CanonicalType::Date => "DATE",
            CanonicalType::Time => "TIME",
            CanonicalType::Timestamp => "TIMESTAMP",
            CanonicalType::Binary => "BINARY",
            CanonicalType::Varbinary => "VARBINARY",
            CanonicalType::Image => "IMAGE",
            CanonicalType::Boolean => "BOOLEAN",
            CanonicalType::Guid => "GUID",
            CanonicalType::Json => "JSON",
            CanonicalType::Xml => "XML",
            CanonicalType::Unknown => "UNKNOWN",
        }
    }

    /// Coarse grouping used for the `type_category` property.
    pub fn category(&self) -> &'static str {
        match self {
            CanonicalType::Integer
            | CanonicalType::Bigint
            | CanonicalType::Smallint
            | CanonicalType::Tinyint
            | CanonicalType::Decimal
            | CanonicalType::Numeric
            | CanonicalType::Float
            | CanonicalType::Real
            | CanonicalType::Money => "numeric",
            CanonicalType::Varchar
            | CanonicalType::Nvarchar
            | CanonicalType::Char
            | CanonicalType::Nchar
            | CanonicalType::Text
            | CanonicalType::Ntext => "string",
            CanonicalType::Datetime
            | CanonicalType::Date
            | CanonicalType::Time
            | CanonicalType::Timestamp => "datetime",
            CanonicalType::Binary | CanonicalType::Varbinary | CanonicalType::Image => "binary",
            CanonicalType::Boolean => "boolean",
            _ => "special",
        }
    }

    pub fn supports_indexing(&self) -> bool {
        !matches!(
            self,
            CanonicalType::Text | CanonicalType::Ntext | CanonicalType::Image | CanonicalType::Json | CanonicalType::Xml
        )
    }

    pub fn supports_sorting(&self) -> bool {
        !matches!(self, CanonicalType::Image | CanonicalType::Json | CanonicalType::Xml)
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target platforms a canonical type can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPlatform {
    SqlServer,
    Postgresql,
    Mysql,
    Oracle,
    Snowflake,
    Bigquery,
    Redshift,
    Databricks,
    AzureSynapse,
}

impl TargetPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPlatform::SqlServer => "sql_server",
            TargetPlatform::Postgresql => "postgresql",
            TargetPlatform::Mysql => "mysql",
            TargetPlatform::Oracle => "oracle",
            TargetPlatform::Snowflake => "snowflake",
            TargetPlatform::Bigquery => "bigquery",
            TargetPlatform::Redshift => "redshift",
            TargetPlatform::Databricks => "databricks",
            TargetPlatform::AzureSynapse => "azure_synapse",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "sql_server" => TargetPlatform::SqlServer,
            "postgresql" => TargetPlatform::Postgresql,
            "mysql" => TargetPlatform::Mysql,
            "oracle" => TargetPlatform::Oracle,
            "snowflake" => TargetPlatform::Snowflake,
            "bigquery" => TargetPlatform::Bigquery,
            "redshift" => TargetPlatform::Redshift,
            "databricks" => TargetPlatform::Databricks,
            "azure_synapse" => TargetPlatform::AzureSynapse,
            _ => return None,
        })
    }

    /// The four platforms enriched by default when a caller doesn't specify
    /// a target list, matching the original mapper's default.
    pub fn defaults() -> Vec<TargetPlatform> {
        vec![
            TargetPlatform::SqlServer,
            TargetPlatform::Postgresql,
            TargetPlatform::Mysql,
            TargetPlatform::Oracle,
        ]
    }
}

/// Five-level conversion-risk scale between two canonical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionRisk {
    None,
    Low,
    Medium,
    High,
    Unsafe,
}

impl ConversionRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionRisk::None => "none",
            ConversionRisk::Low => "low",
            ConversionRisk::Medium => "medium",
            ConversionRisk::High => "high",
            ConversionRisk::Unsafe => "unsafe",
        }
    }
}
