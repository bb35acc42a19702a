//! Shared platform-template and conversion-risk tables. Both SSIS and
//! Informatica mappers draw from these; only the native-type dictionary
//! differs between the two.

use crate::canonical::{CanonicalType, ConversionRisk, TargetPlatform};
use std::collections::HashMap;

/// Platform type template for `canonical`, with `{length}`/`{precision}`/
/// `{scale}` placeholders substituted by the caller. Returns `None` when no
/// template is defined for the pair, which the mapper records as a
/// conversion issue rather than failing.
pub fn platform_template(canonical: CanonicalType, platform: TargetPlatform) -> Option<&'static str> {
    use CanonicalType::*;
    use TargetPlatform::*;
    Some(match (canonical, platform) {
        (Integer, SqlServer) => "int",
        (Integer, Postgresql) => "integer",
        (Integer, Mysql) => "int",
        (Integer, Oracle) => "number(10)",
        (Integer, Snowflake) => "number(38,0)",
        (Integer, Bigquery) => "int64",
        (Integer, Redshift) => "integer",
        (Integer, Databricks) => "int",
        (Integer, AzureSynapse) => "int",

        (Bigint, SqlServer) => "bigint",
        (Bigint, Postgresql) => "bigint",
        (Bigint, Mysql) => "bigint",
        (Bigint, Oracle) => "number(19)",
        (Bigint, Snowflake) => "number(38,0)",
        (Bigint, Bigquery) => "int64",
        (Bigint, Redshift) => "bigint",
        (Bigint, Databricks) => "bigint",
        (Bigint, AzureSynapse) => "bigint",

        (Smallint, SqlServer) => "smallint",
        (Smallint, Postgresql) => "smallint",
        (Smallint, Mysql) => "smallint",
        (Smallint, Oracle) => "number(5)",
        (Smallint, Snowflake) => "number(38,0)",
        (Smallint, Bigquery) => "int64",
        (Smallint, Redshift) => "smallint",
        (Smallint, Databricks) => "smallint",
        (Smallint, AzureSynapse) => "smallint",

        (Tinyint, SqlServer) => "tinyint",
        (Tinyint, Postgresql) => "smallint",
        (Tinyint, Mysql) => "tinyint",
        (Tinyint, Oracle) => "number(3)",
        (Tinyint, Snowflake) => "number(38,0)",
        (Tinyint, Bigquery) => "int64",
        (Tinyint, Redshift) => "smallint",
        (Tinyint, Databricks) => "tinyint",
        (Tinyint, AzureSynapse) => "tinyint",

        (Decimal, SqlServer) => "decimal({precision},{scale})",
        (Decimal, Postgresql) => "numeric({precision},{scale})",
        (Decimal, Mysql) => "decimal({precision},{scale})",
        (Decimal, Oracle) => "number({precision},{scale})",
        (Decimal, Snowflake) => "number({precision},{scale})",
        (Decimal, Bigquery) => "numeric",
        (Decimal, Redshift) => "decimal({precision},{scale})",
        (Decimal, Databricks) => "decimal({precision},{scale})",
        (Decimal, AzureSynapse) => "decimal({precision},{scale})",

        (Numeric, SqlServer) => "numeric({precision},{scale})",
        (Numeric, Postgresql) => "numeric({precision},{scale})",
        (Numeric, Mysql) => "numeric({precision},{scale})",
        (Numeric, Oracle) => "number({precision},{scale})",
        (Numeric, Snowflake) => "number({precision},{scale})",
        (Numeric, Bigquery) => "numeric",
        (Numeric, Redshift) => "numeric({precision},{scale})",
        (Numeric, Databricks) => "decimal({precision},{scale})",
        (Numeric, AzureSynapse) => "numeric({precision},{scale})",

        (Float, SqlServer) => "float",
        (Float, Postgresql) => "double precision",
        (Float, Mysql) => "double",
        (Float, Oracle) => "binary_double",
        (Float, Snowflake) => "float",
        (Float, Bigquery) => "float64",
        (Float, Redshift) => "double precision",
        (Float, Databricks) => "double",
        (Float, AzureSynapse) => "float",

        (Real, SqlServer) => "real",
        (Real, Postgresql) => "real",
        (Real, Mysql) => "float",
        (Real, Oracle) => "binary_float",
        (Real, Snowflake) => "float",
        (Real, Bigquery) => "float64",
        (Real, Redshift) => "real",
        (Real, Databricks) => "float",
        (Real, AzureSynapse) => "real",

        (Money, SqlServer) => "money",
        (Money, Postgresql) => "money",
        (Money, Mysql) => "decimal(19,4)",
        (Money, Oracle) => "number(19,4)",
        (Money, Snowflake) => "number(19,4)",
        (Money, Bigquery) => "numeric",
        (Money, Redshift) => "decimal(19,4)",
        (Money, Databricks) => "decimal(19,4)",
        (Money, AzureSynapse) => "money",

        (Varchar, SqlServer) => "varchar({length})",
        (Varchar, Postgresql) => "varchar({length})",
        (Varchar, Mysql) => "varchar({length})",
        (Varchar, Oracle) => "varchar2({length})",
        (Varchar, Snowflake) => "varchar({length})",
        (Varchar, Bigquery) => "string",
        (Varchar, Redshift) => "varchar({length})",
        (Varchar, Databricks) => "string",
        (Varchar, AzureSynapse) => "varchar({length})",

        (Nvarchar, SqlServer) => "nvarchar({length})",
        (Nvarchar, Postgresql) => "varchar({length})",
        (Nvarchar, Mysql) => "varchar({length})",
        (Nvarchar, Oracle) => "nvarchar2({length})",
        (Nvarchar, Snowflake) => "varchar({length})",
        (Nvarchar, Bigquery) => "string",
        (Nvarchar, Redshift) => "varchar({length})",
        (Nvarchar, Databricks) => "string",
        (Nvarchar, AzureSynapse) => "nvarchar({length})",

        (Char, SqlServer) => "char({length})",
        (Char, Postgresql) => "char({length})",
        (Char, Mysql) => "char({length})",
        (Char, Oracle) => "char({length})",
        (Char, Snowflake) => "char({length})",
        (Char, Bigquery) => "string",
        (Char, Redshift) => "char({length})",
        (Char, Databricks) => "string",
        (Char, AzureSynapse) => "char({length})",

        (Nchar, SqlServer) => "nchar({length})",
        (Nchar, Postgresql) => "char({length})",
        (Nchar, Mysql) => "char({length})",
        (Nchar, Oracle) => "nchar({length})",
        (Nchar, Snowflake) => "char({length})",
        (Nchar, Bigquery) => "string",
        (Nchar, Redshift) => "char({length})",
        (Nchar, Databricks) => "string",
        (Nchar, AzureSynapse) => "nchar({length})",

        (Text, SqlServer) => "text",
        (Text, Postgresql) => "text",
        (Text, Mysql) => "text",
        (Text, Oracle) => "clob",
        (Text, Snowflake) => "varchar",
        (Text, Bigquery) => "string",
        (Text, Redshift) => "varchar(65535)",
        (Text, Databricks) => "string",
        (Text, AzureSynapse) => "varchar(max)",

        (Ntext, SqlServer) => "ntext",
        (Ntext, Postgresql) => "text",
        (Ntext, Mysql) => "text",
        (Ntext, Oracle) => "nclob",
        (Ntext, Snowflake) => "varchar",
        (Ntext, Bigquery) => "string",
        (Ntext, Redshift) => "varchar(65535)",
        (Ntext, Databricks) => "string",
        (Ntext, AzureSynapse) => "nvarchar(max)",

        (Datetime, SqlServer) => "datetime2",
        (Datetime, Postgresql) => "timestamp",
        (Datetime, Mysql) => "datetime",
        (Datetime, Oracle) => "timestamp",
        (Datetime, Snowflake) => "timestamp_ntz",
        (Datetime, Bigquery) => "datetime",
        (Datetime, Redshift) => "timestamp",
        (Datetime, Databricks) => "timestamp",
        (Datetime, AzureSynapse) => "datetime2",

        (Date, SqlServer) => "date",
        (Date, Postgresql) => "date",
        (Date, Mysql) => "date",
        (Date, Oracle) => "date",
        (Date, Snowflake) => "date",
        (Date, Bigquery) => "date",
        (Date, Redshift) => "date",
        (Date, Databricks) => "date",
        (Date, AzureSynapse) => "date",

        (Time, SqlServer) => "time",
        (Time, Postgresql) => "time",
        (Time, Mysql) => "time",
        (Time, Oracle) => "timestamp",
        (Time, Snowflake) => "time",
        (Time, Bigquery) => "time",
        (Time, Redshift) => "time",
        (Time, Databricks) => "timestamp",
        (Time, AzureSynapse) => "time",

        (Timestamp, SqlServer) => "datetime2",
        (Timestamp, Postgresql) => "timestamptz",
        (Timestamp, Mysql) => "timestamp",
        (Timestamp, Oracle) => "timestamp with time zone",
        (Timestamp, Snowflake) => "timestamp_tz",
        (Timestamp, Bigquery) => "timestamp",
        (Timestamp, Redshift) => "timestamptz",
        (Timestamp, Databricks) => "timestamp",
        (Timestamp, AzureSynapse) => "datetimeoffset",

        (Binary, SqlServer) => "binary({length})",
        (Binary, Postgresql) => "bytea",
        (Binary, Mysql) => "binary({length})",
        (Binary, Oracle) => "raw({length})",
        (Binary, Snowflake) => "binary",
        (Binary, Bigquery) => "bytes",
        (Binary, Redshift) => "varbyte",
        (Binary, Databricks) => "binary",
        (Binary, AzureSynapse) => "binary({length})",

        (Varbinary, SqlServer) => "varbinary({length})",
        (Varbinary, Postgresql) => "bytea",
        (Varbinary, Mysql) => "varbinary({length})",
        (Varbinary, Oracle) => "raw({length})",
        (Varbinary, Snowflake) => "binary",
        (Varbinary, Bigquery) => "bytes",
        (Varbinary, Redshift) => "varbyte",
        (Varbinary, Databricks) => "binary",
        (Varbinary, AzureSynapse) => "varbinary({length})",

        (Image, SqlServer) => "image",
        (Image, Postgresql) => "bytea",
        (Image, Mysql) => "blob",
        (Image, Oracle) => "blob",
        (Image, Snowflake) => "binary",
        (Image, Bigquery) => "bytes",
        (Image, Redshift) => "varbyte",
        (Image, Databricks) => "binary",
        (Image, AzureSynapse) => "varbinary(max)",

        (Boolean, SqlServer) => "bit",
        (Boolean, Postgresql) => "boolean",
        (Boolean, Mysql) => "tinyint(1)",
        (Boolean, Oracle) => "number(1)",
        (Boolean, Snowflake) => "boolean",
        (Boolean, Bigquery) => "bool",
        (Boolean, Redshift) => "boolean",
        (Boolean, Databricks) => "boolean",
        (Boolean, AzureSynapse) => "bit",

        (Guid, SqlServer) => "uniqueidentifier",
        (Guid, Postgresql) => "uuid",
        (Guid, Mysql) => "char(36)",
        (Guid, Oracle) => "char(36)",
        (Guid, Snowflake) => "varchar(36)",
        (Guid, Bigquery) => "string",
        (Guid, Redshift) => "varchar(36)",
        (Guid, Databricks) => "string",
        (Guid, AzureSynapse) => "uniqueidentifier",

        (Json, SqlServer) => "nvarchar(max)",
        (Json, Postgresql) => "jsonb",
        (Json, Mysql) => "json",
        (Json, Oracle) => "clob",
        (Json, Snowflake) => "variant",
        (Json, Bigquery) => "json",
        (Json, Redshift) => "super",
        (Json, Databricks) => "string",
        (Json, AzureSynapse) => "nvarchar(max)",

        (Xml, SqlServer) => "xml",
        (Xml, Postgresql) => "xml",
        (Xml, Mysql) => "text",
        (Xml, Oracle) => "xmltype",
        (Xml, Snowflake) => "varchar",
        (Xml, Bigquery) => "string",
        (Xml, Redshift) => "varchar(65535)",
        (Xml, Databricks) => "string",
        (Xml, AzureSynapse) => "xml",

        _ => return None,
    })
}

/// Conversion-risk table between two canonical types. `source == target` is
/// always `None`; unlisted ordered pairs default to `Unsafe`.
pub fn conversion_risk(source: CanonicalType, target: CanonicalType) -> ConversionRisk {
    use CanonicalType::*;
    if source == target {
        return ConversionRisk::None;
    }
    let low: &[(CanonicalType, CanonicalType)] = &[
        (Tinyint, Smallint),
        (Smallint, Integer),
        (Integer, Bigint),
        (Real, Float),
        (Char, Varchar),
        (Nchar, Nvarchar),
        (Date, Datetime),
        (Time, Datetime),
    ];
    let medium: &[(CanonicalType, CanonicalType)] = &[
        (Bigint, Integer),
        (Float, Real),
        (Decimal, Integer),
        (Datetime, Date),
        (Nvarchar, Varchar),
    ];
    let high: &[(CanonicalType, CanonicalType)] = &[
        (Varchar, Integer),
        (Nvarchar, Integer),
        (Datetime, Time),
    ];
    if low.contains(&(source, target)) {
        ConversionRisk::Low
    } else if medium.contains(&(source, target)) {
        ConversionRisk::Medium
    } else if high.contains(&(source, target)) {
        ConversionRisk::High
    } else {
        ConversionRisk::Unsafe
    }
}

/// Renders `template` by substituting `{length}`/`{precision}`/`{scale}`
/// placeholders, leaving the template untouched if the corresponding value
/// is absent (mirrors the original's conditional-replace behavior).
pub fn render_template(
    template: &str,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> String {
    let mut out = template.to_string();
    if let Some(l) = length {
        out = out.replace("{length}", &l.to_string());
    }
    if let Some(p) = precision {
        out = out.replace("{precision}", &p.to_string());
    }
    if let Some(s) = scale {
        out = out.replace("{scale}", &s.to_string());
    }
    out
}

#[allow(dead_code)]
pub(crate) fn all_platforms() -> HashMap<&'static str, TargetPlatform> {
    use TargetPlatform::*;
    [
        ("sql_server", SqlServer),
        ("postgresql", Postgresql),
        ("mysql", Mysql),
        ("oracle", Oracle),
        ("snowflake", Snowflake),
        ("bigquery", Bigquery),
        ("redshift", Redshift),
        ("databricks", Databricks),
        ("azure_synapse", AzureSynapse),
    ]
    .into_iter()
    .collect()
}
