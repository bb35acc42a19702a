//! SSIS native-type dictionary (`DT_*` tokens and their short-form aliases).

use crate::canonical::CanonicalType;
use crate::mapper::TypeMapper;
use std::collections::HashMap;

pub fn ssis_mapper() -> TypeMapper {
    use CanonicalType::*;
    let pairs: &[(&str, CanonicalType)] = &[
        ("DT_I1", Tinyint),
        ("i1", Tinyint),
        ("DT_I2", Smallint),
        ("i2", Smallint),
        ("DT_I4", Integer),
        ("i4", Integer),
        ("DT_I8", Bigint),
        ("i8", Bigint),
        ("DT_UI1", Tinyint),
        ("ui1", Tinyint),
        ("DT_UI2", Smallint),
        ("ui2", Smallint),
        ("DT_UI4", Integer),
        ("ui4", Integer),
        ("DT_UI8", Bigint),
        ("ui8", Bigint),
        ("DT_R4", Real),
        ("r4", Real),
        ("DT_R8", Float),
        ("r8", Float),
        ("DT_DECIMAL", Decimal),
        ("decimal", Decimal),
        ("DT_NUMERIC", Numeric),
        ("numeric", Numeric),
        ("DT_CY", Money),
        ("cy", Money),
        ("DT_STR", Varchar),
        ("str", Varchar),
        ("DT_WSTR", Nvarchar),
        ("wstr", Nvarchar),
        ("DT_TEXT", Text),
        ("text", Text),
        ("DT_NTEXT", Ntext),
        ("ntext", Ntext),
        ("DT_DBTIMESTAMP", Datetime),
        ("dbtimestamp", Datetime),
        ("DT_DBTIMESTAMP2", Datetime),
        ("dbtimestamp2", Datetime),
        ("DT_DBDATE", Date),
        ("dbdate", Date),
        ("DT_DBTIME", Time),
        ("dbtime", Time),
        ("DT_DBTIME2", Time),
        ("dbtime2", Time),
        ("DT_DBTIMESTAMPOFFSET", Timestamp),
        ("dbtimestampoffset", Timestamp),
        ("DT_BYTES", Varbinary),
        ("bytes", Varbinary),
        ("DT_IMAGE", Image),
        ("image", Image),
        ("DT_BOOL", Boolean),
        ("bool", Boolean),
        ("DT_GUID", Guid),
        ("guid", Guid),
    ];
    let map: HashMap<String, CanonicalType> = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    TypeMapper::new(map)
}
