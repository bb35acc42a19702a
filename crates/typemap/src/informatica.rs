//! Informatica native-type dictionary (lowercase PowerCenter tokens).

use crate::canonical::CanonicalType;
use crate::mapper::TypeMapper;
use std::collections::HashMap;

pub fn informatica_mapper() -> TypeMapper {
    use CanonicalType::*;
    let pairs: &[(&str, CanonicalType)] = &[
        ("string", Varchar),
        ("varchar", Varchar),
        ("varchar2", Varchar),
        ("char", Char),
        ("nstring", Nvarchar),
        ("nvarchar", Nvarchar),
        ("nchar", Nchar),
        ("text", Text),
        ("ntext", Ntext),
        ("decimal", Decimal),
        ("numeric", Numeric),
        ("number", Decimal),
        ("number(p,s)", Decimal),
        ("integer", Integer),
        ("int", Integer),
        ("bigint", Bigint),
        ("smallint", Smallint),
        ("tinyint", Tinyint),
        ("float", Float),
        ("double", Float),
        ("real", Real),
        ("date/time", Datetime),
        ("datetime", Datetime),
        ("date", Date),
        ("time", Time),
        ("timestamp", Timestamp),
        ("binary", Binary),
        ("varbinary", Varbinary),
        ("uuid", Guid),
    ];
    let map: HashMap<String, CanonicalType> = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    TypeMapper::new(map)
}
