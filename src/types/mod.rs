//! Column type descriptions.
//!
//! A column's type text (`Nullable(Array(Decimal(18,4)))`, `DateTime64(3, 'Asia/Tokyo')`)
//! is parsed once per result set into a [`Type`] tree, then shared read-only by
//! every row decode for that column.

pub mod grammar;

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use chrono_tz::Tz;

pub use grammar::{parse_type, parse_type_with_depth};

/// Default cap on composite nesting, for both grammar and decode recursion.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Leaf (non-composite) data kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    /// Arbitrary precision, exact digits.
    Decimal,
    Boolean,
    String,
    /// `\x`-prefixed hex text.
    Bytea,
    Date,
    /// Whole-second timestamp without zone.
    DateTime,
    /// Sub-second timestamp, interpreted in a zone.
    DateTime64,
    /// Timestamp text carrying an explicit UTC offset.
    TimestampTz,
    /// Always decodes to null.
    Null,
    /// Keyword the grammar could not resolve; decoded as text.
    Unknown,
}

impl Kind {
    /// Canonical type name, as written back by [`Type`]'s `Display`.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::UInt8 => "UInt8",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Decimal => "Decimal",
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::Bytea => "Bytea",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::DateTime64 => "DateTime64",
            Self::TimestampTz => "TimestampTz",
            Self::Null => "Nothing",
            Self::Unknown => "Unknown",
        }
    }

    /// Default `(precision, scale)` when the type text gives no arguments.
    pub const fn default_precision_scale(&self) -> (u32, u32) {
        match self {
            Self::Int8 => (4, 0),
            Self::UInt8 => (3, 0),
            Self::Int16 => (6, 0),
            Self::UInt16 => (5, 0),
            Self::Int32 => (11, 0),
            Self::UInt32 => (10, 0),
            Self::Int64 | Self::UInt64 => (20, 0),
            Self::Float32 => (8, 8),
            Self::Float64 => (17, 17),
            Self::Decimal => (38, 9),
            Self::Boolean => (1, 0),
            Self::Date => (10, 0),
            Self::DateTime => (19, 0),
            Self::DateTime64 => (26, 6),
            Self::TimestampTz => (32, 6),
            Self::String | Self::Bytea | Self::Null | Self::Unknown => (0, 0),
        }
    }

    /// Kinds whose values carry a zone-interpreted sub-second timestamp.
    pub const fn accepts_timezone(&self) -> bool {
        matches!(self, Self::DateTime64)
    }

    /// Resolve a leaf keyword through the alias table (case-insensitive).
    pub fn from_alias(name: &str) -> Option<Kind> {
        ALIASES.get(name.trim().to_ascii_uppercase().as_str()).copied()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Alias table, built once on first use and read-only afterwards.
static ALIASES: LazyLock<HashMap<&'static str, Kind>> = LazyLock::new(|| {
    let table: &[(&[&str], Kind)] = &[
        (&["INT8", "TINYINT"], Kind::Int8),
        (&["UINT8"], Kind::UInt8),
        (&["INT16", "SMALLINT"], Kind::Int16),
        (&["UINT16"], Kind::UInt16),
        (&["INT32", "INT", "INTEGER"], Kind::Int32),
        (&["UINT32"], Kind::UInt32),
        (&["INT64", "BIGINT", "LONG"], Kind::Int64),
        (&["UINT64"], Kind::UInt64),
        (&["FLOAT32", "FLOAT", "REAL"], Kind::Float32),
        (&["FLOAT64", "DOUBLE", "DOUBLE PRECISION"], Kind::Float64),
        (&["DECIMAL", "NUMERIC"], Kind::Decimal),
        (&["BOOLEAN", "BOOL"], Kind::Boolean),
        (&["STRING", "TEXT", "VARCHAR"], Kind::String),
        (&["BYTEA"], Kind::Bytea),
        (&["DATE", "DATE32", "PGDATE"], Kind::Date),
        (&["DATETIME"], Kind::DateTime),
        (&["DATETIME64", "TIMESTAMP", "TIMESTAMPNTZ"], Kind::DateTime64),
        (&["TIMESTAMPTZ"], Kind::TimestampTz),
        (&["NOTHING", "NULL"], Kind::Null),
    ];
    let mut map = HashMap::new();
    for (names, kind) in table {
        for name in *names {
            // first entry wins
            map.entry(*name).or_insert(*kind);
        }
    }
    map
});

/// A leaf column type with its modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarType {
    pub kind: Kind,
    pub nullable: bool,
    pub precision: u32,
    pub scale: u32,
    /// Only set for [`Kind::DateTime64`] with a recognized zone id.
    pub timezone: Option<Tz>,
}

impl ScalarType {
    /// Leaf type with the kind's default precision and scale.
    pub fn new(kind: Kind) -> Self {
        let (precision, scale) = kind.default_precision_scale();
        Self {
            kind,
            nullable: false,
            precision,
            scale,
            timezone: None,
        }
    }
}

impl From<Kind> for ScalarType {
    fn from(kind: Kind) -> Self {
        Self::new(kind)
    }
}

/// Writes the leaf without its nullable wrapper.
impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        let defaults = self.kind.default_precision_scale();
        match self.kind {
            Kind::Decimal if (self.precision, self.scale) != defaults => {
                write!(f, "({},{})", self.precision, self.scale)
            }
            Kind::DateTime64 => match (self.scale != defaults.1, self.timezone) {
                (_, Some(tz)) => write!(f, "({},'{}')", self.scale, tz.name()),
                (true, None) => write!(f, "({})", self.scale),
                (false, None) => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

/// Parsed column type: a leaf, or a composite with child types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Scalar(ScalarType),
    /// One child; depth is implied by how many `Array` levels are nested.
    Array { element: Box<Type>, nullable: bool },
    /// One child per positional field.
    Tuple { elements: Vec<Type>, nullable: bool },
}

impl Type {
    pub fn scalar(kind: Kind) -> Self {
        Self::Scalar(ScalarType::new(kind))
    }

    pub fn array(element: Type) -> Self {
        Self::Array {
            element: Box::new(element),
            nullable: false,
        }
    }

    pub fn tuple(elements: Vec<Type>) -> Self {
        Self::Tuple {
            elements,
            nullable: false,
        }
    }

    /// Same type with the nullable flag set.
    pub fn into_nullable(mut self) -> Self {
        match &mut self {
            Self::Scalar(s) => s.nullable = true,
            Self::Array { nullable, .. } | Self::Tuple { nullable, .. } => *nullable = true,
        }
        self
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Scalar(s) => s.nullable,
            Self::Array { nullable, .. } | Self::Tuple { nullable, .. } => *nullable,
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Self::Tuple { .. })
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Number of nested `Array` levels starting at this type.
    pub fn array_depth(&self) -> usize {
        match self {
            Self::Array { element, .. } => 1 + element.array_depth(),
            _ => 0,
        }
    }

    /// Innermost non-array type.
    pub fn innermost(&self) -> &Type {
        match self {
            Self::Array { element, .. } => element.innermost(),
            other => other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nullable() {
            write!(f, "Nullable(")?;
        }
        match self {
            Type::Scalar(s) => write!(f, "{}", s)?,
            Type::Array { element, .. } => write!(f, "Array({})", element)?,
            Type::Tuple { elements, .. } => {
                write!(f, "Tuple(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, ")")?;
            }
        }
        if self.is_nullable() {
            write!(f, ")")?;
        }
        Ok(())
    }
}
