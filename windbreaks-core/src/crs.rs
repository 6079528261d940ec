//! Coordinate reference systems and their axis units.
//!
//! Only the systems the project works with are known by EPSG code. Anything
//! else can be described with [`Crs::Custom`], which names the linear or
//! angular unit directly and keeps the `.prj` text it was read from.

use std::fmt;

use thiserror::Error;

/// Unit of a CRS's first axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisUnit {
    /// Angular degrees: a geographic CRS.
    Degree,
    /// Metres.
    Meter,
    /// International foot (0.3048 m).
    Foot,
    /// US survey foot (1200/3937 m).
    UsSurveyFoot,
}

impl AxisUnit {
    /// Lower-case unit name as used by the buffer distance rules.
    ///
    /// # Examples
    /// ```
    /// use windbreaks_core::AxisUnit;
    ///
    /// assert_eq!(AxisUnit::UsSurveyFoot.name(), "us survey foot");
    /// ```
    pub const fn name(self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Meter => "meter",
            Self::Foot => "foot",
            Self::UsSurveyFoot => "us survey foot",
        }
    }

    /// Recognise a unit name, ignoring case and the common spelling variants.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalised = name.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalised.as_str() {
            "degree" | "degrees" => Some(Self::Degree),
            "meter" | "metre" | "meters" | "metres" | "m" => Some(Self::Meter),
            "foot" | "feet" | "ft" | "international foot" | "foot international" => {
                Some(Self::Foot)
            }
            "us survey foot" | "foot us" | "us foot" | "ftus" | "us survey feet" => {
                Some(Self::UsSurveyFoot)
            }
            _ => None,
        }
    }

    /// Whether the unit is one of the foot variants.
    pub const fn is_foot(self) -> bool {
        matches!(self, Self::Foot | Self::UsSurveyFoot)
    }

    /// Size of one unit in its SI base (radians for degrees, metres otherwise).
    pub const fn conversion_factor(self) -> f64 {
        match self {
            Self::Degree => 0.017_453_292_519_943_3,
            Self::Meter => 1.0,
            Self::Foot => 0.3048,
            Self::UsSurveyFoot => 0.304_800_609_601_219,
        }
    }

    fn wkt_name(self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Meter => "metre",
            Self::Foot => "foot",
            Self::UsSurveyFoot => "US survey foot",
        }
    }
}

impl fmt::Display for AxisUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Datum {
    Wgs84,
    Nad83,
    Nad83Nsrs2011,
    Nad27,
}

impl Datum {
    const fn geographic_name(self) -> &'static str {
        match self {
            Self::Wgs84 => "WGS 84",
            Self::Nad83 => "NAD83",
            Self::Nad83Nsrs2011 => "NAD83(2011)",
            Self::Nad27 => "NAD27",
        }
    }

    const fn datum_wkt(self) -> &'static str {
        match self {
            Self::Wgs84 => r#"DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]"#,
            Self::Nad83 => {
                r#"DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101]]"#
            }
            Self::Nad83Nsrs2011 => {
                r#"DATUM["NAD83_National_Spatial_Reference_System_2011",SPHEROID["GRS 1980",6378137,298.257222101]]"#
            }
            Self::Nad27 => {
                r#"DATUM["North_American_Datum_1927",SPHEROID["Clarke 1866",6378206.4,294.978698213898]]"#
            }
        }
    }

    fn geogcs_wkt(self) -> String {
        format!(
            r#"GEOGCS["{}",{},PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#,
            self.geographic_name(),
            self.datum_wkt()
        )
    }
}

#[derive(Debug)]
struct EpsgEntry {
    code: u32,
    name: &'static str,
    unit: AxisUnit,
    datum: Datum,
}

const fn entry(code: u32, name: &'static str, unit: AxisUnit, datum: Datum) -> EpsgEntry {
    EpsgEntry {
        code,
        name,
        unit,
        datum,
    }
}

const NAD83: EpsgEntry = entry(Crs::NAD83_EPSG, "NAD83", AxisUnit::Degree, Datum::Nad83);
const WORLD_MERCATOR: EpsgEntry = entry(
    Crs::WORLD_MERCATOR_EPSG,
    "WGS 84 / World Mercator",
    AxisUnit::Meter,
    Datum::Wgs84,
);

const EPSG_TABLE: &[EpsgEntry] = &[
    entry(4326, "WGS 84", AxisUnit::Degree, Datum::Wgs84),
    NAD83,
    entry(4267, "NAD27", AxisUnit::Degree, Datum::Nad27),
    entry(6318, "NAD83(2011)", AxisUnit::Degree, Datum::Nad83Nsrs2011),
    WORLD_MERCATOR,
    entry(3857, "WGS 84 / Pseudo-Mercator", AxisUnit::Meter, Datum::Wgs84),
    entry(5070, "NAD83 / Conus Albers", AxisUnit::Meter, Datum::Nad83),
    entry(6350, "NAD83(2011) / Conus Albers", AxisUnit::Meter, Datum::Nad83Nsrs2011),
    entry(26914, "NAD83 / UTM zone 14N", AxisUnit::Meter, Datum::Nad83),
    entry(26915, "NAD83 / UTM zone 15N", AxisUnit::Meter, Datum::Nad83),
    entry(32614, "WGS 84 / UTM zone 14N", AxisUnit::Meter, Datum::Wgs84),
    entry(32615, "WGS 84 / UTM zone 15N", AxisUnit::Meter, Datum::Wgs84),
    entry(2222, "NAD83 / Arizona East (ft)", AxisUnit::Foot, Datum::Nad83),
    entry(2223, "NAD83 / Arizona Central (ft)", AxisUnit::Foot, Datum::Nad83),
    entry(2224, "NAD83 / Arizona West (ft)", AxisUnit::Foot, Datum::Nad83),
    entry(2227, "NAD83 / California zone 3 (ftUS)", AxisUnit::UsSurveyFoot, Datum::Nad83),
    entry(2263, "NAD83 / New York Long Island (ftUS)", AxisUnit::UsSurveyFoot, Datum::Nad83),
    entry(2264, "NAD83 / North Carolina (ftUS)", AxisUnit::UsSurveyFoot, Datum::Nad83),
    entry(2277, "NAD83 / Texas Central (ftUS)", AxisUnit::UsSurveyFoot, Datum::Nad83),
    entry(3418, "NAD83 / Kansas North (ftUS)", AxisUnit::UsSurveyFoot, Datum::Nad83),
    entry(3419, "NAD83 / Kansas South (ftUS)", AxisUnit::UsSurveyFoot, Datum::Nad83),
];

fn lookup(code: u32) -> Option<&'static EpsgEntry> {
    EPSG_TABLE.iter().find(|entry| entry.code == code)
}

/// An EPSG code present in the built-in table.
///
/// Only [`Crs::from_epsg`] and the named constructors produce one.
#[derive(Clone, Copy)]
pub struct EpsgCode(&'static EpsgEntry);

impl EpsgCode {
    /// The numeric code.
    pub const fn get(self) -> u32 {
        self.0.code
    }

    const fn entry(self) -> &'static EpsgEntry {
        self.0
    }
}

impl PartialEq for EpsgCode {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for EpsgCode {}

impl std::hash::Hash for EpsgCode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}

impl fmt::Debug for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EpsgCode").field(&self.get()).finish()
    }
}

impl fmt::Display for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.get())
    }
}

/// A coordinate reference system.
///
/// # Examples
/// ```
/// use windbreaks_core::{AxisUnit, Crs};
///
/// # fn main() -> Result<(), windbreaks_core::CrsError> {
/// let crs = Crs::from_epsg(3419)?;
/// assert_eq!(crs.axis_unit(), AxisUnit::UsSurveyFoot);
/// assert_eq!(Crs::nad83().unit_name(), "degree");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Crs {
    /// A system from the built-in EPSG table.
    Epsg(EpsgCode),
    /// A system known only by name and axis unit.
    Custom {
        /// Display name.
        name: String,
        /// Unit of the first axis.
        unit: AxisUnit,
        /// The `.prj` text the system was read from, written back unchanged.
        definition: Option<String>,
    },
}

/// Errors raised when resolving a CRS.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrsError {
    /// The EPSG code is not in the built-in table.
    #[error("EPSG:{code} is not a supported coordinate reference system")]
    UnknownEpsg {
        /// The rejected code.
        code: u32,
    },
    /// A `.prj` string did not describe a recognisable CRS.
    #[error("unrecognised projection definition: {reason}")]
    UnrecognisedPrj {
        /// What was missing from the definition.
        reason: &'static str,
    },
}

/// Human-readable CRS description: name, EPSG code and unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsSummary {
    /// CRS name.
    pub name: String,
    /// EPSG code when the CRS has one.
    pub epsg: Option<u32>,
    /// Unit of the first axis.
    pub unit: AxisUnit,
}

impl Crs {
    /// EPSG code of NAD83 geographic.
    pub const NAD83_EPSG: u32 = 4269;
    /// EPSG code of WGS 84 / World Mercator.
    pub const WORLD_MERCATOR_EPSG: u32 = 3395;

    /// Resolve an EPSG code against the built-in table.
    pub fn from_epsg(code: u32) -> Result<Self, CrsError> {
        lookup(code)
            .map(|entry| Self::Epsg(EpsgCode(entry)))
            .ok_or(CrsError::UnknownEpsg { code })
    }

    /// Geographic NAD83 (EPSG:4269), the default for ingested records.
    pub const fn nad83() -> Self {
        Self::Epsg(EpsgCode(&NAD83))
    }

    /// WGS 84 / World Mercator (EPSG:3395).
    pub const fn world_mercator() -> Self {
        Self::Epsg(EpsgCode(&WORLD_MERCATOR))
    }

    /// Describe a CRS that is not in the EPSG table.
    pub fn custom(name: impl Into<String>, unit: AxisUnit) -> Self {
        Self::Custom {
            name: name.into(),
            unit,
            definition: None,
        }
    }

    fn entry(&self) -> Option<&'static EpsgEntry> {
        match self {
            Self::Epsg(code) => Some(code.entry()),
            Self::Custom { .. } => None,
        }
    }

    /// Unit of the first axis.
    pub fn axis_unit(&self) -> AxisUnit {
        match self {
            Self::Epsg(code) => code.entry().unit,
            Self::Custom { unit, .. } => *unit,
        }
    }

    /// Lower-case name of the first axis unit.
    pub fn unit_name(&self) -> &'static str {
        self.axis_unit().name()
    }

    /// Whether coordinates are angular.
    pub fn is_geographic(&self) -> bool {
        self.axis_unit() == AxisUnit::Degree
    }

    /// EPSG code, when the CRS has one.
    pub const fn epsg(&self) -> Option<u32> {
        match self {
            Self::Epsg(code) => Some(code.get()),
            Self::Custom { .. } => None,
        }
    }

    /// Display name.
    pub fn name(&self) -> String {
        match self {
            Self::Epsg(code) => code.entry().name.to_owned(),
            Self::Custom { name, .. } => name.clone(),
        }
    }

    /// Name, EPSG code and unit in one value.
    pub fn describe(&self) -> CrsSummary {
        CrsSummary {
            name: self.name(),
            epsg: self.epsg(),
            unit: self.axis_unit(),
        }
    }

    /// Render the CRS as WKT for a `.prj` sidecar.
    ///
    /// Projected systems carry their base geographic CRS, linear unit and
    /// EPSG authority; projection parameters are left to the authority code.
    /// A custom system read from a `.prj` is written back verbatim.
    pub fn to_wkt(&self) -> String {
        if let Self::Custom {
            definition: Some(definition),
            ..
        } = self
        {
            return definition.clone();
        }
        let unit = self.axis_unit();
        match self.entry() {
            Some(entry) if unit == AxisUnit::Degree => format!(
                r#"GEOGCS["{}",{},PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","{}"]]"#,
                entry.name,
                entry.datum.datum_wkt(),
                entry.code
            ),
            Some(entry) => format!(
                r#"PROJCS["{}",{},UNIT["{}",{}],AUTHORITY["EPSG","{}"]]"#,
                entry.name,
                entry.datum.geogcs_wkt(),
                unit.wkt_name(),
                unit.conversion_factor(),
                entry.code
            ),
            None if unit == AxisUnit::Degree => format!(
                r#"GEOGCS["{}",PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#,
                self.name()
            ),
            None => format!(
                r#"PROJCS["{}",UNIT["{}",{}]]"#,
                self.name(),
                unit.wkt_name(),
                unit.conversion_factor()
            ),
        }
    }

    /// Recognise a `.prj` definition.
    ///
    /// The outermost EPSG authority wins when it is in the built-in table.
    /// Otherwise the CRS is rebuilt from the top-level name and the last
    /// `UNIT` entry, which in WKT1 belongs to the outermost system, and the
    /// definition itself is kept for [`Crs::to_wkt`].
    pub fn from_prj(definition: &str) -> Result<Self, CrsError> {
        let trimmed = definition.trim();
        if let Some(code) = last_quoted_after(trimmed, r#"AUTHORITY["EPSG",""#)
            .and_then(|raw| raw.parse::<u32>().ok())
            && let Ok(crs) = Self::from_epsg(code)
        {
            return Ok(crs);
        }

        let name = first_quoted_after(trimmed, "[\"").ok_or(CrsError::UnrecognisedPrj {
            reason: "missing CRS name",
        })?;
        let unit = if trimmed.starts_with("GEOGCS") || trimmed.starts_with("GEOGCRS") {
            AxisUnit::Degree
        } else {
            last_quoted_after(trimmed, "UNIT[\"")
                .and_then(AxisUnit::from_name)
                .ok_or(CrsError::UnrecognisedPrj {
                    reason: "missing or unknown linear unit",
                })?
        };
        Ok(Self::Custom {
            name: name.to_owned(),
            unit,
            definition: Some(trimmed.to_owned()),
        })
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epsg(code) => fmt::Display::fmt(code, f),
            Self::Custom { name, .. } => f.write_str(name),
        }
    }
}

fn quoted_prefix(rest: &str) -> Option<&str> {
    rest.split_once('"').map(|(value, _)| value)
}

fn first_quoted_after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    haystack
        .split_once(marker)
        .and_then(|(_, rest)| quoted_prefix(rest))
}

fn last_quoted_after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    haystack
        .rsplit_once(marker)
        .and_then(|(_, rest)| quoted_prefix(rest))
}
