//! Coordinate reference system resolution from `.prj` text
//!
//! A shapefile declares its CRS as WKT. OGC-flavoured WKT carries an
//! `AUTHORITY["EPSG","..."]` (WKT1) or `ID["EPSG",...]` (WKT2) on the root
//! node; ESRI-flavoured WKT usually carries only a name such as
//! `GCS_WGS_1984`. Resolution tries the authority first, then the name.

use std::collections::HashMap;

use regex::Regex;

use crate::domain::{DomainError, Epsg};

/// CRS declared by a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerCrs {
    /// Raw WKT as found in the `.prj`
    pub wkt: String,
    /// Name of the root node, e.g. `WGS 84 / Pseudo-Mercator`
    pub name: Option<String>,
    /// EPSG code attached to the root node
    pub authority: Option<Epsg>,
}

impl LayerCrs {
    pub fn from_wkt(wkt: &str) -> Self {
        let wkt = wkt.trim();
        Self {
            wkt: wkt.to_string(),
            name: root_name(wkt),
            authority: top_level_authority(wkt),
        }
    }

    /// Canonical WGS 84 declaration, attached after reprojection.
    pub fn wgs84() -> Self {
        Self {
            wkt: String::new(),
            name: Some("WGS 84".to_string()),
            authority: Some(Epsg::WGS84),
        }
    }

    /// Human readable name for messages.
    pub fn display_name(&self) -> String {
        match (&self.name, self.authority) {
            (Some(name), _) => name.clone(),
            (None, Some(epsg)) => epsg.to_string(),
            (None, None) => "unnamed CRS".to_string(),
        }
    }

    /// Resolve the EPSG code: root authority wins over the name lookup.
    pub fn resolve(&self, aliases: &CrsAliases) -> Result<Epsg, DomainError> {
        if let Some(epsg) = self.authority {
            return Ok(epsg);
        }
        self.name
            .as_deref()
            .and_then(|name| aliases.lookup(name))
            .ok_or_else(|| DomainError::UnresolvedCrs {
                name: self.display_name(),
            })
    }
}

const BUILTIN_ALIASES: &[(&str, u16)] = &[
    ("wgs_84", 4326),
    ("wgs84", 4326),
    ("wgs_1984", 4326),
    ("gcs_wgs_1984", 4326),
    ("wgs_84_pseudo_mercator", 3857),
    ("wgs_1984_web_mercator", 3857),
    ("wgs_1984_web_mercator_auxiliary_sphere", 3857),
    ("popular_visualisation_crs_mercator", 3857),
    ("google_maps_global_mercator", 3857),
    ("nad83", 4269),
    ("gcs_north_american_1983", 4269),
    ("etrs89", 4258),
    ("gcs_etrs_1989", 4258),
    ("etrs89_laea_europe", 3035),
    ("etrs89_extended_laea_europe", 3035),
    ("etrs_1989_laea", 3035),
    ("osgb36", 4277),
    ("osgb_1936", 4277),
    ("gcs_osgb_1936", 4277),
    ("osgb36_british_national_grid", 27700),
    ("osgb_1936_british_national_grid", 27700),
    ("rgf93_lambert_93", 2154),
    ("rgf_1993_lambert_93", 2154),
    ("ch1903_lv95", 2056),
    ("gda94", 4283),
    ("gcs_gda_1994", 4283),
];

/// Name → EPSG lookup for CRS declarations without an authority.
///
/// Names are compared after normalization (lowercase, runs of
/// non-alphanumerics collapsed to `_`), so `WGS 84 / Pseudo-Mercator` and
/// `WGS_84_Pseudo_Mercator` are the same key.
#[derive(Debug, Clone)]
pub struct CrsAliases {
    names: HashMap<String, Epsg>,
    utm_zone: Regex,
}

impl CrsAliases {
    /// Built-in table of common ESRI and OGC names, plus UTM zones.
    pub fn builtin() -> Self {
        let names = BUILTIN_ALIASES
            .iter()
            .map(|(name, code)| (name.to_string(), Epsg(*code)))
            .collect();
        Self {
            names,
            utm_zone: Regex::new(
                r"^(?:(wgs)_?(?:19)?84|(nad)_?(?:19)?83|(etrs)_?(?:19)?89)_utm_zone_(\d{1,2})([ns])$",
            )
            .expect("valid UTM zone pattern"),
        }
    }

    /// Add or override an alias.
    pub fn insert(&mut self, name: &str, epsg: Epsg) {
        self.names.insert(normalize_name(name), epsg);
    }

    pub fn with_extra<'a>(mut self, extra: impl IntoIterator<Item = (&'a String, &'a u16)>) -> Self {
        for (name, code) in extra {
            self.insert(name, Epsg(*code));
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Epsg> {
        let key = normalize_name(name);
        if let Some(epsg) = self.names.get(&key) {
            return Some(*epsg);
        }
        self.utm_zone_code(&key)
    }

    fn utm_zone_code(&self, key: &str) -> Option<Epsg> {
        let caps = self.utm_zone.captures(key)?;
        let zone: u16 = caps.get(4)?.as_str().parse().ok()?;
        let north = caps.get(5)?.as_str() == "n";

        let code = if caps.get(1).is_some() {
            if !(1..=60).contains(&zone) {
                return None;
            }
            if north {
                32600 + zone
            } else {
                32700 + zone
            }
        } else if caps.get(2).is_some() {
            if !north || !(1..=23).contains(&zone) {
                return None;
            }
            26900 + zone
        } else {
            if !north || !(28..=38).contains(&zone) {
                return None;
            }
            25800 + zone
        };
        Some(Epsg(code))
    }
}

impl Default for CrsAliases {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Name of the root WKT node: `PROJCS["<name>", ...]`.
fn root_name(wkt: &str) -> Option<String> {
    let open = wkt.find(['[', '('])?;
    let rest = &wkt[open + 1..];
    let start = rest.find('"')?;
    let rest = &rest[start + 1..];
    let end = rest.find('"')?;
    let name = rest[..end].trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// EPSG code attached directly to the root node.
///
/// Nested authorities (datum, spheroid, base GEOGCS) sit deeper than one
/// bracket level and are ignored. When several root-level authorities exist
/// the last one wins, matching WKT1 where AUTHORITY is the final element.
fn top_level_authority(wkt: &str) -> Option<Epsg> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut token_start = 0usize;
    let mut found = None;

    for (i, c) in wkt.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        match c {
            '[' | '(' => {
                let keyword = wkt[token_start..i].trim();
                if depth == 1
                    && (keyword.eq_ignore_ascii_case("AUTHORITY") || keyword.eq_ignore_ascii_case("ID"))
                {
                    if let Some(epsg) = parse_authority_args(&wkt[i + 1..]) {
                        found = Some(epsg);
                    }
                }
                depth += 1;
                token_start = i + 1;
            }
            ']' | ')' => {
                depth = depth.saturating_sub(1);
                token_start = i + 1;
            }
            ',' => token_start = i + 1,
            _ => {}
        }
    }
    found
}

/// Parse `"EPSG","3857"]` or `"EPSG",3857]`.
fn parse_authority_args(args: &str) -> Option<Epsg> {
    let end = args.find([']', ')'])?;
    let mut parts = args[..end].split(',');
    let authority = parts.next()?.trim().trim_matches('"');
    if !authority.eq_ignore_ascii_case("EPSG") {
        return None;
    }
    let code = parts.next()?.trim().trim_matches('"');
    code.parse().ok().map(Epsg)
}
