//! Tag Derivation Engine
//!
//! Given a fetched way's raw tag set, derives the initial editable fields
//! (surface, lane count, lane-markings flag, directional lane counts) and
//! detects anomalies that need user disposition: numbered name tags,
//! abbreviated street names, lane tags on unpaved surfaces, and unnamed
//! residential ways.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::way::Tags;

/// Surfaces offered as one-press buttons in the review prompt
pub const COMMON_SURFACES: &[&str] = &["asphalt", "compacted", "concrete"];

/// Additional surfaces offered behind the "other" pick
pub const OTHER_SURFACES: &[&str] = &["paved", "unpaved", "brick", "gravel", "ground"];

/// Surfaces on which lane tags are not applicable
pub const UNPAVED_SURFACES: &[&str] = &[
    "unpaved",
    "compacted",
    "gravel",
    "fine_gravel",
    "ground",
    "dirt",
    "earth",
    "grass",
    "sand",
    "mud",
];

/// Tag keys that encode lane information
pub const LANE_KEYS: &[&str] = &["lanes", "lanes:forward", "lanes:backward", "lane_markings"];

/// Initial values for the editable fields, derived from fetched tags.
///
/// `lane_markings: false` is the "no painted stripes" state; it is only
/// derived when the way carries `lane_markings=no` and no `lanes` count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorDefaults {
    pub surface: String,
    pub lanes: String,
    pub lane_markings: bool,
    pub lanes_forward: u32,
    pub lanes_backward: u32,
}

/// Derive the initial editable fields from a fetched tag set
pub fn derive_defaults(tags: &Tags) -> EditorDefaults {
    let surface = tags.get("surface").cloned().unwrap_or_default();
    let lanes = tags.get("lanes").cloned().unwrap_or_default();
    let lane_markings =
        !(lanes.is_empty() && tags.get("lane_markings").map(String::as_str) == Some("no"));
    let parse_count = |key: &str| {
        tags.get(key)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0)
    };
    EditorDefaults {
        surface,
        lanes,
        lane_markings,
        lanes_forward: parse_count("lanes:forward"),
        lanes_backward: parse_count("lanes:backward"),
    }
}

/// A `name_<n>` tag that should probably move to `alt_name`
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedNameFix {
    pub key: String,
    pub value: String,
}

static NUMBERED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^name_\d+$").unwrap());

/// Detect a lone numbered name tag (`name_1`, `name_2`, ...).
///
/// Only fires when exactly one such tag exists and `alt_name` is absent;
/// with several numbered names (or an occupied `alt_name`) there is no
/// obvious single destination, so the way is left for manual judgment.
pub fn numbered_name_fix(tags: &Tags) -> Option<NumberedNameFix> {
    if tags.contains_key("alt_name") {
        return None;
    }
    let mut numbered = tags.iter().filter(|(key, _)| NUMBERED_NAME.is_match(key));
    let (key, value) = numbered.next()?;
    if numbered.next().is_some() {
        return None;
    }
    Some(NumberedNameFix {
        key: key.clone(),
        value: value.clone(),
    })
}

/// A detected street-type abbreviation with its suggested expansion
#[derive(Debug, Clone, PartialEq)]
pub struct AbbreviationFix {
    pub abbreviated: String,
    pub expanded: String,
    pub full_original: String,
    pub full_expanded: String,
}

/// TIGER street-type abbreviations and their expanded forms
static STREET_ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Acc", "Access"),
        ("Aly", "Alley"),
        ("Anx", "Anex"),
        ("Arc", "Arcade"),
        ("Av", "Avenue"),
        ("Ave", "Avenue"),
        ("Byu", "Bayou"),
        ("Bch", "Beach"),
        ("Bnd", "Bend"),
        ("Blf", "Bluff"),
        ("Blfs", "Bluffs"),
        ("Btm", "Bottom"),
        ("Blvd", "Boulevard"),
        ("Br", "Branch"),
        ("Brg", "Bridge"),
        ("Brk", "Brook"),
        ("Brks", "Brooks"),
        ("Bg", "Burg"),
        ("Bgs", "Burgs"),
        ("Byp", "Bypass"),
        ("Cp", "Camp"),
        ("Cy", "Key"),
        ("Cyn", "Canyon"),
        ("Cpe", "Cape"),
        ("Ctr", "Center"),
        ("Ctrs", "Centers"),
        ("Cir", "Circle"),
        ("Cirs", "Circles"),
        ("Clf", "Cliff"),
        ("Clfs", "Cliffs"),
        ("Clb", "Club"),
        ("Cmn", "Common"),
        ("Cmns", "Commons"),
        ("Co", "County"),
        ("Cor", "Corner"),
        ("Cors", "Corners"),
        ("Crse", "Course"),
        ("Ct", "Court"),
        ("Cts", "Courts"),
        ("Cv", "Cove"),
        ("Cvs", "Coves"),
        ("Crk", "Creek"),
        ("Cres", "Crescent"),
        ("Crst", "Crest"),
        ("Cswy", "Causeway"),
        ("Curv", "Curve"),
        ("Dl", "Dale"),
        ("Dm", "Dam"),
        ("Dv", "Divide"),
        ("Dr", "Drive"),
        ("Drs", "Drives"),
        ("Est", "Estate"),
        ("Expy", "Expressway"),
        ("Expwy", "Expressway"),
        ("Ext", "Extension"),
        ("Exts", "Extensions"),
        ("Fgr", "Forge"),
        ("Fgrs", "Forges"),
        ("Fls", "Falls"),
        ("Fld", "Field"),
        ("Flds", "Fields"),
        ("Flt", "Flat"),
        ("Flts", "Flats"),
        ("Frd", "Ford"),
        ("Frds", "Fords"),
        ("Frst", "Forest"),
        ("Frg", "Forge"),
        ("Frgs", "Forges"),
        ("Frk", "Fork"),
        ("Frks", "Forks"),
        ("Fry", "Ferry"),
        ("Frys", "Ferrys"),
        ("For", "Ford"),
        ("Fors", "Fords"),
        ("Ft", "Fort"),
        ("Fwy", "Freeway"),
        ("Gd", "Grade"),
        ("Gdn", "Garden"),
        ("Gdns", "Gardens"),
        ("Gtwy", "Gateway"),
        ("Gln", "Glen"),
        ("Glns", "Glens"),
        ("Gn", "Green"),
        ("Gns", "Greens"),
        ("Grn", "Green"),
        ("Grns", "Greens"),
        ("Grv", "Grove"),
        ("Grvs", "Groves"),
        ("Hbr", "Harbor"),
        ("Hbrs", "Harbors"),
        ("Hgwy", "Highway"),
        ("Hvn", "Haven"),
        ("Hts", "Heights"),
        ("Hwy", "Highway"),
        ("Hl", "Hill"),
        ("Hls", "Hills"),
        ("Holw", "Hollow"),
        ("Inlt", "Inlet"),
        ("Is", "Island"),
        ("Iss", "Islands"),
        ("Jct", "Junction"),
        ("Jcts", "Junctions"),
        ("Ky", "Key"),
        ("Kys", "Keys"),
        ("Knl", "Knoll"),
        ("Knls", "Knolls"),
        ("Lk", "Lake"),
        ("Lks", "Lakes"),
        ("Lndg", "Landing"),
        ("Ln", "Lane"),
        ("Lgt", "Light"),
        ("Lgts", "Lights"),
        ("Lf", "Loaf"),
        ("Lck", "Lock"),
        ("Lcks", "Locks"),
        ("Ldg", "Lodge"),
        ("Lp", "Loop"),
        ("Mnr", "Manor"),
        ("Mnrs", "Manors"),
        ("Mdw", "Meadow"),
        ("Mdws", "Meadows"),
        ("Ml", "Mill"),
        ("Mls", "Mills"),
        ("Msn", "Mission"),
        ("Mtwy", "Motorway"),
        ("Mt", "Mount"),
        ("Mtn", "Mountain"),
        ("Mtns", "Mountains"),
        ("Nck", "Neck"),
        ("Orch", "Orchard"),
        ("Opas", "Overpass"),
        ("Pky", "Parkway"),
        ("Pkwy", "Parkway"),
        ("Psge", "Passage"),
        ("Pne", "Pine"),
        ("Pnes", "Pines"),
        ("Pl", "Place"),
        ("Pln", "Plain"),
        ("Plns", "Plains"),
        ("Plz", "Plaza"),
        ("Pt", "Point"),
        ("Pts", "Points"),
        ("Prt", "Port"),
        ("Prts", "Ports"),
        ("Pr", "Private"),
        ("Pvt", "Private"),
        ("Radl", "Radial"),
        ("Rnch", "Ranch"),
        ("Rpd", "Rapid"),
        ("Rpds", "Rapids"),
        ("Rst", "Rest"),
        ("Rdg", "Ridge"),
        ("Rdgs", "Ridges"),
        ("Riv", "River"),
        ("Rd", "Road"),
        ("Rds", "Roads"),
        ("Rt", "Route"),
        ("Rte", "Route"),
        ("Shl", "Shoal"),
        ("Shls", "Shoals"),
        ("Shr", "Shore"),
        ("Shrs", "Shores"),
        ("Skwy", "Skyway"),
        ("Spg", "Spring"),
        ("Spgs", "Springs"),
        ("Sq", "Square"),
        ("Sqs", "Squares"),
        ("Sta", "Station"),
        ("Strm", "Stream"),
        ("St", "Street"),
        ("Sts", "Streets"),
        ("Smt", "Summit"),
        ("Srvc", "Service"),
        ("Ter", "Terrace"),
        ("Trwy", "Throughway"),
        ("Thfr", "Thoroughfare"),
        ("Trce", "Trace"),
        ("Trak", "Track"),
        ("Trfy", "Trafficway"),
        ("Trl", "Trail"),
        ("Trlr", "Trailer"),
        ("Tunl", "Tunnel"),
        ("Tpke", "Turnpike"),
        ("Upas", "Underpass"),
        ("Unp", "Underpass"),
        ("Uns", "Unions"),
        ("Vias", "Viaducts"),
        ("Vly", "Valley"),
        ("Vlys", "Valleys"),
        ("Vw", "View"),
        ("Vws", "Views"),
        ("Vlg", "Village"),
        ("Vl", "Ville"),
        ("Wk", "Walk"),
        ("Wkwy", "Walkway"),
        ("Wy", "Way"),
        ("Wl", "Well"),
        ("Wls", "Wells"),
        ("Xing", "Crossing"),
        ("Xings", "Crossings"),
        ("Xrd", "Crossroad"),
        ("Xrds", "Crossroads"),
        ("Yu", "Bayou"),
    ])
});

// "St" and "Dr" are too ambiguous mid-name ("St Louis", "Dr King"): they
// only expand as the final token.
const END_ONLY_ABBREVIATIONS: &[&str] = &["St", "Dr"];

/// Detect an abbreviated street-type word in a `name` tag.
///
/// Tokens are scanned left to right (an optional trailing period is
/// ignored); the first qualifying abbreviation is expanded and scanning
/// stops, so at most one expansion is suggested per call. Returns `None`
/// when nothing qualifies.
pub fn detect_abbreviated_name(name: &str) -> Option<AbbreviationFix> {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        let bare = token.strip_suffix('.').unwrap_or(token);
        let Some(expanded) = STREET_ABBREVIATIONS.get(bare).copied() else {
            continue;
        };
        let is_last = i == tokens.len() - 1;
        if END_ONLY_ABBREVIATIONS.contains(&bare) && !is_last {
            continue;
        }
        let mut expanded_tokens = tokens.clone();
        expanded_tokens[i] = expanded;
        return Some(AbbreviationFix {
            abbreviated: bare.to_string(),
            expanded: expanded.to_string(),
            full_original: name.to_string(),
            full_expanded: expanded_tokens.join(" "),
        });
    }
    None
}

/// Lane tag keys present on a way whose surface is unpaved.
///
/// Painted lane markings do not survive on unpaved surfaces, so any of the
/// lane keys present are removal candidates.
pub fn unpaved_lane_keys<'t>(tags: &'t Tags, surface: &str) -> Vec<&'t str> {
    if !UNPAVED_SURFACES.contains(&surface) {
        return Vec::new();
    }
    LANE_KEYS
        .iter()
        .filter(|key| tags.contains_key(**key))
        .copied()
        .collect()
}

/// An unnamed `highway=residential` way is usually a driveway, service way
/// or track left over from the TIGER import.
pub fn is_unnamed_residential(tags: &Tags) -> bool {
    !tags.contains_key("name") && tags.get("highway").map(String::as_str) == Some("residential")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_from_surface_and_lanes() {
        let defaults = derive_defaults(&tags(&[("surface", "asphalt"), ("lanes", "2")]));
        assert_eq!(defaults.surface, "asphalt");
        assert_eq!(defaults.lanes, "2");
        assert!(defaults.lane_markings);
    }

    #[test]
    fn no_markings_sentinel_without_lanes() {
        let defaults = derive_defaults(&tags(&[("lane_markings", "no")]));
        assert_eq!(defaults.lanes, "");
        assert!(!defaults.lane_markings);
        assert_eq!(defaults.surface, "");
    }

    #[test]
    fn lanes_tag_wins_over_markings() {
        let defaults = derive_defaults(&tags(&[("lanes", "2"), ("lane_markings", "no")]));
        assert_eq!(defaults.lanes, "2");
        assert!(defaults.lane_markings);
    }

    #[test]
    fn directional_counts_parsed() {
        let defaults = derive_defaults(&tags(&[
            ("lanes", "3"),
            ("lanes:forward", "2"),
            ("lanes:backward", "1"),
        ]));
        assert_eq!(defaults.lanes_forward, 2);
        assert_eq!(defaults.lanes_backward, 1);
    }

    #[test]
    fn numbered_name_detected() {
        let fix = numbered_name_fix(&tags(&[("name", "Main Street"), ("name_1", "County Road 12")]))
            .unwrap();
        assert_eq!(fix.key, "name_1");
        assert_eq!(fix.value, "County Road 12");
    }

    #[test]
    fn numbered_name_skipped_with_alt_name_or_multiple() {
        assert!(numbered_name_fix(&tags(&[
            ("name_1", "County Road 12"),
            ("alt_name", "Old Road"),
        ]))
        .is_none());
        assert!(numbered_name_fix(&tags(&[
            ("name_1", "County Road 12"),
            ("name_2", "County Road 13"),
        ]))
        .is_none());
        assert!(numbered_name_fix(&tags(&[("name", "Main Street")])).is_none());
    }

    #[test]
    fn abbreviation_at_end() {
        let fix = detect_abbreviated_name("Main St").unwrap();
        assert_eq!(fix.abbreviated, "St");
        assert_eq!(fix.expanded, "Street");
        assert_eq!(fix.full_expanded, "Main Street");
    }

    #[test]
    fn end_only_abbreviation_ignored_mid_name() {
        // Leading "St" is not end-of-string, but "Ave" still expands.
        let fix = detect_abbreviated_name("St Louis Ave").unwrap();
        assert_eq!(fix.abbreviated, "Ave");
        assert_eq!(fix.full_expanded, "St Louis Avenue");
    }

    #[test]
    fn non_end_only_abbreviation_expands_anywhere() {
        let fix = detect_abbreviated_name("Old Hwy 20 North").unwrap();
        assert_eq!(fix.abbreviated, "Hwy");
        assert_eq!(fix.full_expanded, "Old Highway 20 North");
    }

    #[test]
    fn trailing_period_is_stripped() {
        let fix = detect_abbreviated_name("Oak Blvd.").unwrap();
        assert_eq!(fix.abbreviated, "Blvd");
        assert_eq!(fix.full_expanded, "Oak Boulevard");
    }

    #[test]
    fn no_abbreviation_no_match() {
        assert!(detect_abbreviated_name("Martin Luther King Boulevard").is_none());
        assert!(detect_abbreviated_name("St Louis").is_none());
    }

    #[test]
    fn only_first_match_expands() {
        let fix = detect_abbreviated_name("Hwy Ave").unwrap();
        assert_eq!(fix.abbreviated, "Hwy");
        assert_eq!(fix.full_expanded, "Highway Ave");
    }

    #[test]
    fn unpaved_lane_keys_flagged() {
        let t = tags(&[("lanes", "2"), ("lane_markings", "yes")]);
        let keys = unpaved_lane_keys(&t, "gravel");
        assert_eq!(keys, vec!["lanes", "lane_markings"]);
        assert!(unpaved_lane_keys(&t, "asphalt").is_empty());
        assert!(unpaved_lane_keys(&tags(&[("name", "x")]), "gravel").is_empty());
    }

    #[test]
    fn unnamed_residential_flagged() {
        assert!(is_unnamed_residential(&tags(&[("highway", "residential")])));
        assert!(!is_unnamed_residential(&tags(&[
            ("highway", "residential"),
            ("name", "Elm Street"),
        ])));
        assert!(!is_unnamed_residential(&tags(&[("highway", "track")])));
    }
}
