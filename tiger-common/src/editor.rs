//! Way editor: working tag set and finalize actions
//!
//! A `WayEditor` holds the pristine fetched way plus a working copy of its
//! tags and the editable fields. Edits never touch the fetched snapshot;
//! every finalize action (submit, fix, clear-tiger) builds a fresh `OsmWay`
//! by copy, so an unfinalized way stays re-editable and the pristine tags
//! remain available for diffing.

use crate::derive::{
    self, AbbreviationFix, EditorDefaults, NumberedNameFix, UNPAVED_SURFACES,
};
use crate::error::{Error, Result};
use crate::way::{self, OsmWay, Tags};

/// One-press surface + lane combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickTag {
    /// `surface=asphalt`, no painted lane markings
    AsphaltNoMarkings,
    /// `surface=compacted`, no painted lane markings
    CompactedNoMarkings,
    /// `surface=asphalt`, `lanes=2`
    AsphaltTwoLanes,
}

impl QuickTag {
    pub const ALL: [QuickTag; 3] = [
        QuickTag::AsphaltNoMarkings,
        QuickTag::CompactedNoMarkings,
        QuickTag::AsphaltTwoLanes,
    ];

    pub fn surface(&self) -> &'static str {
        match self {
            QuickTag::AsphaltNoMarkings | QuickTag::AsphaltTwoLanes => "asphalt",
            QuickTag::CompactedNoMarkings => "compacted",
        }
    }

    pub fn lanes(&self) -> Option<&'static str> {
        match self {
            QuickTag::AsphaltTwoLanes => Some("2"),
            _ => None,
        }
    }
}

/// Reclassification for an unnamed residential way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivewayConversion {
    /// `highway=service` + `service=driveway`
    Driveway,
    /// `highway=track`
    Track,
}

/// Per-anomaly user disposition, reset whenever the way changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Pending,
    Accept,
    Reject,
}

/// Editing state for a single way
#[derive(Debug, Clone)]
pub struct WayEditor {
    way: OsmWay,
    tags: Tags,
    surface: String,
    lanes: String,
    lane_markings: bool,
    lane_direction: bool,
    lanes_forward: u32,
    lanes_backward: u32,
    convert_driveway: Option<DrivewayConversion>,
    name_fix: Option<NumberedNameFix>,
    name_fix_disposition: Disposition,
    abbreviation: Option<AbbreviationFix>,
    abbreviation_disposition: Disposition,
}

impl WayEditor {
    /// Start editing a fetched way. The working state is seeded from the
    /// derived defaults and the anomaly detectors run once against the
    /// fetched tags.
    pub fn new(way: OsmWay) -> Self {
        let EditorDefaults {
            surface,
            lanes,
            lane_markings,
            lanes_forward,
            lanes_backward,
        } = derive::derive_defaults(&way.tags);
        let name_fix = derive::numbered_name_fix(&way.tags);
        let abbreviation = way
            .tags
            .get("name")
            .and_then(|name| derive::detect_abbreviated_name(name));
        let tags = way.tags.clone();
        WayEditor {
            way,
            tags,
            surface,
            lanes,
            lane_markings,
            lane_direction: false,
            lanes_forward,
            lanes_backward,
            convert_driveway: None,
            name_fix,
            name_fix_disposition: Disposition::Pending,
            abbreviation,
            abbreviation_disposition: Disposition::Pending,
        }
    }

    /// The pristine fetched way
    pub fn way(&self) -> &OsmWay {
        &self.way
    }

    /// The working tag set (fetched tags plus manual edits)
    pub fn working_tags(&self) -> &Tags {
        &self.tags
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn lanes(&self) -> &str {
        &self.lanes
    }

    pub fn lane_markings(&self) -> bool {
        self.lane_markings
    }

    pub fn numbered_name_fix(&self) -> Option<&NumberedNameFix> {
        self.name_fix.as_ref()
    }

    pub fn abbreviation_fix(&self) -> Option<&AbbreviationFix> {
        self.abbreviation.as_ref()
    }

    /// Lane tag keys flagged for removal because the picked surface is
    /// unpaved.
    pub fn unpaved_lane_keys(&self) -> Vec<&str> {
        derive::unpaved_lane_keys(&self.tags, &self.surface)
    }

    pub fn is_unnamed_residential(&self) -> bool {
        derive::is_unnamed_residential(&self.way.tags)
    }

    pub fn set_surface(&mut self, surface: &str) {
        self.surface = surface.to_string();
    }

    /// Set the total lane count. Lanes and "no markings" are mutually
    /// exclusive encodings, so a non-empty count clears the no-markings
    /// state.
    pub fn set_lanes(&mut self, lanes: &str) {
        self.lanes = lanes.to_string();
        if !self.lanes.is_empty() {
            self.lane_markings = true;
        }
    }

    /// Declare whether the road has painted lane markings. Declaring them
    /// absent clears any entered lane counts.
    pub fn set_lane_markings(&mut self, markings: bool) {
        self.lane_markings = markings;
        if !markings {
            self.lanes.clear();
            self.lane_direction = false;
            self.lanes_forward = 0;
            self.lanes_backward = 0;
        }
    }

    /// Set directional lane counts; the total is always recomputed from the
    /// two directions and is not independently settable while directional
    /// mode is active.
    pub fn set_lanes_from_directional(&mut self, forward: u32, backward: u32) {
        self.lane_direction = true;
        self.lanes_forward = forward;
        self.lanes_backward = backward;
        let total = forward + backward;
        self.lanes = if total == 0 {
            String::new()
        } else {
            total.to_string()
        };
        if total > 0 {
            self.lane_markings = true;
        }
    }

    /// Clear all lane state back to "unspecified" (the unpaved "remove lane
    /// data" action).
    pub fn remove_lane_data(&mut self) {
        self.lanes.clear();
        self.lane_markings = true;
        self.lane_direction = false;
        self.lanes_forward = 0;
        self.lanes_backward = 0;
    }

    /// Atomically apply a quick-tag preset, overwriting any partially
    /// entered surface/lane state.
    pub fn apply_quick_tag(&mut self, preset: QuickTag) {
        self.surface = preset.surface().to_string();
        self.lane_direction = false;
        self.lanes_forward = 0;
        self.lanes_backward = 0;
        match preset.lanes() {
            Some(count) => {
                self.lanes = count.to_string();
                self.lane_markings = true;
            }
            None => {
                self.lanes.clear();
                self.lane_markings = false;
            }
        }
    }

    pub fn set_driveway_conversion(&mut self, conversion: Option<DrivewayConversion>) {
        self.convert_driveway = conversion;
    }

    pub fn set_name_fix_disposition(&mut self, disposition: Disposition) {
        self.name_fix_disposition = disposition;
    }

    pub fn set_abbreviation_disposition(&mut self, disposition: Disposition) {
        self.abbreviation_disposition = disposition;
    }

    /// Remove every `tiger:*` key from the working tag set. Working-state
    /// only: the pristine fetched tags keep them for diff display, and the
    /// removal becomes final at upload serialization.
    pub fn clear_tiger_tags(&mut self) {
        self.tags = way::filter_tiger_tags(&self.tags, false);
    }

    /// Apply manual `key=value` tag edits. Malformed input is rejected
    /// before any line is applied, leaving the working set untouched.
    pub fn apply_tag_text(&mut self, text: &str) -> Result<()> {
        let updates = way::parse_tags_text(text)?;
        for (key, value) in updates {
            match value {
                Some(value) => {
                    self.tags.insert(key, value);
                }
                None => {
                    self.tags.remove(&key);
                }
            }
        }
        Ok(())
    }

    /// Whether submit preconditions hold: a surface is picked and the lane
    /// state is resolved (a count, or markings declared absent).
    pub fn can_submit(&self) -> bool {
        !self.surface.is_empty() && (!self.lanes.is_empty() || !self.lane_markings)
    }

    /// Finalize with the "submit" disposition.
    ///
    /// Produces a new way whose tags are the tiger-filtered working tags
    /// plus the picked surface and exactly one lane encoding (`lanes=<n>`
    /// or `lane_markings=no`), directional counts when directional mode was
    /// engaged, any accepted anomaly fixes, and the driveway conversion.
    /// Stale lane keys are dropped when the picked surface is unpaved.
    pub fn finalize_submit(&self) -> Result<OsmWay> {
        if !self.can_submit() {
            return Err(Error::InvalidInput(
                "submit requires a surface and a resolved lane state".to_string(),
            ));
        }

        let mut tags = way::filter_tiger_tags(&self.tags, false);

        if UNPAVED_SURFACES.contains(&self.surface.as_str()) {
            for key in derive::LANE_KEYS {
                tags.remove(*key);
            }
        }

        tags.insert("surface".to_string(), self.surface.clone());

        if !self.lanes.is_empty() {
            tags.insert("lanes".to_string(), self.lanes.clone());
            // lane_markings defaults to yes/absent once a count is given
            if tags.get("lane_markings").map(String::as_str) == Some("no") {
                tags.remove("lane_markings");
            }
            if self.lane_direction {
                if self.lanes_forward > 0 {
                    tags.insert("lanes:forward".to_string(), self.lanes_forward.to_string());
                }
                if self.lanes_backward > 0 {
                    tags.insert(
                        "lanes:backward".to_string(),
                        self.lanes_backward.to_string(),
                    );
                }
            }
        } else {
            tags.insert("lane_markings".to_string(), "no".to_string());
            tags.remove("lanes");
            tags.remove("lanes:forward");
            tags.remove("lanes:backward");
        }

        if self.name_fix_disposition == Disposition::Accept {
            if let Some(fix) = &self.name_fix {
                tags.remove(&fix.key);
                tags.insert("alt_name".to_string(), fix.value.clone());
            }
        }

        if self.abbreviation_disposition == Disposition::Accept {
            if let Some(fix) = &self.abbreviation {
                tags.insert("name".to_string(), fix.full_expanded.clone());
            }
        }

        match self.convert_driveway {
            Some(DrivewayConversion::Driveway) => {
                tags.insert("highway".to_string(), "service".to_string());
                tags.insert("service".to_string(), "driveway".to_string());
            }
            Some(DrivewayConversion::Track) => {
                tags.insert("highway".to_string(), "track".to_string());
            }
            None => {}
        }

        Ok(OsmWay {
            tags,
            ..self.way.clone()
        })
    }

    /// Finalize with the "fix" disposition: record the reason under
    /// `fixme:tigerking` and keep `tiger:reviewed` so the way stays in
    /// review queries. Surface and lane state are deliberately untouched.
    pub fn finalize_fix(&self, reason: &str) -> Result<OsmWay> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::InvalidInput("fix reason must not be empty".to_string()));
        }
        let mut tags = way::filter_tiger_tags(&self.tags, true);
        tags.insert("fixme:tigerking".to_string(), reason.to_string());
        Ok(OsmWay {
            tags,
            ..self.way.clone()
        })
    }

    /// Finalize by stripping TIGER tags and changing nothing else
    pub fn finalize_clear_tiger(&self) -> OsmWay {
        OsmWay {
            tags: way::filter_tiger_tags(&self.tags, false),
            ..self.way.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_way(pairs: &[(&str, &str)]) -> OsmWay {
        OsmWay {
            id: 100,
            version: 2,
            nodes: vec![1, 2, 3],
            tags: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            bounds: None,
            geometry: Vec::new(),
            user: None,
        }
    }

    fn tag<'w>(way: &'w OsmWay, key: &str) -> Option<&'w str> {
        way.tags.get(key).map(String::as_str)
    }

    #[test]
    fn submit_refused_without_surface() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential")]));
        editor.set_lanes("2");
        assert!(!editor.can_submit());
        assert!(editor.finalize_submit().is_err());
    }

    #[test]
    fn submit_refused_with_markings_but_no_count() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential")]));
        editor.set_surface("asphalt");
        // markings still expected, no count given
        assert!(!editor.can_submit());
        assert!(editor.finalize_submit().is_err());
    }

    #[test]
    fn submit_writes_surface_and_lanes() {
        let mut editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("tiger:reviewed", "no"),
        ]));
        editor.set_surface("asphalt");
        editor.set_lanes("2");
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "surface"), Some("asphalt"));
        assert_eq!(tag(&finalized, "lanes"), Some("2"));
        assert_eq!(tag(&finalized, "lane_markings"), None);
        assert_eq!(tag(&finalized, "tiger:reviewed"), None);
        // pristine copy untouched
        assert_eq!(editor.way().tags.get("tiger:reviewed").map(String::as_str), Some("no"));
    }

    #[test]
    fn submit_writes_no_markings_encoding() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential"), ("lanes", "2")]));
        editor.set_surface("asphalt");
        editor.set_lane_markings(false);
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "lane_markings"), Some("no"));
        assert_eq!(tag(&finalized, "lanes"), None);
    }

    #[test]
    fn lane_encoding_is_exclusive_after_finalize() {
        // fetched lane_markings=no must not survive next to a new count
        let mut editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("lane_markings", "no"),
        ]));
        editor.set_surface("asphalt");
        editor.set_lanes("2");
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "lanes"), Some("2"));
        assert_eq!(tag(&finalized, "lane_markings"), None);
    }

    #[test]
    fn directional_counts_recompute_total() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential")]));
        editor.set_surface("asphalt");
        editor.set_lanes_from_directional(2, 1);
        assert_eq!(editor.lanes(), "3");
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "lanes"), Some("3"));
        assert_eq!(tag(&finalized, "lanes:forward"), Some("2"));
        assert_eq!(tag(&finalized, "lanes:backward"), Some("1"));
    }

    #[test]
    fn directional_counts_not_persisted_without_directional_mode() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential")]));
        editor.set_surface("asphalt");
        editor.set_lanes("2");
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "lanes:forward"), None);
        assert_eq!(tag(&finalized, "lanes:backward"), None);
    }

    #[test]
    fn quick_tag_overwrites_partial_state() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential")]));
        editor.set_surface("concrete");
        editor.set_lanes_from_directional(1, 1);
        editor.apply_quick_tag(QuickTag::CompactedNoMarkings);
        assert_eq!(editor.surface(), "compacted");
        assert_eq!(editor.lanes(), "");
        assert!(!editor.lane_markings());
        assert!(editor.can_submit());
    }

    #[test]
    fn unpaved_submit_drops_stale_lane_keys() {
        let mut editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("lanes:forward", "1"),
            ("lane_markings", "yes"),
        ]));
        editor.apply_quick_tag(QuickTag::CompactedNoMarkings);
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "lanes:forward"), None);
        assert_eq!(tag(&finalized, "surface"), Some("compacted"));
        assert_eq!(tag(&finalized, "lane_markings"), Some("no"));
    }

    #[test]
    fn fix_sets_reason_and_keeps_reviewed() {
        let editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("tiger:reviewed", "no"),
            ("tiger:cfcc", "A41"),
        ]));
        let finalized = editor.finalize_fix("needs splitting").unwrap();
        assert_eq!(tag(&finalized, "fixme:tigerking"), Some("needs splitting"));
        assert_eq!(tag(&finalized, "tiger:reviewed"), Some("no"));
        assert_eq!(tag(&finalized, "tiger:cfcc"), None);
        assert_eq!(tag(&finalized, "surface"), None);
    }

    #[test]
    fn fix_rejects_blank_reason() {
        let editor = WayEditor::new(test_way(&[("highway", "residential")]));
        assert!(editor.finalize_fix("   ").is_err());
    }

    #[test]
    fn clear_tiger_strips_everything_tiger() {
        let editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("tiger:reviewed", "no"),
            ("tiger:county", "Travis, TX"),
        ]));
        let finalized = editor.finalize_clear_tiger();
        assert_eq!(finalized.tags.len(), 1);
        assert_eq!(tag(&finalized, "highway"), Some("residential"));
    }

    #[test]
    fn accepted_name_fix_moves_to_alt_name() {
        let mut editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("name", "Main Street"),
            ("name_1", "County Road 12"),
        ]));
        editor.set_surface("asphalt");
        editor.set_lanes("2");
        editor.set_name_fix_disposition(Disposition::Accept);
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "name_1"), None);
        assert_eq!(tag(&finalized, "alt_name"), Some("County Road 12"));
    }

    #[test]
    fn rejected_name_fix_leaves_tag_alone() {
        let mut editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("name", "Main Street"),
            ("name_1", "County Road 12"),
        ]));
        editor.set_surface("asphalt");
        editor.set_lanes("2");
        editor.set_name_fix_disposition(Disposition::Reject);
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "name_1"), Some("County Road 12"));
        assert_eq!(tag(&finalized, "alt_name"), None);
    }

    #[test]
    fn accepted_abbreviation_expands_name() {
        let mut editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("name", "Main St"),
        ]));
        editor.set_surface("asphalt");
        editor.set_lanes("2");
        editor.set_abbreviation_disposition(Disposition::Accept);
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "name"), Some("Main Street"));
    }

    #[test]
    fn driveway_conversion_rewrites_highway() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential")]));
        editor.set_surface("asphalt");
        editor.set_lane_markings(false);
        editor.set_driveway_conversion(Some(DrivewayConversion::Driveway));
        let finalized = editor.finalize_submit().unwrap();
        assert_eq!(tag(&finalized, "highway"), Some("service"));
        assert_eq!(tag(&finalized, "service"), Some("driveway"));
    }

    #[test]
    fn manual_tag_edits_hit_working_copy_only() {
        let mut editor = WayEditor::new(test_way(&[
            ("highway", "residential"),
            ("maxspeed", "25 mph"),
        ]));
        editor.apply_tag_text("maxspeed=\nname=Elm Street").unwrap();
        assert!(!editor.working_tags().contains_key("maxspeed"));
        assert_eq!(
            editor.working_tags().get("name").map(String::as_str),
            Some("Elm Street")
        );
        // pristine snapshot keeps the original tags
        assert!(editor.way().tags.contains_key("maxspeed"));
    }

    #[test]
    fn malformed_tag_text_discards_update() {
        let mut editor = WayEditor::new(test_way(&[("highway", "residential")]));
        let before = editor.working_tags().clone();
        assert!(editor.apply_tag_text("name=Elm Street\nbroken line").is_err());
        // a later malformed line must not leave earlier lines applied
        assert_eq!(editor.working_tags(), &before);
    }
}
