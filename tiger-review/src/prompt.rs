//! Line-oriented review prompt
//!
//! Renders the current way and parses single-line commands. The command
//! set mirrors the editing controls: surface picks, lane counts, quick
//! tags, the skip/fix/clear/submit dispositions, queue management and the
//! upload trigger.

use tiger_common::derive::{COMMON_SURFACES, OTHER_SURFACES};
use tiger_common::editor::{Disposition, DrivewayConversion, QuickTag, WayEditor};
use tiger_common::way;

/// A parsed prompt command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Surface(String),
    Lanes(String),
    NoMarkings,
    Directional { forward: u32, backward: u32 },
    RemoveLaneData,
    Quick(QuickTag),
    SetTag(String),
    ClearTiger,
    ClearTigerSubmit,
    AcceptNameFix,
    RejectNameFix,
    AcceptAbbreviation,
    RejectAbbreviation,
    Convert(Option<DrivewayConversion>),
    Skip,
    Fix(String),
    Submit,
    ShowQueue,
    RemoveQueued(usize),
    Upload,
    Discard,
    Help,
    Quit,
}

/// Parse one input line. Returns `None` for empty or unrecognized input.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => None,
        "1" => Some(Command::Quick(QuickTag::AsphaltNoMarkings)),
        "2" => Some(Command::Quick(QuickTag::CompactedNoMarkings)),
        "3" => Some(Command::Quick(QuickTag::AsphaltTwoLanes)),
        "surface" if !rest.is_empty() => Some(Command::Surface(rest.to_string())),
        "lanes" if !rest.is_empty() => Some(Command::Lanes(rest.to_string())),
        "none" => Some(Command::NoMarkings),
        "dir" => {
            let mut parts = rest.split_whitespace();
            let forward = parts.next()?.parse().ok()?;
            let backward = parts.next()?.parse().ok()?;
            Some(Command::Directional { forward, backward })
        }
        "nolanes" => Some(Command::RemoveLaneData),
        "set" if !rest.is_empty() => Some(Command::SetTag(rest.to_string())),
        "clear" => Some(Command::ClearTiger),
        "clearok" => Some(Command::ClearTigerSubmit),
        "name" => match rest {
            "accept" => Some(Command::AcceptNameFix),
            "reject" => Some(Command::RejectNameFix),
            _ => None,
        },
        "abbrev" => match rest {
            "accept" => Some(Command::AcceptAbbreviation),
            "reject" => Some(Command::RejectAbbreviation),
            _ => None,
        },
        "convert" => match rest {
            "driveway" => Some(Command::Convert(Some(DrivewayConversion::Driveway))),
            "track" => Some(Command::Convert(Some(DrivewayConversion::Track))),
            "no" => Some(Command::Convert(None)),
            _ => None,
        },
        "s" | "skip" => Some(Command::Skip),
        "f" | "fix" if !rest.is_empty() => Some(Command::Fix(rest.to_string())),
        "ok" | "submit" => Some(Command::Submit),
        "q" | "queue" => Some(Command::ShowQueue),
        "rm" => rest.parse().ok().map(Command::RemoveQueued),
        "u" | "upload" => Some(Command::Upload),
        "discard" => Some(Command::Discard),
        "h" | "help" | "?" => Some(Command::Help),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Render the current way for review
pub fn render_way(editor: &WayEditor, position: usize, total: usize) {
    let osm_way = editor.way();
    println!();
    println!(
        "── Way {}/{} ─ {} (https://www.openstreetmap.org/way/{})",
        position + 1,
        total,
        osm_way.display_name(),
        osm_way.id
    );
    println!("{}", way::format_tags_text(editor.working_tags()));

    if let Some(fix) = editor.numbered_name_fix() {
        println!(
            "! numbered name tag: move {}={} to alt_name? (name accept / name reject)",
            fix.key, fix.value
        );
    }
    if let Some(fix) = editor.abbreviation_fix() {
        println!(
            "! abbreviated name: expand {} to {} -> \"{}\"? (abbrev accept / abbrev reject)",
            fix.abbreviated, fix.expanded, fix.full_expanded
        );
    }
    if editor.is_unnamed_residential() {
        println!("! unnamed residential way: convert driveway / convert track?");
    }
    let stale = editor.unpaved_lane_keys();
    if !stale.is_empty() {
        println!(
            "! unpaved surface with lane tags ({}): they will be dropped on submit",
            stale.join(", ")
        );
    }

    let lanes = if !editor.lane_markings() {
        "no markings".to_string()
    } else if editor.lanes().is_empty() {
        "unset".to_string()
    } else {
        editor.lanes().to_string()
    };
    let surface = if editor.surface().is_empty() {
        "unset"
    } else {
        editor.surface()
    };
    println!("  surface: {} | lanes: {}", surface, lanes);
}

/// Apply an anomaly disposition command to the editor
pub fn apply_disposition(editor: &mut WayEditor, command: &Command) {
    match command {
        Command::AcceptNameFix => editor.set_name_fix_disposition(Disposition::Accept),
        Command::RejectNameFix => editor.set_name_fix_disposition(Disposition::Reject),
        Command::AcceptAbbreviation => editor.set_abbreviation_disposition(Disposition::Accept),
        Command::RejectAbbreviation => editor.set_abbreviation_disposition(Disposition::Reject),
        _ => {}
    }
}

pub fn print_help() {
    println!("Surfaces: surface <value> ({} | {})", COMMON_SURFACES.join("/"), OTHER_SURFACES.join("/"));
    println!("Lanes:    lanes <n> | none (no painted markings) | dir <fwd> <back> | nolanes");
    println!("Quick:    1 asphalt+no markings | 2 compacted+no markings | 3 asphalt+2 lanes");
    println!("Tags:     set key=value (empty value removes) | clear (drop tiger:*)");
    println!("Anomaly:  name accept|reject | abbrev accept|reject | convert driveway|track|no");
    println!("Actions:  ok submit | clearok submit with only tiger:* stripped | s skip");
    println!("Fix:      f <reason> (e.g. bad geometry, needs splitting, doesn't exist)");
    println!("Queue:    q show | rm <index> | u upload | discard | quit");
}
