//! TIGER Review - interactive reviewer for TIGER-imported OSM road ways
//!
//! Fetches candidate ways from Overpass for a relation or bounding box,
//! walks through them one at a time with tag-editing commands, accumulates
//! finalized edits in an upload queue, and uploads everything as a single
//! OSM changeset.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiger_common::config::Settings;
use tiger_common::error::Error;
use tiger_common::services::{OsmApiClient, OverpassClient};
use tiger_common::upload::upload_changes;
use tiger_common::xml::ChangesetMeta;

mod prompt;
mod session;

use prompt::Command;
use session::ReviewSession;

/// Command-line arguments for tiger-review
#[derive(Parser, Debug)]
#[command(name = "tiger-review")]
#[command(about = "Review and fix TIGER-imported OSM road ways")]
#[command(version)]
struct Args {
    /// OSM relation id of the area to review
    #[arg(short, long, conflicts_with = "bbox")]
    relation: Option<u64>,

    /// Bounding box to review: south,west,north,east
    #[arg(short, long)]
    bbox: Option<String>,

    /// Path to a settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OAuth bearer token for the OSM API
    #[arg(long, env = "OSM_ACCESS_TOKEN")]
    token: Option<String>,

    /// Changeset comment
    #[arg(long)]
    comment: Option<String>,

    /// Imagery/source credit for the changeset
    #[arg(long)]
    source: Option<String>,
}

fn parse_bbox(text: &str) -> Result<[f64; 4]> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .context("bbox values must be numbers: south,west,north,east")?;
    if parts.len() != 4 {
        bail!("bbox needs exactly four values: south,west,north,east");
    }
    Ok([parts[0], parts[1], parts[2], parts[3]])
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiger_review=info,tiger_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting TIGER Review v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(args.config.as_deref())
        .context("Failed to load settings")?;
    if args.token.is_some() {
        settings.access_token = args.token.clone();
    }
    if let Some(comment) = &args.comment {
        settings.comment = comment.clone();
    }
    if let Some(source) = &args.source {
        settings.source = source.clone();
    }

    let overpass = OverpassClient::new(&settings.overpass_url)
        .context("Failed to build Overpass client")?;
    let osm_api = Arc::new(
        OsmApiClient::new(&settings.osm_api_url, settings.access_token.clone())
            .context("Failed to build OSM API client")?,
    );

    let ways = match (args.relation, &args.bbox) {
        (Some(relation), _) => {
            match osm_api.fetch_element("relation", relation).await {
                Ok(element) => {
                    let name = element.tags.get("name").map(String::as_str).unwrap_or("?");
                    info!(relation, name, "Reviewing relation");
                }
                Err(err) => warn!(relation, error = %err, "Could not look up relation"),
            }
            overpass
                .ways_in_relation(relation)
                .await
                .context("Error fetching OSM data")?
        }
        (None, Some(bbox)) => {
            let [south, west, north, east] = parse_bbox(bbox)?;
            overpass
                .ways_in_bbox(south, west, north, east)
                .await
                .context("Error fetching OSM data")?
        }
        (None, None) => bail!("Pass --relation <id> or --bbox <S,W,N,E> to pick an area"),
    };

    if ways.is_empty() {
        bail!("No ways found in the selected area");
    }

    let mut session = ReviewSession::new();
    session.load_ways(ways);

    if settings.access_token.is_none() {
        warn!("No OSM access token configured; uploading will fail until one is provided");
    }

    println!("{} ways to review. Type ? for help.", session.total_count());
    run_session(&mut session, &settings, osm_api).await?;
    Ok(())
}

async fn run_session(
    session: &mut ReviewSession,
    settings: &Settings,
    osm_api: Arc<OsmApiClient>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut shown = false;

    loop {
        if let Some(editor) = session.editor_ref() {
            if !shown {
                prompt::render_way(editor, session.reviewed_count(), session.total_count());
                shown = true;
            }
        } else if shown {
            println!(
                "Area completed: {} ways reviewed, {} queued for upload.",
                session.reviewed_count(),
                session.queue().len()
            );
            shown = false;
        }

        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let Some(command) = prompt::parse_command(&line) else {
            if !line.trim().is_empty() {
                println!("Unrecognized command. Type ? for help.");
            }
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Help => prompt::print_help(),

            Command::ShowQueue => {
                for (index, way) in session.queue().ways().iter().enumerate() {
                    println!("{:3}  way/{} {}", index, way.id, way.display_name());
                }
                println!("{} ways queued for upload.", session.queue().len());
            }
            Command::RemoveQueued(index) => {
                session.queue_mut().remove_at(index);
                println!("{} ways queued for upload.", session.queue().len());
            }
            Command::Discard => {
                print!("Discard {} queued edits? This cannot be undone (yes/no): ",
                    session.queue().len());
                io::stdout().flush()?;
                let mut answer = String::new();
                stdin.lock().read_line(&mut answer)?;
                if answer.trim() == "yes" {
                    session.queue_mut().clear();
                    println!("Queue discarded.");
                }
            }
            Command::Upload => {
                upload_queue(session, settings, Arc::clone(&osm_api)).await;
            }

            // everything below edits the current way
            editing_command => {
                let Some(editor) = session.editor() else {
                    println!("No way under review; u to upload, quit to exit.");
                    continue;
                };
                match editing_command {
                    Command::Surface(surface) => editor.set_surface(&surface),
                    Command::Lanes(lanes) => editor.set_lanes(&lanes),
                    Command::NoMarkings => editor.set_lane_markings(false),
                    Command::Directional { forward, backward } => {
                        editor.set_lanes_from_directional(forward, backward)
                    }
                    Command::RemoveLaneData => editor.remove_lane_data(),
                    Command::Quick(preset) => editor.apply_quick_tag(preset),
                    Command::SetTag(text) => {
                        // malformed text is logged and discarded, never applied
                        if let Err(err) = editor.apply_tag_text(&text) {
                            warn!(error = %err, "Tag update discarded");
                        }
                    }
                    Command::ClearTiger => editor.clear_tiger_tags(),
                    Command::Convert(conversion) => editor.set_driveway_conversion(conversion),
                    Command::AcceptNameFix
                    | Command::RejectNameFix
                    | Command::AcceptAbbreviation
                    | Command::RejectAbbreviation => {
                        prompt::apply_disposition(editor, &editing_command)
                    }

                    Command::Skip => {
                        session.advance();
                        shown = false;
                        continue;
                    }
                    Command::ClearTigerSubmit => {
                        let way = editor.finalize_clear_tiger();
                        session.enqueue_and_advance(way);
                        shown = false;
                        continue;
                    }
                    Command::Fix(reason) => match editor.finalize_fix(&reason) {
                        Ok(way) => {
                            session.enqueue_and_advance(way);
                            shown = false;
                            continue;
                        }
                        Err(err) => println!("{}", err),
                    },
                    Command::Submit => {
                        if !editor.can_submit() {
                            println!(
                                "Submit needs a surface and a resolved lane state (count or none)."
                            );
                        } else {
                            let way = editor.finalize_submit()?;
                            session.enqueue_and_advance(way);
                            shown = false;
                        }
                        continue;
                    }
                    _ => unreachable!("non-editing commands handled above"),
                }
                // re-render after an edit
                if let Some(editor) = session.editor_ref() {
                    prompt::render_way(editor, session.reviewed_count(), session.total_count());
                }
            }
        }
    }
    Ok(())
}

/// Upload the queue as one changeset. On success the queue is cleared; on
/// failure it is left intact so the user can retry without redoing edits.
async fn upload_queue(
    session: &mut ReviewSession,
    settings: &Settings,
    osm_api: Arc<OsmApiClient>,
) {
    if session.queue().is_empty() {
        println!("Nothing queued for upload.");
        return;
    }

    let meta = ChangesetMeta::new(&settings.comment)
        .with_source(&settings.source)
        .with_host(&settings.host);

    match upload_changes(osm_api, session.queue().ways(), &meta).await {
        Ok(changeset) => {
            println!(
                "Uploaded {} ways: https://www.openstreetmap.org/changeset/{}",
                session.queue().len(),
                changeset
            );
            session.queue_mut().clear();
        }
        Err(Error::ChangesetOrphaned { changeset, source }) => {
            warn!(changeset, error = %source, "Diff upload failed");
            println!(
                "Upload failed after changeset {} was created; it is empty and will \
                 auto-close on the server. Your edits are still queued - retry with u.",
                changeset
            );
        }
        Err(err) => {
            warn!(error = %err, "Changeset creation failed");
            println!("Upload failed: {}. Your edits are still queued - retry with u.", err);
        }
    }
}
