//! Network collaborators: Overpass (way discovery) and the OSM API
//! (element lookup and the changeset upload protocol)

pub mod osm_api;
pub mod overpass;

pub use osm_api::{ChangesetUpload, OsmApiClient, OsmElement};
pub use overpass::OverpassClient;
