//! Reading networks and starting points from disk.
//!
//! A network file is JSON of the form
//!
//! ```json
//! {
//!   "rows": [
//!     {"viaGlobalId": "e1", "fromGlobalId": "A", "toGlobalId": "B"}
//!   ],
//!   "controllers": [{"globalId": "A"}]
//! }
//! ```
//!
//! Ids may also be given as JSON numbers, in which case their literal text
//! is used. Starting points are a plain text file of whitespace-separated
//! ids, naming points or edges.
use std::fs;
use std::path::Path;
use std::time::Instant;

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::network::{Network, NetworkBuilder};

#[derive(Deserialize)]
#[serde(untagged)]
enum GlobalId {
    Text(String),
    Number(serde_json::Number),
}

impl GlobalId {
    fn into_string(self) -> String {
        match self {
            GlobalId::Text(s) => s,
            GlobalId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    via_global_id: GlobalId,
    from_global_id: GlobalId,
    to_global_id: GlobalId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Controller {
    global_id: GlobalId,
}

#[derive(Deserialize)]
struct NetworkFile {
    rows: Vec<Row>,
    #[serde(default)]
    controllers: Vec<Controller>,
}

pub fn parse_starting_ids(text: &str) -> FxHashSet<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

pub fn read_starting_ids(path: impl AsRef<Path>) -> Result<FxHashSet<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::StartingPoints {
        path: path.to_owned(),
        source,
    })?;
    Ok(parse_starting_ids(&text))
}

/// Build a network from the JSON text of a network file
pub fn parse_network<I, S>(json: &str, starting_ids: I) -> Result<Network>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let timer = Instant::now();
    let file: NetworkFile = serde_json::from_str(json)?;
    tracing::debug!(
        rows = file.rows.len(),
        controllers = file.controllers.len(),
        elapsed = ?timer.elapsed(),
        "parsed network"
    );

    let mut builder = NetworkBuilder::new(starting_ids);
    for row in file.rows {
        builder.add_edge(
            &row.from_global_id.into_string(),
            &row.to_global_id.into_string(),
            &row.via_global_id.into_string(),
        );
    }
    for controller in file.controllers {
        builder.mark_controller(&controller.global_id.into_string());
    }
    Ok(builder.finish_load())
}

impl Network {
    /// Read the starting points and then the network they refer to
    pub fn load(network: impl AsRef<Path>, starting_points: impl AsRef<Path>) -> Result<Self> {
        let starting_ids = read_starting_ids(starting_points)?;
        let path = network.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::NetworkFile {
            path: path.to_owned(),
            source,
        })?;
        parse_network(&json, starting_ids)
    }
}
