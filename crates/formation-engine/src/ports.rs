//! Host port discovery from `<Prefix>Port<N>Host` stack parameters.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// `<prefix>Port<ASCII digits>Host`, anchored. Greedy prefix so the last `Port`
/// segment is the one captured.
static PORT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)Port([0-9]+)Host$").expect("port key regex is valid"));

/// Collect the host ports bound for the process with the given key prefix.
///
/// Returns each port once, ascending. Keys that carry the prefix but do not
/// match the full pattern are ignored.
pub fn discover_ports(prefix: &str, parameters: &HashMap<String, String>) -> Vec<u16> {
    let mut ports = BTreeSet::new();

    for key in parameters.keys() {
        let Some(caps) = PORT_KEY.captures(key) else {
            continue;
        };
        if &caps[1] != prefix {
            continue;
        }
        match caps[2].parse::<u16>() {
            Ok(port) => {
                ports.insert(port);
            }
            Err(_) => debug!(%key, "ignoring port parameter outside port range"),
        }
    }

    ports.into_iter().collect()
}
