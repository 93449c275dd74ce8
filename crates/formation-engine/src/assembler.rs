//! Builds a complete `ProcessFormation` from an app snapshot.

use formation_core::{App, ProcessFormation};

use crate::codec::{self, FormationKeys, Scheme};
use crate::error::FormatError;
use crate::ports::discover_ports;

/// Output holding the balancer hostname shared by all processes.
pub const SHARED_BALANCER_OUTPUT: &str = "BalancerHost";

/// Assemble the current formation of `process` from `app`'s parameters and
/// outputs.
pub fn assemble(app: &App, process: &str) -> Result<ProcessFormation, FormatError> {
    let keys = FormationKeys::for_process(process);
    let scheme = Scheme::detect(&app.parameters, &keys);
    let settings = codec::decode_with(scheme, &app.parameters, process, &keys)?;

    Ok(ProcessFormation {
        name: process.to_string(),
        count: settings.count,
        cpu: settings.cpu,
        memory: settings.memory,
        ports: discover_ports(keys.prefix(), &app.parameters),
        balancer: resolve_balancer(app, &keys),
    })
}

/// First non-empty of the process-specific and the shared balancer output.
fn resolve_balancer(app: &App, keys: &FormationKeys) -> String {
    let specific = format!("Balancer{}Host", keys.prefix());
    [specific.as_str(), SHARED_BALANCER_OUTPUT]
        .iter()
        .filter_map(|name| app.outputs.get(*name))
        .find(|host| !host.is_empty())
        .cloned()
        .unwrap_or_default()
}
