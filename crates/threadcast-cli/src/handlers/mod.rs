//! Command handlers, one module per subcommand.

pub mod fetch;
pub mod narrate;
pub mod serve;
pub mod text;
pub mod voices;

use anyhow::Result;
use threadcast_core::ThreadPayload;

/// Print a payload as JSON on stdout; a degrade warning goes to stderr.
pub(crate) fn print_payload(payload: &ThreadPayload, pretty: bool) -> Result<()> {
    if let Some(warning) = &payload.warning {
        eprintln!("warning: {warning}");
    }
    let json = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    println!("{json}");
    Ok(())
}
