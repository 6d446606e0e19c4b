//! Result sink: drains completed probes to line-oriented output.

use std::io::Write;

use tokio::sync::mpsc::Receiver;

use crate::probe::ProbeResult;

/// Writes one `origin,host,resolves,present` line per result, in arrival
/// order, until the channel is closed and drained.
///
/// Arrival order is completion order, not input order; each line carries its
/// own origin/host pair so no reordering buffer is needed. With
/// `emit_fields` set, the literal [`ProbeResult::FIELDS`] line precedes the
/// first data line.
///
/// Returns the number of data lines emitted.
///
/// # Errors
///
/// Returns the underlying I/O error if writing to `out` fails.
pub async fn drain_results<W: Write>(
    mut results: Receiver<ProbeResult>,
    emit_fields: bool,
    mut out: W,
) -> std::io::Result<usize> {
    let mut first = true;
    let mut emitted = 0usize;

    while let Some(result) = results.recv().await {
        if emit_fields && first {
            writeln!(out, "{}", ProbeResult::FIELDS)?;
        }
        first = false;
        writeln!(out, "{result}")?;
        emitted += 1;
    }

    out.flush()?;
    Ok(emitted)
}
