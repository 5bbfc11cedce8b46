//! Progress normalization into job records

use super::store::JobStore;
use crate::fetcher::{ProgressEvent, ProgressPhase, ProgressSink};
use crate::types::JobId;

/// Writes engine progress into one job's record
///
/// Percentages only ever move forward: a value lower than the stored one
/// (a second stream starting at 0%, say) is ignored. Events arriving after
/// the job reached a terminal state are dropped.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    store: JobStore,
    id: JobId,
}

impl ProgressReporter {
    /// Reporter for the job with this id
    pub fn new(store: JobStore, id: JobId) -> Self {
        Self { store, id }
    }

    /// Job this reporter writes to
    pub fn job_id(&self) -> JobId {
        self.id
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, event: ProgressEvent) {
        let value = match event.phase {
            ProgressPhase::Downloading => {
                match event.percent.as_deref().and_then(parse_percent) {
                    Some(value) => value,
                    None => {
                        tracing::trace!(
                            job_id = %self.id,
                            raw = ?event.percent,
                            "Ignoring unparseable progress"
                        );
                        return;
                    }
                }
            }
            ProgressPhase::Finished => 100.0,
            ProgressPhase::Other(_) => return,
        };

        self.store.update(self.id, |record| {
            if record.is_terminal() {
                return;
            }
            if value > record.progress {
                record.progress = value;
            }
        });
    }
}

/// Parse an engine percentage token such as `" 45.2%"`
///
/// Terminal escape sequences are removed, then every character other than
/// digits, `.` and `%` is dropped and surrounding `%` signs are trimmed. The
/// result is clamped to `0.0..=100.0`. Returns `None` if nothing numeric is
/// left (e.g. `"N/A"`).
pub fn parse_percent(raw: &str) -> Option<f64> {
    let cleaned: String = strip_escape_sequences(raw)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '%')
        .collect();

    let value: f64 = cleaned.trim_matches('%').parse().ok()?;
    Some(value.clamp(0.0, 100.0))
}

fn strip_escape_sequences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('\x1b') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        // A malformed sequence loses only its ESC; the digit filter handles the rest
        rest = csi_len(after).map_or(after, |len| &after[len..]);
    }
    out.push_str(rest);
    out
}

/// Byte length of a CSI sequence (`[`, `[0-9;]*`, final letter) at the start of `s`
fn csi_len(s: &str) -> Option<usize> {
    let params = s.strip_prefix('[')?;
    let end = params.find(|c: char| !(c.is_ascii_digit() || c == ';'))?;
    params[end..].chars().next().filter(char::is_ascii_alphabetic)?;
    Some(end + 2)
}
