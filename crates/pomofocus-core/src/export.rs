//! Whole-store JSON export/import and CSV export of the session history.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::Local;
use csv::Writer;

use crate::error::{CoreError, Result};
use crate::storage::KeyValueStore;
use crate::timer::SessionRecord;

/// Flat JSON object of every namespaced key (prefix stripped) to its stored
/// value. Values are the raw stored strings, so the document imports back
/// byte for byte.
pub fn export_json(store: &KeyValueStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(&store.export_all())?)
}

/// Validate an export document and flatten it back to raw stored strings.
///
/// String values are taken verbatim. Any other value is accepted as already
/// decoded data and is stored as its JSON text.
pub fn parse_import(json: &str) -> Result<BTreeMap<String, String>> {
    let doc: serde_json::Value =
        serde_json::from_str(json).map_err(|e| CoreError::Import(e.to_string()))?;
    let serde_json::Value::Object(map) = doc else {
        return Err(CoreError::Import("expected a JSON object at top level".into()));
    };
    map.into_iter()
        .map(|(key, value)| {
            let raw = match value {
                serde_json::Value::String(raw) => raw,
                other => serde_json::to_string(&other)?,
            };
            Ok::<_, CoreError>((key, raw))
        })
        .collect()
}

/// Replace the store's contents with `json`. Returns the number of keys written.
///
/// The document is validated before anything is cleared; after that the
/// import is clear-then-write and not atomic.
pub fn import_json(store: &KeyValueStore, json: &str) -> Result<usize> {
    let data = parse_import(json)?;
    store.import_all(&data)?;
    Ok(data.len())
}

/// Write `type,duration_minutes,date,time` rows, one per session, with date
/// and time in local `M/D/YYYY` and `h:mm:ss AM` form.
pub fn write_sessions_csv<W: Write>(writer: W, sessions: &[SessionRecord]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record(["type", "duration_minutes", "date", "time"])?;

    for session in sessions {
        let local = session.timestamp.with_timezone(&Local);
        let minutes = (f64::from(session.duration) / 60.0).round() as u64;
        wtr.write_record(&[
            session.session_type.as_str().to_string(),
            minutes.to_string(),
            local.format("%-m/%-d/%Y").to_string(),
            local.format("%-I:%M:%S %p").to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn sessions_csv(sessions: &[SessionRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_sessions_csv(&mut buf, sessions)?;
    String::from_utf8(buf).map_err(|e| CoreError::Import(e.to_string()))
}
