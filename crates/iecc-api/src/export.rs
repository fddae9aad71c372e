use chrono::{DateTime, SecondsFormat, Utc};

use iecc_types::models::Affirmation;

pub const CSV_HEADER: [&str; 5] = ["ID", "Full Name", "Timestamp", "Certificate ID", "Consent"];

/// Render the registry listing as CSV, one row per record in the given order.
///
/// Rows are separated by `\n` with no trailing newline. Fields that contain a
/// comma, quote or line break are quoted.
pub fn to_csv(affirmations: &[Affirmation]) -> String {
    let mut lines = Vec::with_capacity(affirmations.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for a in affirmations {
        let row = [
            a.id.to_string(),
            escape(&a.full_name),
            a.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            escape(&a.certificate_id),
            if a.consent { "YES" } else { "NO" }.to_string(),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Download name for an export taken at `now`.
pub fn filename(now: DateTime<Utc>) -> String {
    format!("iecc_signatories_{}.csv", now.format("%Y-%m-%d"))
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
