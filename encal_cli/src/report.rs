//! Final run report rendering.

use encal_core::RunReport;

pub fn human(report: &RunReport, table_valid: bool) -> String {
    let table = if table_valid { "valid" } else { "invalid" };
    match &report.error {
        None => format!(
            "calibration ok: {} entries in {} ticks ({} ms); table {table}",
            report.entries, report.ticks, report.elapsed_ms,
        ),
        Some(err) => format!("calibration failed: {err}; table {table}"),
    }
}

pub fn json(report: &RunReport, table_valid: bool) -> serde_json::Value {
    serde_json::json!({
        "ok": report.ok(),
        "entries": report.entries,
        "ticks": report.ticks,
        "elapsed_ms": report.elapsed_ms,
        "table_valid": table_valid,
        "restart_required": report.restart_required,
        "error": report.error.as_ref().map(|e| e.to_string()),
    })
}
