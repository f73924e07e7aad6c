//! Weekly grid extraction.
//!
//! The rendered week is read in one DOM-side pass rather than element by
//! element: a script collects every candidate cell with its day column,
//! and the period banner is probed separately for the week's Monday.

use anyhow::{Context, Result};
use cartable_core::lesson::{RawCell, WeekGrid};
use cartable_core::week;
use log::debug;
use serde_json::json;

use crate::driver::PortalDriver;

/// DOM-side collector. Every element whose accessibility label contains a
/// colon is a candidate lesson cell; the day column is recovered by
/// walking ancestors for one of the configured day-index attributes
/// (passed as the script argument).
const COLLECT_CELLS: &str = r#"
const attrs = arguments[0];
const cells = [];
for (const el of document.querySelectorAll('[aria-label]')) {
    const label = el.getAttribute('aria-label');
    if (!label || !label.includes(':')) continue;
    let day = null;
    for (let node = el; node; node = node.parentElement) {
        for (const attr of attrs) {
            const value = node.getAttribute(attr);
            if (value !== null) { day = parseInt(value, 10); break; }
        }
        if (day !== null) break;
    }
    cells.push({ label: label, day_index: Number.isInteger(day) ? day : null });
}
return cells;
"#;

/// Extract everything the pipeline needs from the currently displayed week.
pub async fn extract_week(driver: &PortalDriver) -> Result<WeekGrid> {
    let attributes = &driver.locale().selectors.day_index_attributes;
    let raw = driver
        .client()
        .execute(COLLECT_CELLS, vec![json!(attributes)])
        .await
        .context("Failed to evaluate the grid collection script")?;
    let cells = decode_cells(raw)?;

    let header = banner_text(driver).await?;
    let monday = week::parse_week_banner(&header);

    debug!("Extracted {} cells, header {header:?}", cells.len());
    Ok(WeekGrid {
        monday,
        cells,
        header,
    })
}

/// Decode the collection script's JSON return value.
fn decode_cells(value: serde_json::Value) -> Result<Vec<RawCell>> {
    serde_json::from_value(value).context("Grid script returned an unexpected shape")
}

/// First non-empty banner text among the configured selectors.
async fn banner_text(driver: &PortalDriver) -> Result<String> {
    for selector in &driver.locale().selectors.week_banner {
        let Some(element) = driver.probe(selector).await? else {
            continue;
        };
        let text = element
            .text()
            .await
            .with_context(|| format!("Failed to read banner text for {selector}"))?;
        let text = text.trim();
        if !text.is_empty() {
            return Ok(text.to_string());
        }
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cells_from_script_result() {
        let raw = json!([
            { "label": "08:00 - 09:00 MATH — Salle 12", "day_index": 0 },
            { "label": "10:00 - 11:00 PE", "day_index": null },
        ]);

        let cells = decode_cells(raw).expect("should decode");
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].day_index, Some(0));
        assert_eq!(cells[1].day_index, None);
        assert!(cells[0].label.contains("MATH"));
    }

    #[test]
    fn test_decode_rejects_unexpected_shape() {
        assert!(decode_cells(json!({ "not": "a list" })).is_err());
    }
}
