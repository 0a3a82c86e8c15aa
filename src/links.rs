//! Link extraction from picked elements.
//!
//! The `href` of every picked element is resolved against the page URL and
//! exported as plain text or CSV.

use std::io::Write;

use url::Url;

use crate::dom::DomTree;
use crate::error::{InspectorError, Result};

/// Export format for collected links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkFormat {
    /// One URL per line
    #[default]
    Txt,
    /// A `url` column with a header row
    Csv,
}

/// Absolute URLs of the picked elements' `href` attributes, in document order.
///
/// Elements without an `href`, or with an empty one, are skipped. Duplicates
/// are kept.
pub fn collect_links(tree: &DomTree, base: &str) -> Result<Vec<String>> {
    let base = Url::parse(base).map_err(|e| InspectorError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;

    let mut links = Vec::new();
    for element in tree.picked() {
        let Some(href) = element.attribute("href").map(str::trim).filter(|h| !h.is_empty()) else {
            continue;
        };
        match base.join(href) {
            Ok(url) => links.push(url.to_string()),
            Err(e) => log::warn!("Skipping href '{}': {}", href, e),
        }
    }

    log::debug!("{} links from {} picked elements", links.len(), tree.picked().len());
    Ok(links)
}

/// Write `links` to `writer` in the given format
pub fn write_links<W: Write>(links: &[String], format: LinkFormat, mut writer: W) -> Result<()> {
    match format {
        LinkFormat::Txt => {
            for link in links {
                writeln!(writer, "{}", link)?;
            }
            writer.flush()?;
        }
        LinkFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            csv.write_record(["url"])
                .map_err(|e| InspectorError::ExportFailed(format!("CSV header write error: {}", e)))?;
            for link in links {
                csv.write_record([link])
                    .map_err(|e| InspectorError::ExportFailed(format!("CSV write error: {}", e)))?;
            }
            csv.flush()?;
        }
    }
    Ok(())
}
