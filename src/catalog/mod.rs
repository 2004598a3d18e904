//! # Asset Catalog Discovery
//!
//! Scrapes an HTTP directory listing for Wavefront assets and pairs geometry
//! files (`.obj`) with material files (`.mtl`) of the same stem. Discovery is
//! deliberately forgiving: any network, status, or parse failure produces an
//! empty catalog so the viewer keeps running with nothing to show.

use std::sync::mpsc::Sender;
use std::thread;

/// A paired geometry/material reference with a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Display name, the shared file stem
    pub name: String,
    /// Geometry filename as it appeared in the listing
    pub obj_file: String,
    /// Material filename as it appeared in the listing
    pub mtl_file: String,
}

/// Fetches the directory listing at `url` and returns the paired catalog.
///
/// Every failure mode collapses into an empty catalog: callers must treat
/// "empty" as "no assets available" and cannot distinguish an unreachable
/// server from a directory with nothing in it.
pub fn fetch_catalog(url: &str) -> Vec<CatalogEntry> {
    match fetch_listing(url) {
        Ok(html) => pair_entries(&extract_hrefs(&html)),
        Err(err) => {
            log::warn!("asset listing fetch failed ({url}): {err}");
            Vec::new()
        }
    }
}

/// Runs [`fetch_catalog`] on a background thread and delivers the result
/// over `tx`. The receiving end is polled from the frame loop, so a slow or
/// dead server never stalls rendering.
pub fn spawn_fetch(url: String, tx: Sender<Vec<CatalogEntry>>) {
    thread::spawn(move || {
        let entries = fetch_catalog(&url);
        // The session may have shut down while we were fetching
        let _ = tx.send(entries);
    });
}

fn fetch_listing(url: &str) -> Result<String, reqwest::Error> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    response.text()
}

/// Extracts anchor `href` targets that look like plain filenames.
///
/// Directory indexes differ between servers, but all of them link each file
/// with an anchor element. Links pointing outside the directory (absolute
/// URLs, parent references, queries) are not files and are skipped.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = html;

    while let Some(pos) = find_ignore_case(rest, "href=") {
        rest = &rest[pos + "href=".len()..];
        let Some(quote) = rest.chars().next() else {
            break;
        };
        if quote != '"' && quote != '\'' {
            continue;
        }
        rest = &rest[1..];
        let Some(end) = rest.find(quote) else {
            break;
        };
        let target = &rest[..end];
        rest = &rest[end + 1..];

        if let Some(name) = filename_from_href(target) {
            names.push(name);
        }
    }

    names
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn filename_from_href(href: &str) -> Option<String> {
    if href.is_empty()
        || href.contains("://")
        || href.starts_with('/')
        || href.starts_with('#')
        || href.starts_with('?')
        || href.starts_with("..")
    {
        return None;
    }

    // Strip query/fragment suffixes some servers append to file links
    let href = href.split(['?', '#']).next().unwrap_or(href);
    if href.is_empty() || href.ends_with('/') || href.contains('/') {
        return None;
    }

    Some(percent_decode(href))
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(byte) = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Pairs geometry files with material files of the same stem.
///
/// A geometry file with no matching material file is dropped with a warning;
/// the reverse (an orphaned `.mtl`) is silently ignored since material files
/// are only ever loaded through their geometry.
pub fn pair_entries(filenames: &[String]) -> Vec<CatalogEntry> {
    let mtl_stems: Vec<(&str, &str)> = filenames
        .iter()
        .filter_map(|f| stem_for_extension(f, ".mtl").map(|stem| (stem, f.as_str())))
        .collect();

    let mut entries: Vec<CatalogEntry> = filenames
        .iter()
        .filter_map(|f| stem_for_extension(f, ".obj").map(|stem| (stem, f.as_str())))
        .filter_map(|(stem, obj_file)| {
            match mtl_stems.iter().find(|(mtl_stem, _)| *mtl_stem == stem) {
                Some((_, mtl_file)) => Some(CatalogEntry {
                    name: stem.to_string(),
                    obj_file: obj_file.to_string(),
                    mtl_file: (*mtl_file).to_string(),
                }),
                None => {
                    log::warn!("skipping {obj_file}: no matching .mtl in listing");
                    None
                }
            }
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

fn stem_for_extension<'a>(filename: &'a str, extension: &str) -> Option<&'a str> {
    let len = filename.len().checked_sub(extension.len())?;
    let (stem, ext) = filename.split_at(len);
    (ext.eq_ignore_ascii_case(extension) && !stem.is_empty()).then_some(stem)
}

/// Joins a filename onto the assets base URL.
pub fn asset_url(base: &str, filename: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{filename}")
    } else {
        format!("{base}/{filename}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairing_requires_matching_mtl() {
        let catalog = pair_entries(&names(&["a.obj", "a.mtl", "b.obj"]));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "a");
        assert_eq!(catalog[0].obj_file, "a.obj");
        assert_eq!(catalog[0].mtl_file, "a.mtl");
    }

    #[test]
    fn test_pairing_is_case_insensitive_on_extension() {
        let catalog = pair_entries(&names(&["Crate.OBJ", "Crate.mtl"]));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "Crate");
    }

    #[test]
    fn test_pairing_sorts_by_name() {
        let catalog = pair_entries(&names(&[
            "zebra.obj", "zebra.mtl", "apple.obj", "apple.mtl",
        ]));

        let order: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_orphaned_mtl_is_ignored() {
        let catalog = pair_entries(&names(&["lonely.mtl"]));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_extract_hrefs_from_directory_index() {
        let html = r#"<html><body><h1>Index of /assets</h1><ul>
            <li><a href="../">Parent Directory</a></li>
            <li><a href="teapot.obj">teapot.obj</a></li>
            <li><a href='teapot.mtl'>teapot.mtl</a></li>
            <li><a href="sub/">sub/</a></li>
            <li><a href="https://example.com/away.obj">away</a></li>
            <li><a href="?C=M;O=A">sort</a></li>
        </ul></body></html>"#;

        assert_eq!(extract_hrefs(html), names(&["teapot.obj", "teapot.mtl"]));
    }

    #[test]
    fn test_extract_hrefs_decodes_percent_escapes() {
        let html = r#"<a href="space%20ship.obj">space ship.obj</a>"#;
        assert_eq!(extract_hrefs(html), names(&["space ship.obj"]));
    }

    #[test]
    fn test_fetch_failure_yields_empty_catalog() {
        // Nothing listens on this port; transport failure must not propagate
        let catalog = fetch_catalog("http://127.0.0.1:9/assets/");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_asset_url_join() {
        assert_eq!(asset_url("http://h/assets/", "a.obj"), "http://h/assets/a.obj");
        assert_eq!(asset_url("http://h/assets", "a.obj"), "http://h/assets/a.obj");
    }
}
