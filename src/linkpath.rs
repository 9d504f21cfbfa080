// src/linkpath.rs
// =============================================================================
// Link path helpers shared by the link checker and the redirect matcher.
//
// All paths here are URL-style strings relative to the docs root:
//   "/guide/basics.md", "/images/logo.png", ...
// They always use '/' as the separator, whatever the host OS.
//
// The trick that makes matching work is the normalization character:
// a file extension is replaced by '\0' (which can never appear in a real
// path), so "/old-page.html" and "./old-page.md" both become "/old-page\0"
// and can be compared with a simple prefix test.
// =============================================================================

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Stands in for a file extension in index keys and normalized targets
pub const NORMALIZATION_CHAR: char = '\0';

// Extensions that mark a redirect as a "file redirect"
// (rendered pages and raster images)
const STATIC_EXTENSIONS: [&str; 6] = ["html", "htm", "png", "jpg", "jpeg", "gif"];

// Splits "dir/name.ext" into ("dir/name", Some("ext"))
//
// Only the last segment is inspected, and a leading dot does not count as
// an extension (".vuepress" has none).
pub fn split_extension(path: &str) -> (&str, Option<&str>) {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let segment = &path[segment_start..];

    match segment.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < segment.len() => {
            let split = segment_start + dot;
            (&path[..split], Some(&path[split + 1..]))
        }
        _ => (path, None),
    }
}

/// Returns the extension if it is one of the recognized static extensions
pub fn static_extension(path: &str) -> Option<&str> {
    let (_, extension) = split_extension(path);
    extension.filter(|ext| {
        STATIC_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    })
}

/// Replaces the extension of the last segment with the normalization
/// character. A segment without an extension gets the character appended.
pub fn normalize_extension(path: &str) -> String {
    let (stem, _) = split_extension(path);
    let mut normalized = String::with_capacity(stem.len() + 1);
    normalized.push_str(stem);
    normalized.push(NORMALIZATION_CHAR);
    normalized
}

/// Strips a `#fragment` or `?query` suffix from a link target
pub fn strip_suffixes(target: &str) -> &str {
    let end = target.find(|c: char| c == '#' || c == '?').unwrap_or(target.len());
    &target[..end]
}

/// Decodes `%XX` escapes ("my%20page.md" -> "my page.md").
///
/// Text that does not decode to valid UTF-8 is returned unchanged.
pub fn percent_decode(text: &str) -> Cow<'_, str> {
    percent_decode_str(text)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(text))
}

/// Resolves `target` against the directory of `file`.
///
/// Parameters:
///   file: root-relative path of the document ("guide/basics.md")
///   target: raw link path ("../images/a.png", "/api/", "./x.md")
///
/// Returns: "/"-prefixed root-relative path with `.` and `..` collapsed,
/// or None when the target climbs above the root.
pub fn resolve(file: &str, target: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();

    // Absolute targets start from the root, relative ones from the
    // document's own directory
    if !target.starts_with('/') {
        let file = file.trim_start_matches('/');
        if let Some((dir, _)) = file.rsplit_once('/') {
            segments.extend(dir.split('/').filter(|s| !s.is_empty()));
        }
    }

    for part in target.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    let mut resolved = format!("/{}", segments.join("/"));

    // Keep the trailing slash of directory links like "./legacy/"
    if target.ends_with('/') && resolved.len() > 1 {
        resolved.push('/');
    }

    Some(resolved)
}
