use percent_encoding::percent_decode_str;

/// Resolve an href found inside `referrer` (a container path) to the target
/// container path plus its fragment, if any.
pub fn resolve_href(referrer: &str, href: &str) -> (String, Option<String>) {
    let (path, fragment) = match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    };

    let fragment = fragment
        .map(|value| percent_decode_str(value).decode_utf8_lossy().into_owned())
        .filter(|value| !value.is_empty());

    let path = percent_decode_str(path).decode_utf8_lossy();
    let resolved = if path.is_empty() {
        referrer.to_string()
    } else {
        join_path(parent_dir(referrer), &path)
    };

    (resolved, fragment)
}

pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|index| &path[..index]).unwrap_or("")
}

/// Join `relative` onto `base_dir`, folding `.` and `..` segments.
pub fn join_path(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = if relative.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|segment| !segment.is_empty()).collect()
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
