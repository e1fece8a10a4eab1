//! Path normalization utilities.
//!
//! Workspace paths are abstract `/`-separated strings supplied by the tree
//! loader. The canonical lookup key strips leading and trailing separator
//! runs; interior separators and segment case are preserved verbatim. Every
//! keyed structure in this crate (path index, marker store, UI sets) stores
//! and looks up exclusively by the normalized form.

/// Strip all leading and trailing `/` runs from a raw path.
///
/// The empty string is a valid normalized path: it denotes a root whose raw
/// path itself normalizes to empty.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// The strict ancestor chain of `path`, excluding `path` itself.
///
/// For `"some/example/path"` the result is `["some", "some/example"]`.
/// A path with no separators yields an empty sequence.
#[must_use]
pub fn subpaths(path: &str) -> Vec<String> {
    let normalized = normalize_path(path);
    normalized
        .char_indices()
        .filter(|&(_, c)| c == '/')
        .map(|(idx, _)| normalized[..idx].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_leading_and_trailing_separators() {
        assert_eq!(normalize_path("/some/folder//"), "some/folder");
        assert_eq!(normalize_path("///a"), "a");
        assert_eq!(normalize_path("a/"), "a");
    }

    #[test]
    fn normalize_preserves_interior_separators_and_case() {
        assert_eq!(normalize_path("/a//B/c/"), "a//B/c");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["/a/b//", "", "/", "plain", "//x//y//"] {
            let once = normalize_path(raw);
            assert_eq!(normalize_path(once), once);
        }
    }

    #[test]
    fn normalize_of_separators_only_is_empty() {
        assert_eq!(normalize_path("///"), "");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn subpaths_of_empty_path_is_empty() {
        assert_eq!(subpaths(""), Vec::<String>::new());
    }

    #[test]
    fn subpaths_of_single_segment_is_empty() {
        assert_eq!(subpaths("example.tsl"), Vec::<String>::new());
    }

    #[test]
    fn subpaths_lists_strict_ancestors_in_order() {
        assert_eq!(subpaths("some/example/path"), vec!["some", "some/example"]);
    }

    #[test]
    fn subpaths_normalizes_its_argument() {
        assert_eq!(
            subpaths("//some/example/path//"),
            vec!["some", "some/example"]
        );
    }
}
