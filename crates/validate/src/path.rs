//! Dotted-path resolution used by `extractField` and `crossField`:
//! `a.b`, `a.0.b`, `a[0].b`, and a `*` wildcard that fans out over an array.

use serde_json::Value;

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
}

fn tokenize(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for raw in path.split('.') {
        if raw.is_empty() {
            continue;
        }
        let mut rest = raw;
        if let Some(bracket_at) = rest.find('[') {
            let key = &rest[..bracket_at];
            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }
            rest = &rest[bracket_at..];
            while let Some(after_open) = rest.strip_prefix('[') {
                let Some(close_at) = after_open.find(']') else {
                    break;
                };
                let inner = &after_open[..close_at];
                segments.push(parse_segment(inner));
                rest = &after_open[close_at + 1..];
            }
        } else {
            segments.push(parse_segment(rest));
        }
    }
    segments
}

fn parse_segment(raw: &str) -> Segment {
    if raw == "*" {
        Segment::Wildcard
    } else if let Ok(index) = raw.parse::<usize>() {
        Segment::Index(index)
    } else {
        Segment::Key(raw.to_string())
    }
}

/// Resolve `path` against `root`. A path containing `*` returns a JSON
/// array of the values collected at that point for every element; any
/// other path returns the single resolved value. Returns `None` if the
/// path does not resolve against `root`'s actual shape.
pub fn resolve(root: &Value, path: &str) -> Option<Value> {
    resolve_segments(root, &tokenize(path))
}

fn resolve_segments(value: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };
    match head {
        Segment::Key(key) => value.as_object()?.get(key).and_then(|v| resolve_segments(v, rest)),
        Segment::Index(index) => value.as_array()?.get(*index).and_then(|v| resolve_segments(v, rest)),
        Segment::Wildcard => {
            let items = value.as_array()?;
            let mut collected = Vec::with_capacity(items.len());
            for item in items {
                if let Some(v) = resolve_segments(item, rest) {
                    collected.push(v);
                }
            }
            Some(Value::Array(collected))
        }
    }
}
