use serde::Serialize;

/// A declarative link from a bucket to a function: object-created events
/// under `prefix` invoke the function. Only the orchestration layer
/// creates these; functions cannot subscribe themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSubscription {
    /// Index into the stack's bucket table.
    pub bucket: usize,
    /// Index into the stack's function table.
    pub function: usize,
    pub event: EventKind,
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    ObjectCreated,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ObjectCreated => "s3:ObjectCreated:*",
        }
    }
}

impl EventSubscription {
    /// Whether an event of `kind` for `key` falls inside this
    /// subscription's filter.
    pub fn matches(&self, kind: EventKind, key: &str) -> bool {
        self.event == kind && key.starts_with(&self.prefix)
    }
}

/// Filter overlap as S3 defines it for notification configurations: one
/// prefix being a string prefix of the other (equality included).
pub fn prefixes_overlap(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(prefix: &str) -> EventSubscription {
        EventSubscription {
            bucket: 0,
            function: 0,
            event: EventKind::ObjectCreated,
            prefix: prefix.to_string(),
        }
    }

    #[test]
    fn matches_only_keys_under_the_prefix() {
        let s = sub("input/summarise");
        assert!(s.matches(EventKind::ObjectCreated, "input/summarise/foo.txt"));
        assert!(!s.matches(EventKind::ObjectCreated, "output/summary/foo.txt"));
        assert!(!s.matches(EventKind::ObjectCreated, "input/other/foo.txt"));
    }

    #[test]
    fn overlap_is_mutual_prefixing() {
        assert!(prefixes_overlap("input", "input/summarise"));
        assert!(prefixes_overlap("input/summarise", "input"));
        assert!(prefixes_overlap("input/summarise", "input/summarise"));
        assert!(!prefixes_overlap("input/summarise", "output/summary"));
    }
}
