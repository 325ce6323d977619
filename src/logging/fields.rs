use std::fmt;
use std::sync::Arc;

/// Context fields attached by [`Logger::with`](super::Logger::with).
///
/// Rendered as ` key=value` pairs appended to the message, in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Fields(Arc<Vec<(String, String)>>);

impl Fields {
    pub(crate) fn with(&self, key: &str, value: &dyn fmt::Display) -> Self {
        let mut next = Vec::with_capacity(self.0.len() + 1);
        next.extend(self.0.iter().cloned());
        next.push((key.to_string(), value.to_string()));
        Self(Arc::new(next))
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.0.iter() {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_render_in_order() {
        let fields = Fields::default().with("process", &"db").with("attempt", &2);
        assert_eq!(fields.to_string(), " process=db attempt=2");
    }

    #[test]
    fn test_with_leaves_parent_untouched() {
        let parent = Fields::default().with("a", &1);
        let _child = parent.with("b", &2);
        assert_eq!(parent.to_string(), " a=1");
    }
}
