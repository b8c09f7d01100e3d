use crate::engine::{EngineKind, StyleQuery};

/// Parameters for a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Attribute whose presence marks a style block as scoped.
    pub marker_attribute: String,
    /// Tag name of style blocks.
    pub style_tag: String,
    /// User-agent string used to pick the style query form.
    pub user_agent: String,
    /// Explicit query form; overrides user-agent detection when set.
    pub query: Option<StyleQuery>,
    /// Empty the scoped blocks once every scope has been frozen.
    pub finalize: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            marker_attribute: "scoped".to_string(),
            style_tag: "style".to_string(),
            user_agent: String::new(),
            query: None,
            finalize: true,
        }
    }
}

impl ScopeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker_attribute(mut self, name: impl Into<String>) -> Self {
        self.marker_attribute = name.into();
        self
    }

    pub fn with_style_tag(mut self, tag: impl Into<String>) -> Self {
        self.style_tag = tag.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_query(mut self, query: StyleQuery) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_finalize(mut self, finalize: bool) -> Self {
        self.finalize = finalize;
        self
    }

    /// The query form for this pass: the explicit one, else the one the
    /// user agent's engine needs.
    pub fn style_query(&self) -> StyleQuery {
        self.query
            .unwrap_or_else(|| EngineKind::detect(&self.user_agent).query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ScopeOptions::default();
        assert_eq!(options.marker_attribute, "scoped");
        assert_eq!(options.style_tag, "style");
        assert!(options.finalize);
        assert_eq!(options.style_query(), StyleQuery::NameKeyed);
    }

    #[test]
    fn explicit_query_overrides_detection() {
        let options = ScopeOptions::new()
            .with_user_agent("Mozilla/5.0 (X11; rv:3.6) Gecko/20100101 Firefox/3.6")
            .with_query(StyleQuery::NameKeyed);
        assert_eq!(options.style_query(), StyleQuery::NameKeyed);
        let options = options.with_user_agent("Firefox/3.6");
        assert_eq!(options.style_query(), StyleQuery::NameKeyed);
        let detected = ScopeOptions::new().with_user_agent("Firefox/3.6");
        assert_eq!(detected.style_query(), StyleQuery::IndexKeyed);
    }
}
