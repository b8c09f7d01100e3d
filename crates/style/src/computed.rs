//! Computed style values — the final resolved CSS properties for a node.
//!
//! Values are kept as CSS text. The property table fixes both the set of
//! properties every computed style carries and their enumeration order.

// ─────────────────────────────────────────────────────────────────────────────
// Property table
// ─────────────────────────────────────────────────────────────────────────────

/// Static description of one longhand property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: &'static str,
    pub initial: &'static str,
    pub inherited: bool,
}

const fn prop(name: &'static str, initial: &'static str, inherited: bool) -> PropertyDef {
    PropertyDef {
        name,
        initial,
        inherited,
    }
}

/// Every longhand the engine computes, in enumeration order.
pub const PROPERTIES: &[PropertyDef] = &[
    prop("background-color", "transparent", false),
    prop("background-image", "none", false),
    prop("border-top-color", "currentcolor", false),
    prop("border-right-color", "currentcolor", false),
    prop("border-bottom-color", "currentcolor", false),
    prop("border-left-color", "currentcolor", false),
    prop("border-top-style", "none", false),
    prop("border-right-style", "none", false),
    prop("border-bottom-style", "none", false),
    prop("border-left-style", "none", false),
    prop("border-top-width", "0px", false),
    prop("border-right-width", "0px", false),
    prop("border-bottom-width", "0px", false),
    prop("border-left-width", "0px", false),
    prop("box-sizing", "content-box", false),
    prop("color", "black", true),
    prop("cursor", "auto", true),
    prop("display", "inline", false),
    prop("float", "none", false),
    prop("font-family", "serif", true),
    prop("font-size", "16px", true),
    prop("font-style", "normal", true),
    prop("font-weight", "normal", true),
    prop("height", "auto", false),
    prop("letter-spacing", "normal", true),
    prop("line-height", "normal", true),
    prop("list-style-type", "disc", true),
    prop("margin-top", "0px", false),
    prop("margin-right", "0px", false),
    prop("margin-bottom", "0px", false),
    prop("margin-left", "0px", false),
    prop("opacity", "1", false),
    prop("overflow", "visible", false),
    prop("padding-top", "0px", false),
    prop("padding-right", "0px", false),
    prop("padding-bottom", "0px", false),
    prop("padding-left", "0px", false),
    prop("position", "static", false),
    prop("text-align", "start", true),
    prop("text-decoration", "none", false),
    prop("text-transform", "none", true),
    prop("vertical-align", "baseline", false),
    prop("visibility", "visible", true),
    prop("white-space", "normal", true),
    prop("width", "auto", false),
    prop("z-index", "auto", false),
];

/// Index of `name` in [`PROPERTIES`].
pub fn property_index(name: &str) -> Option<usize> {
    PROPERTIES.iter().position(|p| p.name == name)
}

/// Convert a hyphenated property name to its camel-cased script name:
/// `font-size` → `fontSize`, `-moz-box` → `MozBox`. Dash runs collapse and
/// trailing dashes vanish.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// ComputedStyle
// ─────────────────────────────────────────────────────────────────────────────

/// Computed values for every property in [`PROPERTIES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    values: Vec<String>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}

impl ComputedStyle {
    /// Every property at its initial value.
    pub fn initial() -> Self {
        Self {
            values: PROPERTIES.iter().map(|p| p.initial.to_string()).collect(),
        }
    }

    /// Inherited properties copied from `parent`, the rest at their initial value.
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        Self {
            values: PROPERTIES
                .iter()
                .zip(&parent.values)
                .map(|(p, v)| {
                    if p.inherited {
                        v.clone()
                    } else {
                        p.initial.to_string()
                    }
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        property_index(name).map(|i| self.values[i].as_str())
    }

    /// Set a longhand. Returns `false` for properties outside the table.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match property_index(name) {
            Some(i) => {
                self.values[i] = value.to_string();
                true
            }
            None => false,
        }
    }

    /// `(property, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        PROPERTIES
            .iter()
            .zip(&self.values)
            .map(|(p, v)| (p.name, v.as_str()))
    }

    /// Serialized form, `property: value;` pairs joined by single spaces.
    pub fn css_text(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The legacy enumeration view; see [`IndexedDeclarations`].
    pub fn indexed(&self) -> IndexedDeclarations {
        let mut entries = Vec::with_capacity(self.values.len() * 2 + 2);
        for (i, (name, _)) in self.iter().enumerate() {
            entries.push((i.to_string(), name.to_string()));
        }
        for (name, value) in self.iter() {
            entries.push((camel_case(name), value.to_string()));
        }
        entries.push(("length".to_string(), self.values.len().to_string()));
        entries.push(("cssText".to_string(), self.css_text()));
        IndexedDeclarations::new(entries)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// IndexedDeclarations
// ─────────────────────────────────────────────────────────────────────────────

/// A computed style exposed the way older engines enumerate a style
/// declaration object: numeric keys (`"0"`, `"1"`, …) map to hyphenated
/// property names, camel-cased keys map to values, and bookkeeping keys such
/// as `length` or `cssText` are mixed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedDeclarations {
    entries: Vec<(String, String)>,
}

impl IndexedDeclarations {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Raw `(key, value)` entries in enumeration order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
