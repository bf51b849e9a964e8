use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Structural lookup key: a tag name plus optional class, attribute and
/// label-text constraints.
///
/// A multi-word class matches only an element whose class attribute is
/// exactly that string, so `"activity-log click-cookie"` does not match an
/// anchor carrying `"activity-log ph-flyout-click click-cookie"`. A single
/// word matches any element carrying that class.
#[derive(Debug, Clone, Copy)]
pub struct Lookup {
    tag: &'static str,
    class: Option<&'static str>,
    attr: Option<(&'static str, Option<&'static str>)>,
    label: Option<&'static str>,
}

impl Lookup {
    pub const fn tag(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            attr: None,
            label: None,
        }
    }

    pub const fn class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub const fn attr(mut self, name: &'static str, value: &'static str) -> Self {
        self.attr = Some((name, Some(value)));
        self
    }

    pub const fn has_attr(mut self, name: &'static str) -> Self {
        self.attr = Some((name, None));
        self
    }

    /// Match on the element's own trimmed text, e.g. `<strong>Cost:</strong>`.
    pub const fn label(mut self, text: &'static str) -> Self {
        self.label = Some(text);
        self
    }

    pub fn matches(&self, el: ElementRef) -> bool {
        let value = el.value();
        if value.name() != self.tag {
            return false;
        }
        if let Some(want) = self.class {
            let exact = value
                .attr("class")
                .is_some_and(|c| collapse_whitespace(c) == want);
            if !exact && !value.classes().any(|c| c == want) {
                return false;
            }
        }
        if let Some((name, want)) = self.attr {
            match (value.attr(name), want) {
                (None, _) => return false,
                (Some(found), Some(want)) if found != want => return false,
                _ => {}
            }
        }
        if let Some(label) = self.label {
            if text(el) != label {
                return false;
            }
        }
        true
    }
}

/// First descendant of `scope` (excluding `scope` itself) matching `lookup`.
pub fn find<'a>(scope: ElementRef<'a>, lookup: &Lookup) -> Option<ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| lookup.matches(*el))
}

/// All descendants of `scope` matching `lookup`, in document order.
pub fn find_all<'a>(scope: ElementRef<'a>, lookup: &Lookup) -> Vec<ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| lookup.matches(*el))
        .collect()
}

/// First element after `anchor` in document order, within `scope`, that
/// matches `lookup`. Elements nested inside `anchor` count as following it.
pub fn find_next<'a>(
    scope: ElementRef<'a>,
    anchor: ElementRef<'a>,
    lookup: &Lookup,
) -> Option<ElementRef<'a>> {
    let anchor_id = anchor.id();
    scope
        .descendants()
        .skip_while(|node| node.id() != anchor_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| lookup.matches(*el))
}

/// Concatenated text content, trimmed.
pub fn text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text nodes joined with `sep`, trimmed.
pub fn joined_text(el: ElementRef, sep: &str) -> String {
    el.text().collect::<Vec<_>>().join(sep).trim().to_string()
}

/// Text nodes individually trimmed, empties dropped, concatenated.
pub fn stripped_text(el: ElementRef) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

pub fn collapse_whitespace(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

pub fn attr(el: ElementRef, name: &str) -> Option<String> {
    el.value().attr(name).map(str::to_string)
}
