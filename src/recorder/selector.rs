//! Selector synthesis
//!
//! Derives a best-effort CSS selector for a single element. Only the element
//! itself is inspected: tag name, then `id`, then classes. Ancestors are never
//! walked, so two elements sharing tag and classes without an id produce the
//! same selector. Consumers of recorded actions have to tolerate that.

use std::borrow::Cow;

/// Read-only view of a DOM element
///
/// Implemented by [`crate::dom::Element`] and, with the `wasm` feature, by
/// `web_sys::Element`.
pub trait DomElement {
    /// Tag name as reported by the DOM (any case)
    fn tag_name(&self) -> Option<Cow<'_, str>>;

    /// The `id` attribute
    fn id(&self) -> Option<Cow<'_, str>>;

    /// The raw `class` attribute
    fn class_name(&self) -> Option<Cow<'_, str>>;

    /// Current form value, for elements that carry one
    fn value(&self) -> Option<Cow<'_, str>> {
        None
    }
}

impl<T: DomElement + ?Sized> DomElement for &T {
    fn tag_name(&self) -> Option<Cow<'_, str>> {
        (**self).tag_name()
    }

    fn id(&self) -> Option<Cow<'_, str>> {
        (**self).id()
    }

    fn class_name(&self) -> Option<Cow<'_, str>> {
        (**self).class_name()
    }

    fn value(&self) -> Option<Cow<'_, str>> {
        (**self).value()
    }
}

/// Build a selector for `element`
///
/// Returns `""` when there is no element or it has no tag name,
/// `tag#id` when an id is set, otherwise `tag.class1.class2` or just `tag`.
pub fn synthesize<E: DomElement + ?Sized>(element: Option<&E>) -> String {
    let Some(element) = element else {
        return String::new();
    };
    let tag = match element.tag_name() {
        Some(tag) if !tag.is_empty() => tag.to_lowercase(),
        _ => return String::new(),
    };

    let mut selector = tag;

    if let Some(id) = element.id().filter(|id| !id.is_empty()) {
        selector.push('#');
        selector.push_str(&id);
        return selector;
    }

    if let Some(class_name) = element.class_name() {
        for class in class_name.split_whitespace() {
            selector.push('.');
            selector.push_str(class);
        }
    }

    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    #[test]
    fn test_none_is_empty() {
        assert_eq!(synthesize::<Element>(None), "");
    }

    #[test]
    fn test_missing_tag_is_empty() {
        let el = Element::new("").with_id("main");
        assert_eq!(synthesize(Some(&el)), "");
    }

    #[test]
    fn test_tag_is_lowercased() {
        let el = Element::new("BUTTON");
        assert_eq!(synthesize(Some(&el)), "button");
    }

    #[test]
    fn test_id_short_circuits_classes() {
        let el = Element::new("BUTTON").with_id("submit").with_class("btn primary");
        assert_eq!(synthesize(Some(&el)), "button#submit");
    }

    #[test]
    fn test_empty_id_falls_through_to_classes() {
        let el = Element::new("div").with_id("").with_class("card");
        assert_eq!(synthesize(Some(&el)), "div.card");
    }

    #[test]
    fn test_class_whitespace_runs_collapse() {
        let el = Element::new("input").with_class("  a \t b\n\nc ");
        assert_eq!(synthesize(Some(&el)), "input.a.b.c");
    }

    #[test]
    fn test_blank_class_adds_nothing() {
        let el = Element::new("span").with_class("   ");
        assert_eq!(synthesize(Some(&el)), "span");
    }

    #[test]
    fn test_id_is_not_escaped() {
        // Ids are appended verbatim, even when they are not valid CSS identifiers.
        let el = Element::new("div").with_id("1:weird");
        assert_eq!(synthesize(Some(&el)), "div#1:weird");
    }
}
