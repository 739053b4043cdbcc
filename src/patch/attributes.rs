//! Attribute synchronisation between two attribute maps of one element.
//!
//! Each attribute name is routed to one of four write paths:
//!
//! ```text
//! style           → per-property style writes (old ∪ new properties)
//! on<event>       → handler registry + one delegated listener
//! live property   → property write (non-SVG, outside the exception list)
//! anything else   → set_attribute / remove_attribute
//! ```
//!
//! `key` and the lifecycle hook names are never written to the target.

use indexmap::IndexSet;

use super::Patcher;
use crate::types::{NodeId, PatchFlags};
use crate::vnode::{AttrValue, Attributes, Hook, Style, HOOK_NAMES};

/// Names that always go through the attribute path even when the target
/// exposes them as properties.
const ATTRIBUTE_ONLY: [&str; 5] = ["list", "type", "draggable", "spellcheck", "translate"];

/// Properties whose live value may have drifted from the last render.
const LIVE_PROPERTIES: [&str; 2] = ["value", "checked"];

impl Patcher {
    /// Diff `old` against `new` on `element` and enqueue the update hook.
    ///
    /// While recycling, the adopted element gets its `oncreate` hook instead
    /// of `onupdate`.
    pub(super) fn update_element(
        &mut self,
        element: NodeId,
        old: &Attributes,
        new: &Attributes,
        flags: PatchFlags,
    ) {
        let null = AttrValue::Null;
        let names: IndexSet<&str> = old.names().chain(new.names()).map(String::as_str).collect();

        for name in names {
            let value = new.get(name).unwrap_or(&null);
            let old_value = old.get(name).unwrap_or(&null);

            let changed = if LIVE_PROPERTIES.contains(&name) {
                *value != self.target.property(element, name)
            } else {
                value != old_value
            };
            if changed {
                self.update_attribute(element, name, value, old_value, flags);
            }
        }

        let hook = if flags.contains(PatchFlags::RECYCLING) {
            new.hook("oncreate")
        } else {
            new.hook("onupdate")
        };
        match hook {
            Some(Hook::Create(f)) => {
                let f = f.clone();
                self.lifecycle.push(move || f(element));
            }
            Some(Hook::Update(f)) => {
                let f = f.clone();
                let old = old.clone();
                self.lifecycle.push(move || f(element, &old));
            }
            _ => {}
        }
    }

    /// Write one attribute change to the target.
    pub(super) fn update_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        value: &AttrValue,
        old_value: &AttrValue,
        flags: PatchFlags,
    ) {
        if name == "key" || HOOK_NAMES.contains(&name) {
            return;
        }

        if name == "style" {
            self.update_style(element, old_value.as_style(), value.as_style());
        } else if let Some(event) = name.strip_prefix("on") {
            let handler = value.as_handler().cloned();
            let subscribe = handler.is_some();
            let previous = self.target.set_handler(element, event, handler);
            if subscribe {
                if old_value.as_handler().is_none() && previous.is_none() {
                    self.target.add_event_listener(element, event);
                }
            } else {
                self.target.remove_event_listener(element, event);
            }
        } else if self.target.has_property(element, name)
            && !ATTRIBUTE_ONLY.contains(&name)
            && !flags.contains(PatchFlags::SVG)
        {
            let property = match value {
                AttrValue::Null => AttrValue::from(""),
                other => other.clone(),
            };
            self.target.set_property(element, name, &property);
        } else if !value.is_removal() {
            if let Some(text) = value.to_attribute_text() {
                self.target.set_attribute(element, name, &text);
            }
        }

        if value.is_removal() {
            self.target.remove_attribute(element, name);
        }
    }

    /// Write every property present in either style map; properties that
    /// disappeared are cleared with an empty value.
    fn update_style(&mut self, element: NodeId, old: Option<&Style>, new: Option<&Style>) {
        let properties: IndexSet<&String> = old
            .into_iter()
            .flat_map(Style::properties)
            .chain(new.into_iter().flat_map(Style::properties))
            .collect();

        for property in properties {
            let value = new.and_then(|style| style.get(property)).unwrap_or_default();
            if property.starts_with('-') {
                self.target.set_style_custom(element, property, value);
            } else {
                self.target.set_style(element, property, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::actions::{Actions, WiredActions};
    use crate::state::Value;
    use crate::target::{MemoryTarget, Mutation, RenderTarget};
    use crate::vnode::{Event, Handler};

    fn setup() -> (MemoryTarget, Patcher, NodeId) {
        let target = MemoryTarget::new();
        let element = target.create_element("input", false);
        let patcher = Patcher::new(
            Rc::new(target.clone()),
            Value::Null,
            WiredActions::detached(Actions::new()),
        );
        target.clear_mutations();
        (target, patcher, element)
    }

    #[test]
    fn test_plain_attribute_set_and_removed() {
        let (target, mut patcher, element) = setup();
        let old = Attributes::new().with("title", "a").with("hidden", true);
        let new = Attributes::new().with("title", "b").with("hidden", false);
        patcher.update_element(element, &old, &new, PatchFlags::NONE);

        assert_eq!(target.attribute(element, "title").as_deref(), Some("b"));
        assert_eq!(target.attribute(element, "hidden"), None);
        assert!(target.mutations().contains(&Mutation::RemoveAttribute {
            node: element,
            name: "hidden".to_string(),
        }));
    }

    #[test]
    fn test_unchanged_attributes_not_written() {
        let (target, mut patcher, element) = setup();
        let attrs = Attributes::new().with("title", "same").with("key", "k");
        patcher.update_element(element, &attrs, &attrs.clone(), PatchFlags::NONE);
        assert!(target.mutations().is_empty());
    }

    #[test]
    fn test_key_and_hooks_never_written() {
        let (target, mut patcher, element) = setup();
        let new = Attributes::new().key("k").oncreate(|_| {}).ondestroy(|_| {});
        patcher.update_element(element, &Attributes::new(), &new, PatchFlags::NONE);
        assert!(target.mutations().is_empty());
    }

    #[test]
    fn test_value_compares_against_live_property() {
        let (target, mut patcher, element) = setup();
        let attrs = Attributes::new().with("value", "a");
        patcher.update_element(element, &Attributes::new(), &attrs, PatchFlags::NONE);
        assert_eq!(target.property(element, "value"), AttrValue::from("a"));

        // User typed; the view still says "a"
        target.set_property(element, "value", &AttrValue::from("typed"));
        target.clear_mutations();
        patcher.update_element(element, &attrs, &attrs.clone(), PatchFlags::NONE);

        assert_eq!(target.property(element, "value"), AttrValue::from("a"));
        assert_eq!(target.mutations().len(), 1);
    }

    #[test]
    fn test_null_property_becomes_empty() {
        let (target, mut patcher, element) = setup();
        let old = Attributes::new().with("value", "a");
        patcher.update_element(element, &Attributes::new(), &old, PatchFlags::NONE);
        patcher.update_element(element, &old, &Attributes::new(), PatchFlags::NONE);
        assert_eq!(target.property(element, "value"), AttrValue::from(""));
    }

    #[test]
    fn test_type_goes_through_attribute_path() {
        let (target, mut patcher, element) = setup();
        let new = Attributes::new().with("type", "checkbox");
        patcher.update_element(element, &Attributes::new(), &new, PatchFlags::NONE);

        assert_eq!(target.attribute(element, "type").as_deref(), Some("checkbox"));
        assert_eq!(target.property(element, "type"), AttrValue::Null);
    }

    #[test]
    fn test_svg_never_uses_properties() {
        let (target, mut patcher, element) = setup();
        let new = Attributes::new().with("value", "v");
        patcher.update_element(element, &Attributes::new(), &new, PatchFlags::SVG);
        assert_eq!(target.attribute(element, "value").as_deref(), Some("v"));
        assert_eq!(target.property(element, "value"), AttrValue::Null);
    }

    #[test]
    fn test_style_diff_clears_dropped_properties() {
        let (target, mut patcher, element) = setup();
        let old = Attributes::new().style(Style::new().with("color", "red").with("--gap", "1px"));
        let new = Attributes::new().style(Style::new().with("margin", "0"));

        patcher.update_element(element, &Attributes::new(), &old, PatchFlags::NONE);
        assert_eq!(target.style(element, "--gap").as_deref(), Some("1px"));

        patcher.update_element(element, &old, &new, PatchFlags::NONE);
        assert_eq!(target.style(element, "color"), None);
        assert_eq!(target.style(element, "--gap"), None);
        assert_eq!(target.style(element, "margin").as_deref(), Some("0"));
    }

    #[test]
    fn test_equal_styles_skip_writes() {
        let (target, mut patcher, element) = setup();
        let a = Attributes::new().style(Style::new().with("color", "red"));
        let b = Attributes::new().style(Style::new().with("color", "red"));
        patcher.update_element(element, &a, &b, PatchFlags::NONE);
        assert!(target.mutations().is_empty());
    }

    #[test]
    fn test_handler_swap_keeps_single_listener() {
        let (target, mut patcher, element) = setup();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let first_hits = hits.clone();
        let first = Attributes::new().on("click", move |_| first_hits.borrow_mut().push("first"));
        let second_hits = hits.clone();
        let second = Attributes::new().on("click", move |_| second_hits.borrow_mut().push("second"));

        patcher.update_element(element, &Attributes::new(), &first, PatchFlags::NONE);
        patcher.update_element(element, &first, &second, PatchFlags::NONE);

        let listeners = target
            .mutations()
            .iter()
            .filter(|m| matches!(m, Mutation::AddListener { .. }))
            .count();
        assert_eq!(listeners, 1);

        assert!(target.dispatch(Event::new("click", element)));
        assert_eq!(*hits.borrow(), vec!["second"]);
    }

    #[test]
    fn test_handler_removed() {
        let (target, mut patcher, element) = setup();
        let with = Attributes::new().with("onclick", Handler::new(|_| {}));
        patcher.update_element(element, &Attributes::new(), &with, PatchFlags::NONE);
        patcher.update_element(element, &with, &Attributes::new(), PatchFlags::NONE);

        assert!(!target.has_listener(element, "click"));
        assert!(!target.dispatch(Event::new("click", element)));
    }

    #[test]
    fn test_update_hook_receives_old_attributes() {
        let (_target, mut patcher, element) = setup();
        let seen = Rc::new(RefCell::new(None));
        let seen_clone = seen.clone();

        let old = Attributes::new().with("title", "old");
        let new = Attributes::new().with("title", "new").onupdate(move |node, previous| {
            *seen_clone.borrow_mut() = Some((node, previous.get("title").cloned()));
        });
        patcher.update_element(element, &old, &new, PatchFlags::NONE);
        assert!(seen.borrow().is_none());

        patcher.finish().drain();
        assert_eq!(*seen.borrow(), Some((element, Some(AttrValue::from("old")))));
    }

    #[test]
    fn test_recycling_runs_create_hook() {
        let (_target, mut patcher, element) = setup();
        let created = Rc::new(RefCell::new(Vec::new()));
        let created_clone = created.clone();

        let new = Attributes::new()
            .oncreate(move |node| created_clone.borrow_mut().push(node))
            .onupdate(|_, _| panic!("update hook while recycling"));
        patcher.update_element(element, &Attributes::new(), &new, PatchFlags::RECYCLING);

        patcher.finish().drain();
        assert_eq!(*created.borrow(), vec![element]);
    }
}
