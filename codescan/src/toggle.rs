//! Visibility toggling for trigger/target element pairs
//!
//! A trigger is any element carrying [`TRIGGER_ATTR`]; its [`TARGET_ATTR`]
//! holds a selector for the element whose [`VISIBLE_CLASS`] gets flipped.
//! Bindings are collected once into a [`ToggleRegistry`], while the target is
//! looked up on every activation so the page can change underneath.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const TRIGGER_ATTR: &str = "data-bs-toggle";
pub const TARGET_ATTR: &str = "data-bs-target";
pub const VISIBLE_CLASS: &str = "show";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    pub fn from_shown(shown: bool) -> Self {
        if shown {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }

    pub fn is_shown(self) -> bool {
        self == Visibility::Shown
    }

    pub fn toggled(self) -> Self {
        match self {
            Visibility::Shown => Visibility::Hidden,
            Visibility::Hidden => Visibility::Shown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub classes: BTreeSet<String>,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    /// Mark this element as a trigger for `selector`.
    pub fn trigger_for(self, selector: impl Into<String>) -> Self {
        self.with_attr(TRIGGER_ATTR, "collapse")
            .with_attr(TARGET_ATTR, selector)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn is_trigger(&self) -> bool {
        self.attributes.contains_key(TRIGGER_ATTR)
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_shown(self.has_class(VISIBLE_CLASS))
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        if visibility.is_shown() {
            self.classes.insert(VISIBLE_CLASS.to_string());
        } else {
            self.classes.remove(VISIBLE_CLASS);
        }
    }
}

/// Flat stand-in for a document: elements in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Page {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    /// First element matching `selector`, or `None` when nothing matches or
    /// the selector is not understood.
    pub fn query_selector(&self, selector: &str) -> Option<&Element> {
        let index = self.position(selector)?;
        self.elements.get(index)
    }

    fn position(&self, selector: &str) -> Option<usize> {
        let selector = Selector::parse(selector)?;
        self.elements.iter().position(|el| selector.matches(el))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Selector {
    fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();

        if let Some(id) = selector.strip_prefix('#') {
            return is_ident(id).then(|| Selector::Id(id.to_string()));
        }

        if let Some(class) = selector.strip_prefix('.') {
            return is_ident(class).then(|| Selector::Class(class.to_string()));
        }

        let inner = selector.strip_prefix('[')?.strip_suffix(']')?;
        let (name, value) = match inner.split_once('=') {
            Some((name, value)) => {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                (name.trim(), Some(value.to_string()))
            }
            None => (inner.trim(), None),
        };

        is_ident(name).then(|| Selector::Attr {
            name: name.to_string(),
            value,
        })
    }

    fn matches(&self, el: &Element) -> bool {
        match self {
            Selector::Id(id) => el.id == *id,
            Selector::Class(class) => el.has_class(class),
            Selector::Attr { name, value: None } => el.attributes.contains_key(name),
            Selector::Attr {
                name,
                value: Some(value),
            } => el.attr(name) == Some(value.as_str()),
        }
    }
}

/// Declarative trigger -> target pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleBinding {
    pub trigger: String,
    pub target: String,
}

impl ToggleBinding {
    pub fn new(trigger: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            target: target.into(),
        }
    }
}

/// Trigger element ids mapped to target selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleRegistry {
    targets: BTreeMap<String, String>,
}

impl ToggleRegistry {
    pub fn from_bindings<'a>(bindings: impl IntoIterator<Item = &'a ToggleBinding>) -> Self {
        let targets = bindings
            .into_iter()
            .map(|b| (b.trigger.clone(), b.target.clone()))
            .collect();
        Self { targets }
    }

    /// Collect bindings from trigger-marked elements. Triggers without a
    /// target attribute are skipped.
    pub fn scan(page: &Page) -> Self {
        let targets = page
            .elements
            .iter()
            .filter(|el| el.is_trigger())
            .filter_map(|el| Some((el.id.clone(), el.attr(TARGET_ATTR)?.to_string())))
            .collect();
        Self { targets }
    }

    /// Lay `bindings` over the current ones; a trigger bound in both keeps
    /// the target from `bindings`.
    pub fn extend<'a>(&mut self, bindings: impl IntoIterator<Item = &'a ToggleBinding>) {
        for b in bindings {
            self.targets.insert(b.trigger.clone(), b.target.clone());
        }
    }

    pub fn target_for(&self, trigger: &str) -> Option<&str> {
        self.targets.get(trigger).map(String::as_str)
    }

    pub fn bindings(&self) -> impl Iterator<Item = ToggleBinding> + '_ {
        self.targets
            .iter()
            .map(|(trigger, target)| ToggleBinding::new(trigger, target))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Ignored,
    Toggled {
        target: String,
        visibility: Visibility,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ToggleReactor {
    registry: ToggleRegistry,
}

impl ToggleReactor {
    pub fn new(registry: ToggleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToggleRegistry {
        &self.registry
    }

    /// React to an activation originating at element `origin`.
    pub fn activate(&self, page: &mut Page, origin: &str) -> ToggleOutcome {
        let Some(selector) = self.registry.target_for(origin) else {
            return ToggleOutcome::Ignored;
        };
        let Some(index) = page.position(selector) else {
            return ToggleOutcome::Ignored;
        };

        let target = &mut page.elements[index];
        let visibility = target.visibility().toggled();
        target.set_visibility(visibility);

        ToggleOutcome::Toggled {
            target: target.id.clone(),
            visibility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_page() -> Page {
        Page::new(vec![
            Element::new("menu-button").trigger_for("#panel"),
            Element::new("panel").with_class("collapse"),
            Element::new("plain"),
        ])
    }

    #[test]
    fn toggled_is_an_involution() {
        for v in [Visibility::Shown, Visibility::Hidden] {
            assert_ne!(v.toggled(), v);
            assert_eq!(v.toggled().toggled(), v);
        }
    }

    #[test]
    fn two_activations_restore_state() {
        let mut page = panel_page();
        let before = page.clone();
        let reactor = ToggleReactor::new(ToggleRegistry::scan(&page));

        assert_eq!(
            reactor.activate(&mut page, "menu-button"),
            ToggleOutcome::Toggled {
                target: "panel".into(),
                visibility: Visibility::Shown
            }
        );
        assert!(page.get("panel").unwrap().has_class(VISIBLE_CLASS));
        assert!(page.get("panel").unwrap().has_class("collapse"));

        reactor.activate(&mut page, "menu-button");
        assert_eq!(page, before);
    }

    #[test]
    fn non_trigger_does_nothing() {
        let mut page = panel_page();
        let before = page.clone();
        let reactor = ToggleReactor::new(ToggleRegistry::scan(&page));

        assert_eq!(reactor.activate(&mut page, "plain"), ToggleOutcome::Ignored);
        assert_eq!(reactor.activate(&mut page, "missing"), ToggleOutcome::Ignored);
        assert_eq!(page, before);
    }

    #[test]
    fn unresolved_or_invalid_selector_is_ignored() {
        let mut page = Page::new(vec![
            Element::new("a").trigger_for("#nowhere"),
            Element::new("b").trigger_for("div > p"),
            Element::new("c").with_attr(TRIGGER_ATTR, "collapse"),
        ]);
        let before = page.clone();
        let reactor = ToggleReactor::new(ToggleRegistry::scan(&page));

        assert_eq!(reactor.registry().len(), 2);
        for origin in ["a", "b", "c"] {
            assert_eq!(reactor.activate(&mut page, origin), ToggleOutcome::Ignored);
        }
        assert_eq!(page, before);
    }

    #[test]
    fn target_is_resolved_at_activation_time() {
        let mut page = Page::new(vec![Element::new("btn")]);
        let registry = ToggleRegistry::from_bindings(&[ToggleBinding::new("btn", ".drawer")]);
        let reactor = ToggleReactor::new(registry);

        assert_eq!(reactor.activate(&mut page, "btn"), ToggleOutcome::Ignored);

        page.push(Element::new("side").with_class("drawer"));
        assert!(matches!(
            reactor.activate(&mut page, "btn"),
            ToggleOutcome::Toggled { ref target, .. } if target == "side"
        ));
    }

    #[test]
    fn extra_bindings_keep_page_markers() {
        let mut page = panel_page();
        page.push(Element::new("help"));
        page.push(Element::new("help-link"));

        let mut registry = ToggleRegistry::scan(&page);
        registry.extend(&[
            ToggleBinding::new("help-link", "#help"),
            ToggleBinding::new("plain", "#panel"),
        ]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.target_for("menu-button"), Some("#panel"));

        let reactor = ToggleReactor::new(registry);
        reactor.activate(&mut page, "menu-button");
        reactor.activate(&mut page, "help-link");
        assert!(page.get("panel").unwrap().visibility().is_shown());
        assert!(page.get("help").unwrap().visibility().is_shown());
    }

    #[test]
    fn later_binding_overrides_marker_target() {
        let page = panel_page();
        let mut registry = ToggleRegistry::scan(&page);
        registry.extend(&[ToggleBinding::new("menu-button", ".collapse")]);
        assert_eq!(registry.target_for("menu-button"), Some(".collapse"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn selector_forms() {
        let page = Page::new(vec![
            Element::new("one").with_class("card"),
            Element::new("two").with_attr("data-role", "dialog"),
        ]);

        assert_eq!(page.query_selector("#two").map(|e| e.id.as_str()), Some("two"));
        assert_eq!(page.query_selector(".card").map(|e| e.id.as_str()), Some("one"));
        assert_eq!(
            page.query_selector("[data-role]").map(|e| e.id.as_str()),
            Some("two")
        );
        assert_eq!(
            page.query_selector("[data-role=\"dialog\"]").map(|e| e.id.as_str()),
            Some("two")
        );
        assert!(page.query_selector("[data-role=menu]").is_none());
        assert!(page.query_selector("").is_none());
        assert!(page.query_selector("#").is_none());
        assert!(page.query_selector("div").is_none());
    }

    #[test]
    fn page_deserializes_with_defaults() {
        let page: Page = serde_json::from_str(
            r##"{"elements": [
                {"id": "btn", "attributes": {"data-bs-toggle": "", "data-bs-target": "#p"}},
                {"id": "p"}
            ]}"##,
        )
        .unwrap();

        let registry = ToggleRegistry::scan(&page);
        assert_eq!(registry.target_for("btn"), Some("#p"));
        assert_eq!(page.get("p").unwrap().visibility(), Visibility::Hidden);
    }
}
