//! The component node: Tag, Animation, Events, Component.
//!
//! A [`Component`] is one entry in the static UI tree. Nodes are created by
//! the builder layer in a single synchronous pass and never mutated
//! afterwards; runtime behavior operates on the *state* slices, not on the
//! tree. The record is closed: every field a node can carry is enumerated
//! here, and the generic setters in [`crate::build`] are typed accessors
//! over this record rather than an open property bag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::behavior::FunctionBundle;
use crate::build::AdapterMap;
use crate::diag::{Diagnostic, Diagnostics};
use crate::expr::Expr;
use crate::geometry::{Border, Edges, Measure};

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    // Containers.
    Root,
    Row,
    Column,
    Stack,
    Scrollable,
    Grid,
    Fixed,
    // Inputs.
    Button,
    Checkbox,
    Input,
    Number,
    Select,
    Option,
    Textarea,
    Date,
    // Text.
    Text,
    // Media.
    Image,
    Canvas,
    Progress,
    // Navigation.
    Anchor,
}

impl Tag {
    /// Whether this tag carries text content.
    pub fn is_text(self) -> bool {
        matches!(self, Tag::Text)
    }
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// The animated property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationName {
    Opacity,
    Left,
    Right,
}

/// Whether the node is animating in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationDirection {
    In,
    Out,
}

/// An animation descriptor: which property animates, in which direction,
/// anchored at which timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: AnimationName,
    pub direction: AnimationDirection,
    pub start: f64,
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Axis alignment for container layout and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Start,
    Center,
    End,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The closed set of event kinds a node can bind programs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Observe,
    Init,
    Enter,
    Click,
    Back,
    Change,
    Resize,
}

impl EventKind {
    /// The wire name of this event kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Observe => "observe",
            EventKind::Init => "onInit",
            EventKind::Enter => "onEnter",
            EventKind::Click => "onClick",
            EventKind::Back => "onBack",
            EventKind::Change => "onChange",
            EventKind::Resize => "onResize",
        }
    }

    /// Parse a wire name back into an event kind.
    pub fn parse(name: &str) -> Option<EventKind> {
        match name {
            "observe" => Some(EventKind::Observe),
            "onInit" => Some(EventKind::Init),
            "onEnter" => Some(EventKind::Enter),
            "onClick" => Some(EventKind::Click),
            "onBack" => Some(EventKind::Back),
            "onChange" => Some(EventKind::Change),
            "onResize" => Some(EventKind::Resize),
            _ => None,
        }
    }
}

/// Per-event-type ordered program lists.
///
/// Handlers attached to the same event accumulate in registration order and
/// fire in that order on dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Events {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observe: Option<Vec<Expr>>,
    #[serde(rename = "onInit", skip_serializing_if = "Option::is_none")]
    pub on_init: Option<Vec<Expr>>,
    #[serde(rename = "onEnter", skip_serializing_if = "Option::is_none")]
    pub on_enter: Option<Vec<Expr>>,
    #[serde(rename = "onClick", skip_serializing_if = "Option::is_none")]
    pub on_click: Option<Vec<Expr>>,
    #[serde(rename = "onBack", skip_serializing_if = "Option::is_none")]
    pub on_back: Option<Vec<Expr>>,
    #[serde(rename = "onChange", skip_serializing_if = "Option::is_none")]
    pub on_change: Option<Vec<Expr>>,
    #[serde(rename = "onResize", skip_serializing_if = "Option::is_none")]
    pub on_resize: Option<Vec<Expr>>,
}

impl Events {
    /// The program list for an event kind, if any handler is attached.
    pub fn list(&self, kind: EventKind) -> Option<&[Expr]> {
        let slot = match kind {
            EventKind::Observe => &self.observe,
            EventKind::Init => &self.on_init,
            EventKind::Enter => &self.on_enter,
            EventKind::Click => &self.on_click,
            EventKind::Back => &self.on_back,
            EventKind::Change => &self.on_change,
            EventKind::Resize => &self.on_resize,
        };
        slot.as_deref()
    }

    /// Append a program to an event kind's list, creating the list on
    /// first use.
    pub fn push(&mut self, kind: EventKind, program: Expr) {
        let slot = match kind {
            EventKind::Observe => &mut self.observe,
            EventKind::Init => &mut self.on_init,
            EventKind::Enter => &mut self.on_enter,
            EventKind::Click => &mut self.on_click,
            EventKind::Back => &mut self.on_back,
            EventKind::Change => &mut self.on_change,
            EventKind::Resize => &mut self.on_resize,
        };
        slot.get_or_insert_with(Vec::new).push(program);
    }

    /// Whether no handlers are attached at all.
    pub fn is_empty(&self) -> bool {
        [
            &self.observe,
            &self.on_init,
            &self.on_enter,
            &self.on_click,
            &self.on_back,
            &self.on_change,
            &self.on_resize,
        ]
        .iter()
        .all(|slot| slot.is_none())
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// One node of the static UI tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: Tag,
    pub width: Measure,
    pub height: Measure,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Component>>,
    // Sub-tree templates are lazy closures, so they stay out of the wire
    // format; everything else on the node is serde data.
    #[serde(skip)]
    pub adapters: Option<AdapterMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funcs: Option<Vec<FunctionBundle>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Edges<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Edges<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Edges<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Edges<Border>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,

    #[serde(flatten)]
    pub events: Events,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_axis_alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_axis_alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

impl Component {
    /// Create a bare node with the given tag and dimensions.
    pub fn new(name: Tag, width: Measure, height: Measure) -> Self {
        Self {
            name,
            width,
            height,
            id: None,
            text: None,
            children: None,
            adapters: None,
            funcs: None,
            margin: None,
            padding: None,
            position: None,
            border: None,
            animation: None,
            events: Events::default(),
            value: None,
            placeholder: None,
            visible: None,
            enabled: None,
            clickable: None,
            clip: None,
            shadow: None,
            grow: None,
            background: None,
            color: None,
            src: None,
            alt: None,
            size: None,
            weight: None,
            opacity: None,
            round: None,
            align: None,
            main_axis_alignment: None,
            cross_axis_alignment: None,
            data: None,
            resize: None,
            index: None,
        }
    }

    /// Append a child, creating the child list on first use.
    pub fn push_child(&mut self, child: Component) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }

    /// The node's children, or an empty slice.
    pub fn children(&self) -> &[Component] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// How many of the mutually-exclusive content slots (text, children,
    /// adapters) this node carries.
    pub fn content_slot_count(&self) -> usize {
        [
            self.text.is_some(),
            self.children.is_some(),
            self.adapters.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }

    /// Whether dispatch should reach this node. Only an explicit
    /// `enabled == false` opts a node out.
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

/// Soft-check a single node's content invariants.
///
/// A node should carry at most one of text/children/adapters; a text node
/// must carry text and no other tag should. Violations warn and continue.
pub fn validate(component: &Component, diagnostics: &mut Diagnostics) {
    if component.content_slot_count() > 1 {
        diagnostics.push(Diagnostic::ConflictingContent { tag: component.name });
    }
    if !component.name.is_text() && component.text.is_some() {
        diagnostics.push(Diagnostic::TextOnNonText { tag: component.name });
    }
    if component.name.is_text() && component.text.is_none() {
        diagnostics.push(Diagnostic::TextMissing);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{lit, set, Expr};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(tag: Tag) -> Component {
        Component::new(tag, Measure::Wrap, Measure::Wrap)
    }

    // ── Events ───────────────────────────────────────────────────────

    #[test]
    fn events_accumulate_in_order() {
        let mut events = Events::default();
        events.push(EventKind::Click, lit(1));
        events.push(EventKind::Click, lit(2));
        let list = events.list(EventKind::Click).unwrap();
        assert_eq!(list, &[lit(1), lit(2)]);
    }

    #[test]
    fn events_empty_by_default() {
        let events = Events::default();
        assert!(events.is_empty());
        assert!(events.list(EventKind::Init).is_none());
    }

    #[test]
    fn event_kind_wire_names_round_trip() {
        for kind in [
            EventKind::Observe,
            EventKind::Init,
            EventKind::Enter,
            EventKind::Click,
            EventKind::Back,
            EventKind::Change,
            EventKind::Resize,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("onHover"), None);
    }

    // ── Component ────────────────────────────────────────────────────

    #[test]
    fn push_child_creates_list() {
        let mut parent = node(Tag::Column);
        assert!(parent.children.is_none());
        parent.push_child(node(Tag::Text));
        assert_eq!(parent.children().len(), 1);
    }

    #[test]
    fn enabled_defaults_to_true() {
        let mut c = node(Tag::Button);
        assert!(c.is_enabled());
        c.enabled = Some(false);
        assert!(!c.is_enabled());
    }

    #[test]
    fn serializes_sparsely() {
        let c = node(Tag::Row);
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(
            value,
            json!({ "name": "row", "width": "wrap", "height": "wrap" })
        );
    }

    #[test]
    fn event_programs_serialize_under_wire_names() {
        let mut c = node(Tag::Button);
        c.events.push(
            EventKind::Click,
            set(Expr::global().key("count"), lit(1)),
        );
        let value = serde_json::to_value(&c).unwrap();
        assert!(value.get("onClick").is_some());
    }

    #[test]
    fn tree_round_trips_through_json() {
        let mut root = node(Tag::Column);
        let mut text = node(Tag::Text);
        text.text = Some("hello".into());
        root.push_child(text);

        let json = serde_json::to_string(&root).unwrap();
        let back: Component = serde_json::from_str(&json).unwrap();
        assert_eq!(back.children().len(), 1);
        assert_eq!(back.children()[0].text.as_deref(), Some("hello"));
    }

    // ── Validation ───────────────────────────────────────────────────

    #[test]
    fn validate_flags_conflicting_content() {
        let mut c = node(Tag::Column);
        c.text = Some("oops".into());
        c.push_child(node(Tag::Text));

        let mut diags = Diagnostics::new();
        validate(&c, &mut diags);
        assert!(diags.contains(&Diagnostic::ConflictingContent { tag: Tag::Column }));
        // Text on a non-text tag is also flagged.
        assert!(diags.contains(&Diagnostic::TextOnNonText { tag: Tag::Column }));
    }

    #[test]
    fn validate_flags_text_node_without_text() {
        let c = node(Tag::Text);
        let mut diags = Diagnostics::new();
        validate(&c, &mut diags);
        assert!(diags.contains(&Diagnostic::TextMissing));
    }

    #[test]
    fn validate_accepts_well_formed_nodes() {
        let mut text = node(Tag::Text);
        text.text = Some("ok".into());
        let mut diags = Diagnostics::new();
        validate(&text, &mut diags);
        assert!(diags.is_empty());
    }
}
