use crate::error::LosslessJsonError;
use crate::format::{self, DetectionWalk, Style};
use crate::model::{InputSpan, JsonToken, TokenType};
use crate::options::FormatOptions;
use crate::value::{check_identifier, encode_string, format_number, numbers_equal, JsonValue};

/// The kind of a value node, used by [`parse_as`] and the typed accessors.
///
/// [`parse_as`]: crate::parse_as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Primitive,
    Identifier,
    Array,
    Object,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Primitive => "primitive",
            NodeKind::Identifier => "identifier",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
        }
    }

    fn with_article(&self) -> &'static str {
        match self {
            NodeKind::Primitive => "a primitive",
            NodeKind::Identifier => "an identifier",
            NodeKind::Array => "an array",
            NodeKind::Object => "an object",
        }
    }
}

/// One entry of a composite's physical child list: either a leaf token
/// (punctuation or trivia) or a reference into the owning composite's item
/// arena. Flattening the rib list in order reproduces the serialized text.
#[derive(Debug, Clone)]
pub(crate) enum Rib {
    Token(JsonToken),
    Item(usize),
}

impl Rib {
    pub(crate) fn as_token(&self) -> Option<&JsonToken> {
        match self {
            Rib::Token(t) => Some(t),
            Rib::Item(_) => None,
        }
    }

    pub(crate) fn token_type(&self) -> Option<TokenType> {
        self.as_token().map(|t| t.token_type)
    }

    pub(crate) fn is_insignificant(&self) -> bool {
        matches!(self, Rib::Token(t) if t.is_insignificant())
    }
}

/// The decoded logical value of a primitive node.
#[derive(Debug, Clone)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Null, Primitive::Null) => true,
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            (Primitive::Number(a), Primitive::Number(b)) => numbers_equal(*a, *b),
            (Primitive::String(a), Primitive::String(b)) => a == b,
            _ => false,
        }
    }
}

/// A string, number, boolean, or null value.
///
/// The verbatim token from the parse is kept alongside the decoded value:
/// `0x2A` and `42` are logically equal but textually distinct, and the
/// original spelling is re-emitted unless the value actually changes.
#[derive(Debug, Clone)]
pub struct PrimitiveNode {
    pub(crate) span: InputSpan,
    pub(crate) token: Option<JsonToken>,
    pub(crate) value: Primitive,
}

impl PrimitiveNode {
    pub(crate) fn parsed(token: JsonToken, value: Primitive) -> Self {
        let span = token.span;
        PrimitiveNode { span, token: Some(token), value }
    }

    pub fn fresh(value: Primitive) -> Self {
        PrimitiveNode { span: InputSpan::UNKNOWN, token: None, value }
    }

    pub fn value(&self) -> &Primitive {
        &self.value
    }

    /// The original token text, when this node came from a parse and has
    /// not been overwritten since.
    pub fn verbatim(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.text.as_str())
    }

    /// Replaces the decoded value. The verbatim token survives only when
    /// the new value equals the old one.
    pub fn set_value(&mut self, value: Primitive) {
        if self.value == value {
            return;
        }
        self.value = value;
        self.token = None;
        self.span = InputSpan::UNKNOWN;
    }

    pub fn is_equivalent(&self, other: &PrimitiveNode) -> bool {
        self.value == other.value
    }

    pub(crate) fn default_text(&self) -> String {
        match &self.value {
            Primitive::Null => "null".to_string(),
            Primitive::Bool(true) => "true".to_string(),
            Primitive::Bool(false) => "false".to_string(),
            Primitive::Number(n) => format_number(*n),
            Primitive::String(s) => encode_string(s, '"'),
        }
    }

    pub(crate) fn write_text(&self, out: &mut String) {
        match &self.token {
            Some(t) => out.push_str(&t.text),
            None => out.push_str(&self.default_text()),
        }
    }
}

/// An unquoted property name written as a bare identifier.
#[derive(Debug, Clone)]
pub struct IdentifierNode {
    pub(crate) span: InputSpan,
    pub(crate) token: Option<JsonToken>,
    pub(crate) name: String,
}

impl IdentifierNode {
    pub(crate) fn parsed(token: JsonToken) -> Self {
        let span = token.span;
        let name = token.text.clone();
        IdentifierNode { span, token: Some(token), name }
    }

    pub fn fresh(name: &str) -> Result<Self, LosslessJsonError> {
        check_identifier(name)?;
        Ok(IdentifierNode { span: InputSpan::UNKNOWN, token: None, name: name.to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_equivalent(&self, other: &IdentifierNode) -> bool {
        self.name == other.name
    }

    pub(crate) fn write_text(&self, out: &mut String) {
        match &self.token {
            Some(t) => out.push_str(&t.text),
            None => out.push_str(&self.name),
        }
    }
}

/// A `key: value` pair inside an object.
///
/// The rib list holds the key, the colon, the value, and any trivia between
/// them; trivia before the property and after its value belong to the
/// enclosing object instead.
#[derive(Debug, Clone)]
pub struct PropertyNode {
    pub(crate) span: InputSpan,
    pub(crate) children: Vec<Rib>,
    pub(crate) slots: Vec<Option<ValueNode>>,
    pub(crate) key_slot: usize,
    pub(crate) value_slot: usize,
    pub(crate) dirty: bool,
}

impl PropertyNode {
    pub(crate) fn parsed(
        key: ValueNode,
        value: ValueNode,
        children_between: Vec<Rib>,
        span: InputSpan,
    ) -> Self {
        let mut slots = Vec::with_capacity(2);
        slots.push(Some(key));
        slots.push(Some(value));
        let mut children = vec![Rib::Item(0)];
        children.extend(children_between);
        children.push(Rib::Item(1));
        PropertyNode { span, children, slots, key_slot: 0, value_slot: 1, dirty: false }
    }

    pub fn fresh(name: &str, value: ValueNode) -> Self {
        let key = ValueNode::Primitive(PrimitiveNode::fresh(Primitive::String(name.to_string())));
        PropertyNode {
            span: InputSpan::UNKNOWN,
            children: Vec::new(),
            slots: vec![Some(key), Some(value)],
            key_slot: 0,
            value_slot: 1,
            dirty: true,
        }
    }

    pub fn key(&self) -> &ValueNode {
        self.slot_ref(self.key_slot)
    }

    pub fn key_name(&self) -> &str {
        match self.key() {
            ValueNode::Primitive(p) => match &p.value {
                Primitive::String(s) => s,
                _ => "",
            },
            ValueNode::Identifier(id) => &id.name,
            _ => "",
        }
    }

    pub fn value(&self) -> &ValueNode {
        self.slot_ref(self.value_slot)
    }

    pub fn value_mut(&mut self) -> &mut ValueNode {
        let slot = self.value_slot;
        match self.slots[slot].as_mut() {
            Some(v) => v,
            None => unreachable!("property value slot is always populated"),
        }
    }

    pub fn set_value(&mut self, value: ValueNode) {
        self.slots.push(Some(value));
        self.value_slot = self.slots.len() - 1;
        self.dirty = true;
    }

    /// Discards the property's physical tokens (trivia and colon spacing),
    /// forcing regeneration on the next serialization.
    pub fn reset(&mut self) {
        self.children.clear();
        self.dirty = true;
    }

    pub fn is_equivalent(&self, other: &PropertyNode) -> bool {
        self.key_name() == other.key_name() && self.value().is_equivalent(other.value())
    }

    fn slot_ref(&self, id: usize) -> &ValueNode {
        match self.slots[id].as_ref() {
            Some(v) => v,
            None => unreachable!("property key/value slots are always populated"),
        }
    }

    pub(crate) fn write_text(&self, out: &mut String) {
        for rib in &self.children {
            match rib {
                Rib::Token(t) => out.push_str(&t.text),
                Rib::Item(id) => {
                    if let Some(node) = self.slots[*id].as_ref() {
                        node.write_text(out);
                    }
                }
            }
        }
    }
}

/// Which kind of structural composite a [`Structure`] is; supplies the
/// delimiter pair and how deep formatting detection looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StructureKind {
    Array,
    Object,
}

impl StructureKind {
    pub(crate) fn open_type(&self) -> TokenType {
        match self {
            StructureKind::Array => TokenType::BeginArray,
            StructureKind::Object => TokenType::BeginObject,
        }
    }

    pub(crate) fn close_type(&self) -> TokenType {
        match self {
            StructureKind::Array => TokenType::EndArray,
            StructureKind::Object => TokenType::EndObject,
        }
    }

    pub(crate) fn open_text(&self) -> &'static str {
        match self {
            StructureKind::Array => "[",
            StructureKind::Object => "{",
        }
    }

    pub(crate) fn close_text(&self) -> &'static str {
        match self {
            StructureKind::Array => "]",
            StructureKind::Object => "}",
        }
    }
}

/// The hooks the shared structure machinery needs from its item type:
/// equivalence for reconciliation, serialization, formatting evidence, and
/// recursive synchronization.
pub(crate) trait StructureItem: Sized + Clone {
    const KIND: StructureKind;
    fn is_equivalent(&self, other: &Self) -> bool;
    fn write_text(&self, out: &mut String);
    fn detect_item(&self, walk: &mut DetectionWalk, depth: usize);
    fn synchronize(
        &mut self,
        inherited: &Style,
        options: Option<&FormatOptions>,
        depth: usize,
        restyle: bool,
    );
}

/// Shared machinery for arrays and objects: a delimiter pair, a physical
/// rib list, and an ordered logical item list.
///
/// Mutating accessors edit only `order` and the slot arena; the rib list is
/// stale until the next rebuild, which happens lazily at serialization time.
#[derive(Debug, Clone)]
pub struct Structure<T> {
    pub(crate) span: InputSpan,
    pub(crate) children: Vec<Rib>,
    pub(crate) slots: Vec<Option<T>>,
    pub(crate) order: Vec<usize>,
    pub(crate) dirty: bool,
}

/// A JSON array node.
pub type ArrayNode = Structure<ValueNode>;
/// A JSON object node.
pub type ObjectNode = Structure<PropertyNode>;

impl<T> Structure<T> {
    pub(crate) fn new_parsed(span: InputSpan) -> Self {
        Structure { span, children: Vec::new(), slots: Vec::new(), order: Vec::new(), dirty: false }
    }

    pub fn new() -> Self {
        Structure {
            span: InputSpan::UNKNOWN,
            children: Vec::new(),
            slots: Vec::new(),
            order: Vec::new(),
            dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Discards the physical token stream, forcing the next serialization
    /// to regenerate this structure's formatting from scratch. The logical
    /// items (and their own internals) are kept.
    pub fn reset(&mut self) {
        self.children.clear();
        self.dirty = true;
    }

    pub(crate) fn add_slot(&mut self, item: T) -> usize {
        self.slots.push(Some(item));
        self.slots.len() - 1
    }

    pub(crate) fn slot(&self, id: usize) -> Option<&T> {
        self.slots.get(id).and_then(|s| s.as_ref())
    }

    /// Drops arena entries no longer referenced by the logical order. Runs
    /// after a rebuild, once the rib list references `order` exactly.
    pub(crate) fn sweep(&mut self) {
        for id in 0..self.slots.len() {
            if !self.order.contains(&id) {
                self.slots[id] = None;
            }
        }
    }

    fn out_of_bounds(&self, index: usize) -> LosslessJsonError {
        LosslessJsonError::simple(format!(
            "Index {} is out of bounds (length {})",
            index,
            self.order.len()
        ))
    }
}

impl<T> Default for Structure<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StructureItem> Structure<T> {
    pub(crate) fn write_text(&self, out: &mut String) {
        for rib in &self.children {
            match rib {
                Rib::Token(t) => out.push_str(&t.text),
                Rib::Item(id) => {
                    if let Some(item) = self.slots[*id].as_ref() {
                        item.write_text(out);
                    }
                }
            }
        }
    }

    pub(crate) fn items_equivalent(&self, other: &Self) -> bool {
        self.order.len() == other.order.len()
            && self
                .order
                .iter()
                .zip(other.order.iter())
                .all(|(a, b)| match (self.slot(*a), other.slot(*b)) {
                    (Some(x), Some(y)) => x.is_equivalent(y),
                    _ => false,
                })
    }
}

impl ArrayNode {
    pub fn get(&self, index: usize) -> Option<&ValueNode> {
        self.order.get(index).and_then(|id| self.slot(*id))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ValueNode> {
        let id = *self.order.get(index)?;
        self.slots.get_mut(id).and_then(|s| s.as_mut())
    }

    /// Replaces the element at `index`.
    pub fn set(
        &mut self,
        index: usize,
        value: impl Into<JsonValue>,
    ) -> Result<(), LosslessJsonError> {
        self.set_node(index, ValueNode::from_value(value.into()))
    }

    pub fn set_node(&mut self, index: usize, node: ValueNode) -> Result<(), LosslessJsonError> {
        if index >= self.order.len() {
            return Err(self.out_of_bounds(index));
        }
        let id = self.add_slot(node);
        self.order[index] = id;
        self.dirty = true;
        Ok(())
    }

    pub fn push(&mut self, value: impl Into<JsonValue>) {
        self.push_node(ValueNode::from_value(value.into()));
    }

    pub fn push_node(&mut self, node: ValueNode) {
        let id = self.add_slot(node);
        self.order.push(id);
        self.dirty = true;
    }

    pub fn pop(&mut self) -> Option<ValueNode> {
        let id = self.order.pop()?;
        self.dirty = true;
        self.slots[id].take()
    }

    /// Removes and returns the first element.
    pub fn shift(&mut self) -> Option<ValueNode> {
        if self.order.is_empty() {
            return None;
        }
        let id = self.order.remove(0);
        self.dirty = true;
        self.slots[id].take()
    }

    /// Prepends an element.
    pub fn unshift(&mut self, value: impl Into<JsonValue>) {
        let id = self.add_slot(ValueNode::from_value(value.into()));
        self.order.insert(0, id);
        self.dirty = true;
    }

    pub fn insert(
        &mut self,
        index: usize,
        value: impl Into<JsonValue>,
    ) -> Result<(), LosslessJsonError> {
        if index > self.order.len() {
            return Err(self.out_of_bounds(index));
        }
        let id = self.add_slot(ValueNode::from_value(value.into()));
        self.order.insert(index, id);
        self.dirty = true;
        Ok(())
    }

    /// Removes the element at `index` and returns it.
    pub fn delete(&mut self, index: usize) -> Result<ValueNode, LosslessJsonError> {
        if index >= self.order.len() {
            return Err(self.out_of_bounds(index));
        }
        let id = self.order.remove(index);
        self.dirty = true;
        match self.slots[id].take() {
            Some(node) => Ok(node),
            None => unreachable!("ordered slots are always populated"),
        }
    }

    /// Removes `delete_count` elements starting at `start` (clamped to the
    /// end) and inserts `values` in their place, returning the removed
    /// nodes.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        values: Vec<JsonValue>,
    ) -> Result<Vec<ValueNode>, LosslessJsonError> {
        if start > self.order.len() {
            return Err(self.out_of_bounds(start));
        }
        let delete_count = delete_count.min(self.order.len() - start);
        let mut removed = Vec::with_capacity(delete_count);
        for _ in 0..delete_count {
            let id = self.order.remove(start);
            if let Some(node) = self.slots[id].take() {
                removed.push(node);
            }
        }
        for (offset, value) in values.into_iter().enumerate() {
            let id = self.add_slot(ValueNode::from_value(value));
            self.order.insert(start + offset, id);
        }
        self.dirty = true;
        Ok(removed)
    }

    pub fn clear(&mut self) {
        if !self.order.is_empty() {
            self.order.clear();
            self.dirty = true;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueNode> {
        self.order.iter().filter_map(move |id| self.slot(*id))
    }
}

impl ObjectNode {
    pub fn get(&self, name: &str) -> Option<&ValueNode> {
        self.get_property(name).map(|p| p.value())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ValueNode> {
        let id = *self
            .order
            .iter()
            .find(|id| matches!(self.slot(**id), Some(p) if p.key_name() == name))?;
        self.slots
            .get_mut(id)
            .and_then(|s| s.as_mut())
            .map(|p| p.value_mut())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyNode> {
        self.order
            .iter()
            .filter_map(|id| self.slot(*id))
            .find(|p| p.key_name() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(move |id| self.slot(*id))
            .map(|p| p.key_name())
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyNode> {
        self.order.iter().filter_map(move |id| self.slot(*id))
    }

    /// Sets a property, replacing the value of an existing one or
    /// appending a new property at the end.
    pub fn set(&mut self, name: &str, value: impl Into<JsonValue>) {
        self.set_node(name, ValueNode::from_value(value.into()));
    }

    pub fn set_node(&mut self, name: &str, node: ValueNode) {
        let existing = self
            .order
            .iter()
            .copied()
            .find(|id| matches!(self.slot(*id), Some(p) if p.key_name() == name));
        match existing {
            Some(id) => {
                if let Some(prop) = self.slots[id].as_mut() {
                    prop.set_value(node);
                }
            }
            None => {
                let id = self.add_slot(PropertyNode::fresh(name, node));
                self.order.push(id);
                self.dirty = true;
            }
        }
    }

    /// Removes the named property and returns its value.
    pub fn delete(&mut self, name: &str) -> Result<ValueNode, LosslessJsonError> {
        let position = self
            .order
            .iter()
            .position(|id| matches!(self.slot(*id), Some(p) if p.key_name() == name));
        let position = position.ok_or_else(|| {
            LosslessJsonError::simple(format!("Object has no property named '{}'", name))
        })?;
        let id = self.order.remove(position);
        self.dirty = true;
        match self.slots[id].take() {
            Some(mut prop) => match prop.slots[prop.value_slot].take() {
                Some(value) => Ok(value),
                None => unreachable!("ordered slots are always populated"),
            },
            None => unreachable!("ordered slots are always populated"),
        }
    }
}

/// One JSON value: a primitive, an identifier, an array, or an object.
///
/// The closed enum makes every node-kind-specific branch of the rebuild and
/// equivalence logic exhaustively checked.
#[derive(Debug, Clone)]
pub enum ValueNode {
    Primitive(PrimitiveNode),
    Identifier(IdentifierNode),
    Array(ArrayNode),
    Object(ObjectNode),
}

impl ValueNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ValueNode::Primitive(_) => NodeKind::Primitive,
            ValueNode::Identifier(_) => NodeKind::Identifier,
            ValueNode::Array(_) => NodeKind::Array,
            ValueNode::Object(_) => NodeKind::Object,
        }
    }

    pub fn span(&self) -> InputSpan {
        match self {
            ValueNode::Primitive(p) => p.span,
            ValueNode::Identifier(i) => i.span,
            ValueNode::Array(a) => a.span,
            ValueNode::Object(o) => o.span,
        }
    }

    /// Structural/value equality, ignoring source spans.
    pub fn is_equivalent(&self, other: &ValueNode) -> bool {
        match (self, other) {
            (ValueNode::Primitive(a), ValueNode::Primitive(b)) => a.is_equivalent(b),
            (ValueNode::Identifier(a), ValueNode::Identifier(b)) => a.is_equivalent(b),
            (ValueNode::Array(a), ValueNode::Array(b)) => a.items_equivalent(b),
            (ValueNode::Object(a), ValueNode::Object(b)) => a.items_equivalent(b),
            _ => false,
        }
    }

    /// `is_equivalent` plus identical source spans.
    pub fn equals(&self, other: &ValueNode) -> bool {
        self.span() == other.span() && self.is_equivalent(other)
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveNode> {
        match self {
            ValueNode::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_primitive_mut(&mut self) -> Option<&mut PrimitiveNode> {
        match self {
            ValueNode::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            ValueNode::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayNode> {
        match self {
            ValueNode::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            ValueNode::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectNode> {
        match self {
            ValueNode::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn expect_array(&self) -> Result<&ArrayNode, LosslessJsonError> {
        match self {
            ValueNode::Array(a) => Ok(a),
            other => Err(other.kind_mismatch(NodeKind::Array)),
        }
    }

    pub fn expect_array_mut(&mut self) -> Result<&mut ArrayNode, LosslessJsonError> {
        match self {
            ValueNode::Array(a) => Ok(a),
            other => Err(other.kind_mismatch(NodeKind::Array)),
        }
    }

    pub fn expect_object(&self) -> Result<&ObjectNode, LosslessJsonError> {
        match self {
            ValueNode::Object(o) => Ok(o),
            other => Err(other.kind_mismatch(NodeKind::Object)),
        }
    }

    pub fn expect_object_mut(&mut self) -> Result<&mut ObjectNode, LosslessJsonError> {
        match self {
            ValueNode::Object(o) => Ok(o),
            other => Err(other.kind_mismatch(NodeKind::Object)),
        }
    }

    pub fn expect_primitive(&self) -> Result<&PrimitiveNode, LosslessJsonError> {
        match self {
            ValueNode::Primitive(p) => Ok(p),
            other => Err(other.kind_mismatch(NodeKind::Primitive)),
        }
    }

    fn kind_mismatch(&self, expected: NodeKind) -> LosslessJsonError {
        LosslessJsonError::new(
            format!(
                "Expected {} but found {}",
                expected.with_article(),
                self.kind().with_article()
            ),
            Some(self.span().start),
        )
    }

    /// Builds a fresh, unformatted node tree from a plain value. The tree
    /// has no source location and no physical tokens until it is first
    /// serialized into a document.
    pub fn from_value(value: JsonValue) -> ValueNode {
        match value {
            JsonValue::Null => ValueNode::Primitive(PrimitiveNode::fresh(Primitive::Null)),
            JsonValue::Bool(b) => ValueNode::Primitive(PrimitiveNode::fresh(Primitive::Bool(b))),
            JsonValue::Number(n) => {
                ValueNode::Primitive(PrimitiveNode::fresh(Primitive::Number(n)))
            }
            JsonValue::String(s) => {
                ValueNode::Primitive(PrimitiveNode::fresh(Primitive::String(s)))
            }
            JsonValue::Array(items) => {
                let mut array = ArrayNode::new();
                for item in items {
                    array.push_node(ValueNode::from_value(item));
                }
                ValueNode::Array(array)
            }
            JsonValue::Object(entries) => {
                let mut object = ObjectNode::new();
                for (name, item) in entries {
                    object.set_node(&name, ValueNode::from_value(item));
                }
                ValueNode::Object(object)
            }
        }
    }

    /// Projects the node into a plain decoded value tree.
    pub fn to_json(&self) -> JsonValue {
        match self {
            ValueNode::Primitive(p) => match &p.value {
                Primitive::Null => JsonValue::Null,
                Primitive::Bool(b) => JsonValue::Bool(*b),
                Primitive::Number(n) => JsonValue::Number(*n),
                Primitive::String(s) => JsonValue::String(s.clone()),
            },
            ValueNode::Identifier(i) => JsonValue::String(i.name.clone()),
            ValueNode::Array(a) => JsonValue::Array(a.iter().map(|v| v.to_json()).collect()),
            ValueNode::Object(o) => JsonValue::Object(
                o.properties()
                    .map(|p| (p.key_name().to_string(), p.value().to_json()))
                    .collect(),
            ),
        }
    }

    /// Replaces this node's logical content with `value`, reusing existing
    /// sub-nodes (and their formatting) wherever the kinds line up.
    ///
    /// With `merge` set, object properties absent from `value` are kept;
    /// without it, they are deleted.
    pub fn update(&mut self, value: JsonValue, merge: bool) {
        match (&mut *self, value) {
            (ValueNode::Primitive(p), JsonValue::Null) => p.set_value(Primitive::Null),
            (ValueNode::Primitive(p), JsonValue::Bool(b)) => p.set_value(Primitive::Bool(b)),
            (ValueNode::Primitive(p), JsonValue::Number(n)) => p.set_value(Primitive::Number(n)),
            (ValueNode::Primitive(p), JsonValue::String(s)) => p.set_value(Primitive::String(s)),
            (ValueNode::Array(a), JsonValue::Array(items)) => {
                let target_len = items.len();
                for (i, item) in items.into_iter().enumerate() {
                    if i < a.len() {
                        if let Some(existing) = a.get_mut(i) {
                            existing.update(item, merge);
                        }
                    } else {
                        a.push(item);
                    }
                }
                while a.len() > target_len {
                    let _ = a.delete(target_len);
                }
            }
            (ValueNode::Object(o), JsonValue::Object(entries)) => {
                if !merge {
                    let stale: Vec<String> = o
                        .keys()
                        .filter(|k| !entries.iter().any(|(name, _)| name == k))
                        .map(|k| k.to_string())
                        .collect();
                    for name in stale {
                        let _ = o.delete(&name);
                    }
                }
                for (name, item) in entries {
                    match o.get_mut(&name) {
                        Some(existing) => existing.update(item, merge),
                        None => o.set(&name, item),
                    }
                }
            }
            (slot, value) => *slot = ValueNode::from_value(value),
        }
    }

    pub(crate) fn write_text(&self, out: &mut String) {
        match self {
            ValueNode::Primitive(p) => p.write_text(out),
            ValueNode::Identifier(i) => i.write_text(out),
            ValueNode::Array(a) => a.write_text(out),
            ValueNode::Object(o) => o.write_text(out),
        }
    }
}

impl StructureItem for ValueNode {
    const KIND: StructureKind = StructureKind::Array;

    fn is_equivalent(&self, other: &Self) -> bool {
        ValueNode::is_equivalent(self, other)
    }

    fn write_text(&self, out: &mut String) {
        ValueNode::write_text(self, out);
    }

    fn detect_item(&self, walk: &mut DetectionWalk, _depth: usize) {
        if let ValueNode::Primitive(p) = self {
            format::observe_primitive_quote(p, false, walk);
        }
    }

    fn synchronize(
        &mut self,
        inherited: &Style,
        options: Option<&FormatOptions>,
        depth: usize,
        restyle: bool,
    ) {
        format::synchronize_value(self, inherited, options, depth, restyle);
    }
}

impl StructureItem for PropertyNode {
    const KIND: StructureKind = StructureKind::Object;

    fn is_equivalent(&self, other: &Self) -> bool {
        PropertyNode::is_equivalent(self, other)
    }

    fn write_text(&self, out: &mut String) {
        PropertyNode::write_text(self, out);
    }

    fn detect_item(&self, walk: &mut DetectionWalk, depth: usize) {
        format::observe_property_item(self, walk, depth);
    }

    fn synchronize(
        &mut self,
        inherited: &Style,
        options: Option<&FormatOptions>,
        depth: usize,
        restyle: bool,
    ) {
        format::synchronize_property(self, inherited, options, depth, restyle);
    }
}

/// A parsed document: leading trivia, exactly one root value, and trailing
/// trivia. Serializing an unmutated document reproduces the input exactly.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) leading: Vec<JsonToken>,
    pub(crate) root: ValueNode,
    pub(crate) trailing: Vec<JsonToken>,
}

impl Document {
    /// Wraps a fresh value tree in an empty document.
    pub fn from_value(value: impl Into<JsonValue>) -> Document {
        Document {
            leading: Vec::new(),
            root: ValueNode::from_value(value.into()),
            trailing: Vec::new(),
        }
    }

    pub fn root(&self) -> &ValueNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ValueNode {
        &mut self.root
    }

    /// Replaces the root value, keeping the document's surrounding trivia.
    pub fn set_root(&mut self, value: impl Into<JsonValue>) {
        self.root = ValueNode::from_value(value.into());
    }

    pub fn update(&mut self, value: JsonValue, merge: bool) {
        self.root.update(value, merge);
    }

    pub fn to_json(&self) -> JsonValue {
        self.root.to_json()
    }

    /// Serializes the document, rebuilding any mutated structures while
    /// preserving the original formatting of everything untouched.
    pub fn to_text(&mut self) -> String {
        format::synchronize_document(self, None);
        self.flatten()
    }

    /// Serializes with explicit style overrides applied throughout.
    pub fn to_text_with(&mut self, options: &FormatOptions) -> String {
        format::synchronize_document(self, Some(options));
        self.flatten()
    }

    /// Applies explicit style overrides to the whole tree without
    /// serializing. Comments and unchanged value spellings survive.
    pub fn reformat(&mut self, options: &FormatOptions) {
        format::synchronize_document(self, Some(options));
    }

    fn flatten(&self) -> String {
        let mut out = String::new();
        for token in &self.leading {
            out.push_str(&token.text);
        }
        self.root.write_text(&mut out);
        for token in &self.trailing {
            out.push_str(&token.text);
        }
        out
    }
}
