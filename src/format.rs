use crate::manipulator::{ItemOutcome, ListEditor};
use crate::model::{InputSpan, JsonToken, TokenType};
use crate::node::{
    ArrayNode, Document, IdentifierNode, ObjectNode, Primitive, PrimitiveNode, PropertyNode, Rib,
    Structure, StructureItem, StructureKind, ValueNode,
};
use crate::options::{FormatOptions, QuoteStyle};
use crate::value::{encode_string, format_number, is_reserved_word, is_valid_identifier};

const DEFAULT_INDENT_SIZE: usize = 4;

/// The working style state for one rebuild: detected evidence merged over
/// the style inherited from enclosing structures. Array- and
/// object-specific concerns are tracked separately so a nested level never
/// loses the other collection kind's settings.
#[derive(Debug, Clone, Default)]
pub(crate) struct CollectionStyle {
    pub indentation_size: Option<usize>,
    pub leading_indentation: Option<bool>,
    pub trailing_indentation: Option<bool>,
    pub entry_indentation: Option<bool>,
    pub trailing_comma: Option<bool>,
    pub comma_spacing: Option<bool>,
    pub colon_spacing: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Style {
    pub array: CollectionStyle,
    pub object: CollectionStyle,
    pub indent_char: Option<char>,
    pub string_quote: Option<char>,
    pub property_quote: Option<char>,
    pub property_unquoted: Option<bool>,
}

impl Style {
    fn collection(&self, kind: StructureKind) -> &CollectionStyle {
        match kind {
            StructureKind::Array => &self.array,
            StructureKind::Object => &self.object,
        }
    }

    fn collection_mut(&mut self, kind: StructureKind) -> &mut CollectionStyle {
        match kind {
            StructureKind::Array => &mut self.array,
            StructureKind::Object => &mut self.object,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingSpacing {
    Comma,
    Colon,
}

/// Evidence accumulator for formatting detection. One walk per rebuild,
/// never cached: every call may carry different explicit overrides.
#[derive(Debug, Default)]
pub(crate) struct DetectionWalk {
    comma_spacing: Option<bool>,
    colon_spacing: Option<bool>,
    entry_indentation: Option<bool>,
    leading_indentation: Option<bool>,
    trailing_indentation: Option<bool>,
    trailing_comma: Option<bool>,
    deepest_indent: Option<(usize, usize)>,
    saw_tab: bool,
    string_quote: Option<char>,
    property_quote: Option<char>,
    property_unquoted: Option<bool>,

    saw_newline_since_significant: bool,
    saw_any_newline: bool,
    pending_spacing: Option<PendingSpacing>,
    pending_indent_width: Option<usize>,
    after_newline: bool,
    at_block_start: bool,
    saw_item: bool,
    last_significant_was_comma: bool,
}

impl DetectionWalk {
    fn begin_block(&mut self) {
        self.at_block_start = true;
    }

    fn resolve_pending(&mut self, spaced: Option<bool>) {
        if let Some(pending) = self.pending_spacing.take() {
            if let Some(spaced) = spaced {
                match pending {
                    PendingSpacing::Comma => self.comma_spacing = Some(spaced),
                    PendingSpacing::Colon => self.colon_spacing = Some(spaced),
                }
            }
        }
    }

    fn record_indent(&mut self, depth: usize, width: usize) {
        match self.deepest_indent {
            Some((d, _)) if d > depth => {}
            _ => self.deepest_indent = Some((depth, width)),
        }
    }

    pub(crate) fn observe_token(&mut self, token: &JsonToken, depth: usize) {
        let at_start = self.at_block_start;
        self.at_block_start = false;
        match token.token_type {
            TokenType::Whitespace => {
                self.resolve_pending(Some(true));
                if at_start {
                    self.leading_indentation = Some(false);
                }
                if self.after_newline {
                    self.pending_indent_width = Some(token.text.chars().count());
                    if token.text.contains('\t') {
                        self.saw_tab = true;
                    }
                    self.after_newline = false;
                }
            }
            TokenType::Newline => {
                self.resolve_pending(None);
                if at_start {
                    self.leading_indentation = Some(true);
                }
                self.saw_newline_since_significant = true;
                self.saw_any_newline = true;
                self.after_newline = true;
                self.pending_indent_width = None;
            }
            TokenType::LineComment | TokenType::BlockComment => {
                self.resolve_pending(Some(false));
                if at_start {
                    self.leading_indentation = Some(false);
                }
                self.after_newline = false;
                self.pending_indent_width = None;
            }
            TokenType::Comma => {
                self.resolve_pending(Some(false));
                self.observe_significant(depth);
                self.pending_spacing = Some(PendingSpacing::Comma);
                self.last_significant_was_comma = true;
            }
            TokenType::Colon => {
                self.resolve_pending(Some(false));
                self.observe_significant(depth);
                self.pending_spacing = Some(PendingSpacing::Colon);
            }
            _ => {
                self.resolve_pending(Some(false));
                if at_start {
                    self.leading_indentation = Some(false);
                }
                self.observe_significant(depth);
            }
        }
    }

    /// Shared bookkeeping for any significant token or item: consume the
    /// pending indentation evidence and reset the line-tracking flags.
    pub(crate) fn observe_significant(&mut self, depth: usize) {
        if self.after_newline {
            self.record_indent(depth, 0);
        } else if let Some(width) = self.pending_indent_width {
            self.record_indent(depth, width);
        }
        self.after_newline = false;
        self.pending_indent_width = None;
        self.saw_newline_since_significant = false;
        self.last_significant_was_comma = false;
    }

    fn observe_item(&mut self, depth: usize) {
        let at_start = self.at_block_start;
        self.at_block_start = false;
        if at_start {
            self.leading_indentation = Some(self.saw_newline_since_significant);
        }
        self.resolve_pending(Some(false));
        self.entry_indentation = Some(self.saw_newline_since_significant);
        self.observe_significant(depth);
        self.saw_item = true;
    }

    fn observe_close(&mut self) {
        self.trailing_indentation = Some(self.saw_newline_since_significant);
        if self.saw_item {
            self.trailing_comma = Some(self.last_significant_was_comma);
        }
    }

    /// A deliberately multi-line empty block reads as an intent to space
    /// and indent, so an empty-but-newlined body turns the defaults on.
    fn finish(&mut self) {
        if !self.saw_item && self.trailing_comma.is_none() && self.saw_any_newline {
            self.comma_spacing.get_or_insert(true);
            self.colon_spacing.get_or_insert(true);
            self.entry_indentation.get_or_insert(true);
            self.leading_indentation.get_or_insert(true);
            self.trailing_indentation.get_or_insert(true);
        }
    }

    /// The per-level indentation unit, from the deepest observed
    /// indentation divided by its nesting depth with the remainder folded
    /// back in, so uneven source indentation still yields a usable width.
    fn unit(&self) -> Option<usize> {
        self.deepest_indent.map(|(depth, width)| {
            if depth <= 1 {
                width
            } else {
                (width - width % depth) / depth + width % depth
            }
        })
    }

    fn to_options(&self, kind: StructureKind) -> FormatOptions {
        let collection = crate::options::CollectionOptions {
            indentation_size: self.unit(),
            leading_indentation: self.leading_indentation,
            trailing_indentation: self.trailing_indentation,
            entry_indentation: self.entry_indentation,
            trailing_comma: self.trailing_comma,
            comma_spacing: self.comma_spacing,
            colon_spacing: self.colon_spacing,
        };
        let mut options = FormatOptions {
            indentation_character: if self.saw_tab {
                Some(crate::options::IndentCharacter::Tab)
            } else if matches!(self.deepest_indent, Some((_, w)) if w > 0) {
                Some(crate::options::IndentCharacter::Space)
            } else {
                None
            },
            string_quote: self.string_quote.map(quote_style),
            property_quote: self.property_quote.map(quote_style),
            property_unquoted: self.property_unquoted,
            ..FormatOptions::default()
        };
        match kind {
            StructureKind::Array => options.array = collection,
            StructureKind::Object => options.object = collection,
        }
        options
    }
}

fn quote_style(ch: char) -> QuoteStyle {
    if ch == '\'' {
        QuoteStyle::Single
    } else {
        QuoteStyle::Double
    }
}

pub(crate) fn observe_primitive_quote(
    node: &PrimitiveNode,
    is_key: bool,
    walk: &mut DetectionWalk,
) {
    if let Some(token) = &node.token {
        if token.token_type == TokenType::String {
            let quote = token.text.chars().next().unwrap_or('"');
            if is_key {
                walk.property_quote = Some(quote);
                walk.property_unquoted = Some(false);
            } else {
                walk.string_quote = Some(quote);
            }
        }
    }
}

/// Depth-two detection for objects: property keys and values carry quoting
/// evidence, and trivia inside the property carries indentation and colon
/// spacing evidence.
pub(crate) fn observe_property_item(prop: &PropertyNode, walk: &mut DetectionWalk, depth: usize) {
    for rib in &prop.children {
        match rib {
            Rib::Token(t) => walk.observe_token(t, depth + 1),
            Rib::Item(id) => {
                let Some(node) = prop.slots.get(*id).and_then(|s| s.as_ref()) else {
                    continue;
                };
                if *id == prop.key_slot {
                    match node {
                        ValueNode::Primitive(p) => observe_primitive_quote(p, true, walk),
                        ValueNode::Identifier(_) => walk.property_unquoted = Some(true),
                        _ => {}
                    }
                } else if let ValueNode::Primitive(p) = node {
                    observe_primitive_quote(p, false, walk);
                }
                walk.observe_significant(depth + 1);
            }
        }
    }
}

fn detect<T: StructureItem>(s: &Structure<T>, depth: usize) -> DetectionWalk {
    let kind = T::KIND;
    let mut walk = DetectionWalk::default();
    let mut seen_open = false;
    for rib in &s.children {
        match rib {
            Rib::Token(t) if !seen_open && t.token_type == kind.open_type() => {
                seen_open = true;
                walk.begin_block();
            }
            Rib::Token(t) if t.token_type == kind.close_type() => {
                walk.observe_close();
            }
            Rib::Token(t) => walk.observe_token(t, depth + 1),
            Rib::Item(id) => {
                walk.observe_item(depth + 1);
                if let Some(item) = s.slot(*id) {
                    item.detect_item(&mut walk, depth + 1);
                }
            }
        }
    }
    walk.finish();
    walk
}

impl ArrayNode {
    /// The formatting this array's existing text exhibits, as inference
    /// sees it. Unset fields had no evidence either way.
    pub fn detected_style(&self) -> FormatOptions {
        detect(self, 0).to_options(StructureKind::Array)
    }
}

impl ObjectNode {
    /// The formatting this object's existing text exhibits, as inference
    /// sees it. Unset fields had no evidence either way.
    pub fn detected_style(&self) -> FormatOptions {
        detect(self, 0).to_options(StructureKind::Object)
    }
}

fn apply_detected(style: &mut Style, kind: StructureKind, walk: &DetectionWalk) {
    if walk.saw_tab {
        style.indent_char = Some('\t');
    } else if matches!(walk.deepest_indent, Some((_, w)) if w > 0) {
        style.indent_char = Some(' ');
    }
    if let Some(q) = walk.string_quote {
        style.string_quote = Some(q);
    }
    if let Some(q) = walk.property_quote {
        style.property_quote = Some(q);
    }
    if let Some(u) = walk.property_unquoted {
        style.property_unquoted = Some(u);
    }

    let cs = style.collection_mut(kind);
    if let Some(v) = walk.unit() {
        cs.indentation_size = Some(v);
    }
    if let Some(v) = walk.leading_indentation {
        cs.leading_indentation = Some(v);
    }
    if let Some(v) = walk.trailing_indentation {
        cs.trailing_indentation = Some(v);
    }
    if let Some(v) = walk.entry_indentation {
        cs.entry_indentation = Some(v);
    }
    if let Some(v) = walk.trailing_comma {
        cs.trailing_comma = Some(v);
    }
    if let Some(v) = walk.comma_spacing {
        cs.comma_spacing = Some(v);
    }
    if let Some(v) = walk.colon_spacing {
        cs.colon_spacing = Some(v);
    }
}

fn apply_collection_options(
    cs: &mut CollectionStyle,
    opts: &crate::options::CollectionOptions,
) {
    if let Some(v) = opts.indentation_size {
        cs.indentation_size = Some(v);
    }
    if let Some(v) = opts.leading_indentation {
        cs.leading_indentation = Some(v);
    }
    if let Some(v) = opts.trailing_indentation {
        cs.trailing_indentation = Some(v);
    }
    if let Some(v) = opts.entry_indentation {
        cs.entry_indentation = Some(v);
    }
    if let Some(v) = opts.trailing_comma {
        cs.trailing_comma = Some(v);
    }
    if let Some(v) = opts.comma_spacing {
        cs.comma_spacing = Some(v);
    }
    if let Some(v) = opts.colon_spacing {
        cs.colon_spacing = Some(v);
    }
}

fn apply_options(style: &mut Style, opts: &FormatOptions) {
    apply_collection_options(&mut style.array, &opts.array);
    apply_collection_options(&mut style.object, &opts.object);
    if let Some(c) = opts.indentation_character {
        style.indent_char = Some(c.character());
    }
    if let Some(q) = opts.string_quote {
        style.string_quote = Some(q.character());
    }
    if let Some(q) = opts.property_quote {
        style.property_quote = Some(q.character());
    }
    if let Some(u) = opts.property_unquoted {
        style.property_unquoted = Some(u);
    }
}

/// Entry point for serialization: rebuild what is stale (or everything,
/// under explicit overrides), leaving clean regions untouched.
pub(crate) fn synchronize_document(doc: &mut Document, options: Option<&FormatOptions>) {
    let restyle = options.is_some();
    let inherited = Style::default();
    synchronize_value(&mut doc.root, &inherited, options, 0, restyle);
}

pub(crate) fn synchronize_value(
    node: &mut ValueNode,
    inherited: &Style,
    options: Option<&FormatOptions>,
    depth: usize,
    restyle: bool,
) {
    match node {
        ValueNode::Primitive(p) => {
            materialize_primitive(p, inherited, if restyle { options } else { None })
        }
        ValueNode::Identifier(i) => {
            if i.token.is_none() {
                i.token = Some(JsonToken::synthetic(TokenType::Identifier, i.name.clone()));
            }
        }
        ValueNode::Array(a) => sync_structure(a, inherited, options, depth, restyle),
        ValueNode::Object(o) => sync_structure(o, inherited, options, depth, restyle),
    }
}

fn sync_structure<T: StructureItem>(
    s: &mut Structure<T>,
    inherited: &Style,
    options: Option<&FormatOptions>,
    depth: usize,
    restyle: bool,
) {
    let walk = detect(s, depth);
    let mut style = inherited.clone();
    apply_detected(&mut style, T::KIND, &walk);
    if let Some(opts) = options {
        apply_options(&mut style, opts);
    }

    if s.dirty || restyle {
        replay(s, &style, depth, restyle);
        s.dirty = false;
    }

    let order = s.order.clone();
    for id in order {
        if let Some(item) = s.slots[id].as_mut() {
            item.synchronize(&style, options, depth + 1, restyle);
        }
    }
    s.sweep();
}

pub(crate) fn synchronize_property(
    p: &mut PropertyNode,
    style: &Style,
    options: Option<&FormatOptions>,
    depth: usize,
    restyle: bool,
) {
    materialize_key(p, style, if restyle { options } else { None });

    if p.dirty || restyle {
        replay_property(p, style, restyle);
        p.dirty = false;
    }

    let value_slot = p.value_slot;
    if let Some(value) = p.slots[value_slot].as_mut() {
        value.synchronize(style, options, depth, restyle);
    }
    let key_slot = p.key_slot;
    for id in 0..p.slots.len() {
        if id != key_slot && id != value_slot {
            p.slots[id] = None;
        }
    }
}

fn materialize_primitive(
    p: &mut PrimitiveNode,
    style: &Style,
    restyle_opts: Option<&FormatOptions>,
) {
    if p.token.is_none() {
        let text = match &p.value {
            Primitive::String(s) => encode_string(s, style.string_quote.unwrap_or('"')),
            Primitive::Number(n) => format_number(*n),
            _ => p.default_text(),
        };
        p.token = Some(JsonToken::synthetic(token_type_for(&p.value), text));
        return;
    }
    if let (Some(opts), Primitive::String(s)) = (restyle_opts, &p.value) {
        if let Some(q) = opts.string_quote {
            let token = JsonToken::synthetic(TokenType::String, encode_string(s, q.character()));
            p.token = Some(token);
        }
    }
}

fn token_type_for(value: &Primitive) -> TokenType {
    match value {
        Primitive::Null => TokenType::Null,
        Primitive::Bool(_) => TokenType::Boolean,
        Primitive::Number(_) => TokenType::Number,
        Primitive::String(_) => TokenType::String,
    }
}

fn materialize_key(p: &mut PropertyNode, style: &Style, restyle_opts: Option<&FormatOptions>) {
    let key_slot = p.key_slot;
    let Some(key) = p.slots[key_slot].as_mut() else {
        return;
    };
    match key {
        ValueNode::Primitive(prim) => {
            let name = match &prim.value {
                Primitive::String(s) => s.clone(),
                _ => return,
            };
            let fresh = prim.token.is_none();
            let want_unquoted = if fresh {
                style.property_unquoted == Some(true)
            } else {
                restyle_opts.and_then(|o| o.property_unquoted) == Some(true)
            };
            if want_unquoted && is_valid_identifier(&name) && !is_reserved_word(&name) {
                *key = ValueNode::Identifier(IdentifierNode {
                    span: InputSpan::UNKNOWN,
                    token: Some(JsonToken::synthetic(TokenType::Identifier, name.clone())),
                    name,
                });
            } else if fresh {
                let quote = style.property_quote.unwrap_or('"');
                prim.token =
                    Some(JsonToken::synthetic(TokenType::String, encode_string(&name, quote)));
            } else if let Some(q) = restyle_opts.and_then(|o| o.property_quote) {
                prim.token = Some(JsonToken::synthetic(
                    TokenType::String,
                    encode_string(&name, q.character()),
                ));
            }
        }
        ValueNode::Identifier(id_node) => {
            if id_node.token.is_none() {
                id_node.token =
                    Some(JsonToken::synthetic(TokenType::Identifier, id_node.name.clone()));
            } else if restyle_opts.and_then(|o| o.property_unquoted) == Some(false) {
                let name = id_node.name.clone();
                let quote = restyle_opts
                    .and_then(|o| o.property_quote)
                    .map(|q| q.character())
                    .or(style.property_quote)
                    .unwrap_or('"');
                *key = ValueNode::Primitive(PrimitiveNode {
                    span: InputSpan::UNKNOWN,
                    token: Some(JsonToken::synthetic(
                        TokenType::String,
                        encode_string(&name, quote),
                    )),
                    value: Primitive::String(name),
                });
            }
        }
        _ => {}
    }
}

fn item_equiv<T: StructureItem>(slots: &[Option<T>], a: usize, b: usize) -> bool {
    match (slots.get(a).and_then(|s| s.as_ref()), slots.get(b).and_then(|s| s.as_ref())) {
        (Some(x), Some(y)) => x.is_equivalent(y),
        _ => false,
    }
}

fn slot_live<T>(slots: &[Option<T>], id: usize) -> bool {
    slots.get(id).map_or(false, |s| s.is_some())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemPath {
    InPlace,
    Removal(usize),
    Insert,
}

/// Replays the logical item order against the physical rib list,
/// reconciling delimiters, commas, indentation, and spacing while leaving
/// every cleanly matched region byte-identical.
fn replay<T: StructureItem>(s: &mut Structure<T>, style: &Style, depth: usize, restyle: bool) {
    let kind = T::KIND;
    let cs = style.collection(kind);
    let entry = cs.entry_indentation.unwrap_or(false);
    let leading = cs.leading_indentation.unwrap_or(false);
    let trailing_ind = cs.trailing_indentation.unwrap_or(false);
    let trailing_comma = cs.trailing_comma.unwrap_or(false);
    let spacing = cs.comma_spacing.unwrap_or(false);
    let unit = cs.indentation_size.unwrap_or(DEFAULT_INDENT_SIZE);
    let indent_char = style.indent_char.unwrap_or(' ');

    let order_now: Vec<usize> = s.order.clone();
    let mut remaps: Vec<(usize, usize)> = Vec::new();

    {
        let Structure { ref mut children, ref slots, .. } = *s;
        let mut ed = ListEditor::new(children);
        let close = kind.close_type();

        ed.match_token(kind.open_type(), kind.open_text());

        if order_now.is_empty() {
            ed.drop_everything_until(|rib| rib.token_type() == Some(close));
            ed.match_token(close, kind.close_text());
            ed.end();
            return;
        }

        let n = order_now.len();
        let mut prev_clean = true;
        for (i, id) in order_now.iter().copied().enumerate() {
            let strict_pos = ed.peek_significant();
            let strict_item = strict_pos.and_then(|p| match ed.rib(p) {
                Some(Rib::Item(pid)) => Some(*pid),
                _ => None,
            });
            let strict_match = strict_item.map_or(false, |pid| item_equiv(slots, pid, id));

            let path = if strict_match {
                ItemPath::InPlace
            } else {
                let ahead =
                    ed.find_anywhere(|rib| matches!(rib, Rib::Item(pid) if item_equiv(slots, *pid, id)));
                match ahead {
                    Some(pos) => {
                        // Dropping up to the match is only legal when none
                        // of the skipped items are still wanted.
                        let mut intermediates_wanted = false;
                        for j in ed.cursor()..pos {
                            if let Some(Rib::Item(pid)) = ed.rib(j) {
                                if slot_live(slots, *pid)
                                    && order_now[i..]
                                        .iter()
                                        .any(|did| item_equiv(slots, *pid, *did))
                                {
                                    intermediates_wanted = true;
                                    break;
                                }
                            }
                        }
                        if intermediates_wanted {
                            ItemPath::Insert
                        } else {
                            ItemPath::Removal(pos)
                        }
                    }
                    None => {
                        let strict_wanted_later = strict_item.map_or(false, |pid| {
                            slot_live(slots, pid)
                                && order_now[i + 1..]
                                    .iter()
                                    .any(|did| item_equiv(slots, pid, *did))
                        });
                        if strict_wanted_later {
                            ItemPath::Insert
                        } else {
                            ItemPath::InPlace
                        }
                    }
                }
            };

            if let ItemPath::Removal(pos) = path {
                ed.drop_to(pos);
            }
            let this_clean = strict_match && !restyle;
            let will_insert = match path {
                ItemPath::Insert => true,
                ItemPath::Removal(_) => false,
                ItemPath::InPlace => {
                    !strict_match
                        && ed
                            .find_next(
                                |rib| matches!(rib, Rib::Item(pid) if slot_live(slots, *pid)),
                                |rib| rib.is_insignificant(),
                            )
                            .is_none()
                }
            };

            if will_insert {
                step_over_comments(&mut ed);
            }

            let closer_next = ed
                .find_next(
                    |rib| rib.token_type() == Some(close),
                    |rib| rib.is_insignificant(),
                )
                .is_some();

            if entry {
                if closer_next {
                    // The run ahead belongs to the closing delimiter; give
                    // this item indentation of its own.
                    insert_indent(&mut ed, indent_char, (depth + 1) * unit);
                } else if !(this_clean && prev_clean) {
                    ensure_indent(&mut ed, indent_char, (depth + 1) * unit, restyle);
                }
            } else if i == 0 {
                if leading && !this_clean {
                    ensure_indent(&mut ed, indent_char, (depth + 1) * unit, restyle);
                } else if restyle && !leading {
                    strip_pure_ws_run(&mut ed);
                }
            } else if spacing {
                if will_insert || !prev_clean || restyle {
                    ensure_space(&mut ed, restyle);
                }
            } else if restyle {
                strip_pure_ws_run(&mut ed);
            }

            match path {
                ItemPath::Insert => {
                    ed.mark_fixing();
                    ed.insert(Rib::Item(id));
                }
                _ => {
                    let outcome = ed.match_or_insert_item(
                        id,
                        |pid| item_equiv(slots, pid, id),
                        |pid| slot_live(slots, pid),
                    );
                    if let ItemOutcome::Matched(pid) = outcome {
                        if pid != id {
                            remaps.push((i, pid));
                        }
                    }
                }
            }

            let last = i == n - 1;
            if !last || trailing_comma {
                if restyle {
                    strip_ws_before(&mut ed, TokenType::Comma);
                }
                ed.match_token(TokenType::Comma, ",");
            }

            prev_clean = this_clean;
        }

        // Anything still sitting between the last item and the closing
        // delimiter was deleted from the logical list; excise it.
        let clean_close = ed
            .find_next(
                |rib| rib.token_type() == Some(close),
                |rib| rib.is_insignificant(),
            )
            .is_some();
        if !clean_close {
            if let Some(pos) = ed.find_anywhere(|rib| rib.token_type() == Some(close)) {
                ed.drop_to(pos);
            }
        }

        if trailing_ind {
            ensure_indent(&mut ed, indent_char, depth * unit, restyle);
        } else if restyle {
            strip_pure_ws_run(&mut ed);
        }
        ed.match_token(close, kind.close_text());
        ed.end();
    }

    for (i, pid) in remaps {
        s.order[i] = pid;
    }
}

fn replay_property(p: &mut PropertyNode, style: &Style, restyle: bool) {
    let colon_spacing = style.object.colon_spacing.unwrap_or(false);
    let key_slot = p.key_slot;
    let value_slot = p.value_slot;
    let mut value_remap: Option<usize> = None;

    {
        let PropertyNode { ref mut children, ref slots, .. } = *p;
        let mut ed = ListEditor::new(children);

        let _ = ed.match_or_insert_item(key_slot, |pid| pid == key_slot, |pid| pid == key_slot);

        if restyle {
            strip_ws_before(&mut ed, TokenType::Colon);
        }
        let had_colon = ed.match_token(TokenType::Colon, ":");
        if !had_colon {
            if colon_spacing {
                ed.insert_token(TokenType::Whitespace, " ");
            }
        } else if restyle {
            if colon_spacing {
                ensure_space(&mut ed, true);
            } else {
                strip_pure_ws_run(&mut ed);
            }
        }

        let outcome = ed.match_or_insert_item(
            value_slot,
            |pid| pid == value_slot || item_equiv(slots, pid, value_slot),
            |pid| slot_live(slots, pid),
        );
        if let ItemOutcome::Matched(pid) = outcome {
            if pid != value_slot {
                value_remap = Some(pid);
            }
        }
        ed.end();
    }

    if let Some(pid) = value_remap {
        p.value_slot = pid;
    }
}

/// For an insertion, the previous item's trailing comments stay attached
/// to it: a line comment claims the rest of its line (the new item must
/// start after the newline), and a block comment keeps the single space
/// that followed it.
fn step_over_comments(ed: &mut ListEditor) {
    let mut end = ed.cursor();
    while matches!(ed.rib(end), Some(rib) if rib.is_insignificant()) {
        end += 1;
    }
    let mut last_comment: Option<usize> = None;
    for j in ed.cursor()..end {
        if matches!(ed.rib(j).and_then(|r| r.token_type()), Some(t) if t.is_comment()) {
            last_comment = Some(j);
        }
    }
    let Some(pos) = last_comment else {
        return;
    };
    let is_line = ed.rib(pos).and_then(|r| r.token_type()) == Some(TokenType::LineComment);
    ed.advance_past(pos);
    if is_line {
        if ed.rib(ed.cursor()).and_then(|r| r.token_type()) == Some(TokenType::Newline) {
            let at = ed.cursor();
            ed.advance_past(at);
        } else {
            ed.insert_token(TokenType::Newline, "\n");
        }
    } else if ed.rib(ed.cursor()).and_then(|r| r.token_type()) == Some(TokenType::Whitespace) {
        let at = ed.cursor();
        ed.advance_past(at);
    }
}

fn insert_indent(ed: &mut ListEditor, indent_char: char, width: usize) {
    let after_newline = ed.cursor() > 0
        && ed.rib(ed.cursor() - 1).and_then(|r| r.token_type()) == Some(TokenType::Newline);
    if !after_newline {
        ed.insert_token(TokenType::Newline, "\n");
    }
    if width > 0 {
        let text: String = std::iter::repeat(indent_char).take(width).collect();
        ed.insert_token(TokenType::Whitespace, &text);
    }
}

/// Makes sure the run ahead of the cursor leads the next rib onto a fresh
/// indented line, reusing an existing newline run when one is there.
fn ensure_indent(ed: &mut ListEditor, indent_char: char, width: usize, restyle: bool) {
    let mut end = ed.cursor();
    let mut has_newline = false;
    while let Some(rib) = ed.rib(end) {
        if !rib.is_insignificant() {
            break;
        }
        if rib.token_type() == Some(TokenType::Newline) {
            has_newline = true;
        }
        end += 1;
    }

    if has_newline {
        if restyle {
            rebuild_gap_indented(ed, indent_char, width);
        } else {
            ed.advance_to(end);
        }
        return;
    }

    if restyle {
        rebuild_gap_indented(ed, indent_char, width);
        return;
    }
    while ed.rib(ed.cursor()).and_then(|r| r.token_type()) == Some(TokenType::Whitespace) {
        let at = ed.cursor();
        ed.remove_at(at);
    }
    insert_indent(ed, indent_char, width);
}

/// Rewrites the trivia run ahead of the cursor into canonical indentation,
/// keeping each comment on a line of its own.
fn rebuild_gap_indented(ed: &mut ListEditor, indent_char: char, width: usize) {
    let mut comments: Vec<JsonToken> = Vec::new();
    while let Some(rib) = ed.rib(ed.cursor()) {
        if !rib.is_insignificant() {
            break;
        }
        let at = ed.cursor();
        if let Rib::Token(t) = ed.remove_at(at) {
            if t.token_type.is_comment() {
                comments.push(t);
            }
        }
    }
    let indent: String = std::iter::repeat(indent_char).take(width).collect();
    for comment in comments {
        ed.insert_token(TokenType::Newline, "\n");
        if width > 0 {
            ed.insert_token(TokenType::Whitespace, &indent);
        }
        ed.insert(Rib::Token(comment));
    }
    ed.insert_token(TokenType::Newline, "\n");
    if width > 0 {
        ed.insert_token(TokenType::Whitespace, &indent);
    }
}

/// Exactly one space between the comma and the next item, unless a newline
/// is already doing the separating or the cursor already sits after one.
fn ensure_space(ed: &mut ListEditor, restyle: bool) {
    if ed.cursor() > 0 {
        if let Some(TokenType::Newline | TokenType::Whitespace) =
            ed.rib(ed.cursor() - 1).and_then(|r| r.token_type())
        {
            return;
        }
    }
    match ed.rib(ed.cursor()).and_then(|r| r.token_type()) {
        Some(TokenType::Whitespace) => {
            let at = ed.cursor();
            if restyle {
                ed.replace_text_at(at, " ");
            }
            ed.advance_past(at);
        }
        Some(TokenType::Newline) => {}
        Some(t) if t.is_comment() => {}
        _ => ed.insert_token(TokenType::Whitespace, " "),
    }
}

/// Removes a comment-free whitespace run ahead of the cursor.
fn strip_pure_ws_run(ed: &mut ListEditor) {
    let mut end = ed.cursor();
    while let Some(rib) = ed.rib(end) {
        if !rib.is_insignificant() {
            break;
        }
        if matches!(rib.token_type(), Some(t) if t.is_comment()) {
            return;
        }
        end += 1;
    }
    while end > ed.cursor() {
        let at = ed.cursor();
        ed.remove_at(at);
        end -= 1;
    }
}

/// Under restyle, whitespace between a value and its following comma or
/// colon is dropped (comments keep the run intact).
fn strip_ws_before(ed: &mut ListEditor, token_type: TokenType) {
    let next_is_target = ed
        .find_next(
            |rib| rib.token_type() == Some(token_type),
            |rib| rib.is_insignificant(),
        )
        .is_some();
    if next_is_target {
        strip_pure_ws_run(ed);
    }
}
