use crate::model::{JsonToken, TokenType};
use crate::node::Rib;

/// How an item landed in the list during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemOutcome {
    /// A structurally equivalent node was already in place; carries its
    /// slot id so the caller can reuse the old node's verbatim text.
    Matched(usize),
    /// An existing node of a compatible kind was replaced in place.
    Replaced,
    /// Nothing usable was found; the item was inserted at the cursor.
    Inserted,
}

/// A cursor over a composite's physical rib list.
///
/// The editor starts in clean mode, where the desired content is expected
/// to match what is already there; the first accommodation (an insertion or
/// replacement) switches it to fixing mode, which loosens how trailing
/// trivia is treated at the end.
///
/// Reconciliation through this cursor is a three-way merge: the existing
/// rib list is the base, the desired logical items are the patch, and
/// untouched regions survive because they are only edited when no
/// structural match is found.
pub(crate) struct ListEditor<'a> {
    list: &'a mut Vec<Rib>,
    cursor: usize,
    fixing: bool,
}

impl<'a> ListEditor<'a> {
    pub fn new(list: &'a mut Vec<Rib>) -> Self {
        ListEditor { list, cursor: 0, fixing: false }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mark_fixing(&mut self) {
        self.fixing = true;
    }

    pub fn rib(&self, index: usize) -> Option<&Rib> {
        self.list.get(index)
    }

    /// Scans forward from the cursor without moving it, skipping ribs that
    /// match `skip`. A rib matching neither predicate ends the scan.
    pub fn find_next(
        &self,
        matches: impl Fn(&Rib) -> bool,
        skip: impl Fn(&Rib) -> bool,
    ) -> Option<usize> {
        let mut i = self.cursor;
        while let Some(rib) = self.list.get(i) {
            if matches(rib) {
                return Some(i);
            }
            if !skip(rib) {
                return None;
            }
            i += 1;
        }
        None
    }

    /// Unrestricted forward scan, used for the insert/remove classification
    /// lookahead.
    pub fn find_anywhere(&self, matches: impl Fn(&Rib) -> bool) -> Option<usize> {
        (self.cursor..self.list.len()).find(|i| matches(&self.list[*i]))
    }

    /// Index of the first significant rib at or after the cursor.
    pub fn peek_significant(&self) -> Option<usize> {
        (self.cursor..self.list.len()).find(|i| !self.list[*i].is_insignificant())
    }

    /// Inserts at the cursor and advances past the insertion.
    pub fn insert(&mut self, rib: Rib) {
        self.list.insert(self.cursor, rib);
        self.cursor += 1;
    }

    pub fn insert_token(&mut self, token_type: TokenType, text: &str) {
        self.insert(Rib::Token(JsonToken::synthetic(token_type, text)));
    }

    pub fn remove_at(&mut self, index: usize) -> Rib {
        let rib = self.list.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        rib
    }

    pub fn replace_text_at(&mut self, index: usize, text: &str) {
        if let Some(Rib::Token(t)) = self.list.get_mut(index) {
            t.text = text.to_string();
        }
    }

    pub fn advance_past(&mut self, index: usize) {
        self.cursor = index + 1;
    }

    pub fn advance_to(&mut self, index: usize) {
        self.cursor = index;
    }

    /// Matches an equivalent token ahead of the cursor (skipping trivia) and
    /// advances past it, or inserts a synthetic one. Returns whether an
    /// existing token was reused.
    pub fn match_token(&mut self, token_type: TokenType, text: &str) -> bool {
        let found = self.find_next(
            |rib| matches!(rib.as_token(), Some(t) if t.token_type == token_type && t.text == text),
            |rib| rib.is_insignificant(),
        );
        match found {
            Some(pos) => {
                self.advance_past(pos);
                true
            }
            None => {
                self.fixing = true;
                self.insert_token(token_type, text);
                false
            }
        }
    }

    /// The item half of reconciliation: reuse an equivalent node in place,
    /// or accommodate by replacing the next compatible node or inserting.
    pub fn match_or_insert_item(
        &mut self,
        id: usize,
        equivalent: impl Fn(usize) -> bool,
        live: impl Fn(usize) -> bool,
    ) -> ItemOutcome {
        let found = self.find_next(
            |rib| matches!(rib, Rib::Item(pid) if equivalent(*pid)),
            |rib| rib.is_insignificant(),
        );
        if let Some(pos) = found {
            let matched = match self.list[pos] {
                Rib::Item(pid) => pid,
                _ => unreachable!("find_next matched an item rib"),
            };
            self.advance_past(pos);
            return ItemOutcome::Matched(matched);
        }

        self.fixing = true;
        let target = self.find_next(
            |rib| matches!(rib, Rib::Item(pid) if live(*pid)),
            |rib| rib.is_insignificant(),
        );
        match target {
            Some(pos) => {
                self.list[pos] = Rib::Item(id);
                self.advance_past(pos);
                ItemOutcome::Replaced
            }
            None => {
                self.insert(Rib::Item(id));
                ItemOutcome::Inserted
            }
        }
    }

    /// Deletes ribs forward from the cursor up to `target`, keeping the
    /// trailing trivia run adjacent to the target (it serves as the next
    /// item's lead-in), then normalizes the spacing left behind.
    pub fn drop_to(&mut self, target: usize) {
        let mut keep_from = target.min(self.list.len());
        while keep_from > self.cursor && self.list[keep_from - 1].is_insignificant() {
            keep_from -= 1;
        }
        if keep_from > self.cursor {
            self.list.drain(self.cursor..keep_from);
            self.fixing = true;
            self.fix_spacing();
        }
    }

    /// Deletes everything forward until `matches`, keeping only comments
    /// (and the newline a kept line comment needs to terminate). Used when
    /// a structure has been emptied out.
    pub fn drop_everything_until(&mut self, matches: impl Fn(&Rib) -> bool) {
        let mut after_line_comment = false;
        while let Some(rib) = self.list.get(self.cursor) {
            if matches(rib) {
                break;
            }
            let token_type = rib.as_token().map(|t| t.token_type);
            let keep = matches!(token_type, Some(t) if t.is_comment())
                || (after_line_comment && token_type == Some(TokenType::Newline));
            after_line_comment = token_type == Some(TokenType::LineComment);
            if keep {
                self.cursor += 1;
            } else {
                self.list.remove(self.cursor);
                self.fixing = true;
            }
        }
        self.fix_spacing();
    }

    /// Collapses redundant runs around the cursor after a deletion: doubled
    /// whitespace, stacked blank lines, and the single space that belongs
    /// between a block comment and adjacent punctuation.
    pub fn fix_spacing(&mut self) {
        let c = self.cursor;
        if c == 0 || c >= self.list.len() {
            return;
        }

        let prev_type = self.list[c - 1].token_type();
        let here_type = self.list[c].token_type();

        if prev_type == Some(TokenType::Whitespace) && here_type == Some(TokenType::Whitespace) {
            if let Rib::Token(t) = self.list.remove(c) {
                if let Some(Rib::Token(prev)) = self.list.get_mut(c - 1) {
                    prev.text.push_str(&t.text);
                }
            }
            return;
        }

        if prev_type == Some(TokenType::Newline)
            && here_type == Some(TokenType::Newline)
            && self.list.get(c + 1).and_then(|r| r.token_type()) == Some(TokenType::Newline)
        {
            self.list.remove(c);
            return;
        }

        let prev_is_block_comment = prev_type == Some(TokenType::BlockComment);
        let here_is_punctuation =
            matches!(&self.list[c], Rib::Token(t) if !t.is_insignificant()) || matches!(&self.list[c], Rib::Item(_));
        if prev_is_block_comment && here_is_punctuation {
            self.list
                .insert(c, Rib::Token(JsonToken::synthetic(TokenType::Whitespace, " ")));
            return;
        }

        let prev_is_punctuation = matches!(&self.list[c - 1], Rib::Token(t) if !t.is_insignificant());
        if prev_is_punctuation && here_type == Some(TokenType::BlockComment) {
            self.list
                .insert(c, Rib::Token(JsonToken::synthetic(TokenType::Whitespace, " ")));
            self.cursor += 1;
        }
    }

    /// Finalizes the pass. After accommodations, trailing trivia past the
    /// cursor is trimmed back to the last significant rib; a clean pass
    /// leaves trailing trivia untouched.
    pub fn end(&mut self) {
        if !self.fixing {
            return;
        }
        while self.list.len() > self.cursor {
            match self.list.last() {
                Some(rib) if rib.is_insignificant() => {
                    self.list.pop();
                }
                _ => break,
            }
        }
    }
}
