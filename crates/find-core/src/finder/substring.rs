use std::mem;

use crate::browser::FragmentBrowser;
use crate::error::Result;
use crate::fragment::Fragment;

use super::{chars_match, FindMatch, Finder};

/// Saved position between two calls.
struct Cursor {
    fragment: Fragment,
    offset: usize,
    /// Fragments holding the already matched head of an unconfirmed match, in
    /// document order. Never contains `fragment`.
    pending: Vec<Fragment>,
    /// Total char length of `pending`.
    carried: usize,
    /// Chars of `fragment` and the byte length they were read at.
    text: Vec<char>,
    bytes: usize,
}

impl Cursor {
    fn at(fragment: Fragment, offset: usize) -> Self {
        let mut cursor = Self {
            fragment,
            offset,
            pending: Vec::new(),
            carried: 0,
            text: Vec::new(),
            bytes: 0,
        };
        cursor.read_text();
        cursor
    }

    fn read_text(&mut self) {
        self.text = self.fragment.chars();
        self.bytes = self.fragment.byte_len();
    }

    /// The node may have been split and merged back since the last call;
    /// that restores its text, so only a change in length means new text.
    fn refresh(&mut self) {
        if self.fragment.byte_len() != self.bytes {
            self.read_text();
        }
    }

    fn move_to(&mut self, next: Fragment, matched: usize) {
        let done = mem::replace(&mut self.fragment, next);
        if matched > 0 {
            self.carried += self.text.len();
            self.pending.push(done);
        }
        self.offset = 0;
        self.read_text();
    }

    fn drop_pending(&mut self) {
        self.pending.clear();
        self.carried = 0;
    }
}

enum Position {
    Unstarted,
    /// Resume from an explicit point; the browser is repositioned on use.
    StartAt(Fragment, usize),
    At(Cursor),
    Exhausted,
}

/// Character-streaming matcher: compares one char at a time and restarts
/// right after the start of a failed attempt. Nothing but the fragments of an
/// in-progress match is kept around, so memory does not grow with the
/// document.
pub struct SubstringFinder<B> {
    browser: B,
    position: Position,
}

impl<B: FragmentBrowser> SubstringFinder<B> {
    pub fn new(browser: B) -> Self {
        Self {
            browser,
            position: Position::Unstarted,
        }
    }

    /// A finder whose first `find_next` starts at `offset` in `fragment`
    /// instead of at the beginning of the document.
    pub fn starting_at(browser: B, fragment: Fragment, offset: usize) -> Self {
        Self {
            browser,
            position: Position::StartAt(fragment, offset),
        }
    }

    /// Forgets the cursor; the next `find_next` starts from the first
    /// fragment.
    pub fn restart(&mut self) {
        self.position = Position::Unstarted;
    }

    /// Moves the cursor to `offset` in `fragment`.
    pub fn restart_at(&mut self, fragment: Fragment, offset: usize) {
        self.position = Position::StartAt(fragment, offset);
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    fn from_first(&mut self) -> Position {
        match self.browser.first() {
            Some(fragment) if !fragment.is_empty() => Position::At(Cursor::at(fragment, 0)),
            _ => Position::Exhausted,
        }
    }

    fn scan(&mut self, query: &[char]) -> Result<Option<FindMatch>> {
        let mut cursor = match mem::replace(&mut self.position, Position::Exhausted) {
            Position::Unstarted => match self.from_first() {
                Position::At(cursor) => cursor,
                _ => return Ok(None),
            },
            Position::StartAt(fragment, offset) => {
                if fragment.is_empty() {
                    return Ok(None);
                }
                if let Err(err) = self.browser.resume_from(&fragment) {
                    self.position = Position::StartAt(fragment, offset);
                    return Err(err);
                }
                Cursor::at(fragment, offset)
            }
            Position::At(cursor) => cursor,
            Position::Exhausted => return Ok(None),
        };

        cursor.drop_pending();
        cursor.refresh();
        let mut matched = 0;
        loop {
            if cursor.offset >= cursor.text.len() {
                let next = match self.browser.next(&cursor.fragment) {
                    Ok(next) => next,
                    Err(err) => {
                        self.position = Position::At(cursor);
                        return Err(err);
                    }
                };
                let Some(next) = next.filter(|fragment| !fragment.is_empty()) else {
                    return Ok(None);
                };
                cursor.move_to(next, matched);
                continue;
            }

            if chars_match(query[matched], cursor.text[cursor.offset]) {
                matched += 1;
                cursor.offset += 1;
            } else {
                // Restart one char after where the failed attempt began. Chars
                // of the attempt that lived in earlier fragments are not
                // revisited.
                cursor.drop_pending();
                cursor.offset = (cursor.offset + 1).saturating_sub(matched);
                matched = 0;
            }

            if matched == query.len() {
                let found = build_match(&cursor, query.len());
                self.position = Position::At(cursor);
                return Ok(Some(found));
            }
        }
    }
}

fn build_match(cursor: &Cursor, matched: usize) -> FindMatch {
    let start_offset = cursor.offset + cursor.carried - matched;
    match cursor.pending.split_first() {
        Some((start, intermediates)) => FindMatch::new(
            start.clone(),
            start_offset,
            cursor.fragment.clone(),
            cursor.offset,
            intermediates.to_vec(),
        ),
        None => FindMatch::single(cursor.fragment.clone(), start_offset, cursor.offset),
    }
}

impl<B: FragmentBrowser> Finder for SubstringFinder<B> {
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>> {
        if query.is_empty() {
            return Ok(None);
        }
        self.position = self.from_first();
        self.find_next(query)
    }

    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>> {
        if query.is_empty() {
            return Ok(None);
        }
        let query: Vec<char> = query.chars().collect();
        self.scan(&query)
    }
}
