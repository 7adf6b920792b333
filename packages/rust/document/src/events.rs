//! Markup event stream built on the html5ever tokenizer.
//!
//! Only what is literally in the input becomes an event: no implied end tags,
//! no tree repair. Void elements such as `<br>` produce a start event only;
//! self-closing syntax (`<br/>`) produces a start and an end. Adjacent
//! character tokens are merged into one text event, flushed at the next tag,
//! comment or end of input.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

/// One markup event, in input order. Tag names are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    Start(String),
    End(String),
    Text(String),
}

#[derive(Default)]
struct EventCollector {
    events: RefCell<Vec<MarkupEvent>>,
    pending: RefCell<String>,
}

impl EventCollector {
    fn flush_text(&self) {
        let mut pending = self.pending.borrow_mut();
        if !pending.is_empty() {
            self.events
                .borrow_mut()
                .push(MarkupEvent::Text(std::mem::take(&mut *pending)));
        }
    }
}

impl TokenSink for EventCollector {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => self.pending.borrow_mut().push_str(&text),
            Token::TagToken(tag) => {
                self.flush_text();
                let name = tag.name.to_string();
                let mut events = self.events.borrow_mut();
                match tag.kind {
                    TagKind::StartTag => {
                        events.push(MarkupEvent::Start(name.clone()));
                        if tag.self_closing {
                            events.push(MarkupEvent::End(name));
                        }
                    }
                    TagKind::EndTag => events.push(MarkupEvent::End(name)),
                }
            }
            Token::CommentToken(_) | Token::DoctypeToken(_) | Token::EOFToken => {
                self.flush_text();
            }
            Token::NullCharacterToken | Token::ParseError(_) => {}
        }
        TokenSinkResult::Continue
    }

    fn end(&self) {
        self.flush_text();
    }
}

/// Tokenize `html` into start, end and text events.
pub fn markup_events(html: &str) -> Vec<MarkupEvent> {
    let tokenizer = Tokenizer::new(EventCollector::default(), TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    let _ = tokenizer.feed(&input);
    tokenizer.end();
    tokenizer.sink.events.take()
}
