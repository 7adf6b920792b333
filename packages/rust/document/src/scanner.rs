//! Tag-event state machine that turns markup events into styled blocks.
//!
//! The scanner tracks two things: the leaf tag whose text is being collected
//! and the nearest list container. Any end tag clears the leaf, matching or
//! not, so `<p>a <em>b</em> c</p>` yields only "a" and "b".

use contentfactory_shared::{BlockKind, StyledBlock};

/// Tags whose text becomes a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    H2,
    H3,
    H4,
    P,
    Li,
}

impl Leaf {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "h4" => Some(Self::H4),
            "p" => Some(Self::P),
            "li" => Some(Self::Li),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ul" => Some(Self::Unordered),
            "ol" => Some(Self::Ordered),
            _ => None,
        }
    }
}

/// Streaming converter state. Feed it start tags, end tags and text in
/// document order, then take the collected blocks.
#[derive(Debug, Default)]
pub struct BlockScanner {
    leaf: Option<Leaf>,
    list: Option<ListKind>,
    blocks: Vec<StyledBlock>,
}

impl BlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a start tag. Tag names are expected lowercase.
    pub fn start_tag(&mut self, tag: &str) {
        if let Some(leaf) = Leaf::from_tag(tag) {
            self.leaf = Some(leaf);
        } else if let Some(list) = ListKind::from_tag(tag) {
            // Entering a list leaves the current leaf alone.
            self.list = Some(list);
        }
    }

    /// Handle an end tag.
    pub fn end_tag(&mut self, tag: &str) {
        if ListKind::from_tag(tag).is_some_and(|kind| self.list == Some(kind)) {
            self.list = None;
        }
        self.leaf = None;
    }

    /// Handle a text run.
    pub fn text(&mut self, data: &str) {
        let Some(leaf) = self.leaf else {
            return;
        };
        let trimmed = data.trim();
        if trimmed.is_empty() {
            return;
        }

        let kind = match leaf {
            Leaf::H2 => BlockKind::Heading2,
            Leaf::H3 => BlockKind::Heading3,
            Leaf::H4 => BlockKind::Heading4,
            Leaf::P => BlockKind::Paragraph,
            Leaf::Li => match self.list {
                Some(ListKind::Unordered) => BlockKind::BulletItem,
                // Items outside any list are numbered.
                Some(ListKind::Ordered) | None => BlockKind::NumberedItem,
            },
        };
        self.blocks.push(StyledBlock::new(kind, trimmed));
    }

    /// Blocks collected so far, in document order.
    pub fn blocks(&self) -> &[StyledBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<StyledBlock> {
        self.blocks
    }
}
