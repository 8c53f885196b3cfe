use super::errors::{Error, Result};

/// Coordinates of the two sentinel spans which bracket the screen.
pub const SENTINEL_EXTENT: i32 = 100_000;

/// A closed range of screen columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub first: i32,
    pub last: i32,
}

impl Span {
    pub fn new(first: i32, last: i32) -> Span {
        Span { first, last }
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (i64::from(self.last) - i64::from(self.first) + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }
}

/// The columns of the screen already covered by solid walls.
///
/// Walls are submitted in front to back order; each submission reports the parts of the wall not
/// hidden by closer walls and then marks the wall's columns as covered. The spans are kept sorted,
/// disjoint and non-adjacent, with a sentinel span on each side of the screen so every search
/// finds a successor.
#[derive(Clone, Debug)]
pub struct SolidSpans {
    spans: Vec<Span>,
    screen_width: i32,
}

impl SolidSpans {
    pub fn new(screen_width: i32) -> Result<SolidSpans> {
        ensure!(
            screen_width > 0 && screen_width < SENTINEL_EXTENT,
            Error::invalid_screen_width(screen_width)
        );
        let mut spans = SolidSpans {
            spans: Vec::with_capacity(32),
            screen_width,
        };
        spans.reset();
        Ok(spans)
    }

    /// Clears every span but the sentinels; called at the start of every frame.
    pub fn reset(&mut self) {
        self.spans.clear();
        self.spans.push(Span::new(-SENTINEL_EXTENT, -1));
        self.spans.push(Span::new(self.screen_width, SENTINEL_EXTENT));
    }

    pub fn screen_width(&self) -> i32 {
        self.screen_width
    }

    /// All solid spans in order, sentinels included.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether every screen column is covered, after which nothing more can be visible.
    pub fn is_full(&self) -> bool {
        self.spans
            .windows(2)
            .all(|pair| pair[0].last + 1 >= pair[1].first)
    }

    /// Adds a solid wall covering `first..=last`, returning the newly visible parts.
    pub fn submit(&mut self, first: i32, last: i32) -> Result<Vec<Span>> {
        let mut visible = Vec::new();
        self.submit_with(first, last, |span| visible.push(span))?;
        Ok(visible)
    }

    /// Like `submit`, but hands the visible parts to `visible` in left to right order.
    pub fn submit_with<F>(&mut self, first: i32, last: i32, mut visible: F) -> Result<()>
    where
        F: FnMut(Span),
    {
        check_range(first, last)?;
        let start = self.find(first);
        let found = self.spans[start];
        if first < found.first {
            if last < found.first - 1 {
                visible(Span::new(first, last));
                self.spans.insert(start, Span::new(first, last));
                return Ok(());
            }
            visible(Span::new(first, found.first - 1));
            self.spans[start].first = first;
        }
        if last <= self.spans[start].last {
            return Ok(());
        }

        let mut next = start;
        while last >= self.spans[next + 1].first - 1 {
            emit_gap(self.spans[next].last + 1, self.spans[next + 1].first - 1, &mut visible);
            next += 1;
            if last <= self.spans[next].last {
                self.spans[start].last = self.spans[next].last;
                self.spans.drain(start + 1..=next);
                return Ok(());
            }
        }

        visible(Span::new(self.spans[next].last + 1, last));
        self.spans[start].last = last;
        self.spans.drain(start + 1..=next);
        Ok(())
    }

    /// Clips a see-through wall against the solid spans without covering anything.
    pub fn pass(&self, first: i32, last: i32) -> Result<Vec<Span>> {
        let mut visible = Vec::new();
        self.pass_with(first, last, |span| visible.push(span))?;
        Ok(visible)
    }

    pub fn pass_with<F>(&self, first: i32, last: i32, mut visible: F) -> Result<()>
    where
        F: FnMut(Span),
    {
        check_range(first, last)?;
        let mut current = self.find(first);
        let found = self.spans[current];
        if first < found.first {
            if last < found.first - 1 {
                visible(Span::new(first, last));
                return Ok(());
            }
            visible(Span::new(first, found.first - 1));
        }
        if last <= found.last {
            return Ok(());
        }

        while last >= self.spans[current + 1].first - 1 {
            emit_gap(
                self.spans[current].last + 1,
                self.spans[current + 1].first - 1,
                &mut visible,
            );
            current += 1;
            if last <= self.spans[current].last {
                return Ok(());
            }
        }
        visible(Span::new(self.spans[current].last + 1, last));
        Ok(())
    }

    /// Index of the first span which ends at or after `first - 1`; the right sentinel guarantees
    /// there is one.
    fn find(&self, first: i32) -> usize {
        self.spans.partition_point(|span| span.last < first - 1)
    }
}

fn check_range(first: i32, last: i32) -> Result<()> {
    ensure!(
        first <= last && first >= -SENTINEL_EXTENT && last <= SENTINEL_EXTENT,
        Error::invalid_range(first, last)
    );
    Ok(())
}

fn emit_gap<F: FnMut(Span)>(first: i32, last: i32, visible: &mut F) {
    if first <= last {
        visible(Span::new(first, last));
    }
}
