//! Per-action generation tokens.
//!
//! Each user action takes a fresh generation. A response is painted only if
//! its generation is still the newest one handed out; anything older is stale.

/// Handed out when an action starts, returned when its response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub is_search: bool,
    /// Whether the caller should paint the loading placeholder now.
    pub paint_placeholder: bool,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
    searches_in_flight: usize,
}

impl RequestTracker {
    /// True while at least one new-search request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.searches_in_flight > 0
    }

    pub fn begin(&mut self, is_search: bool) -> Ticket {
        self.latest += 1;
        let paint_placeholder = is_search && !self.is_loading();
        if is_search {
            self.searches_in_flight += 1;
        }
        Ticket {
            generation: self.latest,
            is_search,
            paint_placeholder,
        }
    }

    /// Supersede whatever is in flight without sending anything, e.g. when
    /// validation fails and its message now owns the results area.
    pub fn supersede(&mut self) {
        self.latest += 1;
    }

    /// Record completion. Returns whether the response may be painted.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if ticket.is_search {
            self.searches_in_flight = self.searches_in_flight.saturating_sub(1);
        }
        ticket.generation == self.latest
    }
}
