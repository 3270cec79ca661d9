//! Request mailbox between the network boundary and the scheduler
//!
//! HTTP handlers, interrupts or other tasks post parsed [`Request`]s through
//! a [`RequestPoster`]; the scheduler takes at most one per tick through the
//! [`RequestInbox`]. Nothing blocks: a full mailbox refuses the request and
//! hands it back so the boundary can answer "busy" right away.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::command::Request;

/// The mailbox is full; the refused request is handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxFull(pub Request);

/// Bounded mailbox of pending requests
pub struct RequestMailbox<const SIZE: usize> {
    pending: Mutex<RefCell<Deque<Request, SIZE>>>,
}

impl<const SIZE: usize> RequestMailbox<SIZE> {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle given to the network boundary. Any number may coexist.
    pub const fn poster(&self) -> RequestPoster<'_, SIZE> {
        RequestPoster { mailbox: self }
    }

    /// Handle drained by the scheduler
    pub const fn inbox(&self) -> RequestInbox<'_, SIZE> {
        RequestInbox { mailbox: self }
    }

    fn post(&self, request: Request) -> Result<(), MailboxFull> {
        if request.is_noop() {
            return Ok(());
        }
        critical_section::with(|cs| {
            let mut pending = self.pending.borrow(cs).borrow_mut();
            pending.push_back(request).map_err(MailboxFull)
        })
    }

    fn take(&self) -> Option<Request> {
        critical_section::with(|cs| self.pending.borrow(cs).borrow_mut().pop_front())
    }
}

impl<const SIZE: usize> Default for RequestMailbox<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Posting side of a [`RequestMailbox`]
#[derive(Clone, Copy)]
pub struct RequestPoster<'a, const SIZE: usize> {
    mailbox: &'a RequestMailbox<SIZE>,
}

impl<const SIZE: usize> RequestPoster<'_, SIZE> {
    /// Queue `request` for the scheduler
    ///
    /// Requests with nothing to apply (a light or defaults batch without a
    /// single recognized key) are accepted but not queued, so they never
    /// take a slot or a tick.
    pub fn post(&self, request: Request) -> Result<(), MailboxFull> {
        self.mailbox.post(request)
    }
}

/// Scheduler side of a [`RequestMailbox`]
pub struct RequestInbox<'a, const SIZE: usize> {
    mailbox: &'a RequestMailbox<SIZE>,
}

impl<const SIZE: usize> RequestInbox<'_, SIZE> {
    /// Oldest pending request, if any
    pub fn take(&mut self) -> Option<Request> {
        self.mailbox.take()
    }
}
