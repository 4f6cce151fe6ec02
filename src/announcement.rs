/*!
Channels providers announce themselves on.

In a browser this is the `window` event target (see [`WindowChannel`]),
elsewhere [`LocalChannel`] plays the same role in-process.

[`WindowChannel`]: crate::ffi::WindowChannel
*/

use crate::provider::ProviderHandle;
use std::{cell::RefCell, rc::Rc};

pub type AnnouncementListener<P> = Rc<dyn Fn(ProviderHandle<P>)>;

/// A broadcast channel delivering provider announcements.
pub trait AnnouncementChannel<P> {
    /// Keeps the listener attached. Dropping it detaches the listener.
    type Subscription;

    fn subscribe(&self, listener: AnnouncementListener<P>) -> Self::Subscription;

    /// Ask providers already present to announce themselves again.
    fn request_announcements(&self);
}

/// In-process announcement channel.
///
/// Providers installed with [`LocalChannel::install`] answer every
/// [`request_announcements`](AnnouncementChannel::request_announcements),
/// [`LocalChannel::announce`] delivers a one-off announcement. Clones share
/// the same listeners and providers.
pub struct LocalChannel<P> {
    inner: Rc<LocalInner<P>>,
}

struct LocalInner<P> {
    next: RefCell<u64>,
    listeners: RefCell<Vec<(u64, AnnouncementListener<P>)>>,
    installed: RefCell<Vec<ProviderHandle<P>>>,
}

/// Subscription on a [`LocalChannel`], detaches its listener when dropped.
pub struct LocalSubscription<P> {
    id: u64,
    inner: Rc<LocalInner<P>>,
}

impl<P> Clone for LocalChannel<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P> Default for LocalChannel<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> LocalChannel<P> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(LocalInner {
                next: RefCell::new(0),
                listeners: RefCell::new(Vec::new()),
                installed: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Install a provider that announces itself now and on every
    /// announcement request.
    pub fn install(&self, handle: ProviderHandle<P>) {
        self.inner.installed.borrow_mut().push(handle.clone());
        self.announce(handle);
    }

    /// Deliver an announcement to the current listeners.
    pub fn announce(&self, handle: ProviderHandle<P>) {
        let listeners: Vec<_> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(handle.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl<P> AnnouncementChannel<P> for LocalChannel<P> {
    type Subscription = LocalSubscription<P>;

    fn subscribe(&self, listener: AnnouncementListener<P>) -> Self::Subscription {
        let mut next = self.inner.next.borrow_mut();
        let id = *next;
        *next += 1;
        self.inner.listeners.borrow_mut().push((id, listener));
        LocalSubscription {
            id,
            inner: Rc::clone(&self.inner),
        }
    }

    fn request_announcements(&self) {
        let installed = self.inner.installed.borrow().clone();
        for handle in installed {
            self.announce(handle);
        }
    }
}

impl<P> Drop for LocalSubscription<P> {
    fn drop(&mut self) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(id, _)| *id != self.id);
    }
}
