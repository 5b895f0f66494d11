//! Document-level input routing.
//!
//! Menus listen to key presses and clicks anywhere in the document, not only
//! inside themselves. The host owns one [`InputRouter`] and feeds it every
//! key-down and click; mounted menus subscribe to it and unsubscribe when
//! they unmount.
//!
//! Handlers run in subscription order. Once a handler consumes a key no
//! later handler sees it; clicks reach every handler. The router holds weak references only, so a
//! dropped menu silently falls out of the list.

use crate::input::handler::{InputContext, InputHandler, InputResult, PointerTarget};
use crate::input::key::KeyInput;
use crate::menu::Menu;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    handler: Weak<RefCell<dyn InputHandler>>,
}

#[derive(Default)]
pub struct InputRouter {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl std::fmt::Debug for InputRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputRouter")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<H: InputHandler + 'static>(&mut self, handler: &Rc<RefCell<H>>) -> SubscriptionId {
        let handler: Rc<RefCell<dyn InputHandler>> = handler.clone();
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription {
            id,
            handler: Rc::downgrade(&handler),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.handler.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_handlers(&mut self) -> Vec<Rc<RefCell<dyn InputHandler>>> {
        self.subscriptions
            .retain(|subscription| subscription.handler.strong_count() > 0);
        self.subscriptions
            .iter()
            .filter_map(|subscription| subscription.handler.upgrade())
            .collect()
    }

    /// Offer a key-down to every subscriber until one consumes it.
    pub fn dispatch_key(&mut self, event: &KeyInput, ctx: &mut InputContext) -> InputResult {
        for handler in self.live_handlers() {
            let Ok(mut handler) = handler.try_borrow_mut() else {
                tracing::warn!("Skipping key dispatch to a handler that is already borrowed");
                continue;
            };
            if handler.handle_key_event(event, ctx).is_consumed() {
                return InputResult::Consumed;
            }
        }
        InputResult::Ignored
    }

    /// Offer a click to every subscriber. Consumed if any of them consumed it.
    pub fn dispatch_click(
        &mut self,
        target: Option<PointerTarget>,
        ctx: &mut InputContext,
    ) -> InputResult {
        let mut result = InputResult::Ignored;
        for handler in self.live_handlers() {
            let Ok(mut handler) = handler.try_borrow_mut() else {
                tracing::warn!("Skipping click dispatch to a handler that is already borrowed");
                continue;
            };
            result = result.or(handler.handle_click(target, ctx));
        }
        result
    }
}

/// A menu that has been mounted and subscribed to a router.
#[derive(Debug)]
pub struct MountedMenu {
    menu: Rc<RefCell<Menu>>,
    subscription: SubscriptionId,
}

impl MountedMenu {
    /// Mount `menu` and subscribe it to `router`.
    pub fn mount(mut menu: Menu, router: &mut InputRouter) -> Self {
        menu.mount();
        let menu = Rc::new(RefCell::new(menu));
        let subscription = router.subscribe(&menu);
        Self { menu, subscription }
    }

    pub fn menu(&self) -> &Rc<RefCell<Menu>> {
        &self.menu
    }

    /// Unsubscribe from `router` and unmount. The menu is handed back.
    pub fn unmount(self, router: &mut InputRouter) -> Rc<RefCell<Menu>> {
        router.unsubscribe(self.subscription);
        self.menu.borrow_mut().unmount();
        self.menu
    }
}
