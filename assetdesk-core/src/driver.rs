//! Deterministic, task-free driver for scripted sessions.
//!
//! Runs the same update loop as [`crate::Browser`] but executes every effect
//! inline and drains the feeds between steps, so a scripted sequence of
//! messages always ends in the same state.

use std::collections::VecDeque;

use assetdesk_config::BrowserConfig;
use assetdesk_contracts::{FeedEvent, SubscriptionHandle};
use assetdesk_model::EntityKind;
use tokio::sync::mpsc;

use crate::effects::Collaborators;
use crate::error::{BrowserError, Result};
use crate::messages::Message;
use crate::snapshot::BrowserSnapshot;
use crate::state::BrowserState;
use crate::update::update;

#[derive(Debug)]
pub struct InlineDriver {
    state: BrowserState,
    collaborators: Collaborators,
    feeds: Vec<(EntityKind, mpsc::UnboundedReceiver<FeedEvent>)>,
    subscriptions: Vec<SubscriptionHandle>,
}

impl InlineDriver {
    pub async fn start(
        config: BrowserConfig,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let state = BrowserState::new(config);
        let mut feeds = Vec::with_capacity(2);
        let mut subscriptions = Vec::with_capacity(2);

        for kind in [EntityKind::Asset, EntityKind::Tag] {
            let (sink, events) = mpsc::unbounded_channel();
            match collaborators.feed.subscribe(state.feed_filter(kind), sink).await
            {
                Ok(handle) => {
                    subscriptions.push(handle);
                    feeds.push((kind, events));
                }
                Err(err) => {
                    for handle in subscriptions {
                        collaborators.feed.unsubscribe(handle).await;
                    }
                    return Err(BrowserError::Subscribe(kind, err));
                }
            }
        }

        let load_on_start = state.config().load_first_page_on_start;
        let mut driver = Self {
            state,
            collaborators,
            feeds,
            subscriptions,
        };
        if load_on_start {
            driver.dispatch(Message::LoadPage(0)).await;
            driver.dispatch(Message::RefetchTags).await;
        }
        Ok(driver)
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        self.state.snapshot()
    }

    /// Process `message` and everything it causes: effect completions and
    /// feed events, until the state is quiet. Returns why `message` itself
    /// was refused, if it was.
    pub async fn dispatch(&mut self, message: Message) -> Option<BrowserError> {
        let mut queue = VecDeque::from([message]);
        let mut first_rejection = None;
        let mut first = true;

        while let Some(message) = queue.pop_front() {
            let name = message.name();
            let result = update(&mut self.state, message);
            if let Some(rejection) = result.rejection {
                log::debug!("{} rejected: {}", name, rejection);
                if first {
                    first_rejection = Some(rejection);
                }
            }
            first = false;

            for effect in result.effects {
                queue.push_back(self.collaborators.execute(effect).await);
            }
            self.settle();
        }

        first_rejection
    }

    /// Feed whatever the subscriptions delivered through the update loop
    /// and apply every queued transition.
    pub fn settle(&mut self) {
        loop {
            let mut delivered = Vec::new();
            for (kind, events) in &mut self.feeds {
                while let Ok(event) = events.try_recv() {
                    delivered.push(Message::Feed { kind: *kind, event });
                }
            }
            let idle = delivered.is_empty();
            for message in delivered {
                update(&mut self.state, message);
            }
            self.state.flush_all();
            if idle {
                break;
            }
        }
    }

    pub async fn shutdown(mut self) -> BrowserSnapshot {
        for handle in self.subscriptions.drain(..) {
            self.collaborators.feed.unsubscribe(handle).await;
        }
        self.settle();
        self.state.dispose();
        self.state.snapshot()
    }
}
