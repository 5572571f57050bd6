//! Single-actor runtime around [`BrowserState`].
//!
//! One task owns the state and processes one queue of commands. Feed
//! deliveries and collaborator completions re-enter that queue, so nothing
//! mutates the state in parallel. Readers get immutable snapshots through a
//! watch channel.

use std::fmt;
use std::sync::Arc;

use assetdesk_config::BrowserConfig;
use assetdesk_contracts::{FeedEvent, SubscriptionHandle};
use assetdesk_model::EntityKind;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::effects::Collaborators;
use crate::error::{BrowserError, Result};
use crate::messages::{Effect, Message};
use crate::snapshot::BrowserSnapshot;
use crate::state::BrowserState;
use crate::update::update;

enum Command {
    Dispatch(Message),
    /// Keep applying queued transitions without new input.
    Flush,
    Shutdown(oneshot::Sender<BrowserSnapshot>),
}

/// Handle to a running browser.
pub struct Browser {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Arc<BrowserSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("running", &self.task.is_some())
            .finish_non_exhaustive()
    }
}

impl Browser {
    /// Subscribe to the asset and tag feeds and start the actor. When
    /// configured, page 0 and the tag list are requested right away.
    pub async fn start(
        config: BrowserConfig,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let state = BrowserState::new(config);
        let (commands, inbox) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(Arc::new(state.snapshot()));

        let mut subscriptions = Vec::with_capacity(2);
        let mut forwarders = Vec::with_capacity(2);
        for kind in [EntityKind::Asset, EntityKind::Tag] {
            let (sink, events) = mpsc::unbounded_channel();
            match collaborators.feed.subscribe(state.feed_filter(kind), sink).await
            {
                Ok(handle) => {
                    log::info!("Subscribed to {} feed ({})", kind, handle);
                    subscriptions.push(handle);
                    forwarders.push(tokio::spawn(forward_feed(
                        kind,
                        events,
                        commands.clone(),
                    )));
                }
                Err(err) => {
                    log::error!("Subscribing to {} feed failed: {}", kind, err);
                    for handle in subscriptions {
                        collaborators.feed.unsubscribe(handle).await;
                    }
                    for forwarder in forwarders {
                        forwarder.abort();
                    }
                    return Err(BrowserError::Subscribe(kind, err));
                }
            }
        }

        if state.config().load_first_page_on_start {
            let _ = commands.send(Command::Dispatch(Message::LoadPage(0)));
            let _ = commands.send(Command::Dispatch(Message::RefetchTags));
        }

        let actor = Actor {
            state,
            inbox,
            outbox: commands.clone(),
            collaborators,
            publisher,
            subscriptions,
            forwarders,
        };
        let task = tokio::spawn(actor.run());

        Ok(Self {
            commands,
            snapshots,
            task: Some(task),
        })
    }

    /// Queue a message. Never blocks.
    pub fn dispatch(&self, message: Message) -> Result<()> {
        self.commands
            .send(Command::Dispatch(message))
            .map_err(|_| BrowserError::Disposed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<BrowserSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BrowserSnapshot>> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<Arc<BrowserSnapshot>>
    where
        F: FnMut(&BrowserSnapshot) -> bool,
    {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(|snapshot| predicate(snapshot.as_ref()))
            .await
            .map_err(|_| BrowserError::Disposed)?;
        Ok(snapshot.clone())
    }

    /// Unsubscribe from both feeds and stop the actor. Results that arrive
    /// afterwards are discarded. Returns the final snapshot.
    pub async fn shutdown(mut self) -> Result<BrowserSnapshot> {
        let (ack, done) = oneshot::channel();
        self.commands
            .send(Command::Shutdown(ack))
            .map_err(|_| BrowserError::Disposed)?;
        let snapshot = done.await.map_err(|_| BrowserError::Disposed)?;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        Ok(snapshot)
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            log::warn!("Browser dropped without shutdown; aborting actor");
            task.abort();
        }
    }
}

async fn forward_feed(
    kind: EntityKind,
    mut events: mpsc::UnboundedReceiver<FeedEvent>,
    commands: mpsc::UnboundedSender<Command>,
) {
    while let Some(event) = events.recv().await {
        if commands
            .send(Command::Dispatch(Message::Feed { kind, event }))
            .is_err()
        {
            break;
        }
    }
    log::debug!("{} feed closed", kind);
}

struct Actor {
    state: BrowserState,
    inbox: mpsc::UnboundedReceiver<Command>,
    outbox: mpsc::UnboundedSender<Command>,
    collaborators: Collaborators,
    publisher: watch::Sender<Arc<BrowserSnapshot>>,
    subscriptions: Vec<SubscriptionHandle>,
    forwarders: Vec<JoinHandle<()>>,
}

impl Actor {
    async fn run(mut self) {
        while let Some(command) = self.inbox.recv().await {
            let limit = self.state.config().apply_batch_limit;
            let mut shutdown = self.handle(command);

            // Take what is already waiting, bounded so a burst still gets
            // published.
            let mut taken = 1;
            while shutdown.is_none() && taken < limit {
                match self.inbox.try_recv() {
                    Ok(command) => shutdown = self.handle(command),
                    Err(_) => break,
                }
                taken += 1;
            }

            if let Some(ack) = shutdown {
                let snapshot = self.teardown().await;
                let _ = ack.send(snapshot);
                return;
            }

            self.state.flush_transitions(limit);
            self.publish();

            if self.state.queued_transitions() > 0 {
                let _ = self.outbox.send(Command::Flush);
            }
        }
    }

    fn handle(
        &mut self,
        command: Command,
    ) -> Option<oneshot::Sender<BrowserSnapshot>> {
        match command {
            Command::Dispatch(message) => {
                let name = message.name();
                let result = update(&mut self.state, message);
                if let Some(rejection) = result.rejection {
                    log::debug!("{} rejected: {}", name, rejection);
                }
                for effect in result.effects {
                    self.spawn_effect(effect);
                }
                None
            }
            Command::Flush => None,
            Command::Shutdown(ack) => Some(ack),
        }
    }

    fn spawn_effect(&self, effect: Effect) {
        let collaborators = self.collaborators.clone();
        let outbox = self.outbox.clone();
        tokio::spawn(async move {
            let message = collaborators.execute(effect).await;
            if outbox.send(Command::Dispatch(message)).is_err() {
                log::debug!("Browser gone; dropping collaborator result");
            }
        });
    }

    fn publish(&self) {
        let snapshot = Arc::new(self.state.snapshot());
        self.publisher.send_replace(snapshot);
    }

    async fn teardown(&mut self) -> BrowserSnapshot {
        for handle in self.subscriptions.drain(..) {
            self.collaborators.feed.unsubscribe(handle).await;
        }
        for forwarder in self.forwarders.drain(..) {
            forwarder.abort();
        }
        self.state.dispose();
        let snapshot = self.state.snapshot();
        self.publisher.send_replace(Arc::new(snapshot.clone()));
        log::info!("Browser shut down");
        snapshot
    }
}
