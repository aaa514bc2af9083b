use std::collections::BTreeMap;

use crate::host::{Host, SourceRef, Subscription, TransitionStartFn};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Lifecycle signal forwarded by the host.
pub enum HostEvent {
    /// An output channel of `canvas` changed occupant.
    ChannelChanged {
        /// Canvas owning the channel.
        canvas: String,
        /// Output channel index; only channel 0 is observed.
        channel: u32,
        /// New occupant.
        source: Option<SourceRef>,
        /// Previous occupant.
        prev_source: Option<SourceRef>,
    },
    /// A transition started on `canvas`.
    TransitionStarted {
        /// Canvas the transition plays on.
        canvas: String,
    },
    /// The active scene of the main canvas changed.
    SceneChanged,
    /// A source was renamed.
    SourceRenamed {
        /// Canvas owning the source; `None` for sources outside any canvas.
        canvas: Option<String>,
        /// Name before the rename.
        prev_name: String,
        /// Name after the rename.
        new_name: String,
    },
    /// The scene collection is being torn down.
    CollectionCleanup,
    /// The host is exiting.
    Exit,
}

#[derive(Default)]
struct ChannelWatch {
    transition: Option<String>,
    subscription: Option<Subscription>,
}

/// Per-canvas channel-0 watch state and the transitions seen on each canvas.
#[derive(Default)]
pub struct EventBridge {
    watches: BTreeMap<String, ChannelWatch>,
    known: BTreeMap<String, Vec<String>>,
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge")
            .field("watched", &self.watches.len())
            .field("known", &self.known)
            .finish()
    }
}

impl EventBridge {
    /// Track a channel change.
    ///
    /// Releases the subscription of a departing transition and subscribes to an arriving one via
    /// `on_start`. Returns `true` when the channel now holds a source, i.e. overrides should be
    /// refreshed.
    pub fn channel_changed(
        &mut self,
        host: &dyn Host,
        canvas: &str,
        channel: u32,
        source: Option<&SourceRef>,
        prev_source: Option<&SourceRef>,
        on_start: impl FnOnce() -> TransitionStartFn,
    ) -> bool {
        if channel != 0 {
            return false;
        }
        let watch = self.watches.entry(canvas.to_string()).or_default();

        if prev_source.is_some_and(|p| p.is_transition) {
            if let Some(name) = watch.transition.take() {
                tracing::debug!(canvas, transition = %name, "release transition-start subscription");
            }
            watch.subscription = None;
        }

        if let Some(src) = source.filter(|s| s.is_transition) {
            // Replacing drops any previous subscription first.
            watch.subscription = None;
            watch.subscription = Some(host.connect_transition_start(canvas, &src.name, on_start()));
            watch.transition = Some(src.name.clone());
            self.record_known(canvas, &src.name);
        }

        source.is_some()
    }

    /// Transition currently watched on `canvas`.
    pub fn watched_transition(&self, canvas: &str) -> Option<&str> {
        self.watches.get(canvas)?.transition.as_deref()
    }

    /// Add `transition` to the known list of `canvas` unless already present.
    pub fn record_known(&mut self, canvas: &str, transition: &str) {
        if transition.is_empty() {
            return;
        }
        let list = self.known.entry(canvas.to_string()).or_default();
        if !list.iter().any(|t| t == transition) {
            list.push(transition.to_string());
        }
    }

    /// Transitions seen on `canvas`, in first-seen order.
    pub fn known(&self, canvas: &str) -> &[String] {
        self.known.get(canvas).map(Vec::as_slice).unwrap_or_default()
    }

    /// Drop every subscription and known transition.
    pub fn clear(&mut self) {
        self.watches.clear();
        self.known.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/events.rs"]
mod tests;
