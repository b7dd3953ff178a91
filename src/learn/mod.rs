//! Source learning
//!
//! Watches incoming events and proposes sources for them. Plain 7-bit CC
//! values are collected in short bursts first, because the character of the
//! control (fader, button, encoder) only shows over several values.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::midi::{RawSourceEvent, ShortMessage, ShortMessageType};
use crate::source::{guess_source_character, SourceConfig, SourceKind};

/// Tuning of the learning process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearnSettings {
    /// Number of CC values that completes a burst early
    pub burst_size: usize,
    /// Time a burst may take, counted from its first value
    pub max_wait_ms: u64,
    /// Only accept events like the first one
    pub first_message_sets_agenda: bool,
}

impl Default for LearnSettings {
    fn default() -> Self {
        Self {
            burst_size: 10,
            max_wait_ms: 250,
            first_message_sets_agenda: true,
        }
    }
}

impl LearnSettings {
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// Buffer items from `input` and hand them to `output` in bursts.
///
/// A timer of `max_wait` starts with the first item of a burst. The burst
/// goes out when `burst_size` items are in or when the timer fires,
/// whichever comes first. Leftovers go out when `input` closes. Returns
/// when `input` or `output` closes.
pub async fn collect_bursts<T>(
    mut input: UnboundedReceiver<T>,
    output: UnboundedSender<Vec<T>>,
    burst_size: usize,
    max_wait: Duration,
) {
    let burst_size = burst_size.max(1);
    let mut buffer = Vec::with_capacity(burst_size);
    let mut deadline: Option<Instant> = None;
    loop {
        let timer = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            item = input.recv() => match item {
                Some(item) => {
                    buffer.push(item);
                    if buffer.len() == 1 {
                        deadline = Some(Instant::now() + max_wait);
                    }
                    if buffer.len() >= burst_size {
                        deadline = None;
                        if !flush(&mut buffer, &output) {
                            return;
                        }
                    }
                }
                None => {
                    if !buffer.is_empty() {
                        flush(&mut buffer, &output);
                    }
                    return;
                }
            },
            _ = timer => {
                deadline = None;
                if !flush(&mut buffer, &output) {
                    return;
                }
            }
        }
    }
}

fn flush<T>(buffer: &mut Vec<T>, output: &UnboundedSender<Vec<T>>) -> bool {
    let burst = std::mem::take(buffer);
    tracing::debug!(items = burst.len(), "burst complete");
    output.send(burst).is_ok()
}

/// Handle to a spawned [`collect_bursts`] task
///
/// Dropping it cancels the task, a pending burst is discarded.
pub struct BurstCollector {
    handle: JoinHandle<()>,
}

impl BurstCollector {
    /// Spawn a collector on the current runtime.
    ///
    /// Returns the handle, the sending end for items and the receiving end
    /// for bursts.
    pub fn spawn<T: Send + 'static>(
        burst_size: usize,
        max_wait: Duration,
    ) -> (Self, UnboundedSender<T>, UnboundedReceiver<Vec<T>>) {
        let (item_tx, item_rx) = unbounded_channel();
        let (burst_tx, burst_rx) = unbounded_channel();
        let handle = tokio::spawn(collect_bursts(item_rx, burst_tx, burst_size, max_wait));
        (Self { handle }, item_tx, burst_rx)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BurstCollector {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Lets the first item through and after that only items similar to it
pub struct LikeFirst<T, F> {
    first: Option<T>,
    is_similar: F,
}

impl<T: Clone, F: Fn(&T, &T) -> bool> LikeFirst<T, F> {
    pub fn new(is_similar: F) -> Self {
        Self {
            first: None,
            is_similar,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.first.as_ref()
    }

    /// Whether `item` passes. The first item always does.
    pub fn accept(&mut self, item: &T) -> bool {
        match &self.first {
            None => {
                self.first = Some(item.clone());
                true
            }
            Some(first) => (self.is_similar)(item, first),
        }
    }
}

/// Whether two CC messages come from the same controller
pub fn is_same_controller(a: &ShortMessage, b: &ShortMessage) -> bool {
    a.r#type() == ShortMessageType::ControlChange
        && b.r#type() == ShortMessageType::ControlChange
        && a.channel() == b.channel()
        && a.data_byte_1() == b.data_byte_1()
}

/// A source for a single event, `None` if the event can't define one.
///
/// Plain CC values aren't handled here, they need a burst.
fn source_for_event(event: &RawSourceEvent) -> Option<SourceConfig> {
    match event {
        RawSourceEvent::Short(msg) => {
            if msg.is_note_off() || msg.r#type() == ShortMessageType::ControlChange {
                return None;
            }
            Some(SourceConfig::from_short_message(msg))
        }
        RawSourceEvent::ControlChange14Bit(msg) => Some(SourceConfig::from_14_bit_message(msg)),
        RawSourceEvent::ParameterNumber(msg) => {
            Some(SourceConfig::from_parameter_number_message(msg))
        }
        RawSourceEvent::Tempo(_) => Some(SourceConfig::new(SourceKind::ClockTempo)),
    }
}

/// A CC source with the character guessed from `burst`
fn source_for_burst(burst: &[ShortMessage]) -> Option<SourceConfig> {
    let first = burst.first()?;
    let values: Vec<u8> = burst.iter().map(|msg| msg.data_byte_2()).collect();
    let character = guess_source_character(&values)?;
    let mut config = SourceConfig::from_short_message(first);
    config.set_custom_character(character);
    tracing::debug!(?values, character = character.name(), "guessed character");
    Some(config)
}

/// Turns a stream of events into learned sources
///
/// Consecutive duplicates are only reported once.
struct SourceLearner {
    cc_agenda: Option<LikeFirst<ShortMessage, fn(&ShortMessage, &ShortMessage) -> bool>>,
    last: Option<SourceConfig>,
    learned: UnboundedSender<SourceConfig>,
}

impl SourceLearner {
    fn new(settings: &LearnSettings, learned: UnboundedSender<SourceConfig>) -> Self {
        let cc_agenda = settings.first_message_sets_agenda.then(|| {
            LikeFirst::new(is_same_controller as fn(&ShortMessage, &ShortMessage) -> bool)
        });
        Self {
            cc_agenda,
            last: None,
            learned,
        }
    }

    /// Whether a plain CC message joins the burst. Locked to the controller
    /// of the first one if the first message sets the agenda.
    fn accepts_cc(&mut self, msg: &ShortMessage) -> bool {
        match &mut self.cc_agenda {
            Some(agenda) => agenda.accept(msg),
            None => true,
        }
    }

    /// Report `source` unless it was just reported. `false` once nobody
    /// listens anymore.
    fn report(&mut self, source: SourceConfig) -> bool {
        if self.last.as_ref() == Some(&source) {
            return true;
        }
        tracing::debug!(source = %source.main_label(), "learned source");
        self.last = Some(source.clone());
        self.learned.send(source).is_ok()
    }
}

/// Learn sources from `events` until it closes or `learned` is dropped
pub async fn learn_sources(
    mut events: UnboundedReceiver<RawSourceEvent>,
    settings: LearnSettings,
    learned: UnboundedSender<SourceConfig>,
) {
    let mut learner = SourceLearner::new(&settings, learned);
    let (collector, cc_tx, mut bursts) =
        BurstCollector::spawn::<ShortMessage>(settings.burst_size, settings.max_wait());
    let mut cc_tx = Some(cc_tx);
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    RawSourceEvent::Short(msg) if msg.r#type() == ShortMessageType::ControlChange => {
                        if !learner.accepts_cc(&msg) {
                            continue;
                        }
                        if let Some(tx) = &cc_tx {
                            let _ = tx.send(msg);
                        }
                    }
                    event => {
                        if let Some(source) = source_for_event(&event) {
                            if !learner.report(source) {
                                return;
                            }
                        }
                    }
                }
            }
            Some(burst) = bursts.recv() => {
                if let Some(source) = source_for_burst(&burst) {
                    if !learner.report(source) {
                        return;
                    }
                }
            }
        }
    }
    // Let the collector hand out what it still holds
    cc_tx.take();
    while let Some(burst) = bursts.recv().await {
        if let Some(source) = source_for_burst(&burst) {
            if !learner.report(source) {
                break;
            }
        }
    }
    drop(collector);
}
