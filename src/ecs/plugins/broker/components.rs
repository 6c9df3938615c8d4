use std::sync::Mutex;

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ecs::plugins::messages::{Message, encode};

/// Private channel for directed replies to one player.
pub fn player_channel(uuid: &str) -> String {
    format!("player-{uuid}")
}

// ============================================================================
// PUBLISHING
// ============================================================================

/// Fire-and-forget publication to a named broker channel.
pub trait Publisher: Send + Sync {
    fn publish(&self, channel: &str, message: &Message);
}

/// Encodes messages and hands them to the broker link thread.
#[derive(Debug, Clone)]
pub struct BrokerPublisher {
    outbound: Sender<OutboundFrame>,
}

impl BrokerPublisher {
    pub fn new(outbound: Sender<OutboundFrame>) -> Self {
        Self { outbound }
    }
}

impl Publisher for BrokerPublisher {
    fn publish(&self, channel: &str, message: &Message) {
        let payload = match encode(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(channel, kind = message.payload.kind(), "dropping unencodable message: {err}");
                return;
            }
        };
        let frame = OutboundFrame {
            channel: channel.to_string(),
            payload,
        };
        if self.outbound.send(frame).is_err() {
            warn!(channel, "broker link is gone; message dropped");
        }
    }
}

/// Keeps every published message in memory, in publish order.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, Message)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(String, Message)> {
        self.published
            .lock()
            .map(|published| published.clone())
            .unwrap_or_default()
    }

    /// Messages published on `channel`, in order.
    pub fn on_channel(&self, channel: &str) -> Vec<Message> {
        self.published()
            .into_iter()
            .filter(|(published_channel, _)| published_channel == channel)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut published) = self.published.lock() {
            published.clear();
        }
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, channel: &str, message: &Message) {
        if let Ok(mut published) = self.published.lock() {
            published.push((channel.to_string(), message.clone()));
        }
    }
}

/// A publisher bound to the zone's global channel, handed to the managers
/// that emit world events during a tick.
#[derive(Clone, Copy)]
pub struct Broadcaster<'a> {
    publisher: &'a dyn Publisher,
    channel: &'a str,
}

impl<'a> Broadcaster<'a> {
    pub fn new(publisher: &'a dyn Publisher, channel: &'a str) -> Self {
        Self { publisher, channel }
    }

    pub fn publish(&self, message: Message) {
        self.publisher.publish(self.channel, &message);
    }

    pub fn publish_to_player(&self, uuid: &str, message: Message) {
        self.publisher.publish(&player_channel(uuid), &message);
    }
}

// ============================================================================
// LINK FRAMES
// ============================================================================

/// An encoded message bound for a broker channel.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub channel: String,
    pub payload: Vec<u8>,
}

/// JSON frames spoken with the broker's websocket endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BrokerFrame {
    Subscribe { channel: String },
    Publish { channel: String, payload: Vec<u8> },
    Deliver { channel: String, payload: Vec<u8> },
}

/// What the link thread reports to the simulation.
#[derive(Debug, Clone)]
pub enum BrokerEvent {
    /// Raw wire bytes from the subscribed channel.
    Delivered(Vec<u8>),
    /// The link is down; the zone should shut down.
    Closed { reason: String },
}

// ============================================================================
// RESOURCE
// ============================================================================

/// Channel ends shared between the simulation and the link thread.
#[derive(Resource)]
pub struct BrokerConnections {
    pub incoming: Receiver<BrokerEvent>,
    pub incoming_sender: Sender<BrokerEvent>,
    pub outgoing: Receiver<OutboundFrame>,
    pub outgoing_sender: Sender<OutboundFrame>,
}

impl Default for BrokerConnections {
    fn default() -> Self {
        let (in_tx, in_rx) = crossbeam_channel::unbounded();
        let (out_tx, out_rx) = crossbeam_channel::unbounded();
        Self {
            incoming: in_rx,
            incoming_sender: in_tx,
            outgoing: out_rx,
            outgoing_sender: out_tx,
        }
    }
}

impl BrokerConnections {
    pub fn publisher(&self) -> BrokerPublisher {
        BrokerPublisher::new(self.outgoing_sender.clone())
    }
}
