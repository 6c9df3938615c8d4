use std::thread;

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, error, info, warn};

use super::components::*;
use crate::error::BrokerError;

/// Start the broker link on its own thread with a dedicated tokio runtime.
///
/// Deliveries land in `connections.incoming`; anything published through a
/// `BrokerPublisher` is drained from `connections.outgoing`. When the link
/// ends for any reason a `BrokerEvent::Closed` is pushed.
pub fn setup_broker_link(connections: Res<BrokerConnections>, url: String, subscribe_channel: String) {
    let incoming = connections.incoming_sender.clone();
    let outgoing = connections.outgoing.clone();

    let spawned = thread::Builder::new()
        .name("broker-link".to_string())
        .spawn(move || {
            if let Err(err) = run_link(&url, &subscribe_channel, &incoming, outgoing) {
                error!("broker link failed: {err}");
                let _ = incoming.send(BrokerEvent::Closed {
                    reason: err.to_string(),
                });
            }
        });

    if let Err(err) = spawned {
        error!("could not start broker link thread: {err}");
        let _ = connections.incoming_sender.send(BrokerEvent::Closed {
            reason: err.to_string(),
        });
    }
}

fn run_link(
    url: &str,
    subscribe_channel: &str,
    incoming: &Sender<BrokerEvent>,
    outgoing: Receiver<OutboundFrame>,
) -> Result<(), BrokerError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(BrokerError::Runtime)?;
    runtime.block_on(link(url, subscribe_channel, incoming, outgoing))
}

/// Connect and subscribe, then hand the socket to `serve`. Errors here
/// happen before anything was served and are reported by the caller.
async fn link(
    url: &str,
    subscribe_channel: &str,
    incoming: &Sender<BrokerEvent>,
    outgoing: Receiver<OutboundFrame>,
) -> Result<(), BrokerError> {
    let (ws_stream, _) = connect_async(url).await.map_err(BrokerError::Connect)?;
    info!(url, "connected to broker");
    let (mut ws_sender, ws_receiver) = ws_stream.split();

    let subscribe = serde_json::to_string(&BrokerFrame::Subscribe {
        channel: subscribe_channel.to_string(),
    })?;
    ws_sender
        .send(WsMessage::Text(subscribe.into()))
        .await
        .map_err(BrokerError::Connect)?;
    info!(channel = subscribe_channel, "subscribed");

    serve(ws_sender, ws_receiver, incoming, outgoing).await;
    Ok(())
}

/// Pump frames both ways until either direction ends, then report
/// `BrokerEvent::Closed`. The surviving direction is cancelled.
pub(crate) async fn serve<W, R>(
    ws_sender: W,
    ws_receiver: R,
    incoming: &Sender<BrokerEvent>,
    outgoing: Receiver<OutboundFrame>,
) where
    W: Sink<WsMessage, Error = WsError> + Unpin + Send + 'static,
    R: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let mut writer = tokio::spawn(write_frames(ws_sender, outgoing));

    let result = tokio::select! {
        result = read_frames(ws_receiver, incoming) => {
            writer.abort();
            result
        }
        joined = &mut writer => match joined {
            Ok(result) => result,
            Err(err) => Err(BrokerError::Writer(err.to_string())),
        },
    };

    let reason = match result {
        Ok(()) => "broker closed the connection".to_string(),
        Err(err) => {
            error!("broker link failed: {err}");
            err.to_string()
        }
    };
    let _ = incoming.send(BrokerEvent::Closed { reason });
}

/// Forward publications without blocking the runtime on the crossbeam side.
async fn write_frames<W>(mut ws_sender: W, outgoing: Receiver<OutboundFrame>) -> Result<(), BrokerError>
where
    W: Sink<WsMessage, Error = WsError> + Unpin,
{
    loop {
        match outgoing.try_recv() {
            Ok(frame) => {
                let publish = BrokerFrame::Publish {
                    channel: frame.channel,
                    payload: frame.payload,
                };
                let text = match serde_json::to_string(&publish) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!("dropping unserializable frame: {err}");
                        continue;
                    }
                };
                ws_sender
                    .send(WsMessage::Text(text.into()))
                    .await
                    .map_err(BrokerError::Connect)?;
            }
            Err(TryRecvError::Empty) => {
                tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
            }
            Err(TryRecvError::Disconnected) => return Ok(()),
        }
    }
}

async fn read_frames<R>(mut ws_receiver: R, incoming: &Sender<BrokerEvent>) -> Result<(), BrokerError>
where
    R: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    while let Some(message) = ws_receiver.next().await {
        match message.map_err(BrokerError::Connect)? {
            WsMessage::Text(text) => match serde_json::from_str::<BrokerFrame>(text.as_str()) {
                Ok(BrokerFrame::Deliver { payload, .. }) => {
                    if incoming.send(BrokerEvent::Delivered(payload)).is_err() {
                        break;
                    }
                }
                Ok(other) => debug!(?other, "ignoring unexpected broker frame"),
                Err(err) => warn!("malformed broker frame: {err}"),
            },
            WsMessage::Binary(bytes) => {
                if incoming.send(BrokerEvent::Delivered(bytes.to_vec())).is_err() {
                    break;
                }
            }
            WsMessage::Close(_) => {
                info!("broker sent close");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}
