// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! One task per connection: handshake, then a loop that multiplexes client frames,
//! the session's outgoing queue, its mailbox and the server shutdown signal.

use std::net::SocketAddr;

use futures_util::{
	SinkExt, StreamExt,
	stream::{SplitSink, SplitStream},
};
use tokio::{
	net::TcpStream,
	sync::{mpsc, watch},
};
use tokio_tungstenite::{
	WebSocketStream, accept_hdr_async,
	tungstenite::{
		Message,
		handshake::server::{ErrorResponse, Request as HandshakeRequest, Response as HandshakeResponse},
		http::StatusCode,
	},
};
use tracing::{debug, warn};

use crate::{ConnectionError, Response, ResponsePayload, WsState, session::Session};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

pub async fn handle_connection(stream: TcpStream, state: WsState, shutdown: watch::Receiver<bool>) {
	let peer = stream.peer_addr().ok();
	match serve(stream, &state, shutdown).await {
		Ok(()) => debug!("Connection {} ended", display_peer(peer)),
		Err(ConnectionError::Handshake(e)) => debug!("Rejected connection {}: {}", display_peer(peer), e),
		Err(e) => warn!("Connection {} failed: {}", display_peer(peer), e),
	}
}

async fn serve(stream: TcpStream, state: &WsState, shutdown: watch::Receiver<bool>) -> Result<(), ConnectionError> {
	let path = state.config().path.clone();
	let ws = accept_hdr_async(stream, |request: &HandshakeRequest, response: HandshakeResponse| {
		check_path(&path, request, response)
	})
	.await
	.map_err(ConnectionError::Handshake)?;

	let (mut sink, mut source) = ws.split();
	let (session, mut outgoing) = state.sessions().register(
		state.tables().clone(),
		state.engine().clone(),
		state.config().mailbox_capacity,
	);
	session.open();

	let result = run(&session, &mut sink, &mut source, &mut outgoing, shutdown).await;

	let reason = if result.is_ok() {
		"connection closed"
	} else {
		"transport failure"
	};
	state.sessions().remove(session.id(), reason);

	if result.is_ok() {
		while let Ok(response) = outgoing.try_recv() {
			if send(&mut sink, &response).await.is_err() {
				break;
			}
		}
		let _ = sink.send(Message::Close(None)).await;
	}

	result
}

async fn run(
	session: &Session,
	sink: &mut WsSink,
	source: &mut WsSource,
	outgoing: &mut mpsc::UnboundedReceiver<Response>,
	mut shutdown: watch::Receiver<bool>,
) -> Result<(), ConnectionError> {
	loop {
		tokio::select! {
			biased;

			changed = shutdown.changed() => {
				if changed.is_err() || *shutdown.borrow() {
					session.close("server shutting down");
					return Ok(());
				}
			}

			// Flush before computing more deltas, so the queue stays short.
			response = outgoing.recv() => {
				let Some(response) = response else {
					return Ok(());
				};
				send(sink, &response).await?;
				if matches!(response.payload, ResponsePayload::SessionClosed { .. }) {
					return Ok(());
				}
			}

			frame = source.next() => {
				match frame {
					Some(Ok(Message::Text(text))) => session.handle_text(&text),
					Some(Ok(Message::Binary(data))) => session.handle_text(&String::from_utf8_lossy(&data)),
					Some(Ok(Message::Close(_))) | None => {
						session.close("client disconnected");
						return Ok(());
					}
					Some(Ok(_)) => {}
					Some(Err(e)) => {
						session.close("transport failure");
						return Err(e.into());
					}
				}
			}

			events = session.mailbox().recv(), if session.is_open() => {
				if let Some(events) = events {
					session.process(events);
				}
			}
		}
	}
}

async fn send(sink: &mut WsSink, response: &Response) -> Result<(), ConnectionError> {
	let text = serde_json::to_string(response)?;
	sink.send(Message::Text(text.into())).await?;
	Ok(())
}

fn check_path(
	path: &str,
	request: &HandshakeRequest,
	response: HandshakeResponse,
) -> Result<HandshakeResponse, ErrorResponse> {
	if request.uri().path() == path {
		return Ok(response);
	}

	let mut rejection = ErrorResponse::new(Some(format!("no websocket endpoint at {}", request.uri().path())));
	*rejection.status_mut() = StatusCode::NOT_FOUND;
	Err(rejection)
}

fn display_peer(peer: Option<SocketAddr>) -> String {
	peer.map(|addr| addr.to_string()).unwrap_or_else(|| "<unknown>".to_string())
}
