// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use futures_util::{SinkExt, StreamExt};
use prism_sub_server_ws::{
	CloseRequest, CreateViewRequest, GetSchemaRequest, ListTablesRequest, RemoveViewRequest, Request,
	RequestPayload, Response, ResponsePayload, TableSizeRequest, UpdateRequest, ViewSnapshotRequest,
};
use prism_table::Schema;
use prism_type::{
	Diagnostic, Error, TableVersion,
	error::diagnostic::{internal::internal, session::transport_failure},
};
use prism_view::{Delta, ViewConfig, ViewId};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::utils::generate_request_id;

type PendingRequests = Arc<Mutex<HashMap<String, oneshot::Sender<Response>>>>;

/// Async WebSocket client for Prism.
///
/// Requests are correlated with their responses by id. Server pushes (`view_update`,
/// `error`, `session_closed`) are delivered through [`WsClient::recv`].
pub struct WsClient {
	request_tx: mpsc::Sender<(Request, oneshot::Sender<Response>)>,
	shutdown_tx: Option<mpsc::Sender<()>>,
	push_rx: mpsc::UnboundedReceiver<Response>,
}

impl WsClient {
	/// Connects to a Prism server, e.g. `ws://localhost:8082/websocket`.
	pub async fn connect(url: &str) -> Result<Self, Error> {
		let url = if !url.starts_with("ws://") && !url.starts_with("wss://") {
			format!("ws://{}", url)
		} else {
			url.to_string()
		};

		let (ws_stream, _) = connect_async(&url)
			.await
			.map_err(|e| Error(transport_failure(format!("failed to connect to {}: {}", url, e))))?;

		let (write, read) = ws_stream.split();

		let (request_tx, request_rx) = mpsc::channel::<(Request, oneshot::Sender<Response>)>(32);
		let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
		let (push_tx, push_rx) = mpsc::unbounded_channel::<Response>();

		let pending: PendingRequests = Arc::new(Mutex::new(HashMap::new()));

		let pending_clone = pending.clone();
		tokio::spawn(async move {
			Self::connection_loop(write, read, request_rx, shutdown_rx, pending_clone, push_tx).await;
		});

		Ok(Self {
			request_tx,
			shutdown_tx: Some(shutdown_tx),
			push_rx,
		})
	}

	async fn connection_loop(
		mut write: futures_util::stream::SplitSink<
			tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
			Message,
		>,
		mut read: futures_util::stream::SplitStream<
			tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
		>,
		mut request_rx: mpsc::Receiver<(Request, oneshot::Sender<Response>)>,
		mut shutdown_rx: mpsc::Receiver<()>,
		pending: PendingRequests,
		push_tx: mpsc::UnboundedSender<Response>,
	) {
		loop {
			tokio::select! {
				msg = read.next() => {
					let Some(msg) = msg else {
						break;
					};
					match msg {
						Ok(Message::Text(text)) => {
							let Ok(response) = serde_json::from_str::<Response>(&text) else {
								continue;
							};

							let waiter = match &response.id {
								Some(id) => pending.lock().await.remove(id),
								None => None,
							};
							match waiter {
								Some(tx) => {
									let _ = tx.send(response);
								}
								None => {
									let _ = push_tx.send(response);
								}
							}
						}
						Ok(Message::Ping(data)) => {
							let _ = write.send(Message::Pong(data)).await;
						}
						Ok(Message::Close(_)) => {
							break;
						}
						Err(_) => {
							break;
						}
						_ => {}
					}
				}

				Some((request, response_tx)) = request_rx.recv() => {
					if let Some(id) = request.id.clone() {
						pending.lock().await.insert(id, response_tx);
					}

					if let Ok(json) = serde_json::to_string(&request) {
						if write.send(Message::Text(json.into())).await.is_err() {
							break;
						}
					}
				}

				_ = shutdown_rx.recv() => {
					let _ = write.send(Message::Close(None)).await;
					break;
				}

				else => break,
			}
		}

		// Dropping the senders fails every waiting request.
		pending.lock().await.clear();
	}

	/// Creates a view and returns its id and initial snapshot.
	pub async fn create_view(&self, table: &str, config: ViewConfig) -> Result<(ViewId, Delta), Error> {
		let payload = RequestPayload::CreateView(CreateViewRequest {
			table: table.to_string(),
			config,
		});

		match self.send_request(payload).await? {
			ResponsePayload::ViewCreated {
				view_id,
				snapshot,
			} => Ok((view_id, snapshot)),
			other => Err(unexpected("view_created", other)),
		}
	}

	pub async fn remove_view(&self, view_id: ViewId) -> Result<(), Error> {
		let payload = RequestPayload::RemoveView(RemoveViewRequest {
			view_id,
		});

		match self.send_request(payload).await? {
			ResponsePayload::ViewRemoved {
				..
			} => Ok(()),
			other => Err(unexpected("view_removed", other)),
		}
	}

	pub async fn get_schema(&self, table: &str) -> Result<Schema, Error> {
		let payload = RequestPayload::GetSchema(GetSchemaRequest {
			table: table.to_string(),
		});

		match self.send_request(payload).await? {
			ResponsePayload::Schema {
				schema,
				..
			} => Ok(schema),
			other => Err(unexpected("schema", other)),
		}
	}

	pub async fn list_tables(&self) -> Result<Vec<String>, Error> {
		match self.send_request(RequestPayload::ListTables(ListTablesRequest {})).await? {
			ResponsePayload::Tables {
				names,
			} => Ok(names),
			other => Err(unexpected("tables", other)),
		}
	}

	/// Row count and version of a table.
	pub async fn table_size(&self, table: &str) -> Result<(usize, TableVersion), Error> {
		let payload = RequestPayload::TableSize(TableSizeRequest {
			table: table.to_string(),
		});

		match self.send_request(payload).await? {
			ResponsePayload::TableSize {
				size,
				version,
				..
			} => Ok((size, version)),
			other => Err(unexpected("table_size", other)),
		}
	}

	/// Appends rows given as `{"column": [values...]}` or `[{"column": value}, ...]`.
	pub async fn update(&self, table: &str, data: serde_json::Value) -> Result<TableVersion, Error> {
		let payload = RequestPayload::Update(UpdateRequest {
			table: table.to_string(),
			data,
		});

		match self.send_request(payload).await? {
			ResponsePayload::Updated {
				version,
				..
			} => Ok(version),
			other => Err(unexpected("updated", other)),
		}
	}

	/// The current materialized state of a view, as a snapshot delta.
	pub async fn view_snapshot(&self, view_id: ViewId) -> Result<Delta, Error> {
		let payload = RequestPayload::ViewSnapshot(ViewSnapshotRequest {
			view_id,
		});

		match self.send_request(payload).await? {
			ResponsePayload::ViewSnapshot {
				snapshot,
				..
			} => Ok(snapshot),
			other => Err(unexpected("view_snapshot", other)),
		}
	}

	/// Receive the next server push, waiting if necessary.
	///
	/// Returns `None` once the connection is closed.
	pub async fn recv(&mut self) -> Option<Response> {
		self.push_rx.recv().await
	}

	pub fn try_recv(&mut self) -> Result<Response, mpsc::error::TryRecvError> {
		self.push_rx.try_recv()
	}

	async fn send_request(&self, payload: RequestPayload) -> Result<ResponsePayload, Error> {
		let request = Request::new(generate_request_id(), payload);
		let (tx, rx) = oneshot::channel();

		self.request_tx.send((request, tx)).await.map_err(|_| Error(transport_failure("connection closed")))?;

		let response = rx.await.map_err(|_| Error(transport_failure("response channel closed")))?;
		match response.payload {
			ResponsePayload::Error(err) => Err(Error(Diagnostic {
				code: err.code,
				message: err.message,
				label: None,
				help: None,
				notes: vec![],
			})),
			payload => Ok(payload),
		}
	}

	/// Ends the session and waits for the server to confirm.
	pub async fn close(mut self) -> Result<(), Error> {
		let result = match self.send_request(RequestPayload::Close(CloseRequest {})).await {
			Ok(ResponsePayload::SessionClosed {
				..
			}) => Ok(()),
			Ok(other) => Err(unexpected("session_closed", other)),
			Err(e) => Err(e),
		};

		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(()).await;
		}
		result
	}
}

impl Drop for WsClient {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.try_send(());
		}
	}
}

fn unexpected(expected: &str, payload: ResponsePayload) -> Error {
	Error(internal(format!("expected a {} response, got {:?}", expected, payload)))
}
