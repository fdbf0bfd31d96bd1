// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! WebSocket server subsystem.
//!
//! `WsSubsystem` binds the listener, spawns one task per connection and, on shutdown,
//! closes every session and waits for the connections to drain.

use std::{
	any::Any,
	net::SocketAddr,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

use async_trait::async_trait;
use parking_lot::RwLock;
use prism_sub_api::{HealthStatus, Subsystem};
use prism_table::TableRegistry;
use prism_type::{
	error,
	error::diagnostic::session::{address_unavailable, bind_failed},
};
use prism_view::ViewEngine;
use tokio::{
	net::TcpListener,
	spawn,
	sync::{Semaphore, watch},
	task::JoinHandle,
	time::{Duration, Instant, sleep, timeout},
};

use crate::{WsConfig, WsState, handler::handle_connection};

/// Serves viewer sessions over WebSocket.
///
/// # Example
///
/// ```ignore
/// let mut ws = WsSubsystem::new(WsConfig::default(), tables, Arc::new(StandardViewEngine));
/// ws.start().await?;
/// // ws://0.0.0.0:8082/websocket accepts sessions
/// ws.shutdown().await?;
/// ```
pub struct WsSubsystem {
	state: WsState,
	/// Bound address, available after start.
	actual_addr: RwLock<Option<SocketAddr>>,
	running: Arc<AtomicBool>,
	active_connections: Arc<AtomicUsize>,
	shutdown_tx: Option<watch::Sender<bool>>,
	accept_task: Option<JoinHandle<()>>,
	connection_semaphore: Arc<Semaphore>,
}

impl WsSubsystem {
	pub fn new(config: WsConfig, tables: TableRegistry, engine: Arc<dyn ViewEngine>) -> Self {
		Self::with_state(WsState::new(config, tables, engine))
	}

	pub fn with_state(state: WsState) -> Self {
		let max_connections = state.max_connections();
		Self {
			state,
			actual_addr: RwLock::new(None),
			running: Arc::new(AtomicBool::new(false)),
			active_connections: Arc::new(AtomicUsize::new(0)),
			shutdown_tx: None,
			accept_task: None,
			connection_semaphore: Arc::new(Semaphore::new(max_connections)),
		}
	}

	pub fn state(&self) -> &WsState {
		&self.state
	}

	pub fn bind_addr(&self) -> &str {
		&self.state.config().bind_addr
	}

	pub fn local_addr(&self) -> Option<SocketAddr> {
		*self.actual_addr.read()
	}

	pub fn port(&self) -> Option<u16> {
		self.local_addr().map(|a| a.port())
	}

	/// `ws://host:port/path` of the bound listener.
	pub fn url(&self) -> Option<String> {
		self.local_addr().map(|addr| format!("ws://{}{}", addr, self.state.config().path))
	}

	pub fn active_connections(&self) -> usize {
		self.active_connections.load(Ordering::SeqCst)
	}

	pub fn session_count(&self) -> usize {
		self.state.sessions().len()
	}
}

#[async_trait]
impl Subsystem for WsSubsystem {
	fn name(&self) -> &'static str {
		"WebSocket"
	}

	async fn start(&mut self) -> prism_type::Result<()> {
		if self.running.load(Ordering::SeqCst) {
			return Ok(());
		}

		let addr = self.state.config().bind_addr.clone();
		let listener = TcpListener::bind(&addr).await.map_err(|e| error!(bind_failed(&addr, e)))?;

		let actual_addr = listener.local_addr().map_err(|e| error!(address_unavailable(e)))?;
		*self.actual_addr.write() = Some(actual_addr);
		tracing::info!("WebSocket server bound to {}{}", actual_addr, self.state.config().path);

		let (tx, mut rx) = watch::channel(false);
		let state = self.state.clone();
		let active_connections = self.active_connections.clone();
		let semaphore = self.connection_semaphore.clone();
		let running = self.running.clone();

		// Set before spawning so `is_running` holds as soon as `start` returns.
		running.store(true, Ordering::SeqCst);

		let accept_task = spawn(async move {
			loop {
				tokio::select! {
					biased;

					result = rx.changed() => {
						if result.is_err() || *rx.borrow() {
							tracing::info!("WebSocket server shutting down");
							break;
						}
					}

					accept = listener.accept() => {
						match accept {
							Ok((stream, peer)) => {
								let permit = match semaphore.clone().try_acquire_owned() {
									Ok(p) => p,
									Err(_) => {
										tracing::warn!("Connection limit reached, rejecting {}", peer);
										continue;
									}
								};

								let conn_state = state.clone();
								let shutdown_rx = rx.clone();
								let active = active_connections.clone();

								active.fetch_add(1, Ordering::SeqCst);
								tracing::debug!("Accepted connection from {}", peer);

								spawn(async move {
									handle_connection(stream, conn_state, shutdown_rx).await;
									active.fetch_sub(1, Ordering::SeqCst);
									drop(permit);
								});
							}
							Err(e) => {
								tracing::warn!("Accept error: {}", e);
							}
						}
					}
				}
			}

			running.store(false, Ordering::SeqCst);
			tracing::info!("WebSocket server stopped");
		});

		self.shutdown_tx = Some(tx);
		self.accept_task = Some(accept_task);
		Ok(())
	}

	async fn shutdown(&mut self) -> prism_type::Result<()> {
		let Some(tx) = self.shutdown_tx.take() else {
			return Ok(());
		};
		let _ = tx.send(true);

		let closed = self.state.sessions().close_all("server shutting down");
		tracing::debug!("Closed {} sessions", closed);

		let shutdown_timeout = self.state.config().shutdown_timeout;
		let deadline = Instant::now() + shutdown_timeout;

		if let Some(task) = self.accept_task.take() {
			if timeout(shutdown_timeout, task).await.is_err() {
				tracing::warn!("WebSocket accept loop did not stop within {:?}", shutdown_timeout);
			}
		}

		let active = self.active_connections.clone();
		while active.load(Ordering::SeqCst) > 0 {
			if Instant::now() > deadline {
				tracing::warn!(
					"WebSocket shutdown timeout with {} connections still active",
					active.load(Ordering::SeqCst)
				);
				break;
			}
			sleep(Duration::from_millis(10)).await;
		}

		self.running.store(false, Ordering::SeqCst);
		tracing::debug!("WebSocket server shutdown completed");
		Ok(())
	}

	fn is_running(&self) -> bool {
		self.running.load(Ordering::SeqCst)
	}

	fn health_status(&self) -> HealthStatus {
		if self.running.load(Ordering::SeqCst) {
			let active = self.active_connections.load(Ordering::SeqCst);
			let max = self.state.max_connections();

			if active > max * 90 / 100 {
				HealthStatus::Warning {
					description: format!("High connection count: {}/{}", active, max),
				}
			} else {
				HealthStatus::Healthy
			}
		} else {
			HealthStatus::Failed {
				description: "Not running".to_string(),
			}
		}
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
