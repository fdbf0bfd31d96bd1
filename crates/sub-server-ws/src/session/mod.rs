// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Viewer sessions.
//!
//! A session owns the views one client created. Table notifications reach it through
//! its [`Mailbox`]; the connection task drains the mailbox, runs [`Session::process`]
//! and writes whatever the session emitted to the socket.
//!
//! Lifecycle: `Connecting -> Open -> Closing -> Closed`. Only an open session emits.
//! [`Session::close`] flips the state before anything else, so a delta that is still
//! being computed when the session closes is dropped at emission.

mod mailbox;
mod registry;

use std::{
	collections::{BTreeMap, HashMap},
	fmt::{self, Display, Formatter},
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

pub use mailbox::{Mailbox, MailboxEvent};
use parking_lot::Mutex;
use prism_table::{ListenerId, RowBatch, Table, TableRegistry};
use prism_type::{
	Result,
	error::diagnostic::{session::session_closed, view::view_not_found},
	return_error,
};
use prism_view::{Delta, View, ViewEngine, ViewId};
pub use registry::SessionRegistry;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};
use uuid::Uuid;

use crate::{CreateViewRequest, Request, RequestPayload, Response, ResponsePayload, UpdateRequest};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub Uuid);

impl SessionId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for SessionId {
	fn default() -> Self {
		Self::new()
	}
}

impl Display for SessionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
	Connecting,
	Open,
	Closing,
	Closed,
}

pub struct Session {
	id: SessionId,
	state: Mutex<SessionState>,
	tables: TableRegistry,
	engine: Arc<dyn ViewEngine>,
	mailbox: Arc<Mailbox>,
	outgoing: mpsc::UnboundedSender<Response>,
	views: Mutex<BTreeMap<ViewId, View>>,
	subscriptions: Mutex<HashMap<String, (Table, ListenerId)>>,
	next_view_id: AtomicU64,
}

impl Session {
	/// Creates a session in the `Connecting` state and the receiver of everything it
	/// emits.
	///
	/// The outgoing queue is unbounded, but the connection task only drains the mailbox
	/// once the queue is flushed, so it holds at most one round of view updates.
	pub fn new(
		tables: TableRegistry,
		engine: Arc<dyn ViewEngine>,
		mailbox_capacity: usize,
	) -> (Arc<Self>, mpsc::UnboundedReceiver<Response>) {
		let (outgoing, receiver) = mpsc::unbounded_channel();
		let session = Arc::new(Self {
			id: SessionId::new(),
			state: Mutex::new(SessionState::Connecting),
			tables,
			engine,
			mailbox: Arc::new(Mailbox::new(mailbox_capacity)),
			outgoing,
			views: Mutex::new(BTreeMap::new()),
			subscriptions: Mutex::new(HashMap::new()),
			next_view_id: AtomicU64::new(1),
		});
		(session, receiver)
	}

	pub fn id(&self) -> SessionId {
		self.id
	}

	pub fn state(&self) -> SessionState {
		*self.state.lock()
	}

	pub fn is_open(&self) -> bool {
		self.state() == SessionState::Open
	}

	pub fn mailbox(&self) -> &Arc<Mailbox> {
		&self.mailbox
	}

	pub fn view_count(&self) -> usize {
		self.views.lock().len()
	}

	/// Tables this session currently listens to.
	pub fn subscribed_tables(&self) -> Vec<String> {
		let mut names: Vec<String> = self.subscriptions.lock().keys().cloned().collect();
		names.sort();
		names
	}

	/// Marks the handshake as complete. Returns false unless the session was connecting.
	pub fn open(&self) -> bool {
		let mut state = self.state.lock();
		if *state != SessionState::Connecting {
			return false;
		}
		*state = SessionState::Open;
		debug!("Session {} opened", self.id);
		true
	}

	/// Parses and executes one text frame.
	pub fn handle_text(&self, text: &str) {
		match Request::decode(text) {
			Ok(request) => self.handle_request(request),
			Err((id, err)) => {
				debug!("Session {} rejected a malformed request: {}", self.id, err);
				self.emit(Response::reply(id, ResponsePayload::error(None, &err)));
			}
		}
	}

	/// Executes a request and emits its response. Failures become `error` responses
	/// and leave the session open.
	pub fn handle_request(&self, request: Request) {
		let Request {
			id,
			payload,
		} = request;

		if let RequestPayload::Close(_) = payload {
			self.close_with(id, "closed by client");
			return;
		}

		let name = payload.name();
		let payload = self.execute(payload).unwrap_or_else(|err| {
			debug!("Session {} request {} failed: {}", self.id, name, err);
			ResponsePayload::error(None, &err)
		});
		self.emit(Response::reply(id, payload));
	}

	pub fn execute(&self, payload: RequestPayload) -> Result<ResponsePayload> {
		if !self.is_open() {
			return_error!(session_closed());
		}

		match payload {
			RequestPayload::CreateView(request) => self.create_view(request),
			RequestPayload::RemoveView(request) => {
				self.remove_view(request.view_id)?;
				Ok(ResponsePayload::ViewRemoved {
					view_id: request.view_id,
				})
			}
			RequestPayload::GetSchema(request) => {
				let table = self.tables.get(&request.table)?;
				Ok(ResponsePayload::Schema {
					table: request.table,
					schema: table.schema().clone(),
				})
			}
			RequestPayload::ListTables(_) => Ok(ResponsePayload::Tables {
				names: self.tables.names(),
			}),
			RequestPayload::TableSize(request) => {
				let table = self.tables.get(&request.table)?;
				let (size, version) = table.read(|snapshot| (snapshot.row_count, snapshot.version));
				Ok(ResponsePayload::TableSize {
					table: request.table,
					size,
					version,
				})
			}
			RequestPayload::Update(request) => self.update(request),
			RequestPayload::ViewSnapshot(request) => {
				let views = self.views.lock();
				let Some(view) = views.get(&request.view_id) else {
					return_error!(view_not_found(request.view_id.0));
				};
				Ok(ResponsePayload::ViewSnapshot {
					view_id: request.view_id,
					snapshot: Delta::Snapshot {
						version: view.version(),
						frame: view.snapshot(),
					},
				})
			}
			RequestPayload::Close(_) => {
				self.close("closed by client");
				Ok(ResponsePayload::SessionClosed {
					reason: "closed by client".to_string(),
				})
			}
		}
	}

	fn create_view(&self, request: CreateViewRequest) -> Result<ResponsePayload> {
		let table = self.tables.get(&request.table)?;

		// Listen before rendering: anything appended in between arrives as a change the
		// view either skips as stale or applies on top of the snapshot.
		self.subscribe(&table);

		let id = ViewId(self.next_view_id.fetch_add(1, Ordering::SeqCst));
		let (view, snapshot) = match View::create(id, table, request.config, self.engine.as_ref()) {
			Ok(created) => created,
			Err(err) => {
				self.release_unused(&self.views.lock(), &request.table);
				return Err(err);
			}
		};

		let mut views = self.views.lock();
		if !self.is_open() {
			let mut view = view;
			view.close();
			return_error!(session_closed());
		}
		views.insert(id, view);
		debug!("Session {} created view {} on table {}", self.id, id, request.table);

		Ok(ResponsePayload::ViewCreated {
			view_id: id,
			snapshot,
		})
	}

	fn remove_view(&self, id: ViewId) -> Result<()> {
		let mut views = self.views.lock();
		let Some(mut view) = views.remove(&id) else {
			return_error!(view_not_found(id.0));
		};
		view.close();
		self.release_unused(&views, view.table_name());
		debug!("Session {} removed view {}", self.id, id);
		Ok(())
	}

	fn update(&self, request: UpdateRequest) -> Result<ResponsePayload> {
		let table = self.tables.get(&request.table)?;
		let batch = RowBatch::from_json(table.schema(), table.name(), &request.data)?;
		let version = table.append(batch)?;
		Ok(ResponsePayload::Updated {
			table: request.table,
			version,
		})
	}

	/// Turns drained mailbox events into `view_update` pushes.
	///
	/// A view whose engine fails gets an `error` push and is closed. The other views of
	/// this session keep running.
	pub fn process(&self, events: Vec<MailboxEvent>) {
		let mut views = self.views.lock();

		for event in events {
			if !self.is_open() {
				trace!("Session {} no longer open, dropping pending events", self.id);
				return;
			}

			let mut failed = Vec::new();
			for (&view_id, view) in views.iter_mut() {
				let result = match &event {
					MailboxEvent::Change(change) => view.on_table_changed(change),
					MailboxEvent::Resync => view.resync().map(Some),
				};

				match result {
					Ok(Some(delta)) => {
						self.emit(Response::push(ResponsePayload::ViewUpdate {
							view_id,
							delta,
						}));
					}
					Ok(None) => {}
					Err(err) => {
						error!("Session {} view {} failed: {}", self.id, view_id, err);
						self.emit(Response::push(ResponsePayload::error(Some(view_id), &err)));
						failed.push(view_id);
					}
				}
			}

			for view_id in failed {
				if let Some(mut view) = views.remove(&view_id) {
					view.close();
					self.release_unused(&views, view.table_name());
				}
			}
		}
	}

	/// Closes the session. Returns false if it was already closing or closed.
	pub fn close(&self, reason: &str) -> bool {
		self.close_with(None, reason)
	}

	fn close_with(&self, id: Option<String>, reason: &str) -> bool {
		{
			let mut state = self.state.lock();
			let was_open = match *state {
				SessionState::Connecting => false,
				SessionState::Open => true,
				SessionState::Closing | SessionState::Closed => return false,
			};
			*state = SessionState::Closing;

			if was_open {
				let _ = self.outgoing.send(Response::reply(
					id,
					ResponsePayload::SessionClosed {
						reason: reason.to_string(),
					},
				));
			}
		}

		self.mailbox.close();
		for (_, (table, listener)) in self.subscriptions.lock().drain() {
			table.unsubscribe(listener);
		}

		// Waits for a computation in progress; its result is dropped by `emit`.
		let closed = {
			let mut views = self.views.lock();
			views.values_mut().for_each(View::close);
			let closed = views.len();
			views.clear();
			closed
		};

		*self.state.lock() = SessionState::Closed;
		debug!("Session {} closed ({}), released {} views", self.id, reason, closed);
		true
	}

	fn emit(&self, response: Response) -> bool {
		let state = self.state.lock();
		if *state != SessionState::Open {
			trace!("Session {} is {:?}, dropping {:?}", self.id, *state, response.payload);
			return false;
		}
		self.outgoing.send(response).is_ok()
	}

	fn subscribe(&self, table: &Table) {
		let mut subscriptions = self.subscriptions.lock();
		if !subscriptions.contains_key(table.name()) {
			let listener = table.subscribe(self.mailbox.clone());
			subscriptions.insert(table.name().to_string(), (table.clone(), listener));
			trace!("Session {} listens to table {}", self.id, table.name());
		}
	}

	/// Drops the table listener once no view of this session reads the table.
	fn release_unused(&self, views: &BTreeMap<ViewId, View>, table: &str) {
		if views.values().any(|view| view.table_name() == table) {
			return;
		}
		if let Some((table, listener)) = self.subscriptions.lock().remove(table) {
			table.unsubscribe(listener);
			trace!("Session {} stopped listening to table {}", self.id, table.name());
		}
	}
}

impl Drop for Session {
	fn drop(&mut self) {
		for (_, (table, listener)) in self.subscriptions.get_mut().drain() {
			table.unsubscribe(listener);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::{sync::mpsc as std_mpsc, thread, time::Duration};

	use prism_table::{Schema, TableChange, TableSnapshot};
	use prism_testing::{
		fixture::{int_batch, int_table, int_values},
		wait_for_blocking,
	};
	use prism_type::{Error, ErrorKind, TableVersion, Type, error::diagnostic::internal::internal};
	use prism_view::{Changes, FilterOperator, Frame, StandardViewEngine, ViewConfig, ViewState};
	use serde_json::json;

	use super::*;
	use crate::{CreateViewRequest, GetSchemaRequest, RemoveViewRequest, TableSizeRequest, ViewSnapshotRequest};

	fn open_session(
		tables: &TableRegistry,
		engine: Arc<dyn ViewEngine>,
		capacity: usize,
	) -> (Arc<Session>, mpsc::UnboundedReceiver<Response>) {
		let (session, rx) = Session::new(tables.clone(), engine, capacity);
		assert!(session.open());
		(session, rx)
	}

	fn drain(rx: &mut mpsc::UnboundedReceiver<Response>) -> Vec<Response> {
		let mut out = Vec::new();
		while let Ok(response) = rx.try_recv() {
			out.push(response);
		}
		out
	}

	fn create_view(session: &Session, table: &str, config: ViewConfig) -> (ViewId, Delta) {
		match session
			.execute(RequestPayload::CreateView(CreateViewRequest {
				table: table.to_string(),
				config,
			}))
			.unwrap()
		{
			ResponsePayload::ViewCreated {
				view_id,
				snapshot,
			} => (view_id, snapshot),
			other => panic!("expected view_created, got {:?}", other),
		}
	}

	fn frame_of(delta: &Delta) -> &Frame {
		match delta {
			Delta::Snapshot {
				frame,
				..
			} => frame,
			Delta::Patch {
				upserts,
				..
			} => upserts,
		}
	}

	#[test]
	fn test_append_reaches_view_as_patch() {
		let tables = TableRegistry::new();
		let table = int_table(&tables, "data_source_one");
		assert_eq!(table.append(int_batch(0..10)).unwrap(), TableVersion(1));

		let (session, mut rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);
		let (view_id, snapshot) = create_view(&session, "data_source_one", ViewConfig::new());
		assert_eq!(snapshot.version(), TableVersion(1));
		assert_eq!(int_values(frame_of(&snapshot), "x"), (0..10).collect::<Vec<_>>());

		assert_eq!(table.append(int_batch(10..20)).unwrap(), TableVersion(2));
		session.process(session.mailbox().drain());

		let pushed = drain(&mut rx);
		assert_eq!(pushed.len(), 1);
		let ResponsePayload::ViewUpdate {
			view_id: pushed_id,
			delta,
		} = &pushed[0].payload
		else {
			panic!("expected view_update, got {:?}", pushed[0]);
		};
		assert!(pushed[0].is_push());
		assert_eq!(*pushed_id, view_id);
		assert!(!delta.is_snapshot());
		assert_eq!(delta.version(), TableVersion(2));
		assert_eq!(int_values(frame_of(delta), "x"), (10..20).collect::<Vec<_>>());

		assert!(session.close("done"));
		assert_eq!(session.state(), SessionState::Closed);
		assert_eq!(table.size(), 20);
		assert_eq!(table.listener_count(), 0);

		let last = drain(&mut rx);
		assert!(matches!(last.as_slice(), [Response { payload: ResponsePayload::SessionClosed { .. }, .. }]));
	}

	#[test]
	fn test_stale_changes_after_view_creation_are_skipped() {
		let tables = TableRegistry::new();
		let table = int_table(&tables, "t");
		let (session, mut rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);

		// Subscribe with a first view, then append before the second view exists.
		create_view(&session, "t", ViewConfig::new());
		table.append(int_batch(0..3)).unwrap();
		let (second, snapshot) = create_view(&session, "t", ViewConfig::new());
		assert_eq!(snapshot.version(), TableVersion(1));

		session.process(session.mailbox().drain());
		let pushed = drain(&mut rx);
		assert!(pushed.iter().all(|response| !matches!(
			response.payload,
			ResponsePayload::ViewUpdate { view_id, .. } if view_id == second
		)));
	}

	#[test]
	fn test_overflow_resyncs_every_view() {
		let tables = TableRegistry::new();
		let table = int_table(&tables, "t");
		let (session, mut rx) = open_session(&tables, Arc::new(StandardViewEngine), 2);
		let (view_id, _) = create_view(&session, "t", ViewConfig::new());

		for start in 0..3 {
			table.append(int_batch(start * 2..start * 2 + 2)).unwrap();
		}
		assert_eq!(session.mailbox().overflows(), 1);

		session.process(session.mailbox().drain());
		let pushed = drain(&mut rx);
		assert_eq!(pushed.len(), 1);
		match &pushed[0].payload {
			ResponsePayload::ViewUpdate {
				view_id: id,
				delta,
			} => {
				assert_eq!(*id, view_id);
				assert!(delta.is_snapshot());
				assert_eq!(delta.version(), TableVersion(3));
				assert_eq!(int_values(frame_of(delta), "x"), (0..6).collect::<Vec<_>>());
			}
			other => panic!("expected view_update, got {:?}", other),
		}
	}

	#[test]
	fn test_requests_echo_id() {
		let tables = TableRegistry::new();
		int_table(&tables, "t");
		let (session, mut rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);

		session.handle_text(r#"{"id":"a","type":"update","payload":{"table":"t","data":{"x":[1,2,3]}}}"#);
		session.handle_text(r#"{"id":"b","type":"table_size","payload":{"table":"t"}}"#);
		session.handle_text(r#"{"id":"c","type":"list_tables"}"#);

		let responses = drain(&mut rx);
		assert_eq!(
			responses,
			vec![
				Response::reply(
					Some("a".to_string()),
					ResponsePayload::Updated {
						table: "t".to_string(),
						version: TableVersion(1),
					}
				),
				Response::reply(
					Some("b".to_string()),
					ResponsePayload::TableSize {
						table: "t".to_string(),
						size: 3,
						version: TableVersion(1),
					}
				),
				Response::reply(
					Some("c".to_string()),
					ResponsePayload::Tables {
						names: vec!["t".to_string()],
					}
				),
			]
		);
	}

	#[test]
	fn test_get_schema() {
		let tables = TableRegistry::new();
		int_table(&tables, "t");
		let (session, _rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);

		let response = session
			.execute(RequestPayload::GetSchema(GetSchemaRequest {
				table: "t".to_string(),
			}))
			.unwrap();
		assert_eq!(
			response,
			ResponsePayload::Schema {
				table: "t".to_string(),
				schema: Schema::new([("x", Type::Int)]),
			}
		);
	}

	#[test]
	fn test_errors_keep_session_open() {
		let tables = TableRegistry::new();
		int_table(&tables, "t");
		let (session, mut rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);

		session.handle_text("{ not json");
		session.handle_text(r#"{"id":"1","type":"create_view","payload":{"table":"missing"}}"#);
		session.handle_text(
			r#"{"id":"2","type":"create_view","payload":{"table":"t","config":{"columns":["nope"]}}}"#,
		);
		session.handle_text(r#"{"id":"3","type":"update","payload":{"table":"t","data":{"x":["a"]}}}"#);

		let kinds: Vec<(Option<String>, ErrorKind)> = drain(&mut rx)
			.into_iter()
			.map(|response| match response.payload {
				ResponsePayload::Error(err) => (response.id, err.kind),
				other => panic!("expected error, got {:?}", other),
			})
			.collect();
		assert_eq!(
			kinds,
			vec![
				(None, ErrorKind::BadRequest),
				(Some("1".to_string()), ErrorKind::TableNotFound),
				(Some("2".to_string()), ErrorKind::InvalidViewConfig),
				(Some("3".to_string()), ErrorKind::SchemaMismatch),
			]
		);
		assert!(session.is_open());
		assert!(session.subscribed_tables().is_empty());
	}

	#[test]
	fn test_remove_view_releases_listener() {
		let tables = TableRegistry::new();
		let table = int_table(&tables, "t");
		let (session, _rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);

		let (first, _) = create_view(&session, "t", ViewConfig::new());
		let (second, _) = create_view(&session, "t", ViewConfig::new().with_columns(["x"]));
		assert_eq!(table.listener_count(), 1);

		session.execute(RequestPayload::RemoveView(RemoveViewRequest { view_id: first })).unwrap();
		assert_eq!(table.listener_count(), 1);
		session.execute(RequestPayload::RemoveView(RemoveViewRequest { view_id: second })).unwrap();
		assert_eq!(table.listener_count(), 0);

		let err = session.execute(RequestPayload::RemoveView(RemoveViewRequest { view_id: first })).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ViewNotFound);
	}

	#[test]
	fn test_view_snapshot_follows_updates() {
		let tables = TableRegistry::new();
		let table = int_table(&tables, "t");
		let (session, _rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);

		let (view_id, _) = create_view(&session, "t", ViewConfig::new().with_filter("x", FilterOperator::GreaterThan, json!(1)));
		table.append(int_batch(0..4)).unwrap();
		session.process(session.mailbox().drain());

		let response = session.execute(RequestPayload::ViewSnapshot(ViewSnapshotRequest { view_id })).unwrap();
		let ResponsePayload::ViewSnapshot {
			snapshot,
			..
		} = response
		else {
			panic!("expected view_snapshot");
		};
		assert_eq!(snapshot.version(), TableVersion(1));
		assert_eq!(int_values(frame_of(&snapshot), "x"), vec![2, 3]);

		let size = session.execute(RequestPayload::TableSize(TableSizeRequest { table: "t".to_string() })).unwrap();
		assert!(matches!(size, ResponsePayload::TableSize { size: 4, .. }));
	}

	#[test]
	fn test_closed_session_rejects_requests() {
		let tables = TableRegistry::new();
		int_table(&tables, "t");
		let (session, mut rx) = open_session(&tables, Arc::new(StandardViewEngine), 16);

		session.handle_text(r#"{"id":"bye","type":"close","payload":{}}"#);
		assert_eq!(session.state(), SessionState::Closed);
		assert!(!session.close("again"));

		let err = session.execute(RequestPayload::ListTables(Default::default())).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::SessionClosed);

		let responses = drain(&mut rx);
		assert_eq!(
			responses,
			vec![Response::reply(
				Some("bye".to_string()),
				ResponsePayload::SessionClosed {
					reason: "closed by client".to_string(),
				}
			)]
		);
	}

	/// Runs the standard engine, but fails every diff of views that have a filter.
	struct FailingFilterEngine;

	struct FailingState;

	impl ViewState for FailingState {
		fn layout(&self) -> Vec<(String, Type)> {
			vec![("x".to_string(), Type::Int)]
		}

		fn compute(&mut self, _snapshot: &TableSnapshot<'_>) -> Result<Frame> {
			Ok(Frame::empty([("x", Type::Int)]))
		}

		fn diff(&mut self, _change: &TableChange) -> Result<Changes> {
			Err(Error(internal("division by zero")))
		}
	}

	impl ViewEngine for FailingFilterEngine {
		fn prepare(&self, table: &str, schema: &Schema, config: &ViewConfig) -> Result<Box<dyn ViewState>> {
			if config.filter.is_empty() {
				StandardViewEngine.prepare(table, schema, config)
			} else {
				Ok(Box::new(FailingState))
			}
		}
	}

	#[test]
	fn test_engine_error_closes_only_that_view() {
		let tables = TableRegistry::new();
		let table = int_table(&tables, "t");
		let (session, mut rx) = open_session(&tables, Arc::new(FailingFilterEngine), 16);

		let (healthy, _) = create_view(&session, "t", ViewConfig::new());
		let (broken, _) =
			create_view(&session, "t", ViewConfig::new().with_filter("x", FilterOperator::GreaterThan, json!(0)));

		table.append(int_batch(0..2)).unwrap();
		session.process(session.mailbox().drain());

		let pushed = drain(&mut rx);
		assert_eq!(pushed.len(), 2);
		assert!(matches!(
			&pushed[0].payload,
			ResponsePayload::ViewUpdate { view_id, .. } if *view_id == healthy
		));
		match &pushed[1].payload {
			ResponsePayload::Error(err) => {
				assert_eq!(err.view_id, Some(broken));
				assert_eq!(err.kind, ErrorKind::EngineComputeError);
			}
			other => panic!("expected error, got {:?}", other),
		}

		assert!(session.is_open());
		assert_eq!(session.view_count(), 1);

		table.append(int_batch(2..4)).unwrap();
		session.process(session.mailbox().drain());
		let pushed = drain(&mut rx);
		assert_eq!(pushed.len(), 1);
		assert!(matches!(
			&pushed[0].payload,
			ResponsePayload::ViewUpdate { view_id, .. } if *view_id == healthy
		));
	}

	/// Blocks inside `diff` until the test releases it.
	struct BlockingEngine {
		gate: parking_lot::Mutex<Option<(std_mpsc::Sender<()>, std_mpsc::Receiver<()>)>>,
	}

	struct BlockingState {
		inner: Box<dyn ViewState>,
		entered: std_mpsc::Sender<()>,
		release: std_mpsc::Receiver<()>,
	}

	impl ViewState for BlockingState {
		fn layout(&self) -> Vec<(String, Type)> {
			self.inner.layout()
		}

		fn compute(&mut self, snapshot: &TableSnapshot<'_>) -> Result<Frame> {
			self.inner.compute(snapshot)
		}

		fn diff(&mut self, change: &TableChange) -> Result<Changes> {
			self.entered.send(()).unwrap();
			self.release.recv().unwrap();
			self.inner.diff(change)
		}
	}

	impl ViewEngine for BlockingEngine {
		fn prepare(&self, table: &str, schema: &Schema, config: &ViewConfig) -> Result<Box<dyn ViewState>> {
			let (entered, release) = self.gate.lock().take().expect("engine prepares a single view");
			Ok(Box::new(BlockingState {
				inner: StandardViewEngine.prepare(table, schema, config)?,
				entered,
				release,
			}))
		}
	}

	#[test]
	fn test_close_during_computation_emits_nothing_after() {
		let (entered_tx, entered_rx) = std_mpsc::channel();
		let (release_tx, release_rx) = std_mpsc::channel();
		let engine = Arc::new(BlockingEngine {
			gate: parking_lot::Mutex::new(Some((entered_tx, release_rx))),
		});

		let tables = TableRegistry::new();
		let table = int_table(&tables, "t");
		let (session, mut rx) = open_session(&tables, engine, 16);
		create_view(&session, "t", ViewConfig::new());

		table.append(int_batch(0..5)).unwrap();
		let events = session.mailbox().drain();
		let worker = {
			let session = session.clone();
			thread::spawn(move || session.process(events))
		};
		entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

		let closer = {
			let session = session.clone();
			thread::spawn(move || session.close("server shutting down"))
		};
		wait_for_blocking(|| session.state() != SessionState::Open, "session never started closing");

		release_tx.send(()).unwrap();
		worker.join().unwrap();
		assert!(closer.join().unwrap());

		assert_eq!(session.state(), SessionState::Closed);
		assert_eq!(table.listener_count(), 0);
		assert_eq!(table.size(), 5);

		let messages = drain(&mut rx);
		assert_eq!(
			messages,
			vec![Response::push(ResponsePayload::SessionClosed {
				reason: "server shutting down".to_string(),
			})]
		);
	}
}
