//! Event propagation.
//!
//! Handlers are registered per context and keyed by the event's concrete
//! type; there is no subtyping. An event emitted at a context reaches that
//! context's handlers, then each child's subtree, pre-order depth-first.
//! It never travels upward or sideways.
//!
//! ```text
//!        root            emit at A:  A, A1, A2
//!       /    \           emit at root: root, A, A1, A2, B
//!      A      B
//!     / \
//!   A1   A2
//! ```
//!
//! - [`Context::emit`] runs every handler on the calling thread, in that
//!   order, and returns when the last one has.
//! - [`Context::emit_concurrent`] clones the event once per handler and hands
//!   each call to a worker. It returns immediately; calls run in no
//!   particular order.
//!
//! No lock is held while a handler runs, so handlers may register handlers,
//! emit, or mutate state freely.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::context::Context;
use crate::reactive::{lock, worker};

/// A type-erased handler.
pub(crate) type Handler = Arc<dyn Fn(&dyn Any, &Context) + Send + Sync>;

/// Per-context handler lists, one per event type, in registration order.
#[derive(Default)]
pub(crate) struct HandlerTable {
    handlers: Mutex<HashMap<TypeId, Vec<Handler>>>,
}

impl HandlerTable {
    pub(crate) fn add<E: Any>(&self, handler: impl Fn(&E, &Context) + Send + Sync + 'static) {
        let erased: Handler = Arc::new(move |event: &dyn Any, cx: &Context| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event, cx);
            }
        });
        lock(&self.handlers)
            .entry(TypeId::of::<E>())
            .or_default()
            .push(erased);
    }

    /// Copy of the handlers for `E`.
    pub(crate) fn snapshot<E: Any>(&self) -> Vec<Handler> {
        lock(&self.handlers)
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count<E: Any>(&self) -> usize {
        lock(&self.handlers)
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}

impl Context {
    /// Deliver `event` to this subtree synchronously, pre-order.
    pub fn emit<E: Any>(&self, event: &E) {
        for handler in self.handlers().snapshot::<E>() {
            handler(event, self);
        }
        for child in self.children() {
            child.emit(event);
        }
    }

    /// Deliver `event` to this subtree on the worker pool.
    ///
    /// Returns the number of handler calls dispatched.
    pub fn emit_concurrent<E>(&self, event: E) -> usize
    where
        E: Any + Clone + Send + Sync,
    {
        let mut targets = Vec::new();
        self.collect_handlers::<E>(&mut targets);

        let dispatched = targets.len();
        tracing::trace!(handlers = dispatched, "concurrent emit");
        for (cx, handler) in targets {
            let event = event.clone();
            worker::dispatch(move || handler(&event, &cx));
        }
        dispatched
    }

    fn collect_handlers<E: Any>(&self, out: &mut Vec<(Context, Handler)>) {
        for handler in self.handlers().snapshot::<E>() {
            out.push((self.clone(), handler));
        }
        for child in self.children() {
            child.collect_handlers::<E>(out);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::engine::{Context, Runtime};
    use crate::error::BuildError;
    use crate::reactive::State;
    use crate::renderer::View;
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[derive(Debug, Clone)]
    struct Other;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(name: &'static str, log: Log) -> impl Fn(&Ping, &Context) + Send + Sync + 'static {
        move |ping: &Ping, _: &Context| log.lock().unwrap().push(format!("{name}:{}", ping.0))
    }

    /// root -> (a -> (a1, a2), b)
    fn tree(log: &Log) -> (Context, Context) {
        let runtime = Runtime::new();
        let log = log.clone();
        let (tx, rx) = mpsc::channel();
        let root = Context::mount(
            runtime,
            Box::new(move |cx: &Context| -> Result<View, BuildError> {
                cx.on(recorder("root", log.clone()));
                let log_a = log.clone();
                let log_b = log.clone();
                cx.scope(|b| {
                    let a = b.child(move |cx: &Context| -> Result<View, BuildError> {
                        cx.on(recorder("a", log_a.clone()));
                        let log_a1 = log_a.clone();
                        let log_a2 = log_a.clone();
                        cx.scope(|b| {
                            b.child(move |cx: &Context| -> Result<View, BuildError> {
                                cx.on(recorder("a1", log_a1.clone()));
                                Ok(View::empty())
                            })?;
                            b.child(move |cx: &Context| -> Result<View, BuildError> {
                                cx.on(recorder("a2", log_a2.clone()));
                                Ok(View::empty())
                            })?;
                            Ok(())
                        })?;
                        Ok(cx.children_view())
                    })?;
                    tx.send(a).ok();
                    b.child(move |cx: &Context| -> Result<View, BuildError> {
                        cx.on(recorder("b", log_b.clone()));
                        Ok(View::empty())
                    })?;
                    Ok(())
                })?;
                Ok(cx.children_view())
            }),
        )
        .unwrap();
        let a = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        (root, a)
    }

    #[test]
    fn test_emit_is_pre_order() {
        let log: Log = Arc::default();
        let (root, _a) = tree(&log);

        root.emit(&Ping(1));
        assert_eq!(*log.lock().unwrap(), vec!["root:1", "a:1", "a1:1", "a2:1", "b:1"]);
    }

    #[test]
    fn test_emit_reaches_only_descendants() {
        let log: Log = Arc::default();
        let (_root, a) = tree(&log);

        a.emit(&Ping(2));
        assert_eq!(*log.lock().unwrap(), vec!["a:2", "a1:2", "a2:2"]);
    }

    #[test]
    fn test_handlers_keyed_by_exact_type() {
        let log: Log = Arc::default();
        let (root, _a) = tree(&log);

        root.emit(&Other);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(root.handler_count::<Ping>(), 1);
        assert_eq!(root.handler_count::<Other>(), 0);
    }

    #[test]
    fn test_handler_may_register_during_emit() {
        let root = Context::mount(
            Runtime::new(),
            Box::new(|cx: &Context| -> Result<View, BuildError> {
                cx.on(|_: &Ping, cx: &Context| cx.on(|_: &Ping, _: &Context| {}));
                Ok(View::empty())
            }),
        )
        .unwrap();

        root.emit(&Ping(0));
        assert_eq!(root.handler_count::<Ping>(), 2);
    }

    #[test]
    fn test_emit_concurrent_returns_before_handlers_finish() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));
        let (done_tx, done_rx) = mpsc::channel();

        let root = Context::mount(
            Runtime::new(),
            Box::new(move |cx: &Context| -> Result<View, BuildError> {
                let release_rx = release_rx.clone();
                let done_tx = done_tx.clone();
                cx.on(move |ping: &Ping, _: &Context| {
                    release_rx
                        .lock()
                        .unwrap()
                        .recv_timeout(Duration::from_secs(2))
                        .ok();
                    done_tx.send(ping.0).ok();
                });
                Ok(View::empty())
            }),
        )
        .unwrap();

        assert_eq!(root.emit_concurrent(Ping(7)), 1);
        assert!(done_rx.try_recv().is_err(), "handler still blocked");

        release_tx.send(()).unwrap();
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(2)), Ok(7));
    }

    #[test]
    fn test_emit_concurrent_reaches_every_handler() {
        let counter = State::new(0);
        let seen = counter.clone();
        let root = Context::mount(
            Runtime::new(),
            Box::new(move |cx: &Context| -> Result<View, BuildError> {
                for _ in 0..3 {
                    let seen = seen.clone();
                    cx.on(move |_: &Ping, _: &Context| seen.update(|n| *n += 1));
                }
                Ok(View::empty())
            }),
        )
        .unwrap();

        assert_eq!(root.emit_concurrent(Ping(1)), 3);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while counter.get() < 3 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(counter.get(), 3);
    }
}
