//! Control Flow Primitives - Conditional and list rendering.
//!
//! Typed shortcuts over dynamic scopes, for code that builds scopes by hand
//! rather than through a declarative tree:
//! - [`ScopeBuilder::show`] - Conditional rendering
//! - [`ScopeBuilder::each`] - List rendering
//! - [`ScopeBuilder::when`] - Pending / resolved / rejected rendering
//!
//! # Component Lifecycle
//!
//! Each call adds one nested dynamic scope at the builder's position.
//!
//! ## show()
//! - When a dependency fires, the condition is re-read
//! - The previous branch is dropped, the matching branch is built
//! - If `else_fn` is provided it renders when the condition is false
//!
//! ## each()
//! - When a dependency fires, every item is rebuilt
//! - Items are not matched by key; identity does not survive a rebuild
//!
//! ## when()
//! - Re-renders whenever the [`AsyncState`] cell is written
//! - A rejection without `catch_fn` is logged and renders nothing

use std::sync::Arc;

use crate::engine::{Scope, ScopeBuilder};
use crate::error::BuildError;
use crate::reactive::{Dependency, State};

/// A branch body.
pub type BranchFn = Arc<dyn Fn(&mut ScopeBuilder) -> Result<(), BuildError> + Send + Sync>;

impl ScopeBuilder {
    /// Conditionally render based on a condition re-read whenever `deps` fire.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let visible = cx.use_state(true);
    /// let read = visible.clone();
    ///
    /// builder.show(
    ///     vec![visible.dependency()],
    ///     move || read.get(),
    ///     |b| { b.text("Visible!"); Ok(()) },
    ///     Some(|b: &mut ScopeBuilder| { b.text("Hidden replacement"); Ok(()) }),
    /// )?;
    ///
    /// visible.set(false); // "Visible!" destroyed, "Hidden replacement" created
    /// ```
    ///
    /// # Without else branch
    ///
    /// ```ignore
    /// builder.show(deps, condition, then_fn, None::<fn(&mut ScopeBuilder) -> Result<(), BuildError>>)?;
    /// ```
    pub fn show<ThenF, ElseF>(
        &mut self,
        deps: Vec<Arc<dyn Dependency>>,
        condition: impl Fn() -> bool + Send + Sync + 'static,
        then_fn: ThenF,
        else_fn: Option<ElseF>,
    ) -> Result<Scope, BuildError>
    where
        ThenF: Fn(&mut ScopeBuilder) -> Result<(), BuildError> + Send + Sync + 'static,
        ElseF: Fn(&mut ScopeBuilder) -> Result<(), BuildError> + Send + Sync + 'static,
    {
        self.dynamic(deps, move |builder| {
            if condition() {
                then_fn(builder)
            } else if let Some(else_fn) = &else_fn {
                else_fn(builder)
            } else {
                Ok(())
            }
        })
    }

    /// Render `render_fn` once per item, rebuilt whenever `deps` fire.
    ///
    /// ```ignore
    /// let todos = cx.use_state(vec!["a".to_string()]);
    /// let read = todos.clone();
    ///
    /// builder.each(
    ///     vec![todos.dependency()],
    ///     move || read.get(),
    ///     |b, index, todo| { b.text(format!("{index}. {todo}")); Ok(()) },
    /// )?;
    /// ```
    pub fn each<T, ItemsF, RenderF>(
        &mut self,
        deps: Vec<Arc<dyn Dependency>>,
        items_fn: ItemsF,
        render_fn: RenderF,
    ) -> Result<Scope, BuildError>
    where
        T: 'static,
        ItemsF: Fn() -> Vec<T> + Send + Sync + 'static,
        RenderF: Fn(&mut ScopeBuilder, usize, &T) -> Result<(), BuildError> + Send + Sync + 'static,
    {
        self.dynamic(deps, move |builder| {
            for (index, item) in items_fn().iter().enumerate() {
                render_fn(builder, index, item)?;
            }
            Ok(())
        })
    }

    /// Render based on an [`AsyncState`] cell.
    ///
    /// Users run their own async work and write the outcome into the cell:
    ///
    /// ```ignore
    /// let fetch = cx.use_state(AsyncState::Pending);
    /// let writer = fetch.clone();
    /// worker::dispatch(move || match load() {
    ///     Ok(data) => writer.set(AsyncState::Resolved(data)),
    ///     Err(e) => writer.set(AsyncState::Rejected(e.to_string())),
    /// });
    ///
    /// builder.when(
    ///     &fetch,
    ///     WhenOptions::new(|b, data: String| { b.text(data); Ok(()) })
    ///         .pending(|b| { b.text("Loading..."); Ok(()) })
    ///         .catch(|b, err: String| { b.text(format!("Error: {err}")); Ok(()) }),
    /// )?;
    /// ```
    pub fn when<T, E>(
        &mut self,
        state: &State<AsyncState<T, E>>,
        options: WhenOptions<T, E>,
    ) -> Result<Scope, BuildError>
    where
        T: Clone + Send + 'static,
        E: Clone + std::fmt::Display + Send + 'static,
    {
        let read = state.clone();
        self.dynamic(vec![state.dependency()], move |builder| match read.get() {
            AsyncState::Pending => match &options.pending {
                Some(pending) => pending(builder),
                None => Ok(()),
            },
            AsyncState::Resolved(data) => (options.then_fn)(builder, data),
            AsyncState::Rejected(err) => match &options.catch_fn {
                Some(catch_fn) => catch_fn(builder, err),
                None => {
                    tracing::warn!(error = %err, "unhandled rejection in when()");
                    Ok(())
                }
            },
        })
    }
}

// =============================================================================
// Async state
// =============================================================================

/// State of an async operation driving [`ScopeBuilder::when`].
///
/// ```ignore
/// let state = State::new(AsyncState::<Data, String>::Pending);
///
/// // On success: state.set(AsyncState::Resolved(data));
/// // On error: state.set(AsyncState::Rejected("error".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum AsyncState<T, E> {
    /// Loading state - async operation in progress.
    Pending,
    /// Success state - operation completed with value.
    Resolved(T),
    /// Error state - operation failed with error.
    Rejected(E),
}

type ValueBranchFn<T> = Arc<dyn Fn(&mut ScopeBuilder, T) -> Result<(), BuildError> + Send + Sync>;

/// Branches of [`ScopeBuilder::when`].
pub struct WhenOptions<T, E> {
    /// Rendered while pending. If `None`, nothing is rendered.
    pub pending: Option<BranchFn>,
    /// Rendered with the resolved value.
    pub then_fn: ValueBranchFn<T>,
    /// Rendered with the error. If `None`, the error is logged.
    pub catch_fn: Option<ValueBranchFn<E>>,
}

impl<T, E> WhenOptions<T, E> {
    pub fn new(
        then_fn: impl Fn(&mut ScopeBuilder, T) -> Result<(), BuildError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            pending: None,
            then_fn: Arc::new(then_fn),
            catch_fn: None,
        }
    }

    pub fn pending(
        mut self,
        pending: impl Fn(&mut ScopeBuilder) -> Result<(), BuildError> + Send + Sync + 'static,
    ) -> Self {
        self.pending = Some(Arc::new(pending));
        self
    }

    pub fn catch(
        mut self,
        catch_fn: impl Fn(&mut ScopeBuilder, E) -> Result<(), BuildError> + Send + Sync + 'static,
    ) -> Self {
        self.catch_fn = Some(Arc::new(catch_fn));
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
