//! The Action protocol and its function adapter.

use crate::{context::ExecContext, error::ActionError, state::RunState};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::borrow::Cow;
use std::sync::Arc;

/// One unit of work in a composition.
///
/// An action is run once per invocation with the caller's execution context
/// and the run's shared [`RunState`]. The engine keeps no state for it:
/// anything an action needs to remember is captured by the action itself or
/// stored in the run state.
///
/// Returning [`ActionError::SkipRemainder`] asks the enclosing runner to
/// start no further siblings. It is not a failure.
///
/// Runners are actions too, so `Arc<dyn Action>` is the currency for both
/// leaves and nested compositions.
#[async_trait]
pub trait Action: Send + Sync {
    /// Run once.
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError>;

    /// Identity used when wrapping this action's errors and in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<A: Action + ?Sized> Action for Arc<A> {
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError> {
        (**self).run(ctx, state).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<A: Action + ?Sized> Action for Box<A> {
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError> {
        (**self).run(ctx, state).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

type BoxedFn =
    dyn Fn(ExecContext, RunState) -> BoxFuture<'static, Result<(), ActionError>> + Send + Sync;

/// Adapts an async closure into an [`Action`].
///
/// The closure receives owned clones of the context and state handles, so
/// the returned future can be `'static` and move freely between tasks.
///
/// ```
/// use conflux_core::{ActionError, FnAction};
///
/// let greet = FnAction::named("greet", |_ctx, state| async move {
///     state.insert("greeting", String::from("hello"));
///     Ok::<_, ActionError>(())
/// });
/// ```
pub struct FnAction {
    name: Cow<'static, str>,
    f: Box<BoxedFn>,
}

impl FnAction {
    /// Wrap a `(context, state) -> Result` closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ExecContext, RunState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self {
            name: Cow::Borrowed("fn-action"),
            f: Box::new(move |ctx, state| f(ctx, state).boxed()),
        }
    }

    /// Wrap a `(context) -> Result` closure that ignores the run state.
    pub fn from_ctx<F, Fut>(f: F) -> Self
    where
        F: Fn(ExecContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self::new(move |ctx, _state| f(ctx))
    }

    /// Wrap a `(context, state) -> Result` closure under `name`.
    pub fn named<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(ExecContext, RunState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self::new(f).with_name(name)
    }

    /// Replace the name.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Action for FnAction {
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError> {
        (self.f)(ctx.clone(), state.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction").field("name", &self.name).finish()
    }
}

/// An action with its name overridden. Built by [`ActionExt::named`].
pub struct Named<A> {
    name: Cow<'static, str>,
    inner: A,
}

#[async_trait]
impl<A: Action> Action for Named<A> {
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError> {
        self.inner.run(ctx, state).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Conveniences for building compositions.
pub trait ActionExt: Action + Sized + 'static {
    /// Erase the concrete type for use as a runner child.
    fn arc(self) -> Arc<dyn Action> {
        Arc::new(self)
    }

    /// Give this action a name, typically a composite that would otherwise
    /// report its type name.
    fn named(self, name: impl Into<Cow<'static, str>>) -> Named<Self> {
        Named {
            name: name.into(),
            inner: self,
        }
    }
}

impl<A: Action + Sized + 'static> ActionExt for A {}

/// Run `action` once with a fresh context and an empty [`RunState`].
pub async fn run(action: &dyn Action) -> Result<(), ActionError> {
    run_with_state(action, &RunState::new()).await
}

/// Run `action` once with a fresh context and the caller's state.
pub async fn run_with_state(action: &dyn Action, state: &RunState) -> Result<(), ActionError> {
    action.run(&ExecContext::new(), state).await
}
