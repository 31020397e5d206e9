//! Introspection records describing how a type can be built.
//!
//! A [`TypeSource`](crate::TypeSource) answers `introspect` with a
//! [`TypeInfo`] and `introspect_holder` with a [`HolderInfo`]. Both are plain
//! data holding type-erased invokers; they are produced with the typed
//! builders below so callers never handle `dyn Any` themselves.

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::key::Key;
use crate::provider::ResolverContext;

/// Type-erased shared instance, as stored in the instance cache.
pub type AnyArc = Arc<dyn Any + Send + Sync>;
pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

pub(crate) type ConstructorFn = Arc<dyn Fn(&mut Args) -> Result<AnyBox, BoxError> + Send + Sync>;
pub(crate) type DefaultFn = Arc<dyn Fn() -> Result<AnyBox, BoxError> + Send + Sync>;
pub(crate) type AssignFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), AnyArc) -> Result<(), BoxError> + Send + Sync>;
pub(crate) type ProducerFn = Arc<
    dyn for<'r> Fn(&(dyn Any + Send + Sync), &ResolverContext<'r>) -> Result<AnyArc, BoxError>
        + Send
        + Sync,
>;

/// Builds a parameter list for [`TypeBuilder::inject_constructor`].
///
/// ```rust
/// use ferrous_ioc::{params, Key};
///
/// struct Repo;
/// struct Clock;
///
/// let list = params![Repo, Clock];
/// assert_eq!(list, vec![Key::of::<Repo>(), Key::of::<Clock>()]);
/// ```
#[macro_export]
macro_rules! params {
    ($($ty:ty),* $(,)?) => {{
        let params: ::std::vec::Vec<$crate::Key> = ::std::vec![$($crate::Key::of::<$ty>()),*];
        params
    }};
}

/// Resolved constructor arguments, handed out in declared order.
pub struct Args {
    owner: &'static str,
    values: Vec<AnyArc>,
    cursor: usize,
}

impl Args {
    pub(crate) fn new(owner: &'static str, values: Vec<AnyArc>) -> Self {
        Self {
            owner,
            values,
            cursor: 0,
        }
    }

    /// Takes the next argument as `Arc<T>`.
    ///
    /// Fails with `TypeMismatch` when the next declared parameter is not `T`,
    /// and with `MissingArgument` when all declared parameters are consumed.
    pub fn next<T: Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        let value = self.values.get(self.cursor).cloned().ok_or(DiError::MissingArgument {
            owner: self.owner,
            index: self.cursor,
            available: self.values.len(),
        })?;
        self.cursor += 1;
        value
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(type_name::<T>()))
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }
}

#[derive(Clone)]
pub(crate) struct InjectConstructor {
    pub(crate) params: Vec<Key>,
    pub(crate) invoke: ConstructorFn,
}

#[derive(Clone)]
pub(crate) struct InjectField {
    pub(crate) name: &'static str,
    pub(crate) dependency: Key,
    pub(crate) assign: AssignFn,
}

/// Introspection of one constructible type.
///
/// Mirrors what a reflection facility would report: whether the type
/// carries the injectable marker, its injection-marked constructor (if
/// any), its zero-argument constructor (if any), and its injection-marked
/// fields.
#[derive(Clone)]
pub struct TypeInfo {
    pub(crate) key: Key,
    pub(crate) injectable: bool,
    pub(crate) inject_constructor: Option<InjectConstructor>,
    pub(crate) default_constructor: Option<DefaultFn>,
    pub(crate) inject_fields: Vec<InjectField>,
}

impl TypeInfo {
    /// Starts describing `T` as carrying the injectable marker.
    pub fn injectable<T: Send + Sync + 'static>() -> TypeBuilder<T> {
        TypeBuilder::new(true)
    }

    /// Starts describing `T` without the injectable marker.
    ///
    /// Such a type is known to the introspector but is rejected by the graph
    /// builder with `UnsupportedClass`.
    pub fn unmarked<T: Send + Sync + 'static>() -> TypeBuilder<T> {
        TypeBuilder::new(false)
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn is_injectable(&self) -> bool {
        self.injectable
    }

    pub fn has_inject_constructor(&self) -> bool {
        self.inject_constructor.is_some()
    }

    pub fn has_default_constructor(&self) -> bool {
        self.default_constructor.is_some()
    }

    /// Names and dependency keys of the injection-marked fields.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, Key)> + '_ {
        self.inject_fields.iter().map(|f| (f.name, f.dependency))
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("injectable", &self.injectable)
            .field(
                "inject_constructor",
                &self.inject_constructor.as_ref().map(|c| &c.params),
            )
            .field("default_constructor", &self.default_constructor.is_some())
            .field("inject_fields", &self.fields().collect::<Vec<_>>())
            .finish()
    }
}

/// Typed builder for [`TypeInfo`].
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{params, TypeInfo};
/// use std::sync::Arc;
///
/// struct Clock;
///
/// #[derive(Default)]
/// struct Audit {
///     clock: Option<Arc<Clock>>,
/// }
///
/// struct Ledger {
///     clock: Arc<Clock>,
/// }
///
/// // Field strategy: zero-argument constructor plus injected fields
/// let audit = TypeInfo::injectable::<Audit>()
///     .default_constructor(Audit::default)
///     .inject_field::<Clock, _>("clock", |audit, clock| audit.clock = Some(clock))
///     .build();
/// assert!(audit.has_default_constructor());
///
/// // Constructor strategy: arguments arrive in declared order
/// let ledger = TypeInfo::injectable::<Ledger>()
///     .inject_constructor(params![Clock], |args| Ok(Ledger { clock: args.next()? }))
///     .build();
/// assert!(ledger.has_inject_constructor());
/// ```
pub struct TypeBuilder<T> {
    info: TypeInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> TypeBuilder<T> {
    fn new(injectable: bool) -> Self {
        Self {
            info: TypeInfo {
                key: Key::of::<T>(),
                injectable,
                inject_constructor: None,
                default_constructor: None,
                inject_fields: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Declares the injection-marked constructor and its parameter types.
    pub fn inject_constructor<I, F>(mut self, params: I, f: F) -> Self
    where
        I: IntoIterator<Item = Key>,
        F: Fn(&mut Args) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let invoke: ConstructorFn =
            Arc::new(move |args: &mut Args| f(args).map(|value| Box::new(value) as AnyBox));
        self.info.inject_constructor = Some(InjectConstructor {
            params: params.into_iter().collect(),
            invoke,
        });
        self
    }

    /// Declares the zero-argument constructor.
    pub fn default_constructor<F>(self, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.try_default_constructor(move || Ok(f()))
    }

    /// Declares a zero-argument constructor that may fail.
    pub fn try_default_constructor<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let invoke: DefaultFn = Arc::new(move || f().map(|value| Box::new(value) as AnyBox));
        self.info.default_constructor = Some(invoke);
        self
    }

    /// Declares an injection-marked field of type `D`.
    pub fn inject_field<D, F>(self, name: &'static str, assign: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.try_inject_field::<D, _>(name, move |target, value| {
            assign(target, value);
            Ok(())
        })
    }

    /// Declares an injection-marked field whose accessor may reject the value.
    pub fn try_inject_field<D, F>(mut self, name: &'static str, assign: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let accessor: AssignFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), value: AnyArc| {
                let target = target
                    .downcast_mut::<T>()
                    .ok_or(DiError::TypeMismatch(type_name::<T>()))?;
                let value = value
                    .downcast::<D>()
                    .map_err(|_| DiError::TypeMismatch(type_name::<D>()))?;
                assign(target, value)
            },
        );
        self.info.inject_fields.push(InjectField {
            name,
            dependency: Key::of::<D>(),
            assign: accessor,
        });
        self
    }

    pub fn build(self) -> TypeInfo {
        self.info
    }
}

impl<T: Send + Sync + 'static> From<TypeBuilder<T>> for TypeInfo {
    fn from(builder: TypeBuilder<T>) -> Self {
        builder.build()
    }
}

fn erase_producer<F>(f: F) -> ProducerFn
where
    F: for<'r> Fn(&(dyn Any + Send + Sync), &ResolverContext<'r>) -> Result<AnyArc, BoxError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

#[derive(Clone)]
pub(crate) struct ProducerInfo {
    pub(crate) name: &'static str,
    pub(crate) produces: Key,
    pub(crate) invoke: ProducerFn,
}

/// Introspection of one factory holder type.
#[derive(Clone)]
pub struct HolderInfo {
    pub(crate) key: Key,
    pub(crate) factory: bool,
    pub(crate) constructor: Option<DefaultFn>,
    pub(crate) producers: Vec<ProducerInfo>,
}

impl HolderInfo {
    /// Starts describing `H` as carrying the factory marker.
    pub fn factory<H: Send + Sync + 'static>() -> HolderBuilder<H> {
        HolderBuilder::new(true)
    }

    /// Starts describing `H` without the factory marker.
    pub fn unmarked<H: Send + Sync + 'static>() -> HolderBuilder<H> {
        HolderBuilder::new(false)
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn is_factory(&self) -> bool {
        self.factory
    }

    /// Names and produced keys of the producer methods, in declaration order.
    pub fn producers(&self) -> impl Iterator<Item = (&'static str, Key)> + '_ {
        self.producers.iter().map(|p| (p.name, p.produces))
    }
}

impl std::fmt::Debug for HolderInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolderInfo")
            .field("key", &self.key)
            .field("factory", &self.factory)
            .field("constructor", &self.constructor.is_some())
            .field("producers", &self.producers().collect::<Vec<_>>())
            .finish()
    }
}

/// Typed builder for [`HolderInfo`].
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::HolderInfo;
///
/// struct Writer {
///     message: String,
/// }
///
/// #[derive(Default)]
/// struct WriterConfig;
///
/// let holder = HolderInfo::factory::<WriterConfig>()
///     .constructor(WriterConfig::default)
///     .producer("writer", |_cfg: &WriterConfig| Writer {
///         message: "Hello, World!".to_string(),
///     })
///     .build();
///
/// assert_eq!(holder.producers().count(), 1);
/// ```
pub struct HolderBuilder<H> {
    info: HolderInfo,
    _marker: PhantomData<fn() -> H>,
}

impl<H: Send + Sync + 'static> HolderBuilder<H> {
    fn new(factory: bool) -> Self {
        Self {
            info: HolderInfo {
                key: Key::of::<H>(),
                factory,
                constructor: None,
                producers: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Declares the holder's zero-argument constructor.
    pub fn constructor<F>(self, f: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.try_constructor(move || Ok(f()))
    }

    pub fn try_constructor<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<H, BoxError> + Send + Sync + 'static,
    {
        let invoke: DefaultFn = Arc::new(move || f().map(|holder| Box::new(holder) as AnyBox));
        self.info.constructor = Some(invoke);
        self
    }

    /// Declares a producer method returning `R`.
    pub fn producer<R, F>(self, name: &'static str, f: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&H) -> R + Send + Sync + 'static,
    {
        self.producer_with::<R, _>(name, move |holder, _| Ok(f(holder)))
    }

    /// Declares a producer method that may fail.
    pub fn try_producer<R, F>(self, name: &'static str, f: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&H) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.producer_with::<R, _>(name, move |holder, _| f(holder))
    }

    /// Declares a producer method that resolves its own dependencies.
    ///
    /// The context shares the resolution stack of the call that triggered
    /// the producer, so a producer that (transitively) asks for its own
    /// product fails with `CyclicDependency`.
    pub fn producer_with<R, F>(mut self, name: &'static str, f: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&H, &ResolverContext<'_>) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        let invoke = erase_producer(move |holder, ctx| {
            let holder = holder
                .downcast_ref::<H>()
                .ok_or(DiError::TypeMismatch(type_name::<H>()))?;
            f(holder, ctx).map(|value| Arc::new(value) as AnyArc)
        });
        self.info.producers.push(ProducerInfo {
            name,
            produces: Key::of::<R>(),
            invoke,
        });
        self
    }

    pub fn build(self) -> HolderInfo {
        self.info
    }
}

impl<H: Send + Sync + 'static> From<HolderBuilder<H>> for HolderInfo {
    fn from(builder: HolderBuilder<H>) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Target {
        dep: Option<Arc<u32>>,
    }

    #[test]
    fn args_are_handed_out_in_order() {
        let values: Vec<AnyArc> = vec![Arc::new(1u32), Arc::new("two".to_string())];
        let mut args = Args::new("Owner", values);

        assert_eq!(*args.next::<u32>().unwrap(), 1);
        assert_eq!(args.remaining(), 1);
        assert_eq!(*args.next::<String>().unwrap(), "two");
        assert!(matches!(
            args.next::<u32>(),
            Err(DiError::MissingArgument { owner: "Owner", index: 2, available: 2 })
        ));
    }

    #[test]
    fn args_report_wrong_type() {
        let mut args = Args::new("Owner", vec![Arc::new(1u32) as AnyArc]);
        assert!(matches!(args.next::<String>(), Err(DiError::TypeMismatch(_))));
    }

    #[test]
    fn field_accessor_downcasts_both_sides() {
        let info = TypeInfo::injectable::<Target>()
            .default_constructor(Target::default)
            .inject_field::<u32, _>("dep", |t, d| t.dep = Some(d))
            .build();

        let field = &info.inject_fields[0];
        assert_eq!(field.name, "dep");
        assert_eq!(field.dependency, Key::of::<u32>());

        let mut target: AnyBox = Box::new(Target::default());
        (field.assign)(target.as_mut(), Arc::new(7u32)).unwrap();
        let target = target.downcast::<Target>().unwrap();
        assert_eq!(target.dep.as_deref(), Some(&7));

        let mut wrong: AnyBox = Box::new(Target::default());
        let err = (field.assign)(wrong.as_mut(), Arc::new("nope")).unwrap_err();
        assert!(err.to_string().contains("Type mismatch"));
    }

    #[test]
    fn debug_lists_structure_not_invokers() {
        let info = TypeInfo::unmarked::<Target>().build();
        let printed = format!("{:?}", info);
        assert!(printed.contains("injectable: false"));
        assert!(printed.contains("default_constructor: false"));
    }
}
