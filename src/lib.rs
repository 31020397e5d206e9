//! # ferrous-ioc
//!
//! A small inversion-of-control container: types are discovered through a
//! [`TypeSource`], registered once with every structural problem reported up
//! front, and then resolved as container-wide single instances.
//!
//! ## Features
//!
//! - **Two construction strategies**: an injection constructor receiving its
//!   dependencies as arguments, or a zero-argument constructor followed by
//!   field injection
//! - **Factory holders**: producer methods on a holder supply types that are
//!   not injectable themselves
//! - **Cycle detection**: at registration and at resolution, with the full
//!   dependency path in the error
//! - **At-most-once construction**: one instance per type, also under
//!   concurrent resolution
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_ioc::{params, Catalog, Container, HolderInfo, Resolver, TypeInfo};
//! use std::sync::Arc;
//!
//! struct Writer {
//!     message: String,
//! }
//!
//! #[derive(Default)]
//! struct WriterConfig;
//!
//! struct Printer {
//!     writer: Arc<Writer>,
//! }
//!
//! impl Printer {
//!     fn print(&self) -> String {
//!         self.writer.message.clone()
//!     }
//! }
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .add(TypeInfo::injectable::<Printer>().inject_constructor(params![Writer], |args| {
//!         Ok(Printer { writer: args.next()? })
//!     }))
//!     .add_holder(
//!         HolderInfo::factory::<WriterConfig>()
//!             .constructor(WriterConfig::default)
//!             .producer("writer", |_: &WriterConfig| Writer {
//!                 message: "Hello, World!".to_string(),
//!             }),
//!     );
//!
//! let container = Container::from_source(catalog).unwrap();
//! let printer = container.resolve_required::<Printer>();
//! assert_eq!(printer.print(), "Hello, World!");
//! assert!(Arc::ptr_eq(&printer, &container.resolve_required::<Printer>()));
//! ```
//!
//! ## Field Injection
//!
//! ```rust
//! use ferrous_ioc::{Catalog, Container, Resolver, TypeInfo};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Engine;
//!
//! #[derive(Default)]
//! struct Car {
//!     engine: Option<Arc<Engine>>,
//! }
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .add(
//!         TypeInfo::injectable::<Car>()
//!             .default_constructor(Car::default)
//!             .inject_field::<Engine, _>("engine", |car, engine| car.engine = Some(engine)),
//!     )
//!     .describe(TypeInfo::injectable::<Engine>().default_constructor(Engine::default));
//!
//! let container = Container::from_source(catalog).unwrap();
//! let car = container.resolve_required::<Car>();
//! assert!(Arc::ptr_eq(car.engine.as_ref().unwrap(), &container.resolve_required::<Engine>()));
//! ```
//!
//! ## Errors
//!
//! Registration fails with [`DiError::UnsupportedClass`] for a type lacking
//! its marker, [`DiError::NoSuitableConstructor`] when no strategy applies,
//! and [`DiError::CyclicDependency`] for a dependency cycle. Invoker failures
//! during resolution surface as [`DiError::ConstructionFailure`].
//!
//! ## Link-time Registration
//!
//! Hooks submitted to [`INJECTABLE_TYPES`] and [`FACTORY_HOLDERS`] are
//! collected by [`LinkedSource`], so types spread over several modules can
//! be registered without a central list.

// Module declarations
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod introspect;
pub mod key;
pub mod provider;
pub mod source;
pub mod traits;

mod factories;
mod internal;
mod registration;

// Re-exports
pub use collection::ContainerBuilder;
pub use config::{ContainerOptions, DuplicateProducers, DEFAULT_MAX_DEPTH};
pub use descriptors::{PlanDescriptor, Strategy};
pub use error::{BoxError, DiError, DiResult, ErrorCause, InvokerPanic};
pub use introspect::{AnyArc, Args, HolderBuilder, HolderInfo, TypeBuilder, TypeInfo};
pub use key::{key_of_type, Key};
pub use provider::{Container, ResolverContext};
pub use source::{Catalog, LinkedSource, FACTORY_HOLDERS, INJECTABLE_TYPES};
pub use traits::{Resolver, TypeSource};

// Used by `distributed_slice` submissions in dependent crates
#[doc(hidden)]
pub use linkme;
