//! # constellation
//!
//! The client-side behaviour of a static club website, as host-independent
//! Rust: an ambient particle-field background, an endless slide carousel, a
//! loader that injects shared navbar and footer fragments, and the navbar
//! chrome, active-link, mobile-menu and footer-year controller.
//!
//! ## Quick Start
//!
//! ```
//! use constellation::prelude::*;
//!
//! let mut field = ParticleField::new(FieldConfig::constellation(), Vec2::new(1280.0, 720.0), 7);
//! let mut frame = Frame::new();
//! let ctx = FrameContext::new(Vec2::new(1280.0, 720.0)).with_pointer(Some(Vec2::new(640.0, 360.0)));
//! let stats = field.step(&ctx, &mut frame);
//! assert_eq!(stats.particles, 100);
//! ```
//!
//! ## Core Concepts
//!
//! ### Fields
//!
//! A [`ParticleField`](field::ParticleField) owns its particles and a seeded
//! RNG. Each frame it receives the viewport and pointer explicitly through a
//! [`FrameContext`](field::FrameContext) and draws through the
//! [`Surface`](surface::Surface) trait. The [`Frame`](surface::Frame)
//! recorder captures draw calls for tests and for the GPU renderer.
//!
//! ### Pages
//!
//! Page behaviours talk to the document through the [`Dom`](dom::Dom) trait.
//! [`MemoryDom`](dom::MemoryDom) parses real HTML so a page file can be booted
//! outside a browser:
//!
//! ```
//! use constellation::prelude::*;
//! use url::Url;
//!
//! let mut dom = MemoryDom::parse_document(r#"<div id="navbar-placeholder"></div>"#);
//! let source = MapSource::new().with("components/navbar.html", "<nav></nav>");
//! let ctx = PageContext::new(Url::parse("http://localhost:3000/").unwrap());
//! let outcome = boot(&mut dom, &source, &SiteConfig::default(), &ctx).unwrap();
//! assert!(matches!(outcome, BootOutcome::Booted(_)));
//! ```
//!
//! ### Carousels
//!
//! A [`Carousel`](carousel::Carousel) holds only its index, hover flag and
//! timer handle; timers come from a [`TimerHost`](time::TimerHost) such as
//! the deterministic [`ManualTimers`](time::ManualTimers).

pub mod carousel;
pub mod config;
pub mod dom;
pub mod driver;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod loader;
pub mod page;
pub mod particle;
pub mod surface;
pub mod time;
pub mod ui;
pub mod visuals;
pub mod window;

pub use glam::Vec2;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use constellation::prelude::*;
/// ```
pub mod prelude {
    pub use crate::carousel::{Carousel, CarouselOptions, CarouselState};
    pub use crate::config::{FragmentConfig, FragmentSlot, SiteConfig, SliderSpec};
    pub use crate::dom::{ClassPatch, Dom, MemoryDom, NodeId};
    pub use crate::driver::{FrameLoop, StopToken};
    pub use crate::error::{ComposeError, ConfigError, FetchError, GpuError, ViewerError};
    pub use crate::field::{FieldConfig, FrameContext, ParticleField, Variant};
    pub use crate::input::Input;
    pub use crate::loader::{load_fragment, DirectorySource, FragmentSource, HttpSource, MapSource};
    pub use crate::page::{boot, BootOutcome, BootReport, PageContext, Widgets};
    pub use crate::particle::{Boundary, Particle};
    pub use crate::surface::{DrawCommand, Frame, FrameStats, Surface};
    pub use crate::time::{ManualTimers, Time, TimerHandle, TimerHost};
    pub use crate::ui::{MenuVisibility, NavbarChrome, SliderTabs};
    pub use crate::visuals::{ConnectionStyle, ParticleTint, Rgba};
    pub use crate::Vec2;
}
