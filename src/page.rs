//! Page boot and event routing.
//!
//! [`boot`] runs the fixed start-up order of a page: redirect check, navbar,
//! footer, navbar chrome, mobile menu, active link, year. [`Widgets`] then
//! holds the carousels and slider tabs mounted on the page and routes host
//! events (timer ticks, clicks, hover, scroll) to them.

use url::Url;

use crate::carousel::Carousel;
use crate::config::SiteConfig;
use crate::dom::{Dom, NodeId};
use crate::error::ConfigError;
use crate::loader::{load_fragment_with, local_redirect, page_name, FragmentSource};
use crate::time::{TimerHandle, TimerHost};
use crate::ui::{self, MenuVisibility, NavbarChrome, SliderTabs};

/// Where the page is and what the host knows about it at boot.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub location: Url,
    pub scroll_y: f64,
    pub year: i32,
}

impl PageContext {
    /// A context at the top of the page, stamped with the current year.
    pub fn new(location: Url) -> Self {
        Self {
            location,
            scroll_y: 0.0,
            year: ui::current_year(),
        }
    }

    pub fn with_scroll(mut self, scroll_y: f64) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// File name of the page, `index.html` for a directory.
    pub fn page(&self) -> String {
        page_name(&self.location)
    }
}

/// What each boot step found.
#[derive(Debug, Clone, PartialEq)]
pub struct BootReport {
    pub page: String,
    pub navbar_loaded: bool,
    pub footer_loaded: bool,
    /// `None` when the page has no `nav` element.
    pub chrome: Option<NavbarChrome>,
    /// `None` when the page has no mobile menu with a button.
    pub mobile_menu: Option<MenuVisibility>,
    pub active_links: usize,
    pub year_stamped: bool,
}

/// Result of [`boot`].
#[derive(Debug, Clone, PartialEq)]
pub enum BootOutcome {
    /// The page was opened from the filesystem; nothing was loaded.
    Redirect(Url),
    Booted(BootReport),
}

/// Run the boot sequence against `dom`.
///
/// Fragment failures are handled inside the loader and only show up as
/// `false` in the report. The only error is an unparseable dev server URL.
pub fn boot<D, S>(dom: &mut D, source: &S, config: &SiteConfig, ctx: &PageContext) -> Result<BootOutcome, ConfigError>
where
    D: Dom + ?Sized,
    S: FragmentSource + ?Sized,
{
    let dev_server = config.dev_server_url()?;
    if let Some(target) = local_redirect(&ctx.location, &dev_server) {
        log::warn!("page opened from {}, redirecting to {}", ctx.location, target);
        return Ok(BootOutcome::Redirect(target));
    }

    let page = ctx.page();
    log::info!("booting {}", page);

    let fragments = &config.fragments;
    let navbar_loaded = load_fragment_with(
        dom,
        source,
        &fragments.navbar.target_id,
        &fragments.navbar.path,
        &config.dev_server,
    );
    let footer_loaded = load_fragment_with(
        dom,
        source,
        &fragments.footer.target_id,
        &fragments.footer.path,
        &config.dev_server,
    );

    let report = BootReport {
        chrome: ui::refresh_navbar_chrome(dom, &page, ctx.scroll_y),
        mobile_menu: ui::mobile_menu_visibility(dom),
        active_links: ui::refresh_active_link(dom, &page),
        year_stamped: ui::stamp_current_year(dom, ctx.year),
        page,
        navbar_loaded,
        footer_loaded,
    };
    log::info!(
        "booted {}: navbar={} footer={} active_links={}",
        report.page,
        report.navbar_loaded,
        report.footer_loaded,
        report.active_links
    );
    Ok(BootOutcome::Booted(report))
}

/// Interactive widgets mounted on a page.
#[derive(Debug, Default)]
pub struct Widgets {
    carousels: Vec<Carousel>,
    tabs: Option<SliderTabs>,
}

impl Widgets {
    /// Mount every configured carousel present on the page, and the slider
    /// tabs if all their elements exist.
    pub fn mount<D, T>(dom: &mut D, timers: &mut T, config: &SiteConfig) -> Self
    where
        D: Dom + ?Sized,
        T: TimerHost + ?Sized,
    {
        let carousels: Vec<Carousel> = config
            .sliders
            .iter()
            .filter_map(|slider| Carousel::mount(dom, timers, &slider.container_id, slider.options))
            .collect();
        let tabs = SliderTabs::mount_team_years(dom);
        log::debug!("mounted {} carousels, tabs: {}", carousels.len(), tabs.is_some());
        Self { carousels, tabs }
    }

    pub fn carousels(&self) -> &[Carousel] {
        &self.carousels
    }

    pub fn tabs(&self) -> Option<&SliderTabs> {
        self.tabs.as_ref()
    }

    /// The carousel mounted on `container`.
    pub fn carousel(&self, container: NodeId) -> Option<&Carousel> {
        self.carousels.iter().find(|c| c.container() == container)
    }

    /// Deliver a timer firing. Returns `true` if a carousel owned it.
    pub fn on_timer<D: Dom + ?Sized>(&mut self, dom: &mut D, handle: TimerHandle) -> bool {
        self.carousels.iter_mut().any(|c| c.on_timer(dom, handle))
    }

    /// Deliver a click. Returns `true` if some widget handled it.
    pub fn click<D: Dom + ?Sized>(&mut self, dom: &mut D, target: NodeId) -> bool {
        if ui::is_mobile_menu_button(dom, target) {
            return ui::toggle_mobile_menu(dom).is_some();
        }
        if let Some(tabs) = &self.tabs {
            if tabs.click(dom, target) {
                return true;
            }
        }
        self.carousels.iter_mut().any(|c| c.click(dom, target))
    }

    /// The pointer entered `container`.
    pub fn pointer_enter<T: TimerHost + ?Sized>(&mut self, timers: &mut T, container: NodeId) {
        if let Some(c) = self.carousels.iter_mut().find(|c| c.container() == container) {
            c.pointer_enter(timers);
        }
    }

    /// The pointer left `container`.
    pub fn pointer_leave<T: TimerHost + ?Sized>(&mut self, timers: &mut T, container: NodeId) {
        if let Some(c) = self.carousels.iter_mut().find(|c| c.container() == container) {
            c.pointer_leave(timers);
        }
    }

    /// Stop every carousel timer.
    pub fn pause_all<T: TimerHost + ?Sized>(&mut self, timers: &mut T) {
        for c in &mut self.carousels {
            c.pause(timers);
        }
    }
}

/// Re-style the navbar after a scroll.
pub fn on_scroll<D: Dom + ?Sized>(dom: &mut D, ctx: &PageContext) -> Option<NavbarChrome> {
    ui::refresh_navbar_chrome(dom, &ctx.page(), ctx.scroll_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::CarouselState;
    use crate::dom::MemoryDom;
    use crate::loader::{MapSource, REMEDIATION_TEXT};
    use crate::time::ManualTimers;
    use std::time::Duration;

    const PAGE: &str = r#"<html><body>
<div id="navbar-placeholder"></div>
<main>
  <div id="alumni-slider"><button class="prev-btn">&lt;</button><div class="slider-track"><div>A</div><div>B</div><div>C</div></div><button class="next-btn">&gt;</button></div>
</main>
<div id="footer-placeholder"></div>
</body></html>"#;

    const NAVBAR: &str = r#"<nav class="bg-transparent"><a class="nav-link text-slate-300 hover:text-white" href="index.html">Home</a><a class="nav-link text-slate-300 hover:text-white" href="events.html">Events</a><button id="mobile-menu-btn"></button><div id="mobile-menu" class="hidden"></div></nav>"#;

    fn source() -> MapSource {
        MapSource::new()
            .with("components/navbar.html", NAVBAR)
            .with("components/footer.html", r#"<footer><span id="current-year"></span></footer>"#)
    }

    fn ctx(url: &str) -> PageContext {
        PageContext::new(Url::parse(url).unwrap()).with_year(2026)
    }

    #[test]
    fn test_boot_full_page() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let outcome = boot(&mut dom, &source(), &SiteConfig::default(), &ctx("http://localhost:3000/events.html")).unwrap();
        let BootOutcome::Booted(report) = outcome else {
            panic!("expected boot");
        };
        assert!(report.navbar_loaded && report.footer_loaded);
        assert_eq!(report.page, "events.html");
        assert_eq!(report.chrome, Some(NavbarChrome::Solid));
        assert_eq!(report.mobile_menu, Some(MenuVisibility::Hidden));
        assert_eq!(report.active_links, 1);
        assert!(report.year_stamped);

        let year = dom.element_by_id("current-year").unwrap();
        assert_eq!(dom.text(year), "2026");
    }

    #[test]
    fn test_boot_redirects_file_pages() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let outcome = boot(&mut dom, &source(), &SiteConfig::default(), &ctx("file:///srv/site/team.html")).unwrap();
        assert_eq!(
            outcome,
            BootOutcome::Redirect(Url::parse("http://localhost:3000/team.html").unwrap())
        );
        let slot = dom.element_by_id("navbar-placeholder").unwrap();
        assert_eq!(dom.inner_html(slot), "");
    }

    #[test]
    fn test_boot_survives_missing_footer() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let source = MapSource::new().with("components/navbar.html", NAVBAR);
        let Ok(BootOutcome::Booted(report)) = boot(&mut dom, &source, &SiteConfig::default(), &ctx("http://localhost:3000/")) else {
            panic!("expected boot");
        };
        assert!(report.navbar_loaded);
        assert!(!report.footer_loaded);
        assert!(!report.year_stamped);
        assert_eq!(report.chrome, Some(NavbarChrome::Transparent));

        let slot = dom.element_by_id("footer-placeholder").unwrap();
        assert!(dom.inner_html(slot).contains(REMEDIATION_TEXT));
    }

    #[test]
    fn test_boot_rejects_bad_dev_server() {
        let mut dom = MemoryDom::new();
        let mut config = SiteConfig::default();
        config.dev_server = "::".into();
        assert!(boot(&mut dom, &source(), &config, &ctx("http://localhost:3000/")).is_err());
    }

    #[test]
    fn test_widgets_route_events() {
        let mut dom = MemoryDom::parse_document(PAGE);
        boot(&mut dom, &source(), &SiteConfig::default(), &ctx("http://localhost:3000/")).unwrap();

        let mut timers = ManualTimers::new();
        let mut widgets = Widgets::mount(&mut dom, &mut timers, &SiteConfig::default());
        assert_eq!(widgets.carousels().len(), 1);
        assert!(widgets.tabs().is_none());

        let container = dom.element_by_id("alumni-slider").unwrap();
        let fired = timers.advance(Duration::from_millis(2000));
        assert_eq!(fired.len(), 1);
        assert!(widgets.on_timer(&mut dom, fired[0]));
        assert_eq!(widgets.carousel(container).unwrap().index(), 1);

        widgets.pointer_enter(&mut timers, container);
        assert_eq!(widgets.carousel(container).unwrap().state(), CarouselState::Hovered);
        assert_eq!(timers.active(), 0);
        widgets.pointer_leave(&mut timers, container);
        assert_eq!(timers.active(), 1);

        let next = dom.descendant_by_class(container, "next-btn").unwrap();
        assert!(widgets.click(&mut dom, next));
        assert_eq!(widgets.carousel(container).unwrap().index(), 2);

        let btn = dom.element_by_id("mobile-menu-btn").unwrap();
        assert!(widgets.click(&mut dom, btn));
        assert_eq!(ui::mobile_menu_visibility(&dom), Some(MenuVisibility::Shown));

        widgets.pause_all(&mut timers);
        assert_eq!(timers.active(), 0);
    }

    #[test]
    fn test_scroll_restyles_home_navbar() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let context = ctx("http://localhost:3000/index.html");
        boot(&mut dom, &source(), &SiteConfig::default(), &context).unwrap();
        assert_eq!(on_scroll(&mut dom, &context.clone().with_scroll(400.0)), Some(NavbarChrome::Scrolled));
        let nav = dom.first_by_tag("nav").unwrap();
        assert!(dom.has_class(nav, "navbar-scrolled"));
    }
}
