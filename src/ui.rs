//! Page chrome: navbar styling, active links, mobile menu, footer year,
//! slider tabs and reveal-on-scroll.
//!
//! Each behaviour is split into a state value and a pure mapping from that
//! state to the classes it applies ([`ClassPatch`]). The `refresh_*`
//! functions look up their elements and quietly do nothing when a page does
//! not have them.

use chrono::Datelike;

use crate::dom::{ClassPatch, Dom, NodeId};

/// Scroll offset past which the home page navbar turns opaque.
pub const SCROLL_THRESHOLD: f64 = 20.0;

/// Fraction of a section that must be visible before it is revealed.
pub const REVEAL_THRESHOLD: f32 = 0.1;

/// Whether `page` (a file name as returned by
/// [`page_name`](crate::loader::page_name)) is the landing page.
pub fn is_home(page: &str) -> bool {
    page.is_empty() || page == "index.html"
}

/// Visual state of the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarChrome {
    /// Home page at the top: the hero shows through.
    Transparent,
    /// Home page scrolled down.
    Scrolled,
    /// Any other page.
    Solid,
}

impl NavbarChrome {
    pub fn for_page(page: &str, scroll_y: f64) -> Self {
        if !is_home(page) {
            NavbarChrome::Solid
        } else if scroll_y > SCROLL_THRESHOLD {
            NavbarChrome::Scrolled
        } else {
            NavbarChrome::Transparent
        }
    }

    pub fn patch(self) -> ClassPatch {
        match self {
            NavbarChrome::Transparent => ClassPatch {
                add: &["bg-transparent"],
                remove: &["navbar-scrolled", "bg-slate-900/95", "backdrop-blur-xl", "shadow-2xl"],
            },
            NavbarChrome::Scrolled => ClassPatch {
                add: &["navbar-scrolled", "bg-slate-900/95", "backdrop-blur-xl", "shadow-2xl"],
                remove: &["bg-transparent"],
            },
            NavbarChrome::Solid => ClassPatch {
                add: &["bg-slate-900/90", "backdrop-blur-md", "border-b", "border-white/10"],
                remove: &["bg-transparent"],
            },
        }
    }
}

/// Style the first `nav` element for `page` at `scroll_y`.
pub fn refresh_navbar_chrome<D: Dom + ?Sized>(dom: &mut D, page: &str, scroll_y: f64) -> Option<NavbarChrome> {
    let nav = dom.first_by_tag("nav")?;
    let chrome = NavbarChrome::for_page(page, scroll_y);
    chrome.patch().apply(dom, nav);
    Some(chrome)
}

const DESKTOP_ACTIVE: ClassPatch = ClassPatch {
    add: &["text-white", "bg-primary/10"],
    remove: &["text-slate-300", "hover:text-white"],
};

const MOBILE_ACTIVE: ClassPatch = ClassPatch {
    add: &["text-white", "bg-primary/10"],
    remove: &["text-slate-300", "hover:bg-primary/10", "hover:text-primary"],
};

/// Highlight desktop and mobile links whose `href` is `page`. Returns the
/// number of links highlighted.
pub fn refresh_active_link<D: Dom + ?Sized>(dom: &mut D, page: &str) -> usize {
    let mut count = 0;
    for (class, patch) in [("nav-link", DESKTOP_ACTIVE), ("mobile-nav-link", MOBILE_ACTIVE)] {
        for link in dom.elements_by_class(class) {
            if dom.attribute(link, "href").as_deref() == Some(page) {
                patch.apply(dom, link);
                count += 1;
            }
        }
    }
    count
}

/// Whether the mobile menu is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuVisibility {
    Hidden,
    Shown,
}

impl MenuVisibility {
    pub fn toggled(self) -> Self {
        match self {
            MenuVisibility::Hidden => MenuVisibility::Shown,
            MenuVisibility::Shown => MenuVisibility::Hidden,
        }
    }

    /// Whether the menu element carries `hidden` in this state.
    pub fn has_hidden_class(self) -> bool {
        self == MenuVisibility::Hidden
    }
}

fn mobile_menu<D: Dom + ?Sized>(dom: &D) -> Option<NodeId> {
    // The menu is only interactive when its button exists too.
    dom.element_by_id("mobile-menu-btn")?;
    dom.element_by_id("mobile-menu")
}

/// Current mobile menu state, if the page has one.
pub fn mobile_menu_visibility<D: Dom + ?Sized>(dom: &D) -> Option<MenuVisibility> {
    let menu = mobile_menu(dom)?;
    Some(if dom.has_class(menu, "hidden") {
        MenuVisibility::Hidden
    } else {
        MenuVisibility::Shown
    })
}

/// Show a hidden mobile menu or hide a shown one.
pub fn toggle_mobile_menu<D: Dom + ?Sized>(dom: &mut D) -> Option<MenuVisibility> {
    let menu = mobile_menu(dom)?;
    let hidden = dom.toggle_class(menu, "hidden");
    Some(if hidden {
        MenuVisibility::Hidden
    } else {
        MenuVisibility::Shown
    })
}

/// Id of the mobile menu button, for hosts routing clicks.
pub fn is_mobile_menu_button<D: Dom + ?Sized>(dom: &D, target: NodeId) -> bool {
    dom.element_by_id("mobile-menu-btn") == Some(target)
}

/// Write `year` into `#current-year`. Returns whether the element exists.
pub fn stamp_current_year<D: Dom + ?Sized>(dom: &mut D, year: i32) -> bool {
    match dom.element_by_id("current-year") {
        Some(node) => {
            dom.set_text(node, &year.to_string());
            true
        }
        None => false,
    }
}

/// The current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

const ACTIVE_TAB: ClassPatch = ClassPatch {
    add: &["bg-primary", "text-white"],
    remove: &["bg-white/10", "text-slate-400"],
};

const INACTIVE_TAB: ClassPatch = ClassPatch {
    add: &["bg-white/10", "text-slate-400"],
    remove: &["bg-primary", "text-white"],
};

const SHOWN_PANEL: ClassPatch = ClassPatch {
    add: &["fade-in-section"],
    remove: &["hidden"],
};

const HIDDEN_PANEL: ClassPatch = ClassPatch {
    add: &["hidden"],
    remove: &["fade-in-section"],
};

/// Two tab buttons that each show one slider and hide the other.
#[derive(Debug, Clone)]
pub struct SliderTabs {
    buttons: [NodeId; 2],
    panels: [NodeId; 2],
}

impl SliderTabs {
    /// Mount on `(button_id, panel_id)` pairs. All four elements must exist.
    pub fn mount<D: Dom + ?Sized>(dom: &D, tabs: [(&str, &str); 2]) -> Option<Self> {
        Some(Self {
            buttons: [dom.element_by_id(tabs[0].0)?, dom.element_by_id(tabs[1].0)?],
            panels: [dom.element_by_id(tabs[0].1)?, dom.element_by_id(tabs[1].1)?],
        })
    }

    /// The previous-team tabs of the team page.
    pub fn mount_team_years<D: Dom + ?Sized>(dom: &D) -> Option<Self> {
        Self::mount(dom, [("btn-2024", "slider-2024"), ("btn-2023", "slider-2023")])
    }

    /// Activate tab `which` (0 or 1).
    pub fn select<D: Dom + ?Sized>(&self, dom: &mut D, which: usize) {
        if which > 1 {
            return;
        }
        let other = 1 - which;
        ACTIVE_TAB.apply(dom, self.buttons[which]);
        INACTIVE_TAB.apply(dom, self.buttons[other]);
        SHOWN_PANEL.apply(dom, self.panels[which]);
        HIDDEN_PANEL.apply(dom, self.panels[other]);
    }

    /// Route a click. Returns `true` if `target` is one of the tab buttons.
    pub fn click<D: Dom + ?Sized>(&self, dom: &mut D, target: NodeId) -> bool {
        match self.buttons.iter().position(|b| *b == target) {
            Some(which) => {
                self.select(dom, which);
                true
            }
            None => false,
        }
    }

    /// Index of the tab whose panel is visible, if exactly one is.
    pub fn selected<D: Dom + ?Sized>(&self, dom: &D) -> Option<usize> {
        let shown: Vec<usize> = (0..2).filter(|i| !dom.has_class(self.panels[*i], "hidden")).collect();
        match shown.as_slice() {
            [one] => Some(*one),
            _ => None,
        }
    }
}

/// Mark a section as revealed.
pub fn reveal<D: Dom + ?Sized>(dom: &mut D, section: NodeId) {
    dom.add_class(section, "is-visible");
    dom.set_style(section, "opacity", "1");
    dom.set_style(section, "transform", "translateY(0)");
}

/// Reveal every `.fade-in-section` whose visible fraction, as reported by
/// `visible_ratio`, reaches [`REVEAL_THRESHOLD`]. Returns how many were
/// revealed by this call.
pub fn reveal_visible<D, F>(dom: &mut D, mut visible_ratio: F) -> usize
where
    D: Dom + ?Sized,
    F: FnMut(NodeId) -> f32,
{
    let mut revealed = 0;
    for section in dom.elements_by_class("fade-in-section") {
        if dom.has_class(section, "is-visible") {
            continue;
        }
        if visible_ratio(section) >= REVEAL_THRESHOLD {
            reveal(dom, section);
            revealed += 1;
        }
    }
    revealed
}
