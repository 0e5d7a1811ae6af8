//! The navigation bar shown at the top of every page.
//!
//! On large screens the bar renders as a single row of links. On small
//! screens the links move into a fixed bar at the bottom of the viewport,
//! with the less used destinations tucked behind a "More" popover.

use maud::{Markup, html};

use crate::endpoints;

/// A destination reachable from the navigation bar.
#[derive(Clone, Copy)]
struct NavEntry {
    url: &'static str,
    label: &'static str,
}

/// Entries shown directly in the mobile bottom bar.
const PRIMARY_ENTRIES: [NavEntry; 3] = [
    NavEntry {
        url: endpoints::DASHBOARD_VIEW,
        label: "Dashboard",
    },
    NavEntry {
        url: endpoints::TRANSACTIONS_VIEW,
        label: "Transactions",
    },
    NavEntry {
        url: endpoints::REVENUES_VIEW,
        label: "Revenues",
    },
];

/// Entries tucked behind the "More" popover on small screens.
const OVERFLOW_ENTRIES: [NavEntry; 3] = [
    NavEntry {
        url: endpoints::CATEGORIES_VIEW,
        label: "Categories",
    },
    NavEntry {
        url: endpoints::REPORTS_VIEW,
        label: "Reports",
    },
    NavEntry {
        url: endpoints::LOG_OUT,
        label: "Log out",
    },
];

/// The navigation bar with the link for `active_endpoint` highlighted.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl NavBar<'_> {
    /// Create a navigation bar where the link matching `active_endpoint` is
    /// marked as the current page.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        NavBar { active_endpoint }
    }

    pub fn into_html(self) -> Markup {
        html!(
            (self.top_bar())
            (self.bottom_bar())
        )
    }

    fn is_active(&self, entry: NavEntry) -> bool {
        // Log out is an action rather than a page and is never highlighted.
        entry.url != endpoints::LOG_OUT && entry.url == self.active_endpoint
    }

    // Layout adapted from https://flowbite.com/docs/components/navbar/
    fn top_bar(&self) -> Markup {
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl mx-auto flex items-center justify-between p-4"
                {
                    a href="/" class="flex items-center gap-3"
                    {
                        img
                            src="/static/favicon-128x128.png"
                            alt="Depensier Logo"
                            class="h-8"
                        ;

                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Depensier"
                        }
                    }

                    ul class="hidden font-medium lg:flex lg:items-center lg:gap-8"
                    {
                        @for entry in PRIMARY_ENTRIES.into_iter().chain(OVERFLOW_ENTRIES) {
                            li { (self.top_bar_link(entry)) }
                        }
                    }
                }
            }
        )
    }

    fn top_bar_link(&self, entry: NavEntry) -> Markup {
        let is_active = self.is_active(entry);
        let class = if is_active {
            "block font-semibold text-blue-700 dark:text-blue-500"
        } else {
            "block text-gray-900 hover:text-blue-700 dark:text-white
            dark:hover:text-blue-500"
        };

        html!(
            a
                href=(entry.url)
                class=(class)
                aria-current=[is_active.then_some("page")]
            {
                (entry.label)
            }
        )
    }

    fn bottom_bar(&self) -> Markup {
        html!(
            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                div class="mx-auto max-w-screen-xl px-4 pb-4"
                {
                    ul
                        class="grid grid-cols-4 gap-2 rounded-xl border border-gray-200
                        bg-white/95 px-4 py-3 text-xs font-semibold text-gray-600
                        shadow-lg backdrop-blur dark:border-gray-700
                        dark:bg-gray-900/95 dark:text-gray-300"
                        aria-label="Primary"
                    {
                        @for entry in PRIMARY_ENTRIES {
                            li class="min-w-0" { (self.bottom_bar_link(entry)) }
                        }

                        li class="min-w-0" { (self.more_menu()) }
                    }
                }
            }
        )
    }

    fn bottom_bar_link(&self, entry: NavEntry) -> Markup {
        let is_active = self.is_active(entry);
        let class = if is_active {
            "flex w-full items-center justify-center rounded-lg bg-blue-50
            px-2.5 py-2 text-blue-700 shadow-sm sm:px-4 sm:text-sm
            dark:bg-blue-900/30 dark:text-blue-200"
        } else {
            "flex w-full items-center justify-center rounded-lg px-2.5 py-2
            hover:bg-blue-50/70 hover:text-blue-700 sm:px-4 sm:text-sm
            dark:hover:bg-blue-900/20 dark:hover:text-blue-200"
        };

        html!(
            a
                href=(entry.url)
                class=(class)
                aria-current=[is_active.then_some("page")]
            {
                span class="truncate" { (entry.label) }
            }
        )
    }

    /// The popover holding the overflow entries on small screens.
    fn more_menu(&self) -> Markup {
        let holds_active_page = OVERFLOW_ENTRIES
            .into_iter()
            .any(|entry| self.is_active(entry));
        let summary_class = if holds_active_page {
            "flex w-full cursor-pointer list-none items-center justify-center
            rounded-lg bg-blue-50 px-2.5 py-2 text-blue-700 shadow-sm
            sm:px-4 sm:text-sm [&::-webkit-details-marker]:hidden
            dark:bg-blue-900/30 dark:text-blue-200"
        } else {
            "flex w-full cursor-pointer list-none items-center justify-center
            rounded-lg px-2.5 py-2 hover:bg-blue-50/70 hover:text-blue-700
            sm:px-4 sm:text-sm [&::-webkit-details-marker]:hidden
            dark:hover:bg-blue-900/20 dark:hover:text-blue-200"
        };

        html!(
            details class="relative"
            {
                summary class=(summary_class)
                {
                    span class="truncate" { "More" }
                }

                div
                    class="absolute bottom-full right-0 mb-3 w-40 rounded-xl border
                    border-gray-200 bg-white/95 p-2 shadow-xl backdrop-blur
                    dark:border-gray-700 dark:bg-gray-900/95"
                {
                    ul class="flex flex-col gap-1 text-sm font-medium"
                    {
                        @for entry in OVERFLOW_ENTRIES {
                            li { (self.more_menu_link(entry)) }
                        }
                    }
                }
            }
        )
    }

    fn more_menu_link(&self, entry: NavEntry) -> Markup {
        let is_active = self.is_active(entry);
        let class = if is_active {
            "block rounded-lg bg-blue-50 px-3 py-2 text-blue-700
            dark:bg-blue-900/30 dark:text-blue-200"
        } else {
            "block rounded-lg px-3 py-2 text-gray-700 hover:bg-gray-100
            hover:text-blue-700 dark:text-gray-200 dark:hover:bg-gray-800/80
            dark:hover:text-blue-200"
        };

        html!(
            a
                href=(entry.url)
                class=(class)
                aria-current=[is_active.then_some("page")]
            {
                (entry.label)
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use std::collections::HashSet;

    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    fn render(active_endpoint: &str) -> Html {
        Html::parse_fragment(&NavBar::new(active_endpoint).into_html().into_string())
    }

    fn active_hrefs(html: &Html) -> Vec<String> {
        let selector = Selector::parse("a[aria-current='page']").unwrap();

        html.select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .map(ToOwned::to_owned)
            .collect()
    }

    #[test]
    fn links_to_every_section() {
        let html = render(endpoints::DASHBOARD_VIEW);
        let selector = Selector::parse("a").unwrap();
        let hrefs: HashSet<&str> = html
            .select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::REVENUES_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::LOG_OUT,
        ] {
            assert!(hrefs.contains(endpoint), "no link to {endpoint}");
        }
    }

    #[test]
    fn highlights_only_the_active_page() {
        let html = render(endpoints::TRANSACTIONS_VIEW);
        let active = active_hrefs(&html);

        assert!(!active.is_empty());
        assert!(
            active
                .iter()
                .all(|href| href == endpoints::TRANSACTIONS_VIEW),
            "links marked active: {active:?}"
        );
    }

    #[test]
    fn highlights_overflow_page_in_more_menu() {
        let html = render(endpoints::REPORTS_VIEW);
        let active = active_hrefs(&html);

        assert!(!active.is_empty());
        assert!(active.iter().all(|href| href == endpoints::REPORTS_VIEW));
    }

    #[test]
    fn highlights_nothing_for_pages_outside_the_nav_bar() {
        for endpoint in [endpoints::ROOT, endpoints::LOG_IN_VIEW, endpoints::LOG_OUT] {
            let html = render(endpoint);

            assert!(
                active_hrefs(&html).is_empty(),
                "expected no active link for {endpoint}"
            );
        }
    }
}
