//! Shared helpers for splitting long listings into pages.

use std::ops::RangeInclusive;

use maud::{Markup, html};

/// Settings that control how listing pages are sized and linked.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum rows to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

/// One entry in the pagination bar.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The range of page numbers to display around `curr_page`.
///
/// The window holds at most `max_pages` pages and clamps to the ends of the
/// page range instead of shrinking.
fn page_window(curr_page: u64, page_count: u64, max_pages: u64) -> RangeInclusive<u64> {
    let half_window = max_pages / 2;

    if page_count <= max_pages {
        1..=page_count
    } else if curr_page <= half_window {
        1..=max_pages
    } else if curr_page + half_window > page_count {
        (page_count - max_pages + 1)..=page_count
    } else {
        (curr_page - half_window)..=(curr_page + half_window)
    }
}

/// Build the entries of the pagination bar: a window of numbered pages around
/// `curr_page`, links back to the first and last page, and Back/Next buttons
/// where they apply.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let window = page_window(curr_page, page_count, max_pages);
    let last_window_page = *window.end();
    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if *window.start() > 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    for page in window {
        if page == curr_page {
            indicators.push(PaginationIndicator::CurrPage(page));
        } else {
            indicators.push(PaginationIndicator::Page(page));
        }
    }

    if last_window_page < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

const PAGE_LINK_STYLE: &str = "flex items-center justify-center px-3 h-8 leading-tight \
    text-gray-500 bg-white border border-gray-300 hover:bg-gray-100 \
    hover:text-gray-700 dark:bg-gray-800 dark:border-gray-700 dark:text-gray-400 \
    dark:hover:bg-gray-700 dark:hover:text-white";

const CURR_PAGE_STYLE: &str = "flex items-center justify-center px-3 h-8 text-blue-600 \
    bg-blue-50 border border-gray-300 dark:border-gray-700 dark:bg-gray-700 \
    dark:text-white";

/// Render pagination indicators as a navigation bar.
///
/// `make_url` builds the link target for a page number. Callers use it to
/// carry their filter query params across page links.
pub fn pagination_nav(
    indicators: &[PaginationIndicator],
    make_url: impl Fn(u64) -> String,
) -> Markup {
    if indicators.is_empty() {
        return html! {};
    }

    // Template adapted from https://flowbite.com/docs/components/pagination/
    html! {
        nav class="pagination flex justify-center mt-4" aria-label="Page navigation"
        {
            ul class="pagination inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators
                {
                    @match indicator
                    {
                        PaginationIndicator::BackButton(page) => li {
                            a
                                href=(make_url(*page))
                                role="button"
                                class=(format!("{PAGE_LINK_STYLE} rounded-s-lg"))
                            {
                                "Back"
                            }
                        }
                        PaginationIndicator::Page(page) => li {
                            a href=(make_url(*page)) class=(PAGE_LINK_STYLE) { (page) }
                        }
                        PaginationIndicator::CurrPage(page) => li {
                            p aria-current="page" class=(CURR_PAGE_STYLE) { (page) }
                        }
                        PaginationIndicator::Ellipsis => li {
                            p class=(PAGE_LINK_STYLE) { "..." }
                        }
                        PaginationIndicator::NextButton(page) => li {
                            a
                                href=(make_url(*page))
                                role="button"
                                class=(format!("{PAGE_LINK_STYLE} rounded-e-lg"))
                            {
                                "Next"
                            }
                        }
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod pagination_nav_tests {
    use scraper::{Html, Selector};

    use super::{PaginationIndicator, pagination_nav};

    fn render(indicators: &[PaginationIndicator]) -> Html {
        let markup = pagination_nav(indicators, |page| format!("/transactions?page={page}"));
        Html::parse_fragment(&markup.0)
    }

    #[test]
    fn renders_links_current_page_and_buttons() {
        let html = render(&[
            PaginationIndicator::BackButton(1),
            PaginationIndicator::Page(1),
            PaginationIndicator::CurrPage(2),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(3),
        ]);

        let nav_selector = Selector::parse("nav.pagination > ul.pagination").unwrap();
        let nav = html
            .select(&nav_selector)
            .next()
            .expect("No pagination indicator found");

        let list_items: Vec<_> = nav.select(&Selector::parse("li").unwrap()).collect();
        assert_eq!(
            list_items.len(),
            6,
            "got {} items, want 6",
            list_items.len()
        );

        let current = nav
            .select(&Selector::parse("p[aria-current='page']").unwrap())
            .next()
            .expect("No current page indicator found");
        assert_eq!(current.text().collect::<String>().trim(), "2");

        let links: Vec<_> = nav.select(&Selector::parse("a").unwrap()).collect();
        let hrefs: Vec<_> = links
            .iter()
            .map(|link| link.value().attr("href").expect("Link missing href"))
            .collect();
        assert_eq!(
            hrefs,
            vec![
                "/transactions?page=1",
                "/transactions?page=1",
                "/transactions?page=10",
                "/transactions?page=3",
            ]
        );

        let buttons: Vec<String> = links
            .iter()
            .filter(|link| link.value().attr("role") == Some("button"))
            .map(|link| link.text().collect::<String>().trim().to_owned())
            .collect();
        assert_eq!(buttons, vec!["Back", "Next"]);
    }

    #[test]
    fn renders_nothing_for_empty_indicator_list() {
        let html = render(&[]);

        let got = html.select(&Selector::parse("nav").unwrap()).count();
        assert_eq!(got, 0, "want no nav element, got {got}");
    }
}
