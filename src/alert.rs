//! Alert fragments for showing the outcome of htmx form submissions.
//!
//! Alerts replace the `#alert-container` element in the base layout via an
//! out-of-band swap, so an endpoint can return one no matter what the
//! requesting form targets.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const SUCCESS_STYLE: &str = "border-green-300 bg-green-50 text-green-800 \
    dark:border-green-800 dark:bg-gray-800 dark:text-green-400";

const ERROR_STYLE: &str = "border-red-300 bg-red-50 text-red-800 \
    dark:border-red-800 dark:bg-gray-800 dark:text-red-400";

/// A success or error message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something worked, with extra detail text.
    Success { message: String, details: String },
    /// Something worked.
    SuccessSimple { message: String },
    /// Something failed, with extra detail text.
    Error { message: String, details: String },
    /// Something failed.
    ErrorSimple { message: String },
}

impl Alert {
    /// Render the alert as a replacement for the page's alert container.
    pub fn into_html(self) -> Markup {
        let (message, details, color_style) = match self {
            Alert::Success { message, details } => (message, Some(details), SUCCESS_STYLE),
            Alert::SuccessSimple { message } => (message, None, SUCCESS_STYLE),
            Alert::Error { message, details } => (message, Some(details), ERROR_STYLE),
            Alert::ErrorSimple { message } => (message, None, ERROR_STYLE),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    class=(format!("flex items-start justify-between rounded-lg border p-4 shadow-lg {color_style}"))
                    role="alert"
                {
                    div
                    {
                        p class="text-sm font-medium" { (message) }

                        @if let Some(details) = details
                        {
                            p class="mt-1 text-sm opacity-80" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-4 text-lg leading-none"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                        aria-label="Close"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::Alert;

    fn render(alert: Alert) -> Html {
        Html::parse_fragment(&alert.into_html().0)
    }

    #[test]
    fn alert_replaces_alert_container_out_of_band() {
        let html = render(Alert::SuccessSimple {
            message: "Saved".to_owned(),
        });

        let container = html
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .expect("alert should render an #alert-container element");

        assert_eq!(
            container.value().attr("hx-swap-oob"),
            Some("true"),
            "alert container should be swapped out-of-band"
        );
    }

    #[test]
    fn error_alert_renders_message_and_details() {
        let html = render(Alert::Error {
            message: "Could not delete category".to_owned(),
            details: "The category could not be found.".to_owned(),
        });

        let message = html
            .select(&Selector::parse("p.text-sm.font-medium").unwrap())
            .next()
            .expect("alert should contain a message paragraph")
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), "Could not delete category");

        let details = html
            .select(&Selector::parse("p.mt-1.text-sm.opacity-80").unwrap())
            .next()
            .expect("alert should contain a details paragraph")
            .text()
            .collect::<String>();
        assert_eq!(details.trim(), "The category could not be found.");
    }

    #[test]
    fn simple_alert_has_no_details_paragraph() {
        let html = render(Alert::ErrorSimple {
            message: "Could not save the transaction".to_owned(),
        });

        let got = html
            .select(&Selector::parse("p.mt-1.text-sm.opacity-80").unwrap())
            .count();
        assert_eq!(got, 0, "want no details paragraph, got {got}");
    }
}
