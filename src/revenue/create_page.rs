//! Defines the route handler for the page for recording a new revenue entry.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles, form_submit_button},
    navigation::NavBar,
    revenue::form::{RevenueFormDefaults, revenue_form_fields},
    timezone::local_now,
};

fn create_revenue_view(max_date: Date) -> Markup {
    let defaults = RevenueFormDefaults {
        amount: None,
        date: max_date,
        revenue_type: None,
        description: None,
        max_date,
    };

    let content = html! {
        (NavBar::new(endpoints::NEW_REVENUE_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::REVENUES_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Revenue" }

                (revenue_form_fields(&defaults))

                (form_submit_button("Create Revenue"))
            }
        }
    };

    base("Create Revenue", &[dollar_input_styles()], &content)
}

/// The state needed for the create new revenue page.
#[derive(Debug, Clone)]
pub struct CreateRevenuePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for CreateRevenuePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for recording a revenue entry.
///
/// The date input is prefilled with the current local date and capped at today.
pub async fn get_create_revenue_page(
    State(state): State<CreateRevenuePageState>,
) -> Result<Response, Error> {
    let max_date = local_now(&state.local_timezone)?.date();

    Ok(create_revenue_view(max_date).into_response())
}
