//! The form fields shared by the new revenue and edit revenue pages.

use maud::{Markup, html};
use time::Date;

use crate::{
    html::{FORM_TEXT_INPUT_STYLE, labelled_form_field},
    revenue::core::{MAX_DESCRIPTION_LENGTH, RevenueType},
};

/// The values the revenue form starts out with.
pub(super) struct RevenueFormDefaults<'a> {
    /// The prefilled amount, or `None` to leave the input empty.
    pub amount: Option<f64>,
    pub date: Date,
    /// The revenue type to preselect, or `None` for the first option.
    pub revenue_type: Option<RevenueType>,
    /// The prefilled description, or `None` to leave the input empty.
    pub description: Option<&'a str>,
    /// The latest date the date picker accepts.
    pub max_date: Date,
}

/// The shared field set of the revenue forms: amount, date, revenue type and
/// an optional description.
pub(super) fn revenue_form_fields(defaults: &RevenueFormDefaults<'_>) -> Markup {
    let amount_field = html! {
        // w-full needed to ensure input takes the full width when prefilled with a value
        div class="input-wrapper w-full"
        {
            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                required
                autofocus
                value=[defaults.amount]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    };

    let date_field = html! {
        input
            name="date"
            id="date"
            type="date"
            max=(defaults.max_date)
            required
            value=(defaults.date)
            class=(FORM_TEXT_INPUT_STYLE);
    };

    let type_field = html! {
        select
            name="revenue_type"
            id="revenue_type"
            class=(FORM_TEXT_INPUT_STYLE)
        {
            @for revenue_type in RevenueType::ALL {
                option
                    value=(revenue_type)
                    selected[defaults.revenue_type == Some(revenue_type)]
                {
                    (revenue_type)
                }
            }
        }
    };

    let description_field = html! {
        input
            name="description"
            id="description"
            type="text"
            placeholder="Description"
            maxlength=(MAX_DESCRIPTION_LENGTH)
            value=[defaults.description]
            class=(FORM_TEXT_INPUT_STYLE);
    };

    html! {
        (labelled_form_field("amount", "Amount", amount_field))
        (labelled_form_field("date", "Date", date_field))
        (labelled_form_field("revenue_type", "Type", type_field))
        (labelled_form_field("description", "Description", description_field))
    }
}
