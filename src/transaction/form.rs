//! The form fields shared by the new transaction and edit transaction pages.

use maud::{Markup, html};
use time::Date;

use crate::{
    category::{Category, CategoryId},
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, labelled_form_field,
    },
    transaction::TransactionKind,
};

/// The values the transaction form starts out with.
pub(super) struct TransactionFormDefaults<'a> {
    pub kind: TransactionKind,
    /// The prefilled amount, or `None` to leave the input empty.
    pub amount: Option<f64>,
    pub date: Date,
    /// The prefilled time of day as "HH:MM".
    pub time: &'a str,
    /// The prefilled description, or `None` to leave the input empty.
    pub description: Option<&'a str>,
    /// The category to preselect, or `None` for the placeholder option.
    pub category_id: Option<&'a CategoryId>,
    /// The latest date the date picker accepts.
    pub max_date: Date,
}

/// The shared field set of the transaction forms: amount, date, time,
/// category, description and the expense/income choice.
pub(super) fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
) -> Markup {
    let amount_field = html! {
        // w-full needed to ensure input takes the full width when prefilled with a value
        div class="input-wrapper w-full"
        {
            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
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

    let time_field = html! {
        input
            name="time"
            id="time"
            type="time"
            required
            value=(defaults.time)
            class=(FORM_TEXT_INPUT_STYLE);
    };

    let category_field = html! {
        select
            name="category_id"
            id="category_id"
            required
            class=(FORM_TEXT_INPUT_STYLE)
        {
            option value="" { "Select a category" }

            @for category in categories {
                option
                    value=(category.id)
                    selected[defaults.category_id == Some(&category.id)]
                {
                    (category.name)
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
            value=[defaults.description]
            class=(FORM_TEXT_INPUT_STYLE);
    };

    html! {
        (labelled_form_field("amount", "Amount", amount_field))
        (labelled_form_field("date", "Date", date_field))
        (labelled_form_field("time", "Time", time_field))
        (labelled_form_field("category_id", "Category", category_field))
        (labelled_form_field("description", "Description", description_field))
        (kind_radio_group(defaults.kind))
    }
}

/// The expense/income radio pair, with the radio matching `kind` checked.
fn kind_radio_group(kind: TransactionKind) -> Markup {
    html! {
        div
        {
            span class=(FORM_LABEL_STYLE) { "Type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                (kind_radio("kind-expense", "expense", "Expense", kind.is_expense()))
                (kind_radio("kind-income", "income", "Income", !kind.is_expense()))
            }
        }
    }
}

fn kind_radio(id: &str, value: &str, label_text: &str, checked: bool) -> Markup {
    html! {
        div class="flex items-center gap-2"
        {
            input
                type="radio"
                name="kind"
                id=(id)
                value=(value)
                checked[checked]
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label_text) }
        }
    }
}
