//! Assertions on HTML forms and their inputs.

use scraper::{ElementRef, Html, Selector};

/// Get the first form in the document, panicking if there is none.
#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("the page should contain a form")
}

/// Assert that the form submits to `endpoint` via the given htmx attribute,
/// e.g. `hx-post` or `hx-put`.
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got_endpoint = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        got_endpoint, endpoint,
        "form should submit to \"{endpoint}\" via {attribute}, got {got_endpoint:?}"
    );
}

fn find_input<'a>(form: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    form.select(&Selector::parse("input").unwrap())
        .find(|input| input.value().attr("name").unwrap_or_default() == name)
}

#[track_caller]
fn assert_input_type_and_required(input: &ElementRef<'_>, name: &str, type_: &str) {
    let got_type = input.value().attr("type").unwrap_or_default();

    assert_eq!(
        got_type, type_,
        "input \"{name}\" should have type \"{type_}\", got {got_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "input \"{name}\" should have the required attribute"
    );
}

/// Assert that the form has a required input with the given name and type.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let Some(input) = find_input(form, name) else {
        panic!("No input found with name \"{name}\" and type \"{type_}\"");
    };

    assert_input_type_and_required(&input, name, type_);
}

/// Assert that the form has a required input with the given name, type and
/// value.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let Some(input) = find_input(form, name) else {
        panic!("No input found with name \"{name}\" and type \"{type_}\"");
    };

    assert_input_type_and_required(&input, name, type_);

    let got_value = input.value().attr("value").unwrap_or_default();
    assert_eq!(
        got_value, value,
        "input \"{name}\" should have value \"{value}\", got {got_value:?}"
    );
}

/// Assert that the form's first button is a submit button with the given text.
#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        button.value().attr("type").unwrap_or_default(),
        "submit",
        "button should have type \"submit\""
    );
    assert_eq!(text, element_text(&button));
}

/// Assert that the first paragraph in the form shows the given error message.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let paragraph = form
        .select(&Selector::parse("p").unwrap())
        .next()
        .expect("No error message found");

    assert_eq!(want_error_message, element_text(&paragraph));
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
